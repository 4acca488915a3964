//! CHAP/CTOC construction for the `CTOC` entry of the JSON document.
//!
//! Chapters are numbered `ch0`, `ch1`, ... in list order and a single
//! top-level, ordered table of contents `toc` lists them in that order.

use id3::frame::{Chapter, Content, TableOfContents};
use id3::Frame;
use serde_json::Value;
use thiserror::Error;

use crate::cli::TagConfig;
use crate::frame_builder;
use crate::timestamp::{self, TimestampError};

pub const TOC_ELEMENT_ID: &str = "toc";

/// Marks an unused byte offset in a CHAP frame.
const NO_OFFSET: u32 = u32::MAX;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChapterError {
    #[error("CTOC must be a list of chapters, found {0}")]
    NotAList(&'static str),

    #[error("chapter {index} must be a mapping, found {found}")]
    NotAMapping { index: usize, found: &'static str },

    #[error("chapter {index} has no '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("chapter {index} has 'sub_frames' of type {found}, expected a mapping")]
    SubFramesNotAMapping { index: usize, found: &'static str },

    #[error("chapter {index}: {source}")]
    Timestamp {
        index: usize,
        #[source]
        source: TimestampError,
    },
}

/// CHAP frames in list order plus the CTOC that references them.
#[derive(Debug)]
pub struct ChapterTable {
    pub chapters: Vec<Frame>,
    pub toc: Frame,
}

impl ChapterTable {
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn into_frames(self) -> impl Iterator<Item = Frame> {
        self.chapters.into_iter().chain(std::iter::once(self.toc))
    }
}

pub fn chapter_id(index: usize) -> String {
    format!("ch{}", index)
}

pub fn chapter_frame(
    element_id: String,
    start_time: u32,
    end_time: u32,
    frames: Vec<Frame>,
) -> Frame {
    Frame::with_content(
        "CHAP",
        Content::Chapter(Chapter {
            element_id,
            start_time,
            end_time,
            start_offset: NO_OFFSET,
            end_offset: NO_OFFSET,
            frames,
        }),
    )
}

pub fn toc_frame(
    element_id: String,
    top_level: bool,
    ordered: bool,
    elements: Vec<String>,
) -> Frame {
    Frame::with_content(
        "CTOC",
        Content::TableOfContents(TableOfContents {
            element_id,
            top_level,
            ordered,
            elements,
            frames: Vec::new(),
        }),
    )
}

/// Build one CHAP per descriptor and the CTOC listing them.
///
/// Each descriptor needs `start` and `end` timestamps and may carry a
/// `sub_frames` mapping. Sub-frames that can't be built are skipped; any
/// problem with a descriptor itself fails the whole table, since the chapter
/// numbering depends on every entry.
pub fn build_chapter_table(
    value: &Value,
    config: &TagConfig,
) -> Result<ChapterTable, ChapterError> {
    let descriptors = value
        .as_array()
        .ok_or_else(|| ChapterError::NotAList(timestamp::json_type_name(value)))?;

    let mut chapters = Vec::with_capacity(descriptors.len());
    let mut child_element_ids = Vec::with_capacity(descriptors.len());

    for (index, descriptor) in descriptors.iter().enumerate() {
        let fields = descriptor.as_object().ok_or_else(|| ChapterError::NotAMapping {
            index,
            found: timestamp::json_type_name(descriptor),
        })?;

        let time = |field: &'static str| -> Result<u32, ChapterError> {
            let raw = fields
                .get(field)
                .ok_or(ChapterError::MissingField { index, field })?;
            timestamp::convert_to_ms(raw)
                .and_then(timestamp::to_chapter_time)
                .map_err(|source| ChapterError::Timestamp { index, source })
        };
        let start_time = time("start")?;
        let end_time = time("end")?;

        let sub_frames = match fields.get("sub_frames") {
            None => Vec::new(),
            Some(Value::Object(sub_frames)) => frame_builder::build_sub_frames(sub_frames, config),
            Some(other) => {
                return Err(ChapterError::SubFramesNotAMapping {
                    index,
                    found: timestamp::json_type_name(other),
                })
            }
        };

        let element_id = chapter_id(index);
        tracing::debug!(
            "chapter {}: {} ms - {} ms, {} sub-frame(s)",
            element_id,
            start_time,
            end_time,
            sub_frames.len()
        );
        if end_time < start_time {
            tracing::warn!("chapter {} ends before it starts", element_id);
        }

        child_element_ids.push(element_id.clone());
        chapters.push(chapter_frame(element_id, start_time, end_time, sub_frames));
    }

    let toc = toc_frame(TOC_ELEMENT_ID.to_string(), true, true, child_element_ids);
    Ok(ChapterTable { chapters, toc })
}
