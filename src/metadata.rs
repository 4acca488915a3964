use id3::frame::{Content, InvolvedPeopleList};
use id3::{ErrorKind, Frame, Tag, TagLike, Version};
use std::path::{Path, PathBuf};

use crate::chapters;
use crate::cli::{OutputMode, TagConfig};
use crate::document::TagDocument;
use crate::error::{Result, TaggerError};
use crate::file_utils;
use crate::frame_builder;
use crate::frames;

/// Key of the chapter list in the JSON document.
pub const CHAPTER_LIST_KEY: &str = "CTOC";

/// Outcome of filling a tag from a document.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TagReport {
    pub frames: usize,
    pub chapters: usize,
    pub skipped: Vec<String>,
}

/// Open the MP3's tag and throw its frames away, so every run starts from an
/// empty tag. A file without a tag is fine.
pub fn load_cleared(path: &Path) -> Result<Tag> {
    match Tag::read_from_path(path) {
        Ok(existing) => {
            tracing::debug!(
                "Discarding {} existing frame(s) from {}",
                existing.frames().count(),
                path.display()
            );
            Ok(Tag::new())
        }
        Err(err) => {
            if let ErrorKind::NoTag = err.kind {
                tracing::debug!("{} has no ID3v2 tag yet", path.display());
                return Ok(Tag::new());
            }
            let io_error = match &err.kind {
                ErrorKind::Io(io) => file_utils::mp3_io_error(path, io.kind()),
                _ => None,
            };
            Err(io_error.unwrap_or(TaggerError::Mp3Read {
                path: path.to_path_buf(),
                source: err,
            }))
        }
    }
}

/// Add a frame for every entry of the document, in document order.
///
/// `CTOC` holds the chapter list; every other key must be a known frame
/// identifier. Entries that can't be turned into a frame are logged and
/// skipped, and so are entries whose frame a later entry replaced. Only a
/// broken chapter list fails the run.
pub fn populate(tag: &mut Tag, document: &TagDocument, config: &TagConfig) -> Result<TagReport> {
    let mut report = TagReport::default();
    let mut origins = FrameOrigins::default();

    for (key, value) in document {
        if key == CHAPTER_LIST_KEY {
            let table = chapters::build_chapter_table(value, config)?;
            report.chapters += table.len();
            for frame in table.into_frames() {
                add_to_tag(tag, frame, key, &mut origins, &mut report);
            }
            continue;
        }

        if !frames::is_known(key) {
            tracing::warn!("Tag {} not recognized.", key);
            report.skipped.push(key.clone());
            continue;
        }

        match frame_builder::instantiate_tag(key, value, config) {
            Ok(frame) => {
                tracing::debug!("{}: {:?}", key, frame.content());
                add_to_tag(tag, frame, key, &mut origins, &mut report);
            }
            Err(err) => {
                tracing::warn!("{}", err);
                report.skipped.push(key.clone());
            }
        }
    }

    report.frames = tag.frames().count();
    Ok(report)
}

/// The document key each frame in the tag came from.
#[derive(Default)]
struct FrameOrigins(Vec<(Frame, String)>);

impl FrameOrigins {
    fn record(&mut self, frame: &Frame, key: &str) {
        self.0.push((frame.clone(), key.to_string()));
    }

    fn take(&mut self, frame: &Frame) -> Option<String> {
        let index = self.0.iter().position(|(recorded, _)| recorded == frame)?;
        Some(self.0.remove(index).1)
    }
}

fn add_to_tag(
    tag: &mut Tag,
    frame: Frame,
    key: &str,
    origins: &mut FrameOrigins,
    report: &mut TagReport,
) {
    let Some(replaced) = take_slot(tag, &frame) else {
        origins.record(&frame, key);
        tag.add_frame(frame);
        return;
    };
    let source = origins
        .take(&replaced)
        .unwrap_or_else(|| replaced.id().to_string());

    match merge_involved_people(&replaced, &frame) {
        Some(merged) => {
            tracing::debug!("{} merged into the {} frame from {}", key, replaced.id(), source);
            origins.record(&merged, key);
            tag.add_frame(merged);
        }
        None => {
            tracing::warn!("{} overwrote the {} frame from {}", key, replaced.id(), source);
            report.skipped.push(source);
            origins.record(&frame, key);
            tag.add_frame(frame);
        }
    }
}

/// Whether two frames occupy the same place in a v2.3 tag, whatever their
/// text encoding.
fn same_slot(a: &Frame, b: &Frame) -> bool {
    if a.id() != b.id() {
        return false;
    }
    match (a.content(), b.content()) {
        (Content::ExtendedText(x), Content::ExtendedText(y)) => x.description == y.description,
        (Content::ExtendedLink(x), Content::ExtendedLink(y)) => x.description == y.description,
        (Content::Comment(x), Content::Comment(y)) => {
            x.lang == y.lang && x.description == y.description
        }
        (Content::Lyrics(x), Content::Lyrics(y)) => {
            x.lang == y.lang && x.description == y.description
        }
        (Content::Chapter(x), Content::Chapter(y)) => x.element_id == y.element_id,
        (Content::TableOfContents(x), Content::TableOfContents(y)) => {
            x.element_id == y.element_id
        }
        _ => true,
    }
}

/// Remove and return the frame that `frame` would replace.
fn take_slot(tag: &mut Tag, frame: &Frame) -> Option<Frame> {
    if !tag.frames().any(|existing| same_slot(existing, frame)) {
        return None;
    }
    let mut taken = None;
    for existing in tag.remove(frame.id()) {
        if taken.is_none() && same_slot(&existing, frame) {
            taken = Some(existing);
        } else {
            tag.add_frame(existing);
        }
    }
    taken
}

/// v2.3 has a single IPLS frame, so TIPL, TMCL and IPLS entries share it.
fn merge_involved_people(existing: &Frame, new: &Frame) -> Option<Frame> {
    match (existing.content(), new.content()) {
        (Content::InvolvedPeopleList(old), Content::InvolvedPeopleList(added)) => {
            let items = old.items.iter().chain(&added.items).cloned().collect();
            let content = Content::InvolvedPeopleList(InvolvedPeopleList { items });
            Some(Frame::with_content(new.id(), content).set_encoding(new.encoding()))
        }
        _ => None,
    }
}

/// Write the tag as ID3v2.3, either over the original file or into a
/// `_tagged` copy of it. Returns the path that was written.
pub fn save(tag: &Tag, mp3: &Path, output: OutputMode) -> Result<PathBuf> {
    let target = match output {
        OutputMode::Overwrite => mp3.to_path_buf(),
        OutputMode::TaggedCopy => file_utils::copy_for_tagging(mp3)?,
    };

    tag.write_to_path(&target, Version::Id3v23)
        .map_err(|source| TaggerError::Write {
            path: target.clone(),
            source,
        })?;

    Ok(target)
}
