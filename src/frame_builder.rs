use id3::frame::{
    Comment, Content, ExtendedLink, ExtendedText, InvolvedPeopleList, InvolvedPeopleListItem,
    Lyrics,
};
use id3::Frame;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::chapters;
use crate::cli::TagConfig;
use crate::frames::{self, FrameKind, FrameSpec, TextEncoding};
use crate::timestamp::{self, TimestampError};

/// Language code used when a comment or lyrics mapping names none.
pub const UNKNOWN_LANGUAGE: &str = "XXX";

/// Separator for multi-valued text frames in ID3v2.3.
const V23_TEXT_SEPARATOR: &str = "/";

/// Why a JSON entry did not produce a frame. None of these abort the run.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Tag {0} not recognized.")]
    Unrecognized(String),

    #[error(
        "Tag {0} can't be set from a string. \
         Please use a mapping to describe what data you want to set."
    )]
    NeedsMapping(String),

    #[error(
        "{id}'s value of type {found} can't be set. \
         Please use a string or mapping to describe what data you want to set."
    )]
    WrongValueType { id: String, found: &'static str },

    #[error("{id} can't be built from the given fields: {source}")]
    InvalidFields {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{id} has an unknown text encoding {code} (expected 0-3)")]
    InvalidEncoding { id: String, code: Value },

    #[error("{id} has an invalid language code '{lang}' (expected three letters)")]
    InvalidLanguage { id: String, lang: String },

    #[error("{id} has an invalid time: {source}")]
    Timestamp {
        id: String,
        #[source]
        source: TimestampError,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextValue {
    One(String),
    Many(Vec<String>),
}

impl TextValue {
    fn joined(self) -> String {
        match self {
            TextValue::One(text) => text,
            TextValue::Many(parts) => parts.join(V23_TEXT_SEPARATOR),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PeopleValue {
    One(String),
    Pairs(Vec<(String, String)>),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TextFields {
    text: TextValue,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UserTextFields {
    #[serde(default)]
    desc: String,
    text: TextValue,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LanguageTextFields {
    #[serde(default = "unknown_language")]
    lang: String,
    #[serde(default)]
    desc: String,
    text: TextValue,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UrlFields {
    url: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UserUrlFields {
    #[serde(default)]
    desc: String,
    url: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PeopleFields {
    people: PeopleValue,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ChapterFields {
    element_id: String,
    start_time: Value,
    end_time: Value,
    #[serde(default)]
    sub_frames: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TocFields {
    element_id: String,
    child_element_ids: Vec<String>,
    #[serde(default = "default_true")]
    top_level: bool,
    #[serde(default = "default_true")]
    ordered: bool,
}

fn unknown_language() -> String {
    UNKNOWN_LANGUAGE.to_string()
}

fn default_true() -> bool {
    true
}

/// Build the frame for one `frame_id`/`value` pair of the JSON document.
///
/// Strings are accepted for text, URL and involved-people frames. Mappings are
/// accepted for every registered frame and are matched against the field set
/// of the frame's kind; a missing `encoding` falls back to the configured one.
pub fn instantiate_tag(
    frame_id: &str,
    value: &Value,
    config: &TagConfig,
) -> Result<Frame, FrameError> {
    let spec = frames::lookup(frame_id)
        .ok_or_else(|| FrameError::Unrecognized(frame_id.to_string()))?;

    match value {
        Value::String(text) => from_string(spec, text, config),
        Value::Object(fields) => from_mapping(spec, fields, config),
        other => Err(FrameError::WrongValueType {
            id: frame_id.to_string(),
            found: timestamp::json_type_name(other),
        }),
    }
}

/// Build every sub-frame of a chapter, in mapping order. Entries that fail are
/// reported and left out.
pub fn build_sub_frames(sub_frames: &Map<String, Value>, config: &TagConfig) -> Vec<Frame> {
    sub_frames
        .iter()
        .filter_map(|(id, value)| match instantiate_tag(id, value, config) {
            Ok(frame) => Some(frame),
            Err(err) => {
                tracing::warn!("Skipping sub-frame: {}", err);
                None
            }
        })
        .collect()
}

fn from_string(spec: &FrameSpec, value: &str, config: &TagConfig) -> Result<Frame, FrameError> {
    let encoding = config.encoding;
    let text = || TextValue::One(value.to_string());

    match spec.kind {
        FrameKind::Text => Ok(text_frame(spec, TextFields { text: text() }, encoding)),
        FrameKind::UserText => Ok(user_text_frame(
            spec,
            UserTextFields { desc: String::new(), text: text() },
            encoding,
        )),
        FrameKind::Comment => language_text_frame(
            spec,
            LanguageTextFields { lang: unknown_language(), desc: String::new(), text: text() },
            encoding,
        ),
        FrameKind::Url => Ok(url_frame(spec, UrlFields { url: value.to_string() })),
        FrameKind::UserUrl => Ok(user_url_frame(
            spec,
            UserUrlFields { desc: String::new(), url: value.to_string() },
            encoding,
        )),
        FrameKind::PairedText => Ok(people_frame(
            spec,
            PeopleFields { people: PeopleValue::One(value.to_string()) },
            encoding,
        )),
        FrameKind::Lyrics | FrameKind::Chapter | FrameKind::TableOfContents => {
            Err(FrameError::NeedsMapping(spec.id.to_string()))
        }
    }
}

fn from_mapping(
    spec: &FrameSpec,
    fields: &Map<String, Value>,
    config: &TagConfig,
) -> Result<Frame, FrameError> {
    let mut fields = fields.clone();
    let encoding = match fields.remove("encoding") {
        Some(code) => parse_encoding(spec, code)?,
        None => config.encoding,
    };
    let fields = Value::Object(fields);

    match spec.kind {
        FrameKind::Text => Ok(text_frame(spec, parse_fields(spec, fields)?, encoding)),
        FrameKind::UserText => Ok(user_text_frame(spec, parse_fields(spec, fields)?, encoding)),
        FrameKind::Comment | FrameKind::Lyrics => {
            language_text_frame(spec, parse_fields(spec, fields)?, encoding)
        }
        FrameKind::Url => Ok(url_frame(spec, parse_fields(spec, fields)?)),
        FrameKind::UserUrl => Ok(user_url_frame(spec, parse_fields(spec, fields)?, encoding)),
        FrameKind::PairedText => Ok(people_frame(spec, parse_fields(spec, fields)?, encoding)),
        FrameKind::Chapter => chapter_from_fields(spec, parse_fields(spec, fields)?, config),
        FrameKind::TableOfContents => {
            let toc: TocFields = parse_fields(spec, fields)?;
            Ok(chapters::toc_frame(
                toc.element_id,
                toc.top_level,
                toc.ordered,
                toc.child_element_ids,
            ))
        }
    }
}

fn parse_fields<T>(spec: &FrameSpec, fields: Value) -> Result<T, FrameError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(fields).map_err(|source| FrameError::InvalidFields {
        id: spec.id.to_string(),
        source,
    })
}

fn parse_encoding(spec: &FrameSpec, code: Value) -> Result<TextEncoding, FrameError> {
    code.as_u64()
        .and_then(|c| u8::try_from(c).ok())
        .and_then(TextEncoding::from_code)
        .ok_or(FrameError::InvalidEncoding { id: spec.id.to_string(), code })
}

/// Set the frame's text encoding. Latin-1 can't hold text past U+00FF, so
/// such frames are written as UTF-16 instead.
fn encoded(frame: Frame, encoding: TextEncoding) -> Frame {
    let encoding = if encoding == TextEncoding::Latin1 && !fits_latin1(frame.content()) {
        tracing::warn!(
            "{} has characters that Latin-1 can't encode, writing it as UTF-16",
            frame.id()
        );
        TextEncoding::Utf16
    } else {
        encoding
    };
    frame.set_encoding(Some(encoding.for_v23()))
}

fn fits_latin1(content: &Content) -> bool {
    let latin1 = |text: &str| text.chars().all(|c| c <= '\u{ff}');
    match content {
        Content::Text(text) => latin1(text),
        Content::ExtendedText(ExtendedText { description, value }) => {
            latin1(description) && latin1(value)
        }
        Content::Comment(Comment { description, text, .. })
        | Content::Lyrics(Lyrics { description, text, .. }) => {
            latin1(description) && latin1(text)
        }
        Content::ExtendedLink(ExtendedLink { description, .. }) => latin1(description),
        Content::InvolvedPeopleList(list) => list
            .items
            .iter()
            .all(|item| latin1(&item.involvement) && latin1(&item.involvee)),
        _ => true,
    }
}

fn text_frame(spec: &FrameSpec, fields: TextFields, encoding: TextEncoding) -> Frame {
    let text = text_for_v23(spec, fields.text.joined());
    encoded(Frame::text(spec.v23_id, text), encoding)
}

/// v2.4 timestamps stored in a v2.3 year frame keep only their year.
fn text_for_v23(spec: &FrameSpec, text: String) -> String {
    if spec.id != spec.v23_id && matches!(spec.v23_id, "TYER" | "TORY") {
        text.chars().take(4).collect()
    } else {
        text
    }
}

fn user_text_frame(spec: &FrameSpec, fields: UserTextFields, encoding: TextEncoding) -> Frame {
    let content = Content::ExtendedText(ExtendedText {
        description: fields.desc,
        value: fields.text.joined(),
    });
    encoded(Frame::with_content(spec.v23_id, content), encoding)
}

fn language_text_frame(
    spec: &FrameSpec,
    fields: LanguageTextFields,
    encoding: TextEncoding,
) -> Result<Frame, FrameError> {
    if fields.lang.len() != 3 || !fields.lang.is_ascii() {
        return Err(FrameError::InvalidLanguage { id: spec.id.to_string(), lang: fields.lang });
    }
    let content = match spec.kind {
        FrameKind::Lyrics => Content::Lyrics(Lyrics {
            lang: fields.lang,
            description: fields.desc,
            text: fields.text.joined(),
        }),
        _ => Content::Comment(Comment {
            lang: fields.lang,
            description: fields.desc,
            text: fields.text.joined(),
        }),
    };
    Ok(encoded(Frame::with_content(spec.v23_id, content), encoding))
}

fn url_frame(spec: &FrameSpec, fields: UrlFields) -> Frame {
    Frame::link(spec.v23_id, fields.url)
}

fn user_url_frame(spec: &FrameSpec, fields: UserUrlFields, encoding: TextEncoding) -> Frame {
    let content = Content::ExtendedLink(ExtendedLink {
        description: fields.desc,
        link: fields.url,
    });
    encoded(Frame::with_content(spec.v23_id, content), encoding)
}

fn people_frame(spec: &FrameSpec, fields: PeopleFields, encoding: TextEncoding) -> Frame {
    let items = match fields.people {
        PeopleValue::One(person) => vec![InvolvedPeopleListItem {
            involvement: String::new(),
            involvee: person,
        }],
        PeopleValue::Pairs(pairs) => pairs
            .into_iter()
            .map(|(involvement, involvee)| InvolvedPeopleListItem { involvement, involvee })
            .collect(),
    };
    let content = Content::InvolvedPeopleList(InvolvedPeopleList { items });
    encoded(Frame::with_content(spec.v23_id, content), encoding)
}

fn chapter_from_fields(
    spec: &FrameSpec,
    fields: ChapterFields,
    config: &TagConfig,
) -> Result<Frame, FrameError> {
    let time = |value: &Value| {
        timestamp::convert_to_ms(value)
            .and_then(timestamp::to_chapter_time)
            .map_err(|source| FrameError::Timestamp { id: spec.id.to_string(), source })
    };
    let start_time = time(&fields.start_time)?;
    let end_time = time(&fields.end_time)?;
    let sub_frames = build_sub_frames(&fields.sub_frames, config);
    Ok(chapters::chapter_frame(fields.element_id, start_time, end_time, sub_frames))
}
