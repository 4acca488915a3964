use id3::Encoding;

/// How a frame is built from a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Plain text frames (`T***`).
    Text,
    /// `TXXX`, text with a description.
    UserText,
    /// `COMM`, text with a language and description.
    Comment,
    /// Plain URL frames (`W***`), which carry no text encoding.
    Url,
    /// `WXXX`, URL with a description.
    UserUrl,
    /// Involvement/person pairs (`IPLS`, `TIPL`, `TMCL`).
    PairedText,
    /// `USLT`, only settable from a mapping.
    Lyrics,
    /// `CHAP`, only settable from a mapping.
    Chapter,
    /// `CTOC`, only settable from a mapping or through the chapter list.
    TableOfContents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpec {
    pub id: &'static str,
    pub kind: FrameKind,
    pub description: &'static str,
    /// Identifier the frame is stored under in an ID3v2.3 tag.
    pub v23_id: &'static str,
}

const fn spec(id: &'static str, kind: FrameKind, description: &'static str) -> FrameSpec {
    FrameSpec { id, kind, description, v23_id: id }
}

const fn renamed(
    id: &'static str,
    kind: FrameKind,
    description: &'static str,
    v23_id: &'static str,
) -> FrameSpec {
    FrameSpec { id, kind, description, v23_id }
}

use FrameKind::*;

/// Every frame identifier the tagger accepts.
pub const FRAMES: &[FrameSpec] = &[
    spec("TIT1", Text, "Content group description"),
    spec("TIT2", Text, "Title/songname/content description"),
    spec("TIT3", Text, "Subtitle/Description refinement"),
    spec("TALB", Text, "Album/Movie/Show title"),
    spec("TOAL", Text, "Original album/movie/show title"),
    spec("TPE1", Text, "Lead performer(s)/Soloist(s)"),
    spec("TPE2", Text, "Band/orchestra/accompaniment"),
    spec("TPE3", Text, "Conductor/performer refinement"),
    spec("TPE4", Text, "Interpreted, remixed, or otherwise modified by"),
    spec("TOPE", Text, "Original artist(s)/performer(s)"),
    spec("TCOM", Text, "Composer"),
    spec("TEXT", Text, "Lyricist/Text writer"),
    spec("TOLY", Text, "Original lyricist(s)/text writer(s)"),
    spec("TCON", Text, "Content type"),
    spec("TCOP", Text, "Copyright message"),
    spec("TPUB", Text, "Publisher"),
    spec("TENC", Text, "Encoded by"),
    spec("TSSE", Text, "Software/Hardware and settings used for encoding"),
    spec("TLAN", Text, "Language(s)"),
    spec("TKEY", Text, "Initial key"),
    spec("TMED", Text, "Media type"),
    spec("TSRC", Text, "ISRC (international standard recording code)"),
    spec("TRCK", Text, "Track number/Position in set"),
    spec("TPOS", Text, "Part of a set"),
    spec("TBPM", Text, "BPM (beats per minute)"),
    spec("TLEN", Text, "Length"),
    spec("TYER", Text, "Year"),
    spec("TDAT", Text, "Date"),
    spec("TIME", Text, "Time"),
    spec("TORY", Text, "Original release year"),
    renamed("TDRC", Text, "Recording time", "TYER"),
    renamed("TDOR", Text, "Original release time", "TORY"),
    spec("TSOA", Text, "Album sort order"),
    spec("TSOP", Text, "Performer sort order"),
    spec("TSOT", Text, "Title sort order"),
    spec("TXXX", UserText, "User defined text information"),
    spec("COMM", Comment, "Comments"),
    spec("USLT", Lyrics, "Unsynchronised lyrics/text transcription"),
    spec("WCOM", Url, "Commercial information"),
    spec("WCOP", Url, "Copyright/Legal information"),
    spec("WOAF", Url, "Official audio file webpage"),
    spec("WOAR", Url, "Official artist/performer webpage"),
    spec("WOAS", Url, "Official audio source webpage"),
    spec("WORS", Url, "Official internet radio station homepage"),
    spec("WPAY", Url, "Payment"),
    spec("WPUB", Url, "Publishers official webpage"),
    spec("WXXX", UserUrl, "User defined URL link"),
    spec("IPLS", PairedText, "Involved people list"),
    renamed("TIPL", PairedText, "Involved people list", "IPLS"),
    renamed("TMCL", PairedText, "Musician credits list", "IPLS"),
    spec("CHAP", Chapter, "Chapter"),
    spec("CTOC", TableOfContents, "Table of contents"),
];

/// Look up a frame identifier in the allow-list.
pub fn lookup(id: &str) -> Option<&'static FrameSpec> {
    FRAMES.iter().find(|spec| spec.id == id)
}

pub fn is_known(id: &str) -> bool {
    lookup(id).is_some()
}

/// Text encoding code as used in ID3 frames and in the JSON `encoding` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Latin1 = 0,
    Utf16 = 1,
    Utf16Be = 2,
    Utf8 = 3,
}

impl TextEncoding {
    pub const DEFAULT: TextEncoding = TextEncoding::Utf8;

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(TextEncoding::Latin1),
            1 => Some(TextEncoding::Utf16),
            2 => Some(TextEncoding::Utf16Be),
            3 => Some(TextEncoding::Utf8),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// ID3v2.3 only knows Latin-1 and UTF-16 with BOM.
    pub fn for_v23(self) -> Encoding {
        match self {
            TextEncoding::Latin1 => Encoding::Latin1,
            TextEncoding::Utf16 | TextEncoding::Utf16Be | TextEncoding::Utf8 => Encoding::UTF16,
        }
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        TextEncoding::DEFAULT
    }
}

/// Lines for the `--frames` listing.
pub fn describe_frames() -> Vec<String> {
    FRAMES
        .iter()
        .map(|spec| {
            if spec.v23_id == spec.id {
                format!("{}: {}", spec.id, spec.description)
            } else {
                format!("{}: {} (written as {})", spec.id, spec.description, spec.v23_id)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("TIT2").map(|s| s.kind), Some(FrameKind::Text));
        assert_eq!(lookup("WXXX").map(|s| s.kind), Some(FrameKind::UserUrl));
        assert_eq!(lookup("TIPL").map(|s| s.v23_id), Some("IPLS"));
        assert!(lookup("XXXX").is_none());
        assert!(lookup("tit2").is_none());
    }

    #[test]
    fn test_identifiers_are_unique_and_well_formed() {
        for (i, spec) in FRAMES.iter().enumerate() {
            assert_eq!(spec.id.len(), 4, "{}", spec.id);
            assert!(spec.id.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
            assert!(
                FRAMES[i + 1..].iter().all(|other| other.id != spec.id),
                "duplicate {}",
                spec.id
            );
        }
    }

    #[test]
    fn test_v23_targets_are_registered() {
        for spec in FRAMES {
            let target = lookup(spec.v23_id).expect("v2.3 target registered");
            assert_eq!(target.kind, spec.kind);
        }
    }

    #[test]
    fn test_encoding_codes() {
        assert_eq!(TextEncoding::default().code(), 3);
        assert_eq!(TextEncoding::from_code(1), Some(TextEncoding::Utf16));
        assert_eq!(TextEncoding::from_code(4), None);
        assert_eq!(TextEncoding::Utf8.for_v23(), Encoding::UTF16);
        assert_eq!(TextEncoding::Latin1.for_v23(), Encoding::Latin1);
    }
}
