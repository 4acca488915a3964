//! Fatal errors of a tagging run.

use std::path::PathBuf;
use thiserror::Error;

use crate::chapters::ChapterError;

pub type Result<T> = std::result::Result<T, TaggerError>;

/// Anything that stops a run. Problems with single frames are not in here;
/// those are logged and skipped.
#[derive(Error, Debug)]
pub enum TaggerError {
    #[error("Wrong filetype for MP3 file: {0} (expected .mp3)")]
    WrongMp3Extension(PathBuf),

    #[error("Wrong filetype for JSON file: {0} (expected .json)")]
    WrongJsonExtension(PathBuf),

    #[error("MP3 file couldn't be found: {0}")]
    Mp3NotFound(PathBuf),

    #[error("MP3 file couldn't be read. Permission denied: {0}")]
    Mp3PermissionDenied(PathBuf),

    #[error("Unknown error occurred while reading MP3 file {path}: {source}")]
    Mp3Read {
        path: PathBuf,
        #[source]
        source: id3::Error,
    },

    #[error("JSON file couldn't be found: {0}")]
    JsonNotFound(PathBuf),

    #[error("JSON file couldn't be read. Permission denied: {0}")]
    JsonPermissionDenied(PathBuf),

    #[error("Unknown error occurred while reading JSON file {path}: {source}")]
    JsonRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON file couldn't be decoded: {path}: {source}")]
    JsonDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON file {0} must contain an object of frame identifiers at the top level")]
    JsonNotObject(PathBuf),

    #[error("Invalid chapter list: {0}")]
    Chapters(#[from] ChapterError),

    #[error("Couldn't copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Couldn't write tag to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: id3::Error,
    },
}

impl TaggerError {
    /// Usage errors get a pointer to the help text.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            TaggerError::WrongMp3Extension(_) | TaggerError::WrongJsonExtension(_)
        )
    }
}
