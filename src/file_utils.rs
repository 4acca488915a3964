use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, TaggerError};

/// Suffix added to the file stem when tagging a copy.
pub const TAGGED_SUFFIX: &str = "_tagged";

/// Check if a path has the given extension (ASCII case-insensitive)
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Check both input paths before anything is opened.
pub fn validate_inputs(mp3: &Path, json: &Path) -> Result<()> {
    if !has_extension(mp3, "mp3") {
        return Err(TaggerError::WrongMp3Extension(mp3.to_path_buf()));
    }
    if !has_extension(json, "json") {
        return Err(TaggerError::WrongJsonExtension(json.to_path_buf()));
    }
    if !mp3.is_file() {
        return Err(TaggerError::Mp3NotFound(mp3.to_path_buf()));
    }
    Ok(())
}

/// `dir/song.mp3` -> `dir/song_tagged.mp3`
pub fn tagged_copy_path(mp3: &Path) -> PathBuf {
    let stem = mp3
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = mp3
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mp3".to_string());
    mp3.with_file_name(format!("{}{}.{}", stem, TAGGED_SUFFIX, extension))
}

/// Copy the MP3 next to itself so the original stays untouched.
pub fn copy_for_tagging(mp3: &Path) -> Result<PathBuf> {
    let target = tagged_copy_path(mp3);
    fs::copy(mp3, &target).map_err(|source| TaggerError::Copy {
        from: mp3.to_path_buf(),
        to: target.clone(),
        source,
    })?;
    Ok(target)
}

/// Map an I/O failure on the MP3 file to its user-facing error, if it has one.
pub fn mp3_io_error(path: &Path, kind: ErrorKind) -> Option<TaggerError> {
    match kind {
        ErrorKind::NotFound => Some(TaggerError::Mp3NotFound(path.to_path_buf())),
        ErrorKind::PermissionDenied => Some(TaggerError::Mp3PermissionDenied(path.to_path_buf())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("a/song.mp3"), "mp3"));
        assert!(has_extension(Path::new("SONG.MP3"), "mp3"));
        assert!(!has_extension(Path::new("song.mp3.bak"), "mp3"));
        assert!(!has_extension(Path::new("mp3"), "mp3"));
    }

    #[test]
    fn test_tagged_copy_path() {
        assert_eq!(
            tagged_copy_path(Path::new("dir/song.mp3")),
            PathBuf::from("dir/song_tagged.mp3")
        );
        assert_eq!(
            tagged_copy_path(Path::new("my.mp3.collection/a.mp3")),
            PathBuf::from("my.mp3.collection/a_tagged.mp3")
        );
    }

    #[test]
    fn test_validate_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let mp3 = dir.path().join("song.mp3");
        fs::write(&mp3, b"audio").unwrap();
        let json = dir.path().join("tags.json");

        assert!(validate_inputs(&mp3, &json).is_ok());
        assert!(matches!(
            validate_inputs(&dir.path().join("song.wav"), &json),
            Err(TaggerError::WrongMp3Extension(_))
        ));
        assert!(matches!(
            validate_inputs(&mp3, &dir.path().join("tags.txt")),
            Err(TaggerError::WrongJsonExtension(_))
        ));
        assert!(matches!(
            validate_inputs(&dir.path().join("missing.mp3"), &json),
            Err(TaggerError::Mp3NotFound(_))
        ));
    }

    #[test]
    fn test_copy_for_tagging() {
        let dir = tempfile::tempdir().unwrap();
        let mp3 = dir.path().join("song.mp3");
        fs::write(&mp3, b"audio").unwrap();

        let copy = copy_for_tagging(&mp3).unwrap();
        assert_eq!(copy, dir.path().join("song_tagged.mp3"));
        assert_eq!(fs::read(&copy).unwrap(), b"audio");
    }
}
