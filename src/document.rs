use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Result, TaggerError};

const UTF8_BOM: &str = "\u{feff}";

/// Top-level JSON object, frame identifier -> value, in file order.
pub type TagDocument = Map<String, Value>;

/// Read and decode the JSON file. The file is closed again before any tag
/// processing starts.
pub fn load(path: &Path) -> Result<TagDocument> {
    let data = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => TaggerError::JsonNotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => TaggerError::JsonPermissionDenied(path.to_path_buf()),
        _ => TaggerError::JsonRead { path: path.to_path_buf(), source },
    })?;
    parse(path, &data)
}

fn parse(path: &Path, data: &str) -> Result<TagDocument> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let value: Value = serde_json::from_str(data).map_err(|source| TaggerError::JsonDecode {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(TaggerError::JsonNotObject(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_keeps_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tags.json");
        fs::write(&path, r#"{"TPE1": "Artist", "TIT2": "Title", "CTOC": []}"#).unwrap();

        let doc = load(&path).unwrap();
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["TPE1", "TIT2", "CTOC"]);
    }

    #[test]
    fn test_bom_is_accepted() {
        let doc = parse(Path::new("x.json"), "\u{feff}{\"TIT2\": \"Song\"}").unwrap();
        assert_eq!(doc.get("TIT2"), Some(&Value::String("Song".to_string())));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load(&dir.path().join("missing.json")),
            Err(TaggerError::JsonNotFound(_))
        ));
    }

    #[test]
    fn test_decode_failure() {
        assert!(matches!(
            parse(Path::new("x.json"), "{\"TIT2\": "),
            Err(TaggerError::JsonDecode { .. })
        ));
    }

    #[test]
    fn test_top_level_must_be_object() {
        assert!(matches!(
            parse(Path::new("x.json"), "[1, 2]"),
            Err(TaggerError::JsonNotObject(_))
        ));
    }
}
