//! JSON persistence helpers for files that live next to the state snapshot.

use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Platform data directory for the engine, created if needed.
pub fn data_dir() -> io::Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "cultivation").ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "Could not determine data directory",
        )
    })?;
    let dir = dirs.data_dir().to_path_buf();
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Load a JSON file from `dir`. `Ok(None)` when the file does not exist.
pub fn load_json<T: serde::de::DeserializeOwned>(dir: &Path, filename: &str) -> io::Result<Option<T>> {
    let json = match fs::read_to_string(dir.join(filename)) {
        Ok(json) => json,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Load a JSON file from `dir`, returning `T::default()` if missing or invalid.
pub fn load_json_or_default<T: Default + serde::de::DeserializeOwned>(
    dir: &Path,
    filename: &str,
) -> T {
    load_json(dir, filename)
        .unwrap_or_else(|e| {
            tracing::warn!(file = filename, error = %e, "discarding unreadable JSON file");
            None
        })
        .unwrap_or_default()
}

/// Save a value as pretty-printed JSON into `dir`.
pub fn save_json<T: serde::Serialize>(dir: &Path, filename: &str, data: &T) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(dir.join(filename), json)?;
    Ok(())
}

/// Removes a file in `dir`, treating "already gone" as success.
pub fn remove_file(dir: &Path, filename: &str) -> io::Result<()> {
    match fs::remove_file(dir.join(filename)) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "cultivation_persistence_{}_{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_missing_returns_default() {
        let dir = temp_dir("missing");
        let val: Vec<String> = load_json_or_default(&dir, "nonexistent_test_file_12345.json");
        assert!(val.is_empty());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = temp_dir("roundtrip");
        let data = vec!["hello".to_string(), "world".to_string()];
        save_json(&dir, "persistence_test.json", &data).expect("save should succeed");

        let loaded: Vec<String> = load_json_or_default(&dir, "persistence_test.json");
        assert_eq!(loaded, data);

        remove_file(&dir, "persistence_test.json").unwrap();
        // Removing twice is fine
        remove_file(&dir, "persistence_test.json").unwrap();
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_load_json_distinguishes_missing_and_invalid() {
        let dir = temp_dir("strict");
        let missing: Option<Vec<u32>> = load_json(&dir, "absent.json").unwrap();
        assert!(missing.is_none());
        fs::write(dir.join("bad.json"), "[1, 2,").unwrap();
        let err = load_json::<Vec<u32>>(&dir, "bad.json").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_invalid_json_returns_default() {
        let dir = temp_dir("invalid");
        fs::write(dir.join("broken.json"), "{ nope").unwrap();
        let val: Vec<u32> = load_json_or_default(&dir, "broken.json");
        assert!(val.is_empty());
        fs::remove_dir_all(dir).ok();
    }
}
