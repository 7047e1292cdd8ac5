//! JSON export discovery and loading.
//!
//! Input paths are either `.json` files or directories that are searched
//! recursively for them. Every file is parsed as a whole JSON document; a
//! single unreadable or malformed file fails the batch.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};
use wrapped_core::error::{Result, WrappedError};

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.json` files recursively under `dir`, sorted by path.
pub fn find_json_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Input directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && has_json_extension(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Expand CLI input paths into the ordered list of files of one batch.
///
/// Directories contribute their `.json` files (sorted); explicit file paths
/// are kept in the given order and must be named `*.json`.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let found = find_json_files(input);
            if found.is_empty() {
                warn!("No JSON files found in {}", input.display());
            }
            files.extend(found);
        } else if has_json_extension(input) {
            files.push(input.clone());
        } else {
            return Err(WrappedError::NotJsonFile(input.clone()));
        }
    }

    if files.is_empty() {
        return Err(WrappedError::NoInput);
    }

    debug!("Expanded {} input paths into {} files", inputs.len(), files.len());
    Ok(files)
}

/// Read and parse one JSON document.
///
/// Fails with [`WrappedError::NotJsonFile`] when the name does not end in
/// `.json`, [`WrappedError::FileRead`] on I/O errors and
/// [`WrappedError::Parse`] on malformed JSON.
pub fn read_payload(path: &Path) -> Result<Value> {
    if !has_json_extension(path) {
        return Err(WrappedError::NotJsonFile(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| WrappedError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    // Some exports are written with a UTF-8 byte-order mark.
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let value = serde_json::from_str(content).map_err(|source| WrappedError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Parsed {}", path.display());
    Ok(value)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    // ── find_json_files ───────────────────────────────────────────────────────

    #[test]
    fn test_find_json_files_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("Spotify Extended Streaming History");
        std::fs::create_dir_all(&sub).unwrap();
        write_file(dir.path(), "c.json", "[]");
        write_file(&sub, "a.json", "[]");
        write_file(dir.path(), "b.JSON", "[]");
        write_file(dir.path(), "ReadMeFirst.pdf", "");

        let files = find_json_files(dir.path());
        assert_eq!(files.len(), 3);
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn test_find_json_files_nonexistent_path() {
        let files = find_json_files(Path::new("/tmp/does-not-exist-wrapped-test-xyz"));
        assert!(files.is_empty());
    }

    // ── expand_inputs ─────────────────────────────────────────────────────────

    #[test]
    fn test_expand_inputs_mixes_files_and_dirs() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("exports");
        std::fs::create_dir_all(&sub).unwrap();
        write_file(&sub, "Streaming_History_Audio_2023.json", "[]");
        write_file(&sub, "Streaming_History_Audio_2024.json", "[]");
        let single = write_file(dir.path(), "extra.json", "[]");

        let files = expand_inputs(&[single.clone(), sub.clone()]).unwrap();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0], single);
    }

    #[test]
    fn test_expand_inputs_rejects_non_json_file() {
        let dir = TempDir::new().unwrap();
        let txt = write_file(dir.path(), "notes.txt", "hello");
        let err = expand_inputs(&[txt]).unwrap_err();
        assert!(matches!(err, WrappedError::NotJsonFile(_)));
    }

    #[test]
    fn test_expand_inputs_empty_dir_is_no_input() {
        let dir = TempDir::new().unwrap();
        let err = expand_inputs(&[dir.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, WrappedError::NoInput));
    }

    // ── read_payload ──────────────────────────────────────────────────────────

    #[test]
    fn test_read_payload_array() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "h.json", r#"[{"ms_played": 1}]"#);
        let value = read_payload(&path).unwrap();
        assert_eq!(value.as_array().map(|a| a.len()), Some(1));
    }

    #[test]
    fn test_read_payload_strips_bom() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "bom.json", "\u{feff}[]");
        assert!(read_payload(&path).unwrap().is_array());
    }

    #[test]
    fn test_read_payload_malformed_reports_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "broken.json", "[{not json");
        let err = read_payload(&path).unwrap_err();
        match err {
            WrappedError::Parse { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_payload_missing_file() {
        let err = read_payload(Path::new("/tmp/wrapped-missing-xyz/none.json")).unwrap_err();
        assert!(matches!(err, WrappedError::FileRead { .. }));
    }

    #[test]
    fn test_read_payload_wrong_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "data.csv", "[]");
        assert!(matches!(
            read_payload(&path).unwrap_err(),
            WrappedError::NotJsonFile(_)
        ));
    }
}
