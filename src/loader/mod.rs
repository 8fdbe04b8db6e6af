//! Input discovery and tolerant decoding of raw filing files.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::error::DocumentError;

/// List candidate filing files (`.xml` or `.txt`) in a directory, sorted
/// for deterministic batch order.
pub fn discover_filing_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(vec![]);
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_filing = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("xml") || e.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);
        if path.is_file() && is_filing {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read a filing as text: UTF-8 first, Latin-1 on failure. Empty files
/// surface as `DocumentError::Empty` so the batch can count them skipped.
pub fn read_document_text(path: &Path) -> Result<String, DocumentError> {
    let bytes = std::fs::read(path)?;
    if bytes.is_empty() {
        return Err(DocumentError::Empty);
    }

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            debug!("{:?}: not valid UTF-8, retrying as Latin-1", path);
            // Latin-1 maps every byte to the code point of the same value,
            // so this decode is total.
            Ok(e.into_bytes().iter().map(|&b| b as char).collect())
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("insider-etl-loader-{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn discovers_only_filing_extensions() {
        let dir = scratch_dir("discover");
        std::fs::write(dir.join("a.xml"), "<a/>").unwrap();
        std::fs::write(dir.join("b.txt"), "<b/>").unwrap();
        std::fs::write(dir.join("c.csv"), "x,y").unwrap();

        let files = discover_filing_files(&dir).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.xml", "b.txt"]);
    }

    #[test]
    fn missing_directory_is_an_empty_batch() {
        let dir = std::env::temp_dir().join("insider-etl-loader-nonexistent");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(discover_filing_files(&dir).unwrap().is_empty());
    }

    #[test]
    fn empty_file_is_reported_as_empty() {
        let dir = scratch_dir("empty");
        let path = dir.join("empty.xml");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(read_document_text(&path), Err(DocumentError::Empty)));
    }

    #[test]
    fn latin1_bytes_decode_instead_of_failing() {
        let dir = scratch_dir("latin1");
        let path = dir.join("latin1.xml");
        // 0xE9 is 'é' in Latin-1 but not valid standalone UTF-8.
        std::fs::write(&path, b"<name>Jos\xE9</name>").unwrap();

        let text = read_document_text(&path).unwrap();
        assert_eq!(text, "<name>José</name>");
    }
}
