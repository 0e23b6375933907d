//! Raw manifest file reader.
//!
//! Produces numbered raw lines for the parser, plus file metadata.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::domain::{AppError, Result};

/// One raw line from a manifest file.
#[derive(Debug, Clone)]
pub struct RawLine {
    /// 1-based line number.
    pub number: usize,
    /// Line text without the trailing newline.
    pub text: String,
}

/// Reader for a single manifest file.
#[derive(Debug)]
pub struct ManifestReader {
    path: PathBuf,
}

impl ManifestReader {
    /// Opens a manifest file for reading.
    ///
    /// # Errors
    /// Returns error if the path does not point to a readable file.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(AppError::ManifestNotFound {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Reads the whole file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read.
    pub fn read_to_string(&self) -> Result<String> {
        std::fs::read_to_string(&self.path)
            .map_err(|e| AppError::io(format!("Failed to read {}", self.path.display()), e))
    }

    /// Reads all lines with 1-based numbering.
    ///
    /// # Errors
    /// Returns error if the file cannot be read.
    pub fn read_lines(&self) -> Result<Vec<RawLine>> {
        let content = self.read_to_string()?;

        let lines: Vec<RawLine> = content
            .lines()
            .enumerate()
            .map(|(i, text)| RawLine {
                number: i + 1,
                text: text.to_string(),
            })
            .collect();

        tracing::debug!("Read {} lines from {}", lines.len(), self.path.display());

        Ok(lines)
    }

    /// Filesystem modification time, when the platform reports one.
    #[must_use]
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let err = ManifestReader::open(&dir.path().join("requirements.txt")).unwrap_err();
        assert!(matches!(err, AppError::ManifestNotFound { .. }));
    }

    #[test]
    fn test_read_lines_numbered() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("requirements.txt");
        fs::write(&path, "# Core GUI Framework\nPyQt5>=5.15.7\n\nrequests>=2.28.1\n").unwrap();

        let reader = ManifestReader::open(&path).unwrap();
        let lines = reader.read_lines().unwrap();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].number, 1);
        assert_eq!(lines[1].text, "PyQt5>=5.15.7");
        assert_eq!(lines[3].number, 4);
    }

    #[test]
    fn test_modified_at_present_for_real_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("requirements.txt");
        fs::write(&path, "Pillow\n").unwrap();

        let reader = ManifestReader::open(&path).unwrap();
        assert!(reader.modified_at().is_some());
    }
}
