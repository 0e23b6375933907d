//! Canonical manifest writer.
//!
//! Emits requirement entries back to disk in canonical form with a
//! generated-file header, used by `resolve -o` and `export -o`.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::domain::{AppError, Requirement, Result};

/// Writer for canonical manifest files.
pub struct ManifestWriter {
    path: PathBuf,
}

impl ManifestWriter {
    /// Prepares a writer, creating parent directories as needed.
    ///
    /// # Errors
    /// Returns error if the parent directory cannot be created.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AppError::io("Failed to create output directory", e))?;
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Writes entries as a canonical manifest.
    ///
    /// `source_note` describes where the entries came from and is recorded
    /// in the header. Returns the number of entries written.
    ///
    /// # Errors
    /// Returns error if the file cannot be written.
    pub fn write_manifest(
        &self,
        requirements: &[Requirement],
        source_note: &str,
    ) -> Result<usize> {
        let mut file = std::fs::File::create(&self.path)
            .map_err(|e| AppError::io(format!("Failed to create {}", self.path.display()), e))?;

        let header = format!(
            "# Generated by reqfile-handler on {}\n# {source_note}\n\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        );
        file.write_all(header.as_bytes())
            .map_err(|e| AppError::io("Failed to write manifest header", e))?;

        for req in requirements {
            let line = format!("{}\n", req.canonical_line());
            file.write_all(line.as_bytes())
                .map_err(|e| AppError::io("Failed to write manifest entry", e))?;
        }

        tracing::debug!(
            path = %self.path.display(),
            entries = requirements.len(),
            "Wrote manifest"
        );

        Ok(requirements.len())
    }
}
