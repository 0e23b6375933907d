//! Manifest file discovery.
//!
//! Handles locating requirements manifests in a project directory.

use std::path::{Path, PathBuf};

use crate::domain::{AppError, Result};

/// Well-known manifest filenames, probed in this order.
const MANIFEST_NAMES: &[&str] = &[
    "requirements.txt",
    "requirements-dev.txt",
    "dev-requirements.txt",
    "requirements-test.txt",
    "constraints.txt",
];

/// Subdirectory conventionally holding split manifests.
const REQUIREMENTS_DIR: &str = "requirements";

/// Finds all manifest files under a project root.
///
/// Deterministic order: well-known root files first (in the order above),
/// then `requirements/*.txt` sorted by name.
///
/// # Errors
/// Returns error if no manifest can be found.
pub fn find_manifest_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut manifests = Vec::new();

    for name in MANIFEST_NAMES {
        let path = root.join(name);
        if path.is_file() {
            tracing::debug!("Found manifest: {}", path.display());
            manifests.push(path);
        }
    }

    let split_dir = root.join(REQUIREMENTS_DIR);
    if split_dir.is_dir() {
        match std::fs::read_dir(&split_dir) {
            Ok(entries) => {
                let mut split: Vec<PathBuf> = entries
                    .filter_map(std::result::Result::ok)
                    .map(|e| e.path())
                    .filter(|p| {
                        p.is_file() && p.extension().is_some_and(|ext| ext == "txt")
                    })
                    .collect();
                split.sort();

                for path in split {
                    tracing::debug!("Found split manifest: {}", path.display());
                    manifests.push(path);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to read {} directory: {}", REQUIREMENTS_DIR, e);
            }
        }
    }

    if manifests.is_empty() {
        return Err(AppError::ManifestNotFound {
            path: root.join(MANIFEST_NAMES[0]),
        });
    }

    Ok(manifests)
}

/// Finds the primary manifest under a project root.
///
/// # Errors
/// Returns error if no manifest can be found.
pub fn find_default_manifest(root: &Path) -> Result<PathBuf> {
    find_manifest_files(root).map(|mut files| files.remove(0))
}
