//! Manifest loading service.
//!
//! Orchestrates discovery, reading, and parsing of manifest files into
//! domain models plus summary statistics.

use std::path::PathBuf;

use crate::domain::{AppError, Manifest, ManifestStats, Result};
use crate::infrastructure::{find_default_manifest, find_manifest_files, ManifestReader};

use super::parser::{parse_line, ParsedLine};

/// Options for manifest loading.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Project root used for discovery.
    pub root: PathBuf,
    /// Explicit manifest path; bypasses discovery when set.
    pub manifest: Option<PathBuf>,
    /// Load every discovered manifest instead of just the primary one.
    pub all_files: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            manifest: None,
            all_files: false,
        }
    }
}

/// Loads manifests according to the options.
///
/// Entry order within each manifest is source order; manifests follow
/// discovery order.
///
/// # Errors
/// Returns error if no manifest is found, a file cannot be read, or a line
/// fails to parse.
pub fn load_manifests(options: &LoadOptions) -> Result<(Vec<Manifest>, ManifestStats)> {
    let paths = match options.manifest {
        Some(ref explicit) => vec![explicit.clone()],
        None if options.all_files => find_manifest_files(&options.root)?,
        None => vec![find_default_manifest(&options.root)?],
    };

    let mut manifests = Vec::new();
    let mut stats = ManifestStats::default();

    for path in paths {
        tracing::info!("Loading manifest: {}", path.display());

        let reader = ManifestReader::open(&path)?;
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| {
                n.to_string_lossy().into_owned()
            });

        let mut requirements = Vec::new();

        for raw in reader.read_lines()? {
            stats.total_lines += 1;

            match parse_line(&raw.text, raw.number) {
                Ok(ParsedLine::Blank) => stats.blank_lines += 1,
                Ok(ParsedLine::Comment) => stats.comment_lines += 1,
                Ok(ParsedLine::Requirement(req)) => {
                    stats.requirement_count += 1;
                    if req.marker.is_some() {
                        stats.marked_count += 1;
                    }
                    if req.is_unconstrained() {
                        stats.unconstrained_count += 1;
                    }
                    requirements.push(req);
                }
                Err(message) => {
                    return Err(AppError::parse(file_name, raw.number, message));
                }
            }
        }

        manifests.push(Manifest {
            modified_at: reader.modified_at(),
            path,
            requirements,
        });
    }

    stats.files_scanned = manifests.len();

    tracing::info!(
        "Loaded {} manifest(s) with {} entries",
        stats.files_scanned,
        stats.requirement_count
    );

    Ok((manifests, stats))
}

/// Loads the primary manifest only.
///
/// # Errors
/// Returns error under the same conditions as [`load_manifests`].
pub fn load_primary(options: &LoadOptions) -> Result<(Manifest, ManifestStats)> {
    let single = LoadOptions {
        all_files: false,
        ..options.clone()
    };

    let (mut manifests, stats) = load_manifests(&single)?;
    Ok((manifests.remove(0), stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
# Core GUI Framework
PyQt5>=5.15.7

# HTTP client
requests>=2.28.1
pygame>=2.1.0  # Optional: for sound effects

pywin32>=227; sys_platform == \"win32\"
Pillow
";

    #[test]
    fn test_load_primary_counts() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("requirements.txt"), SAMPLE).unwrap();

        let options = LoadOptions {
            root: dir.path().to_path_buf(),
            ..Default::default()
        };

        let (manifest, stats) = load_primary(&options).unwrap();

        assert_eq!(manifest.requirement_count(), 5);
        assert_eq!(stats.total_lines, 9);
        assert_eq!(stats.comment_lines, 2);
        assert_eq!(stats.blank_lines, 2);
        assert_eq!(stats.requirement_count, 5);
        assert_eq!(stats.marked_count, 1);
        assert_eq!(stats.unconstrained_count, 1);
        assert!(manifest.modified_at.is_some());
    }

    #[test]
    fn test_load_all_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("requirements.txt"), "PyQt5>=5.15.7\n").unwrap();
        fs::write(dir.path().join("requirements-dev.txt"), "pytest>=7.0\nblack>=22.0\n").unwrap();

        let options = LoadOptions {
            root: dir.path().to_path_buf(),
            all_files: true,
            ..Default::default()
        };

        let (manifests, stats) = load_manifests(&options).unwrap();
        assert_eq!(manifests.len(), 2);
        assert_eq!(stats.files_scanned, 2);
        assert_eq!(stats.requirement_count, 3);
    }

    #[test]
    fn test_explicit_manifest_bypasses_discovery() {
        let dir = tempdir().unwrap();
        let custom = dir.path().join("deps.txt");
        fs::write(&custom, "requests>=2.28.1\n").unwrap();

        let options = LoadOptions {
            root: PathBuf::from("/nonexistent"),
            manifest: Some(custom),
            ..Default::default()
        };

        let (manifests, _) = load_manifests(&options).unwrap();
        assert_eq!(manifests[0].requirements[0].name, "requests");
    }

    #[test]
    fn test_parse_error_names_file_and_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("requirements.txt");
        fs::write(&path, "PyQt5>=5.15.7\n???bad???\n").unwrap();

        let options = LoadOptions {
            root: dir.path().to_path_buf(),
            ..Default::default()
        };

        let err = load_manifests(&options).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("requirements.txt"), "got: {message}");
        assert!(message.contains("line 2"), "got: {message}");
    }
}
