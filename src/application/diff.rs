//! Manifest comparison.
//!
//! Computes the entry-level difference between two manifests, keyed by
//! normalized package name.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{Manifest, Requirement};

/// One entry whose constraints or marker changed between manifests.
#[derive(Debug, Clone, Serialize)]
pub struct ChangedEntry {
    /// Normalized package name.
    pub name: String,
    /// Entry as it appears in the old manifest.
    pub old: Requirement,
    /// Entry as it appears in the new manifest.
    pub new: Requirement,
}

/// Entry-level difference between two manifests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ManifestDiff {
    /// Entries only present in the new manifest, in its order.
    pub added: Vec<Requirement>,
    /// Entries only present in the old manifest, in its order.
    pub removed: Vec<Requirement>,
    /// Entries present in both with different constraints, extras, or
    /// marker, in new-manifest order.
    pub changed: Vec<ChangedEntry>,
}

impl ManifestDiff {
    /// Whether the two manifests are equivalent at the entry level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Total number of differing entries.
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }
}

/// Compares two manifests entry by entry.
///
/// Entries are matched by normalized name (first occurrence wins when a name
/// repeats). Annotation and line-number differences do not count as changes.
#[must_use]
pub fn diff_manifests(old: &Manifest, new: &Manifest) -> ManifestDiff {
    let old_by_name = index_by_name(&old.requirements);
    let new_by_name = index_by_name(&new.requirements);

    let mut diff = ManifestDiff::default();

    for req in &new.requirements {
        let name = req.canonical_name();
        if new_by_name.get(name.as_str()) != Some(&req.line) {
            // Repeated name inside the new manifest; only the first is compared
            continue;
        }

        match old.requirements.iter().find(|r| r.canonical_name() == name) {
            None => diff.added.push(req.clone()),
            Some(old_req) if !same_constraints(old_req, req) => diff.changed.push(ChangedEntry {
                name,
                old: old_req.clone(),
                new: req.clone(),
            }),
            Some(_) => {}
        }
    }

    for req in &old.requirements {
        let name = req.canonical_name();
        if old_by_name.get(name.as_str()) != Some(&req.line) {
            continue;
        }
        if !new_by_name.contains_key(name.as_str()) {
            diff.removed.push(req.clone());
        }
    }

    diff
}

/// Maps canonical name to the line of its first occurrence.
fn index_by_name(requirements: &[Requirement]) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for req in requirements {
        index.entry(req.canonical_name()).or_insert(req.line);
    }
    index
}

/// Whether two entries are equivalent apart from annotation and position.
fn same_constraints(a: &Requirement, b: &Requirement) -> bool {
    a.specs == b.specs && a.marker == b.marker && a.extras == b.extras
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::parser::parse_manifest_text;
    use std::path::PathBuf;

    fn manifest_of(content: &str) -> Manifest {
        Manifest {
            path: PathBuf::from("requirements.txt"),
            requirements: parse_manifest_text(content, "requirements.txt").unwrap(),
            modified_at: None,
        }
    }

    #[test]
    fn test_identical_manifests() {
        let m = manifest_of("PyQt5>=5.15.7\nrequests>=2.28.1\n");
        let diff = diff_manifests(&m, &m);
        assert!(diff.is_empty());
    }

    #[test]
    fn test_added_and_removed() {
        let old = manifest_of("PyQt5>=5.15.7\nPillow>=9.0\n");
        let new = manifest_of("PyQt5>=5.15.7\nrequests>=2.28.1\n");

        let diff = diff_manifests(&old, &new);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].name, "requests");
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.removed[0].name, "Pillow");
        assert!(diff.changed.is_empty());
    }

    #[test]
    fn test_changed_constraint() {
        let old = manifest_of("PyQt5>=5.15.7\n");
        let new = manifest_of("PyQt5>=5.15.9\n");

        let diff = diff_manifests(&old, &new);
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.changed[0].name, "pyqt5");
        assert_eq!(diff.change_count(), 1);
    }

    #[test]
    fn test_changed_marker() {
        let old = manifest_of("pywin32>=227\n");
        let new = manifest_of("pywin32>=227; sys_platform == \"win32\"\n");

        let diff = diff_manifests(&old, &new);
        assert_eq!(diff.changed.len(), 1);
    }

    #[test]
    fn test_annotation_change_is_not_a_change() {
        let old = manifest_of("pygame>=2.1.0  # sound\n");
        let new = manifest_of("pygame>=2.1.0  # Optional sound support\n");

        let diff = diff_manifests(&old, &new);
        assert!(diff.is_empty());
    }

    #[test]
    fn test_name_matching_is_normalized() {
        let old = manifest_of("pytest_qt>=4.0\n");
        let new = manifest_of("pytest-qt>=4.0\n");

        let diff = diff_manifests(&old, &new);
        assert!(diff.is_empty());
    }
}
