//! Domain models for dependency manifest data.
//!
//! These models represent the entries of a line-oriented requirements
//! manifest: package names, version constraints, and platform markers.

use std::cmp::Ordering;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform values recognized by marker evaluation.
pub const RECOGNIZED_PLATFORMS: &[&str] = &["win32", "darwin", "linux"];

/// Version comparison operator used in a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Comparator {
    /// Exact match (`==`).
    Eq,
    /// Exclusion (`!=`).
    Ne,
    /// Lower bound, inclusive (`>=`).
    Ge,
    /// Lower bound, exclusive (`>`).
    Gt,
    /// Upper bound, inclusive (`<=`).
    Le,
    /// Upper bound, exclusive (`<`).
    Lt,
    /// Compatible release (`~=`).
    Compatible,
}

impl Comparator {
    /// Operator token as written in a manifest.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Lt => "<",
            Self::Compatible => "~=",
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

impl std::str::FromStr for Comparator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            ">=" => Ok(Self::Ge),
            ">" => Ok(Self::Gt),
            "<=" => Ok(Self::Le),
            "<" => Ok(Self::Lt),
            "~=" => Ok(Self::Compatible),
            _ => Err(format!("Unknown version operator: {s}")),
        }
    }
}

impl TryFrom<String> for Comparator {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Comparator> for String {
    fn from(c: Comparator) -> Self {
        c.token().to_string()
    }
}

/// A package version: optional epoch, numeric release segments, and an
/// optional trailing pre-release suffix (`1.0b1`, `2!1.4`, `227`).
///
/// Equality follows ordering: `1.0` and `1.0.0` are the same version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    /// Epoch component (`N!` prefix), almost always 0.
    pub epoch: u32,
    /// Dot-separated numeric release segments.
    pub release: Vec<u64>,
    /// Trailing alphanumeric suffix attached to the last segment, if any.
    pub suffix: Option<String>,
}

impl Version {
    /// Release segment at `index`, treating missing segments as 0.
    #[must_use]
    pub fn segment(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }

    /// Whether this release starts with the given segment prefix
    /// (missing segments compare as 0).
    #[must_use]
    pub fn starts_with(&self, prefix: &[u64]) -> bool {
        prefix
            .iter()
            .enumerate()
            .all(|(i, seg)| self.segment(i) == *seg)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.epoch != other.epoch {
            return self.epoch.cmp(&other.epoch);
        }

        let len = self.release.len().max(other.release.len());
        for i in 0..len {
            match self.segment(i).cmp(&other.segment(i)) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }

        // A suffixed version precedes the bare release: 1.0b1 < 1.0
        match (&self.suffix, &other.suffix) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(a), Some(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release = self
            .release
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{release}")?;
        if let Some(ref suffix) = self.suffix {
            write!(f, "{suffix}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty version".to_string());
        }

        let (epoch, rest) = match s.split_once('!') {
            Some((e, rest)) => {
                let epoch = e
                    .parse::<u32>()
                    .map_err(|_| format!("Invalid epoch in version: {s}"))?;
                (epoch, rest)
            }
            None => (0, s),
        };

        let mut release = Vec::new();
        let mut suffix = None;
        let segments: Vec<&str> = rest.split('.').collect();

        for (i, segment) in segments.iter().enumerate() {
            let digits_end = segment
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(segment.len());
            if digits_end == 0 {
                return Err(format!("Invalid version segment '{segment}' in: {s}"));
            }

            let value = segment[..digits_end]
                .parse::<u64>()
                .map_err(|_| format!("Invalid version segment '{segment}' in: {s}"))?;
            release.push(value);

            let trailing = &segment[digits_end..];
            if !trailing.is_empty() {
                // Only the final segment may carry a pre-release suffix
                if i + 1 != segments.len() {
                    return Err(format!("Invalid version segment '{segment}' in: {s}"));
                }
                if !trailing.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(format!("Invalid version suffix '{trailing}' in: {s}"));
                }
                suffix = Some(trailing.to_string());
            }
        }

        Ok(Self {
            epoch,
            release,
            suffix,
        })
    }
}

impl TryFrom<String> for Version {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

/// A single version constraint: operator plus version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSpec {
    /// Comparison operator.
    pub comparator: Comparator,
    /// Version operand.
    pub version: Version,
}

impl VersionSpec {
    /// Whether a candidate version satisfies this constraint.
    #[must_use]
    pub fn matches(&self, candidate: &Version) -> bool {
        match self.comparator {
            Comparator::Eq => candidate == &self.version,
            Comparator::Ne => candidate != &self.version,
            Comparator::Ge => candidate >= &self.version,
            Comparator::Gt => candidate > &self.version,
            Comparator::Le => candidate <= &self.version,
            Comparator::Lt => candidate < &self.version,
            Comparator::Compatible => {
                // ~= X.Y.Z means >= X.Y.Z with the X.Y release prefix fixed
                let prefix = &self.version.release[..self.version.release.len() - 1];
                candidate.epoch == self.version.epoch
                    && candidate >= &self.version
                    && candidate.starts_with(prefix)
            }
        }
    }
}

impl std::fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.comparator, self.version)
    }
}

/// Marker comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerOp {
    /// `==`
    #[serde(rename = "==")]
    Eq,
    /// `!=`
    #[serde(rename = "!=")]
    Ne,
}

impl std::fmt::Display for MarkerOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq => f.write_str("=="),
            Self::Ne => f.write_str("!="),
        }
    }
}

/// Platform environment marker (`; sys_platform == "win32"`).
///
/// Only `sys_platform` comparisons are supported; the parser rejects other
/// marker variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Comparison operator.
    pub op: MarkerOp,
    /// Platform value the marker compares against.
    pub value: String,
}

impl Marker {
    /// Evaluate this marker against a resolution target platform.
    #[must_use]
    pub fn applies_to(&self, platform: &str) -> bool {
        match self.op {
            MarkerOp::Eq => self.value == platform,
            MarkerOp::Ne => self.value != platform,
        }
    }

    /// Whether the marker's platform value is one of the recognized ones.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        RECOGNIZED_PLATFORMS.contains(&self.value.as_str())
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sys_platform {} \"{}\"", self.op, self.value)
    }
}

/// A single requirement entry parsed from a manifest line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Package name exactly as written.
    pub name: String,
    /// Requested extras (`pkg[gui,audio]`).
    #[serde(default)]
    pub extras: Vec<String>,
    /// Version constraints, in written order.
    #[serde(default)]
    pub specs: Vec<VersionSpec>,
    /// Platform marker, if any.
    #[serde(default)]
    pub marker: Option<Marker>,
    /// Trailing inline comment text (without the `#`), if any.
    #[serde(default)]
    pub annotation: Option<String>,
    /// 1-based source line number.
    pub line: usize,
}

impl Requirement {
    /// Normalized package name: lowercase, runs of `-`, `_`, `.` collapsed
    /// to a single `-`.
    #[must_use]
    pub fn canonical_name(&self) -> String {
        canonicalize_name(&self.name)
    }

    /// Whether `query` names this requirement (normalized, partial match
    /// accepted).
    #[must_use]
    pub fn matches_name(&self, query: &str) -> bool {
        let canonical = self.canonical_name();
        let query = canonicalize_name(query);
        canonical == query || canonical.starts_with(&query) || canonical.contains(&query)
    }

    /// Whether this entry applies on the given platform.
    #[must_use]
    pub fn applies_to(&self, platform: &str) -> bool {
        self.marker.as_ref().is_none_or(|m| m.applies_to(platform))
    }

    /// Whether the inline annotation flags this entry as optional.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.annotation
            .as_ref()
            .is_some_and(|a| a.to_lowercase().contains("optional"))
    }

    /// Whether this entry carries no version constraint at all.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.specs.is_empty()
    }

    /// Version constraints rendered as written (`>=5.15.7,<6`).
    #[must_use]
    pub fn constraint_display(&self) -> String {
        self.specs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Canonical single-line form, suitable for re-emission into a manifest.
    ///
    /// Reparsing the canonical line yields an equal entry.
    #[must_use]
    pub fn canonical_line(&self) -> String {
        let mut out = self.name.clone();

        if !self.extras.is_empty() {
            out.push('[');
            out.push_str(&self.extras.join(","));
            out.push(']');
        }

        out.push_str(&self.constraint_display());

        if let Some(ref marker) = self.marker {
            out.push_str("; ");
            out.push_str(&marker.to_string());
        }

        if let Some(ref annotation) = self.annotation {
            out.push_str("  # ");
            out.push_str(annotation);
        }

        out
    }
}

/// Normalize a package name for comparison.
#[must_use]
pub fn canonicalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_sep = false;

    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !last_was_sep {
                out.push('-');
            }
            last_was_sep = true;
        } else {
            out.push(c.to_ascii_lowercase());
            last_was_sep = false;
        }
    }

    out
}

/// A parsed manifest file.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    /// Path the manifest was read from.
    pub path: PathBuf,
    /// Entries in source order.
    pub requirements: Vec<Requirement>,
    /// Filesystem modification time, when available.
    pub modified_at: Option<DateTime<Utc>>,
}

impl Manifest {
    /// Find an entry by name (exact normalized match wins over partial).
    #[must_use]
    pub fn find(&self, query: &str) -> Option<&Requirement> {
        let canonical = canonicalize_name(query);
        self.requirements
            .iter()
            .find(|r| r.canonical_name() == canonical)
            .or_else(|| self.requirements.iter().find(|r| r.matches_name(query)))
    }

    /// Number of entries.
    #[must_use]
    pub const fn requirement_count(&self) -> usize {
        self.requirements.len()
    }

    /// Number of entries carrying a platform marker.
    #[must_use]
    pub fn marked_count(&self) -> usize {
        self.requirements
            .iter()
            .filter(|r| r.marker.is_some())
            .count()
    }

    /// Short display name (file name, falling back to the full path).
    #[must_use]
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| {
                n.to_string_lossy().into_owned()
            })
    }
}

/// Summary statistics for loaded manifests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ManifestStats {
    /// Manifest files scanned.
    pub files_scanned: usize,
    /// Total lines read across all files.
    pub total_lines: usize,
    /// Blank lines.
    pub blank_lines: usize,
    /// Pure comment lines.
    pub comment_lines: usize,
    /// Requirement entries parsed.
    pub requirement_count: usize,
    /// Entries carrying a platform marker.
    pub marked_count: usize,
    /// Entries with no version constraint.
    pub unconstrained_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(s: &str) -> Version {
        s.parse().unwrap()
    }

    fn spec(op: Comparator, v: &str) -> VersionSpec {
        VersionSpec {
            comparator: op,
            version: version(v),
        }
    }

    #[test]
    fn test_version_parse_simple() {
        let v = version("5.15.7");
        assert_eq!(v.release, vec![5, 15, 7]);
        assert_eq!(v.epoch, 0);
        assert!(v.suffix.is_none());
    }

    #[test]
    fn test_version_parse_single_segment() {
        let v = version("227");
        assert_eq!(v.release, vec![227]);
    }

    #[test]
    fn test_version_parse_suffix_and_epoch() {
        let v = version("1.0b1");
        assert_eq!(v.release, vec![1, 0]);
        assert_eq!(v.suffix.as_deref(), Some("b1"));

        let v = version("2!1.4");
        assert_eq!(v.epoch, 2);
        assert_eq!(v.release, vec![1, 4]);
    }

    #[test]
    fn test_version_parse_rejects_garbage() {
        assert!("".parse::<Version>().is_err());
        assert!("abc".parse::<Version>().is_err());
        assert!("1..2".parse::<Version>().is_err());
        assert!("1.a2.3".parse::<Version>().is_err());
    }

    #[test]
    fn test_version_ordering() {
        assert!(version("5.15.7") < version("5.16"));
        assert!(version("227") > version("5.15.7"));
        assert!(version("1.0") == version("1.0.0"));
        assert!(version("1.0b1") < version("1.0"));
        assert!(version("1!0.1") > version("99.9"));
    }

    #[test]
    fn test_version_display_roundtrip() {
        for s in ["5.15.7", "227", "1.0b1", "2!1.4"] {
            assert_eq!(version(s).to_string(), s);
        }
    }

    #[test]
    fn test_spec_matches_bounds() {
        let ge = spec(Comparator::Ge, "5.15.7");
        assert!(ge.matches(&version("5.15.7")));
        assert!(ge.matches(&version("5.16")));
        assert!(!ge.matches(&version("5.15.6")));

        let lt = spec(Comparator::Lt, "6");
        assert!(lt.matches(&version("5.99")));
        assert!(!lt.matches(&version("6.0")));
    }

    #[test]
    fn test_spec_matches_compatible() {
        let compat = spec(Comparator::Compatible, "5.15.7");
        assert!(compat.matches(&version("5.15.7")));
        assert!(compat.matches(&version("5.15.12")));
        assert!(!compat.matches(&version("5.16.0")));
        assert!(!compat.matches(&version("5.15.6")));
    }

    #[test]
    fn test_marker_applies() {
        let eq = Marker {
            op: MarkerOp::Eq,
            value: "win32".to_string(),
        };
        assert!(eq.applies_to("win32"));
        assert!(!eq.applies_to("linux"));

        let ne = Marker {
            op: MarkerOp::Ne,
            value: "darwin".to_string(),
        };
        assert!(ne.applies_to("win32"));
        assert!(!ne.applies_to("darwin"));
    }

    #[test]
    fn test_canonicalize_name() {
        assert_eq!(canonicalize_name("PyQt5"), "pyqt5");
        assert_eq!(canonicalize_name("pytest_qt"), "pytest-qt");
        assert_eq!(canonicalize_name("zope.interface"), "zope-interface");
        assert_eq!(canonicalize_name("a--b__c"), "a-b-c");
    }

    #[test]
    fn test_canonical_line() {
        let req = Requirement {
            name: "pywin32".to_string(),
            extras: Vec::new(),
            specs: vec![spec(Comparator::Ge, "227")],
            marker: Some(Marker {
                op: MarkerOp::Eq,
                value: "win32".to_string(),
            }),
            annotation: Some("Windows only".to_string()),
            line: 12,
        };

        assert_eq!(
            req.canonical_line(),
            "pywin32>=227; sys_platform == \"win32\"  # Windows only"
        );
    }

    #[test]
    fn test_requirement_optional_flag() {
        let mut req = Requirement {
            name: "pygame".to_string(),
            extras: Vec::new(),
            specs: Vec::new(),
            marker: None,
            annotation: Some("Optional sound support".to_string()),
            line: 3,
        };
        assert!(req.is_optional());

        req.annotation = None;
        assert!(!req.is_optional());
    }
}
