//! Manifest linting.
//!
//! Checks parsed manifests for problems the parser itself cannot reject:
//! unrecognized marker platforms, duplicate entries, and mutually
//! unsatisfiable constraint sets.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{
    Comparator, LintConfig, Manifest, Marker, MarkerOp, Requirement, Version, RECOGNIZED_PLATFORMS,
};

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Suspicious but resolvable.
    Warning,
    /// The manifest cannot be satisfied as written.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A single lint finding.
#[derive(Debug, Clone, Serialize)]
pub struct LintFinding {
    /// Finding severity.
    pub severity: Severity,
    /// 1-based source line the finding anchors to.
    pub line: usize,
    /// Package the finding concerns, if any.
    pub package: Option<String>,
    /// Human-readable description.
    pub message: String,
}

/// Lint results for one manifest.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    /// Findings in line order.
    pub findings: Vec<LintFinding>,
}

impl LintReport {
    /// Number of error-severity findings.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }

    /// Number of warning-severity findings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count()
    }

    /// Whether no findings were produced.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Lints a parsed manifest.
#[must_use]
pub fn lint_manifest(manifest: &Manifest, config: &LintConfig) -> LintReport {
    let mut findings = Vec::new();

    for req in &manifest.requirements {
        if let Some(ref marker) = req.marker {
            if !marker.is_recognized() {
                findings.push(LintFinding {
                    severity: Severity::Warning,
                    line: req.line,
                    package: Some(req.name.clone()),
                    message: format!(
                        "Marker platform \"{}\" is not recognized (expected one of: {})",
                        marker.value,
                        RECOGNIZED_PLATFORMS.join(", ")
                    ),
                });
            }
        }

        if config.warn_unconstrained && req.is_unconstrained() {
            findings.push(LintFinding {
                severity: Severity::Warning,
                line: req.line,
                package: Some(req.name.clone()),
                message: "Entry has no version constraint".to_string(),
            });
        }
    }

    check_name_groups(&manifest.requirements, config, &mut findings);

    findings.sort_by_key(|f| f.line);

    LintReport { findings }
}

/// Duplicate and conflict checks over entries sharing a canonical name.
fn check_name_groups(
    requirements: &[Requirement],
    config: &LintConfig,
    findings: &mut Vec<LintFinding>,
) {
    let mut groups: BTreeMap<String, Vec<&Requirement>> = BTreeMap::new();
    for req in requirements {
        groups.entry(req.canonical_name()).or_default().push(req);
    }

    for group in groups.values().filter(|g| g.len() > 1) {
        for (i, &first) in group.iter().enumerate() {
            for &second in &group[i + 1..] {
                if markers_disjoint(first.marker.as_ref(), second.marker.as_ref()) {
                    // Same package, mutually exclusive platforms: legitimate
                    continue;
                }

                if let Some(reason) = conflict_reason(first, second) {
                    findings.push(LintFinding {
                        severity: Severity::Error,
                        line: second.line,
                        package: Some(second.name.clone()),
                        message: format!(
                            "Conflicting constraints for '{}' (line {} vs line {}): {reason}",
                            second.name, first.line, second.line
                        ),
                    });
                } else if config.warn_duplicates {
                    findings.push(LintFinding {
                        severity: Severity::Warning,
                        line: second.line,
                        package: Some(second.name.clone()),
                        message: format!(
                            "Duplicate entry for '{}' (first seen on line {})",
                            second.name, first.line
                        ),
                    });
                }
            }
        }
    }
}

/// Whether two markers can never apply on the same platform.
fn markers_disjoint(a: Option<&Marker>, b: Option<&Marker>) -> bool {
    let (Some(a), Some(b)) = (a, b) else {
        return false;
    };

    match (a.op, b.op) {
        (MarkerOp::Eq, MarkerOp::Eq) => a.value != b.value,
        (MarkerOp::Eq, MarkerOp::Ne) | (MarkerOp::Ne, MarkerOp::Eq) => a.value == b.value,
        (MarkerOp::Ne, MarkerOp::Ne) => false,
    }
}

/// Why two entries' combined constraints are unsatisfiable, if they are.
fn conflict_reason(a: &Requirement, b: &Requirement) -> Option<String> {
    let specs: Vec<_> = a.specs.iter().chain(b.specs.iter()).collect();

    // An exact pin excluded elsewhere is always a contradiction
    for pin in specs.iter().filter(|s| s.comparator == Comparator::Eq) {
        for excl in specs.iter().filter(|s| s.comparator == Comparator::Ne) {
            if pin.version == excl.version {
                return Some(format!("'{pin}' contradicts '{excl}'"));
            }
        }
    }

    let mut lower: Option<(Version, bool)> = None;
    let mut upper: Option<(Version, bool)> = None;

    for spec in &specs {
        match spec.comparator {
            Comparator::Ge => tighten_lower(&mut lower, spec.version.clone(), true),
            Comparator::Gt => tighten_lower(&mut lower, spec.version.clone(), false),
            Comparator::Le => tighten_upper(&mut upper, spec.version.clone(), true),
            Comparator::Lt => tighten_upper(&mut upper, spec.version.clone(), false),
            Comparator::Eq => {
                tighten_lower(&mut lower, spec.version.clone(), true);
                tighten_upper(&mut upper, spec.version.clone(), true);
            }
            Comparator::Compatible => {
                tighten_lower(&mut lower, spec.version.clone(), true);
                tighten_upper(&mut upper, compatible_ceiling(&spec.version), false);
            }
            Comparator::Ne => {}
        }
    }

    let (Some((low, low_incl)), Some((high, high_incl))) = (lower, upper) else {
        return None;
    };

    let empty = low > high || (low == high && !(low_incl && high_incl));
    if empty {
        Some(format!(
            "No version satisfies both '{}' and '{}'",
            a.constraint_display(),
            b.constraint_display()
        ))
    } else {
        None
    }
}

/// Exclusive upper bound implied by a compatible-release constraint:
/// `~=5.15.7` permits versions below 5.16.
fn compatible_ceiling(version: &Version) -> Version {
    let mut release: Vec<u64> = version.release[..version.release.len() - 1].to_vec();
    if let Some(last) = release.last_mut() {
        *last += 1;
    }

    Version {
        epoch: version.epoch,
        release,
        suffix: None,
    }
}

fn tighten_lower(bound: &mut Option<(Version, bool)>, version: Version, inclusive: bool) {
    let tighter = match bound {
        None => true,
        Some((current, current_incl)) => {
            version > *current || (version == *current && *current_incl && !inclusive)
        }
    };
    if tighter {
        *bound = Some((version, inclusive));
    }
}

fn tighten_upper(bound: &mut Option<(Version, bool)>, version: Version, inclusive: bool) {
    let tighter = match bound {
        None => true,
        Some((current, current_incl)) => {
            version < *current || (version == *current && *current_incl && !inclusive)
        }
    };
    if tighter {
        *bound = Some((version, inclusive));
    }
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

    fn lint(content: &str) -> LintReport {
        lint_manifest(&manifest_of(content), &LintConfig::default())
    }

    #[test]
    fn test_clean_manifest() {
        let report = lint("PyQt5>=5.15.7\nrequests>=2.28.1\n");
        assert!(report.is_clean());
    }

    #[test]
    fn test_unrecognized_marker_platform() {
        let report = lint("pkg>=1.0; sys_platform == \"cygwin\"\n");
        assert_eq!(report.warning_count(), 1);
        assert!(report.findings[0].message.contains("cygwin"));
    }

    #[test]
    fn test_duplicate_entry_warns() {
        let report = lint("requests>=2.28.1\nRequests>=2.30\n");
        assert_eq!(report.warning_count(), 1);
        assert!(report.findings[0].message.contains("Duplicate"));
        assert_eq!(report.findings[0].line, 2);
    }

    #[test]
    fn test_platform_split_is_not_duplicate() {
        let report = lint(
            "pywin32>=227; sys_platform == \"win32\"\n\
             pywin32>=300; sys_platform == \"darwin\"\n",
        );
        assert!(report.is_clean());
    }

    #[test]
    fn test_conflicting_pins() {
        let report = lint("numpy==1.21\nnumpy==1.24\n");
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_pin_against_excluded_version() {
        let report = lint("numpy==1.21\nnumpy!=1.21\n");
        assert_eq!(report.error_count(), 1);
        assert!(report.findings[0].message.contains("contradicts"));
    }

    #[test]
    fn test_empty_range_conflict() {
        let report = lint("pandas>=2.0\npandas<1.5\n");
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_compatible_release_conflict() {
        let report = lint("PyQt5~=5.15.7\nPyQt5>=6.0\n");
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_overlapping_ranges_are_fine() {
        let report = lint_manifest(
            &manifest_of("requests>=2.28.1\nrequests<3\n"),
            &LintConfig {
                warn_duplicates: false,
                ..Default::default()
            },
        );
        assert!(report.is_clean());
    }

    #[test]
    fn test_unconstrained_warning_opt_in() {
        let config = LintConfig {
            warn_unconstrained: true,
            ..Default::default()
        };
        let report = lint_manifest(&manifest_of("Pillow\n"), &config);
        assert_eq!(report.warning_count(), 1);
    }
}
