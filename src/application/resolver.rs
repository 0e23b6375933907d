//! Platform resolution for manifest entries.
//!
//! Evaluates environment markers against a resolution target and partitions
//! entries into the applicable and excluded sets.

use serde::Serialize;

use crate::domain::{Requirement, RECOGNIZED_PLATFORMS};

/// A resolution target platform (`sys_platform` value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetPlatform {
    /// Windows (`win32`).
    Win32,
    /// macOS (`darwin`).
    Darwin,
    /// Linux (`linux`).
    Linux,
    /// Any other platform string, matched literally.
    Other(String),
}

impl TargetPlatform {
    /// Parse a platform name. Common aliases are accepted; anything else
    /// becomes a literal [`Self::Other`] value.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "win32" | "windows" => Self::Win32,
            "darwin" | "macos" => Self::Darwin,
            "linux" => Self::Linux,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Detect the platform this process is running on.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Win32
        } else if cfg!(target_os = "macos") {
            Self::Darwin
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other(std::env::consts::OS.to_string())
        }
    }

    /// The `sys_platform` value for this target.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Win32 => "win32",
            Self::Darwin => "darwin",
            Self::Linux => "linux",
            Self::Other(s) => s,
        }
    }

    /// Whether this is one of the recognized platform values.
    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl std::fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options controlling resolution.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Whether entries without a marker are included.
    pub include_unmarked: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            include_unmarked: true,
        }
    }
}

/// Result of resolving a manifest for one platform.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// The `sys_platform` value that was targeted.
    pub target: String,
    /// Entries applicable on the target, in source order.
    pub included: Vec<Requirement>,
    /// Entries excluded by their marker (or by options), in source order.
    pub skipped: Vec<Requirement>,
}

/// Partitions entries by marker applicability on the target platform.
#[must_use]
pub fn resolve_for_platform(
    requirements: &[Requirement],
    target: &TargetPlatform,
    options: &ResolveOptions,
) -> Resolution {
    let mut included = Vec::new();
    let mut skipped = Vec::new();

    for req in requirements {
        let applies = match req.marker {
            Some(ref marker) => marker.applies_to(target.as_str()),
            None => options.include_unmarked,
        };

        if applies {
            included.push(req.clone());
        } else {
            tracing::debug!(
                name = %req.name,
                target = %target,
                "Entry excluded by marker"
            );
            skipped.push(req.clone());
        }
    }

    Resolution {
        target: target.as_str().to_string(),
        included,
        skipped,
    }
}

/// Whether any entry's marker names the given platform value.
#[must_use]
pub fn manifest_mentions_platform(requirements: &[Requirement], value: &str) -> bool {
    requirements
        .iter()
        .filter_map(|r| r.marker.as_ref())
        .any(|m| m.value == value)
}

/// Per-platform applicable-entry counts for the recognized platforms.
#[must_use]
pub fn platform_entry_counts(requirements: &[Requirement]) -> Vec<(String, usize)> {
    RECOGNIZED_PLATFORMS
        .iter()
        .map(|platform| {
            let count = requirements
                .iter()
                .filter(|r| r.applies_to(platform))
                .count();
            ((*platform).to_string(), count)
        })
        .collect()
}
