//! Application layer - use cases and orchestration.
//!
//! This layer contains the main business logic for loading, resolving,
//! linting, and formatting manifest data.

pub mod diff;
pub mod formatter;
pub mod linter;
pub mod loader;
pub mod parser;
pub mod resolver;

pub use diff::{diff_manifests, ChangedEntry, ManifestDiff};
pub use formatter::{
    format_diff, format_lint_report, format_manifest_markdown, format_requirement_markdown,
    format_requirements_json, format_requirements_table, format_requirements_text,
    format_resolution_summary, format_stats, OutputFormat,
};
pub use linter::{lint_manifest, LintFinding, LintReport, Severity};
pub use loader::{load_manifests, load_primary, LoadOptions};
pub use parser::parse_manifest_text;
pub use resolver::{
    manifest_mentions_platform, platform_entry_counts, resolve_for_platform, Resolution,
    ResolveOptions, TargetPlatform,
};
