//! Output formatting for manifest data.
//!
//! Supports multiple output formats: table, canonical requirements text,
//! JSON, and Markdown.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{Manifest, ManifestStats, MarkerOp, Requirement};

use super::diff::ManifestDiff;
use super::linter::{LintReport, Severity};
use super::resolver::Resolution;

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Compact table listing.
    #[default]
    Table,
    /// Canonical requirements text, suitable for reuse as a manifest.
    Requirements,
    /// JSON format for programmatic use.
    Json,
    /// Human-readable Markdown format.
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "requirements" | "reqs" | "txt" => Ok(Self::Requirements),
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => Err(format!(
                "Unknown format: {s}. Use: table, requirements, json, markdown"
            )),
        }
    }
}

/// Formats a table listing of requirement entries.
pub fn format_requirements_table(requirements: &[Requirement]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Line", "Package", "Constraint", "Platform", "Notes"]);

    for req in requirements {
        let constraint = if req.is_unconstrained() {
            "-".to_string()
        } else {
            req.constraint_display()
        };

        let platform = req.marker.as_ref().map_or_else(
            || "-".to_string(),
            |m| match m.op {
                MarkerOp::Eq => m.value.clone(),
                MarkerOp::Ne => format!("!= {}", m.value),
            },
        );

        let notes = req
            .annotation
            .as_ref()
            .map_or_else(|| "-".to_string(), |a| truncate(a, 40));

        table.add_row(vec![
            &req.line.to_string(),
            &req.name,
            &constraint,
            &platform,
            &notes,
        ]);
    }

    table.to_string()
}

/// Formats entries as canonical requirements text.
pub fn format_requirements_text(requirements: &[Requirement]) -> String {
    let mut out = String::new();
    for req in requirements {
        out.push_str(&req.canonical_line());
        out.push('\n');
    }
    out
}

/// Formats entries as JSON.
///
/// # Errors
/// Returns error if serialization fails.
pub fn format_requirements_json(
    requirements: &[Requirement],
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(requirements)
}

/// Formats a whole manifest as Markdown.
pub fn format_manifest_markdown(manifest: &Manifest) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", manifest.display_name()));
    out.push_str(&format!("**Path:** {}\n", manifest.path.display()));

    if let Some(dt) = manifest.modified_at {
        out.push_str(&format!(
            "**Modified:** {}\n",
            dt.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    out.push_str(&format!(
        "**Entries:** {} ({} platform-specific)\n\n",
        manifest.requirement_count(),
        manifest.marked_count()
    ));

    out.push_str("---\n\n");

    for req in &manifest.requirements {
        out.push_str(&format_requirement_markdown(req));
        out.push('\n');
    }

    out
}

/// Formats a single entry as a Markdown detail block.
pub fn format_requirement_markdown(req: &Requirement) -> String {
    let mut out = String::new();

    out.push_str(&format!("### {}\n\n", req.name));
    out.push_str(&format!("- **Line:** {}\n", req.line));

    if req.is_unconstrained() {
        out.push_str("- **Constraint:** any version\n");
    } else {
        out.push_str(&format!("- **Constraint:** `{}`\n", req.constraint_display()));
    }

    if !req.extras.is_empty() {
        out.push_str(&format!("- **Extras:** {}\n", req.extras.join(", ")));
    }

    if let Some(ref marker) = req.marker {
        out.push_str(&format!("- **Platform:** `{marker}`\n"));
    }

    if let Some(ref annotation) = req.annotation {
        out.push_str(&format!("- **Notes:** {annotation}\n"));
    }

    if req.is_optional() {
        out.push_str("- **Optional:** yes\n");
    }

    out
}

/// Formats loading statistics for display.
pub fn format_stats(stats: &ManifestStats, platform_counts: &[(String, usize)]) -> String {
    let mut out = format!(
        "{}\n  Files scanned: {}\n  Total lines: {}\n  Blank lines: {}\n  Comment lines: {}\n  Entries: {}\n  Platform-specific: {}\n  Unconstrained: {}",
        "📊 Statistics".bold(),
        stats.files_scanned.to_string().cyan(),
        stats.total_lines.to_string().cyan(),
        stats.blank_lines,
        stats.comment_lines,
        stats.requirement_count.to_string().green(),
        stats.marked_count.to_string().yellow(),
        stats.unconstrained_count,
    );

    if !platform_counts.is_empty() {
        out.push_str(&format!("\n{}", "  Applicable per platform:".bold()));
        for (platform, count) in platform_counts {
            out.push_str(&format!("\n    {platform}: {count}"));
        }
    }

    out
}

/// Formats a lint report for display.
pub fn format_lint_report(report: &LintReport) -> String {
    if report.is_clean() {
        return format!("{} No problems found", "✓".green().bold());
    }

    let mut out = String::new();
    for finding in &report.findings {
        let label = match finding.severity {
            Severity::Warning => "warning".yellow().bold(),
            Severity::Error => "error".red().bold(),
        };
        out.push_str(&format!("{label}: line {}: {}\n", finding.line, finding.message));
    }

    out.push_str(&format!(
        "{} {} error(s), {} warning(s)",
        "✗".red().bold(),
        report.error_count(),
        report.warning_count()
    ));

    out
}

/// Formats a resolution summary line.
pub fn format_resolution_summary(resolution: &Resolution) -> String {
    format!(
        "{} {} of {} entries apply on {}",
        "✓".green().bold(),
        resolution.included.len(),
        resolution.included.len() + resolution.skipped.len(),
        resolution.target.cyan()
    )
}

/// Formats a manifest diff for display.
pub fn format_diff(diff: &ManifestDiff) -> String {
    if diff.is_empty() {
        return format!("{} Manifests are equivalent", "✓".green().bold());
    }

    let mut out = String::new();

    for req in &diff.removed {
        out.push_str(&format!("{} {}\n", "-".red().bold(), req.canonical_line()));
    }
    for req in &diff.added {
        out.push_str(&format!("{} {}\n", "+".green().bold(), req.canonical_line()));
    }
    for change in &diff.changed {
        out.push_str(&format!(
            "{} {}: {} → {}\n",
            "~".yellow().bold(),
            change.name,
            describe_entry(&change.old),
            describe_entry(&change.new)
        ));
    }

    out.push_str(&format!(
        "{} change(s): {} added, {} removed, {} changed",
        diff.change_count(),
        diff.added.len(),
        diff.removed.len(),
        diff.changed.len()
    ));

    out
}

/// Short constraint+marker description used in diff output.
fn describe_entry(req: &Requirement) -> String {
    let constraint = if req.is_unconstrained() {
        "any".to_string()
    } else {
        req.constraint_display()
    };

    match req.marker {
        Some(ref marker) => format!("{constraint} ({marker})"),
        None => constraint,
    }
}

/// Truncates a string to max length with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    let s = s.lines().next().unwrap_or(s);
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
