//! reqfile-handler - Parse, inspect, and resolve Python dependency manifests.
//!
//! This tool reads line-oriented requirements manifests, evaluates their
//! platform markers, and provides various output formats (table, JSON,
//! Markdown, canonical requirements text) for review, linting, and export.
//!
//! QUICK START:
//!   reqfile list                        # Table of all entries
//!   reqfile show PyQt5                  # Inspect a single entry
//!   reqfile check --strict              # Lint the manifest
//!   reqfile resolve -p win32 -o win.txt # Platform-filtered manifest
//!   reqfile diff old.txt new.txt        # Compare two manifests
//!   reqfile stats --all-files           # Counts across all manifests

mod application;
mod cli;
mod domain;
mod infrastructure;

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use application::{
    diff_manifests, format_diff, format_lint_report, format_manifest_markdown,
    format_requirement_markdown, format_requirements_json, format_requirements_table,
    format_requirements_text, format_resolution_summary, format_stats, lint_manifest,
    load_manifests, load_primary, manifest_mentions_platform, parse_manifest_text,
    platform_entry_counts, resolve_for_platform, LoadOptions, OutputFormat, ResolveOptions,
    TargetPlatform,
};
use cli::{Cli, Commands};
use domain::{Manifest, Requirement};
use infrastructure::{
    ensure_config_exists, find_manifest_files, load_config, ManifestReader, ManifestWriter,
};

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
fn run(cli: Cli) -> domain::Result<()> {
    let format = cli
        .output_format()
        .map_err(|e| domain::AppError::Config { message: e })?;

    let manifest = cli.manifest;

    match cli.command {
        Commands::List {
            limit,
            platform,
            all_files,
        } => {
            cmd_list(manifest, limit, platform.as_deref(), all_files, format)?;
        }
        Commands::Show { package } => {
            cmd_show(manifest, &package, format)?;
        }
        Commands::Check { strict, all_files } => {
            cmd_check(manifest, strict, all_files)?;
        }
        Commands::Resolve {
            platform,
            output,
            marked_only,
        } => {
            cmd_resolve(
                manifest,
                platform.as_deref(),
                output.as_deref(),
                marked_only,
                format,
            )?;
        }
        Commands::Diff { old, new } => {
            cmd_diff(&old, &new, format)?;
        }
        Commands::Export { output } => {
            cmd_export(manifest, output.as_deref(), format)?;
        }
        Commands::Stats { all_files } => {
            cmd_stats(manifest, all_files)?;
        }
        Commands::Paths => {
            cmd_paths()?;
        }
    }

    Ok(())
}

/// Build load options from the global `--manifest` flag.
fn load_options(manifest: Option<PathBuf>, all_files: bool) -> LoadOptions {
    LoadOptions {
        manifest,
        all_files,
        ..Default::default()
    }
}

/// List manifest entries command.
fn cmd_list(
    manifest: Option<PathBuf>,
    limit: usize,
    platform: Option<&str>,
    all_files: bool,
    format: OutputFormat,
) -> domain::Result<()> {
    let (manifests, stats) = load_manifests(&load_options(manifest, all_files))?;

    let mut entries: Vec<Requirement> = manifests
        .iter()
        .flat_map(|m| m.requirements.iter().cloned())
        .collect();

    if let Some(platform) = platform {
        let target = TargetPlatform::parse(platform);
        entries.retain(|r| r.applies_to(target.as_str()));
    }

    if limit > 0 {
        entries.truncate(limit);
    }

    match format {
        OutputFormat::Table => {
            println!("{}", format_requirements_table(&entries));
            println!();
            println!("{}", format_stats(&stats, &platform_entry_counts(&entries)));
        }
        OutputFormat::Requirements => print!("{}", format_requirements_text(&entries)),
        OutputFormat::Json => {
            println!(
                "{}",
                format_requirements_json(&entries).map_err(domain::AppError::json)?
            );
        }
        OutputFormat::Markdown => {
            for entry in &entries {
                println!("{}", format_requirement_markdown(entry));
            }
        }
    }

    Ok(())
}

/// Show a single entry.
fn cmd_show(manifest: Option<PathBuf>, package: &str, format: OutputFormat) -> domain::Result<()> {
    let (manifest, _) = load_primary(&load_options(manifest, false))?;

    let entry = manifest
        .find(package)
        .ok_or_else(|| domain::AppError::InvalidData {
            message: format!("Package not found in {}: {package}", manifest.display_name()),
        })?;

    let output = match format {
        OutputFormat::Markdown | OutputFormat::Table => format_requirement_markdown(entry),
        OutputFormat::Requirements => entry.canonical_line(),
        OutputFormat::Json => format_requirements_json(std::slice::from_ref(entry))
            .map_err(domain::AppError::json)?,
    };

    println!("{output}");
    Ok(())
}

/// Lint manifests command.
fn cmd_check(manifest: Option<PathBuf>, strict: bool, all_files: bool) -> domain::Result<()> {
    let config = load_config()?;
    let (manifests, _) = load_manifests(&load_options(manifest, all_files))?;

    let mut errors = 0;
    let mut warnings = 0;

    for manifest in &manifests {
        let report = lint_manifest(manifest, &config.lint);

        if manifests.len() > 1 {
            println!("{}", manifest.display_name().bold());
        }
        println!("{}", format_lint_report(&report));

        errors += report.error_count();
        warnings += report.warning_count();
    }

    let failing = errors + if strict { warnings } else { 0 };
    if failing > 0 {
        return Err(domain::AppError::InvalidData {
            message: format!("{failing} problem(s) found"),
        });
    }

    Ok(())
}

/// Platform-filter entries command.
fn cmd_resolve(
    manifest: Option<PathBuf>,
    platform: Option<&str>,
    output_path: Option<&str>,
    marked_only: bool,
    format: OutputFormat,
) -> domain::Result<()> {
    let config = load_config()?;
    let (manifest, _) = load_primary(&load_options(manifest, false))?;

    let target = platform
        .map(TargetPlatform::parse)
        .or_else(|| {
            config
                .resolve
                .default_platform
                .as_deref()
                .map(TargetPlatform::parse)
        })
        .unwrap_or_else(TargetPlatform::current);

    if !target.is_recognized() && !manifest_mentions_platform(&manifest.requirements, target.as_str())
    {
        return Err(domain::AppError::Config {
            message: format!(
                "Unrecognized target platform: {target} (not named by any marker in {})",
                manifest.display_name()
            ),
        });
    }

    let options = ResolveOptions {
        include_unmarked: config.resolve.include_unmarked && !marked_only,
    };

    let resolution = resolve_for_platform(&manifest.requirements, &target, &options);

    match output_path {
        Some(path) => {
            let note = format!(
                "Source: {} (platform: {})",
                manifest.display_name(),
                resolution.target
            );
            let written =
                ManifestWriter::create(Path::new(path))?.write_manifest(&resolution.included, &note)?;
            println!(
                "{} Wrote {} entries for {} to {}",
                "✓".green().bold(),
                written,
                resolution.target.cyan(),
                path
            );
        }
        None => match format {
            OutputFormat::Table => {
                println!("{}", format_requirements_table(&resolution.included));
                println!();
                println!("{}", format_resolution_summary(&resolution));
            }
            OutputFormat::Requirements => {
                print!("{}", format_requirements_text(&resolution.included));
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&resolution).map_err(domain::AppError::json)?
                );
            }
            OutputFormat::Markdown => {
                for entry in &resolution.included {
                    println!("{}", format_requirement_markdown(entry));
                }
                println!("{}", format_resolution_summary(&resolution));
            }
        },
    }

    Ok(())
}

/// Compare two manifests command.
fn cmd_diff(old: &Path, new: &Path, format: OutputFormat) -> domain::Result<()> {
    let old_manifest = read_manifest(old)?;
    let new_manifest = read_manifest(new)?;

    let diff = diff_manifests(&old_manifest, &new_manifest);

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&diff).map_err(domain::AppError::json)?
            );
        }
        _ => println!("{}", format_diff(&diff)),
    }

    Ok(())
}

/// Read and parse a single explicit manifest file.
fn read_manifest(path: &Path) -> domain::Result<Manifest> {
    let reader = ManifestReader::open(path)?;
    let content = reader.read_to_string()?;

    let file_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| {
            n.to_string_lossy().into_owned()
        });

    Ok(Manifest {
        path: path.to_path_buf(),
        requirements: parse_manifest_text(&content, &file_name)?,
        modified_at: reader.modified_at(),
    })
}

/// Export the manifest to file or stdout.
fn cmd_export(
    manifest: Option<PathBuf>,
    output_path: Option<&str>,
    format: OutputFormat,
) -> domain::Result<()> {
    let (manifest, _) = load_primary(&load_options(manifest, false))?;

    let content = match format {
        OutputFormat::Requirements | OutputFormat::Table => {
            format_requirements_text(&manifest.requirements)
        }
        OutputFormat::Json => {
            format_requirements_json(&manifest.requirements).map_err(domain::AppError::json)?
        }
        OutputFormat::Markdown => format_manifest_markdown(&manifest),
    };

    match output_path {
        Some(path) => {
            let mut file = std::fs::File::create(path)
                .map_err(|e| domain::AppError::io(format!("Failed to create {path}"), e))?;
            file.write_all(content.as_bytes())
                .map_err(|e| domain::AppError::io("Failed to write file", e))?;
            println!(
                "{} Exported {} entries to {}",
                "✓".green().bold(),
                manifest.requirement_count(),
                path
            );
        }
        None => {
            println!("{content}");
        }
    }

    Ok(())
}

/// Show statistics command.
fn cmd_stats(manifest: Option<PathBuf>, all_files: bool) -> domain::Result<()> {
    let (manifests, stats) = load_manifests(&load_options(manifest, all_files))?;

    let entries: Vec<Requirement> = manifests
        .iter()
        .flat_map(|m| m.requirements.iter().cloned())
        .collect();

    println!("{}", format_stats(&stats, &platform_entry_counts(&entries)));

    Ok(())
}

/// Show discovered manifest paths command.
fn cmd_paths() -> domain::Result<()> {
    ensure_config_exists()?;
    let manifests = find_manifest_files(Path::new("."))?;

    println!("{}", "📂 Manifest Files".bold());
    println!();

    for (i, path) in manifests.iter().enumerate() {
        let label = if path
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|name| name == "requirements")
        {
            "split".blue()
        } else {
            "project".green()
        };

        println!("  {}. [{}] {}", i + 1, label, path.display());
    }

    println!();
    println!("Total: {} manifest(s)", manifests.len());
    println!("Config: {}", infrastructure::config::config_file_path().display());

    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
