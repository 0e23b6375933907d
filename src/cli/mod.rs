//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::OutputFormat;

/// reqfile-handler - Parse, inspect, and resolve Python dependency manifests.
///
/// Quick start: reqfile list | show <package> | check --strict | resolve -p win32
#[derive(Parser, Debug)]
#[command(name = "reqfile-handler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format: table, requirements, json, or markdown.
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Manifest file to operate on (discovered from the working directory
    /// if omitted).
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List manifest entries (summary table plus statistics).
    List {
        /// Maximum number of entries to show (0 = all).
        #[arg(short, long, default_value = "0")]
        limit: usize,

        /// Only show entries applicable on this platform.
        #[arg(short, long)]
        platform: Option<String>,

        /// Include every discovered manifest, not just the primary one.
        #[arg(long)]
        all_files: bool,
    },

    /// Show a single entry in detail.
    Show {
        /// Package name (normalized or partial match).
        package: String,
    },

    /// Lint the manifest: name syntax, markers, duplicates, conflicts.
    Check {
        /// Treat warnings as errors.
        #[arg(long)]
        strict: bool,

        /// Check every discovered manifest, not just the primary one.
        #[arg(long)]
        all_files: bool,
    },

    /// Filter entries for a target platform.
    Resolve {
        /// Target platform (win32, darwin, linux). Defaults to the
        /// configured platform, then the current host.
        #[arg(short, long)]
        platform: Option<String>,

        /// Output file path (stdout if not specified).
        #[arg(short, long)]
        output: Option<String>,

        /// Only include entries that carry a platform marker.
        #[arg(long)]
        marked_only: bool,
    },

    /// Compare two manifests entry by entry.
    Diff {
        /// Old manifest path.
        old: PathBuf,

        /// New manifest path.
        new: PathBuf,
    },

    /// Export the manifest to a file or stdout.
    Export {
        /// Output file path (stdout if not specified).
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show statistics about manifest entries.
    Stats {
        /// Include every discovered manifest, not just the primary one.
        #[arg(long)]
        all_files: bool,
    },

    /// Show manifest files discovered from the working directory.
    Paths,
}

impl Cli {
    /// Parse the output format argument.
    pub fn output_format(&self) -> Result<OutputFormat, String> {
        self.format.parse()
    }
}
