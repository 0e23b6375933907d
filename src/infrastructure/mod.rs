//! Infrastructure layer - external adapters (filesystem, configuration).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod manifest_paths;
pub mod manifest_reader;
pub mod manifest_writer;

pub use config::{ensure_config_exists, load_config};
pub use manifest_paths::{find_default_manifest, find_manifest_files};
pub use manifest_reader::{ManifestReader, RawLine};
pub use manifest_writer::ManifestWriter;
