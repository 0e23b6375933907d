//! Domain layer - core business logic and types.
//!
//! This layer contains pure domain models and error types
//! without any external dependencies (filesystem, IO, etc.).

pub mod error;
pub mod models;
pub mod settings;

pub use error::{AppError, Result};
pub use models::{
    canonicalize_name, Comparator, Manifest, ManifestStats, Marker, MarkerOp, Requirement,
    Version, VersionSpec, RECOGNIZED_PLATFORMS,
};
pub use settings::{AppConfig, LintConfig, PathConfig, ResolveConfig};
