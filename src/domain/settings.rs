//! Application configuration types.
//!
//! TOML-backed settings controlling resolution defaults, lint behavior,
//! and filesystem paths.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for platform resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Default target platform when `--platform` is not given.
    #[serde(default)]
    pub default_platform: Option<String>,

    /// Whether unmarked entries are included in resolved output.
    #[serde(default = "default_include_unmarked")]
    pub include_unmarked: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            default_platform: None,
            include_unmarked: default_include_unmarked(),
        }
    }
}

const fn default_include_unmarked() -> bool {
    true
}

/// Configuration for manifest linting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintConfig {
    /// Whether entries without any version constraint produce a warning.
    #[serde(default = "default_warn_unconstrained")]
    pub warn_unconstrained: bool,

    /// Whether duplicate package names produce a warning.
    #[serde(default = "default_warn_duplicates")]
    pub warn_duplicates: bool,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            warn_unconstrained: default_warn_unconstrained(),
            warn_duplicates: default_warn_duplicates(),
        }
    }
}

const fn default_warn_unconstrained() -> bool {
    false
}

const fn default_warn_duplicates() -> bool {
    true
}

/// Path configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Resolution defaults.
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Lint behavior.
    #[serde(default)]
    pub lint: LintConfig,

    /// Path configuration.
    #[serde(default)]
    pub paths: PathConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".reqfile-handler")
    }

    /// Get the config file path.
    #[must_use]
    pub fn config_file_path(&self) -> PathBuf {
        self.data_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.resolve.default_platform.is_none());
        assert!(config.resolve.include_unmarked);
        assert!(config.lint.warn_duplicates);
        assert!(!config.lint.warn_unconstrained);
    }

    #[test]
    fn test_data_dir_override() {
        let config = AppConfig {
            paths: PathConfig {
                data_dir: Some(PathBuf::from("/tmp/reqfile-test")),
            },
            ..Default::default()
        };
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/reqfile-test"));
        assert_eq!(
            config.config_file_path(),
            PathBuf::from("/tmp/reqfile-test/config.toml")
        );
    }
}
