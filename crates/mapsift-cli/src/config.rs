//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).
//!
//! Besides the library sections (`[overlap]`, `[visibility]`) a CLI
//! configuration file may carry a `[filter]` section with symbol names
//! that are always removed:
//!
//! ```toml
//! [filter]
//! exclude = ["Building", "Vineyard"]
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use mapsift::{
    MapSiftError,
    config::{AppConfig, OverlapConfig, VisibilityConfig},
};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for MapSiftError {
    fn from(err: ConfigError) -> Self {
        MapSiftError::Config(Box::new(err))
    }
}

/// Symbol names removed on every run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    #[serde(default)]
    exclude: Vec<String>,
}

impl FilterConfig {
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }
}

/// Contents of a CLI configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    overlap: OverlapConfig,

    #[serde(default)]
    visibility: VisibilityConfig,

    #[serde(default)]
    filter: FilterConfig,
}

impl CliConfig {
    /// Returns the filter section.
    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    /// Builds the library configuration from the overlap and visibility sections.
    pub fn app_config(&self) -> AppConfig {
        AppConfig::new(self.overlap.clone(), self.visibility.clone())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (mapsift/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be read or parsed
/// - Config values fail validation
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<CliConfig, ConfigError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("mapsift/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "mapsift", "mapsift") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(CliConfig::default())
}

/// Load and validate configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<CliConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: CliConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    config
        .app_config()
        .validate()
        .map_err(ConfigError::Validation)?;

    debug!(config:?; "Configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use mapsift::filter::HideMode;

    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_full_config() {
        let (_dir, path) = write_config(
            r#"
            [overlap]
            min_overlap_area = 250.0
            parallel = false
            grid_cell_size = 5000.0

            [visibility]
            hide_mode = "transparent"
            exempt_symbol_ranges = [[100, 200]]

            [filter]
            exclude = ["Building", "Vineyard"]
            "#,
        );

        let config = load_config(Some(&path)).unwrap();
        let app = config.app_config();

        assert_eq!(app.overlap().min_overlap_area(), 250.0);
        assert!(!app.overlap().parallel());
        assert_eq!(app.overlap().grid_cell_size(), Some(5000.0));
        assert_eq!(app.visibility().hide_mode(), HideMode::Transparent);
        assert_eq!(app.visibility().exemptions().bands(), [[100, 200]]);
        assert_eq!(config.filter().exclude(), ["Building", "Vineyard"]);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let (_dir, path) = write_config("[visibility]\nhide_mode = \"remove\"\n");
        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.app_config().overlap().min_overlap_area(), 100.0);
        assert!(config.filter().exclude().is_empty());
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nope.toml");

        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::MissingFile(missing)) if missing == path
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let (_dir, path) = write_config("[overlap\nmin_overlap_area = ");
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let (_dir, path) = write_config("[overlap]\nthreshold = 3.0\n");
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let (_dir, path) = write_config("[overlap]\ngrid_cell_size = -5.0\n");
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Validation(message)) if message.contains("grid_cell_size")
        ));
    }

    #[test]
    fn test_config_error_converts() {
        let err: MapSiftError = ConfigError::Validation("bad".to_string()).into();
        assert_eq!(err.to_string(), "Configuration error: Validation error: bad");
    }
}
