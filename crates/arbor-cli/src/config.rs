//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory),
//! applying command-line overrides, and validating the result.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use arbor::{ArborError, config::AppConfig};

use crate::Args;

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for ArborError {
    fn from(err: ConfigError) -> Self {
        ArborError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (arbor/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ArborError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("arbor/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "arbor", "arbor") {
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
    Ok(AppConfig::default())
}

/// Apply command-line overrides on top of a loaded configuration.
pub fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(alignment) = args.align {
        debug!(alignment:? = alignment; "Overriding alignment");
        config.layout_mut().set_alignment(alignment);
    }
    if let Some(orientation) = args.orientation {
        debug!(orientation:? = orientation; "Overriding orientation");
        config.layout_mut().set_orientation(orientation);
    }
    if let Some(scale) = args.scale {
        debug!(scale = scale; "Overriding scale");
        config.canvas_mut().set_scale(scale);
    }
}

/// Check values that deserialize fine but cannot be rendered.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] for unparsable colors and
/// non-positive scale or distances.
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    config
        .style()
        .background_color()
        .map_err(ConfigError::Validation)?;
    config
        .style()
        .connector_stroke()
        .map_err(ConfigError::Validation)?;

    let scale = config.canvas().scale();
    if !(scale.is_finite() && scale > 0.0) {
        return Err(ConfigError::Validation(format!(
            "scale must be a positive number, got {scale}"
        )));
    }

    let distance = config.canvas().distance();
    if distance.x() <= 0.0 || distance.y() <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "distance must be positive, got x = {} and y = {}",
            distance.x(),
            distance.y()
        )));
    }

    Ok(())
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing fails
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, ArborError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;

    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use arbor::layout::{Alignment, Orientation};
    use tempfile::tempdir;

    use super::*;

    fn args() -> Args {
        Args {
            input: "in.json".to_string(),
            output: "out.svg".to_string(),
            config: None,
            log_level: "off".to_string(),
            align: None,
            orientation: None,
            collapse: Vec::new(),
            scale: None,
        }
    }

    #[test]
    fn test_explicit_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout]\nalignment = \"start\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();

        assert_eq!(config.layout().alignment(), Alignment::Start);
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let result = load_config(Some(&path));

        assert!(matches!(result, Err(ArborError::Config(msg)) if msg.contains("Missing")));
    }

    #[test]
    fn test_malformed_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout\n").unwrap();

        assert!(matches!(load_config(Some(&path)), Err(ArborError::Config(_))));
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut config = AppConfig::default();
        let mut args = args();
        args.align = Some(Alignment::Start);
        args.orientation = Some(Orientation::LeftToRight);
        args.scale = Some(2.0);

        apply_overrides(&mut config, &args);

        assert_eq!(config.layout().alignment(), Alignment::Start);
        assert_eq!(config.layout().orientation(), Orientation::LeftToRight);
        assert_eq!(config.canvas().scale(), 2.0);
    }

    #[test]
    fn test_validate() {
        assert!(validate(&AppConfig::default()).is_ok());

        let mut config = AppConfig::default();
        config.canvas_mut().set_scale(0.0);
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        let config: AppConfig = toml::from_str("[style]\nconnector_color = \"nope\"\n").unwrap();
        assert!(validate(&config).is_err());
    }
}
