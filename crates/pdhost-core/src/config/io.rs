//! YAML configuration I/O
//!
//! Loading never fails: a missing or unreadable file yields the default
//! configuration so a broken config cannot keep the plugin from starting.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Load configuration from a YAML file
///
/// Returns `T::default()` when the file doesn't exist, can't be read, or
/// doesn't parse. The latter two are logged as warnings.
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        log::debug!("No config at {:?}, using defaults", path);
        return T::default();
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            log::warn!("Failed to read config {:?}: {}, using defaults", path, e);
            return T::default();
        }
    };

    match serde_yaml::from_str::<T>(&contents) {
        Ok(config) => {
            log::info!("Loaded config from {:?}", path);
            config
        }
        Err(e) => {
            log::warn!("Failed to parse config {:?}: {}, using defaults", path, e);
            T::default()
        }
    }
}

/// Save configuration to a YAML file, creating parent directories as needed
pub fn save_config<T>(config: &T, path: &Path) -> Result<()>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    log::info!("Saved config to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnvironmentConfig, ThemeConfig};
    use std::path::PathBuf;

    #[test]
    fn test_missing_file_gives_defaults() {
        let config: EnvironmentConfig = load_config(Path::new("/nonexistent/pdhost/config.yaml"));
        assert_eq!(config, EnvironmentConfig::default());
    }

    #[test]
    fn test_garbage_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "theme: [this is not a theme").unwrap();

        let config: EnvironmentConfig = load_config(&path);
        assert_eq!(config, EnvironmentConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = EnvironmentConfig {
            theme: ThemeConfig {
                default_background: 0xFF202020,
                default_foreground: 0xFFE0E0E0,
                transparent: Some(0xFF202020),
            },
            search_paths: vec![PathBuf::from("/opt/pd/extra")],
            default_font: "Menlo".to_string(),
        };

        save_config(&config, &path).unwrap();
        let loaded: EnvironmentConfig = load_config(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "default_font: Monaco\n").unwrap();

        let config: EnvironmentConfig = load_config(&path);
        assert_eq!(config.default_font, "Monaco");
        assert_eq!(config.theme, ThemeConfig::default());
        assert!(config.search_paths.is_empty());
    }
}
