//! Path utilities for pdhost configuration files

use std::path::PathBuf;

/// Get the default config file path
///
/// Returns: `<platform config dir>/pdhost/config.yaml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pdhost")
        .join("config.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_layout() {
        let path = default_config_path();
        assert!(path.ends_with("pdhost/config.yaml"));
    }
}
