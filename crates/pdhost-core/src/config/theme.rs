//! Environment settings and host theme defaults

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Font Pd uses when a patch or widget doesn't name one
pub const DEFAULT_FONT: &str = "DejaVu Sans Mono";

/// Colors the host supplies for widgets without a native color config
///
/// All colors are packed ARGB (`0xAARRGGBB`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Background for non-IEM widgets (atom boxes, comments, canvases)
    pub default_background: u32,

    /// Foreground for non-IEM widgets
    pub default_foreground: u32,

    /// Background color the host renders as "see-through"
    ///
    /// A background equal to this value is reported with its alpha
    /// byte cleared.
    pub transparent: Option<u32>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            default_background: 0xFFFFFFFF,
            default_foreground: 0xFF000000,
            transparent: None,
        }
    }
}

impl ThemeConfig {
    /// Clear the alpha byte if `color` is the transparent sentinel
    pub fn apply_transparency(&self, color: u32) -> u32 {
        match self.transparent {
            Some(sentinel) if sentinel == color => color & 0x00FF_FFFF,
            _ => color,
        }
    }
}

/// Settings an [`Environment`](crate::pd::Environment) is created from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Host theme defaults handed to every instance
    pub theme: ThemeConfig,

    /// Directories added to the Pd search path at startup
    pub search_paths: Vec<PathBuf>,

    /// Global Pd font name
    pub default_font: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            theme: ThemeConfig::default(),
            search_paths: Vec::new(),
            default_font: DEFAULT_FONT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparency_only_hits_sentinel() {
        let theme = ThemeConfig {
            transparent: Some(0xFF123456),
            ..Default::default()
        };
        assert_eq!(theme.apply_transparency(0xFF123456), 0x00123456);
        assert_eq!(theme.apply_transparency(0xFF123457), 0xFF123457);
    }

    #[test]
    fn test_no_sentinel_is_identity() {
        let theme = ThemeConfig::default();
        assert_eq!(theme.apply_transparency(0xFFFFFFFF), 0xFFFFFFFF);
    }
}
