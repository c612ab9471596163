//! Configuration for the Pd host environment
//!
//! Provides the YAML-backed settings the environment is created from:
//!
//! - Generic YAML config loading/saving
//! - Default config path
//! - Theme defaults for widgets that carry no colors of their own
//!
//! # Usage
//!
//! ```ignore
//! use pdhost_core::config::{load_config, default_config_path, EnvironmentConfig};
//!
//! let config: EnvironmentConfig = load_config(&default_config_path());
//! ```

mod io;
mod paths;
mod theme;

pub use io::{load_config, save_config};
pub use paths::default_config_path;
pub use theme::{EnvironmentConfig, ThemeConfig, DEFAULT_FONT};
