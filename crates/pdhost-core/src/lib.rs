//! pdhost-core: embed Pure Data patches in a host and drive their GUI objects
//!
//! - [`pd`]: environment, instances, patches and GUI object views
//! - [`config`]: host theme and search-path settings, YAML persistence

pub mod config;
pub mod pd;
