//! # KDB Core Storage
//!
//! Reading plugin configurations and registry settings from configuration
//! files (JSON, and YAML/TOML behind the `yaml-config`/`toml-config`
//! features) and mapping nested documents onto key sets.
pub mod config;
pub mod error;

pub use config::{ConfigFormat, LoaderKind, RegistryConfig};
