//! # KDB Core Plugin System
//!
//! Resolution of module names to plugin factories and the lifecycle contract
//! every plugin follows.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`symbols`]**: flat symbol tables with module markers, [`PluginFactory`]
//!   and the [`export_plugin!`](crate::export_plugin) macro for dynamic modules.
//! - **[`loader`]**: the [`ModuleLoader`](loader::ModuleLoader) seam with a
//!   static-table loader and a shared-library loader.
//! - **[`registry`]**: [`ModuleRegistry`], the cached name → factory resolver.
//! - **[`traits`]**: the [`Plugin`] trait, [`PluginStatus`] and the operation set.
//! - **[`instance`]**: [`PluginInstance`], a plugin bound to its configuration.
//! - **[`contract`]**: building and reading the self-description published
//!   under `system:/elektra/modules/<name>`.
//! - **[`validation`]**: exact-shape checks of required configuration keys.
//! - **[`error`]**: [`PluginSystemError`](error::PluginSystemError).
pub mod contract;
pub mod error;
pub mod instance;
pub mod loader;
pub mod registry;
pub mod symbols;
pub mod traits;
pub mod validation;

pub use contract::Contract;
pub use instance::{LifecycleState, PluginInstance};
pub use loader::{DynamicLoader, ModuleLoader, StaticLoader};
pub use registry::ModuleRegistry;
pub use symbols::{ExportedSymbol, PluginFactory};
pub use traits::{LifecycleError, Operation, Operations, Plugin, PluginStatus};

// Test module declaration
#[cfg(test)]
mod tests;
