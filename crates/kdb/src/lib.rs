//! # KDB
//!
//! Entry point for applications: a [`ModuleRegistry`] that resolves the
//! bundled modules (`crypto`, `crypto_ring`, `xfconf`), plus logging setup.
//!
//! With the default features modules come from the compiled-in
//! [`EXPORTED_SYMBOLS`] table. Built with `dynamic-modules`, [`modules`]
//! loads them as shared libraries from the directories in `KDB_MODULE_PATH`.
//!
//! ```no_run
//! let mut registry = kdb::modules();
//! let mut error_key = kdb::Key::new("user:/app").unwrap();
//! let plugin = registry.open_plugin("xfconf", kdb::KeySet::new(), &mut error_key);
//! ```
pub mod exported_symbols;
pub mod logging;

use std::path::{Path, PathBuf};

pub use kdb_core::{
    FunctionRef, Key, KeyName, KeySet, KeyValue, KernelError, ModuleRegistry, Namespace, Operation, Operations,
    Plugin, PluginFactory, PluginInstance, PluginStatus, Result,
};
pub use kdb_core::storage::{LoaderKind, RegistryConfig};

pub use exported_symbols::EXPORTED_SYMBOLS;
pub use logging::init_logging;

/// Search path for module libraries, separated like `PATH`
pub const MODULE_PATH_ENV: &str = "KDB_MODULE_PATH";

/// Registry with the loader chosen at build time.
pub fn modules() -> ModuleRegistry {
    let config = if cfg!(feature = "dynamic-modules") {
        dynamic_config()
    } else {
        RegistryConfig::default()
    };
    modules_from_config(&config)
}

/// Registry built from explicit settings; the static loader uses [`EXPORTED_SYMBOLS`].
pub fn modules_from_config(config: &RegistryConfig) -> ModuleRegistry {
    log::debug!("Building module registry with {:?} loader", config.loader);
    config.build_registry(EXPORTED_SYMBOLS)
}

/// Registry built from a JSON/YAML/TOML settings file.
pub fn modules_from_file<P: AsRef<Path>>(path: P) -> Result<ModuleRegistry> {
    let config = RegistryConfig::load(path)?;
    Ok(modules_from_config(&config))
}

/// Dynamic-loader settings with the directories from `KDB_MODULE_PATH`.
pub fn dynamic_config() -> RegistryConfig {
    RegistryConfig {
        loader: LoaderKind::Dynamic,
        module_dirs: module_dirs_from_env(),
        ..RegistryConfig::default()
    }
}

fn module_dirs_from_env() -> Vec<PathBuf> {
    std::env::var_os(MODULE_PATH_ENV)
        .map(|paths| std::env::split_paths(&paths).collect())
        .unwrap_or_default()
}
