/// Library name
pub const APP_NAME: &str = "kdb";

/// Library version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Root of the module cache and of every plugin's contract
pub const MODULES_ROOT: &str = "system:/elektra/modules";

/// Name of the factory every module exports
pub const FACTORY_SYMBOL: &str = "elektraPluginSymbol";

/// Default file name prefix for dynamically loaded modules (`libkdb_plugin_<name>.so`)
pub const DEFAULT_LIBRARY_PREFIX: &str = "kdb_plugin_";

/// Error code: module not found
pub const ERROR_MODULE_NOT_FOUND: u32 = 70;

/// Error code: module has no factory symbol
pub const ERROR_MISSING_FACTORY_SYMBOL: u32 = 71;

/// Error code: a resource a plugin needs could not be acquired
pub const ERROR_RESOURCE: u32 = 10;

/// Error code: cryptographic configuration is missing or malformed
pub const ERROR_CRYPTO_CONFIG: u32 = 130;

/// Error code: a cryptographic operation failed
pub const ERROR_CRYPTO_OPERATION: u32 = 131;
