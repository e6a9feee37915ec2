//! # KDB Core Plugin System Errors
//!
//! Defines [`PluginSystemError`], covering module resolution (module not
//! found, factory symbol missing), dynamic library loading, failed opens and
//! malformed contracts.
use std::path::PathBuf;

use crate::kernel::constants::{ERROR_MISSING_FACTORY_SYMBOL, ERROR_MODULE_NOT_FOUND};

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Did not find module {module}")]
    ModuleNotFound { module: String },

    #[error("no such symbol elektraPluginSymbol in module {module}")]
    MissingFactorySymbol { module: String },

    #[error("Module loading failed for '{module}': {source}")]
    LoadingError {
        module: String,
        path: Option<PathBuf>,
        #[source]
        source: Box<PluginSystemErrorSource>,
    },

    #[error("Module registry has been shut down")]
    RegistryShutDown,

    #[error("Opening plugin '{plugin}' failed ({code}): {message}")]
    OpenFailed {
        plugin: String,
        code: u32,
        message: String,
    },

    #[error("Invalid contract for plugin '{plugin}': {message}")]
    InvalidContract { plugin: String, message: String },

    #[error("Version parsing error: {0}")]
    VersionParsing(#[from] semver::Error),
}

impl PluginSystemError {
    /// Numeric code reported on the error key, for resolution errors.
    pub fn code(&self) -> Option<u32> {
        match self {
            PluginSystemError::ModuleNotFound { .. } => Some(ERROR_MODULE_NOT_FOUND),
            PluginSystemError::MissingFactorySymbol { .. } => Some(ERROR_MISSING_FACTORY_SYMBOL),
            PluginSystemError::OpenFailed { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemErrorSource {
    #[error(transparent)]
    Library(#[from] libloading::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Other: {0}")]
    Other(String),
}
