//! # KDB Core Kernel Errors
//!
//! Defines the crate-wide [`Error`] type.
//!
//! Every subsystem keeps its own typed error ([`KeyError`],
//! [`PluginSystemError`], [`StorageSystemError`]); this enum aggregates them
//! so callers that drive several subsystems can use a single `?`.
//!
//! Lifecycle outcomes of plugin calls are deliberately *not* represented here:
//! they travel as [`PluginStatus`](crate::plugin_system::PluginStatus) values
//! together with the error metadata of the parent key.
use std::path::PathBuf;
use std::result::Result as StdResult;

use crate::key::error::KeyError;
use crate::plugin_system::error::PluginSystemError;
use crate::storage::error::StorageSystemError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Key name parsing or key manipulation error
    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    /// Module resolution, loading or contract error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Configuration file or document error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Wraps an I/O error with the operation and path it happened on.
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::Io {
            source,
            operation: operation.into(),
            path,
        })
    }

    /// Numeric code for the store's error channel, when the error has one.
    pub fn code(&self) -> Option<u32> {
        match self {
            Error::PluginSystem(e) => e.code(),
            _ => None,
        }
    }
}
