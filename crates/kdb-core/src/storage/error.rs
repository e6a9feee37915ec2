//! # KDB Core Storage Errors
//!
//! Errors raised while reading configuration documents from disk and
//! converting them to and from key sets.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StorageSystemError {
    #[error("I/O error during '{operation}' on '{path}': {source}")]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
        operation: String,
    },

    #[error("Unknown or unsupported config format for path: {path}")]
    UnsupportedConfigFormat { path: PathBuf },

    #[error("Failed to deserialize from {format}: {message}")]
    DeserializationError { format: String, message: String },

    #[error("Failed to serialize to {format}: {message}")]
    SerializationError { format: String, message: String },
}
