//! File-backed channel store.
//!
//! Every channel is a JSON object stored as `<directory>/<channel>.json`.
//! Property names are slash-separated paths (`/general/theme`); nested
//! objects are accepted too and flattened into the same hierarchy.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use kdb_core::KeyName;
use kdb_core::storage::config::{ConfigFormat, document_to_keyset};
use kdb_core::KeySet;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel directory {} is not usable: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("channel directory {} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error("channel store is not initialized")]
    NotInitialized,

    #[error("invalid channel name '{0}'")]
    InvalidName(String),

    #[error("channel '{channel}' could not be read: {source}")]
    Read {
        channel: String,
        #[source]
        source: std::io::Error,
    },

    #[error("channel '{channel}' is malformed: {message}")]
    Malformed { channel: String, message: String },
}

/// Connection to the channel directory, established by [`init`](ChannelStore::init).
///
/// The store remembers what each fetch returned, keyed by channel and parent,
/// so [`fetch`](ChannelStore::fetch) can tell unchanged channels apart.
#[derive(Debug, Default)]
pub struct ChannelStore {
    directory: Option<PathBuf>,
    fetched: HashMap<(String, KeyName), KeySet>,
}

impl ChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self, directory: &Path) -> Result<(), ChannelError> {
        let metadata = std::fs::metadata(directory).map_err(|source| ChannelError::Directory {
            path: directory.to_path_buf(),
            source,
        })?;
        if !metadata.is_dir() {
            return Err(ChannelError::NotADirectory {
                path: directory.to_path_buf(),
            });
        }
        log::debug!("Channel store initialized at {}", directory.display());
        self.directory = Some(directory.to_path_buf());
        Ok(())
    }

    pub fn shutdown(&mut self) {
        self.directory = None;
        self.fetched.clear();
    }

    pub fn is_initialized(&self) -> bool {
        self.directory.is_some()
    }

    fn channel_path(&self, channel: &str) -> Result<PathBuf, ChannelError> {
        let directory = self.directory.as_ref().ok_or(ChannelError::NotInitialized)?;
        if channel.is_empty() || channel.contains(['/', '\\']) || channel.starts_with('.') {
            return Err(ChannelError::InvalidName(channel.to_string()));
        }
        Ok(directory.join(format!("{}.{}", channel, ConfigFormat::Json.extension())))
    }

    /// Reads all properties of `channel` as keys below `parent`.
    pub fn properties(&self, channel: &str, parent: &KeyName) -> Result<KeySet, ChannelError> {
        let path = self.channel_path(channel)?;
        let data = std::fs::read_to_string(&path).map_err(|source| ChannelError::Read {
            channel: channel.to_string(),
            source,
        })?;
        let document = ConfigFormat::Json.parse(&data).map_err(|e| ChannelError::Malformed {
            channel: channel.to_string(),
            message: e.to_string(),
        })?;
        if !document.is_object() {
            return Err(ChannelError::Malformed {
                channel: channel.to_string(),
                message: "top level must be an object".to_string(),
            });
        }
        Ok(document_to_keyset(parent, &document))
    }

    /// Reads `channel` like [`properties`](Self::properties), but returns `None`
    /// when it holds the same keys as on the previous fetch for `parent`.
    /// A channel never fetched before counts as empty.
    pub fn fetch(&mut self, channel: &str, parent: &KeyName) -> Result<Option<KeySet>, ChannelError> {
        let properties = self.properties(channel, parent)?;
        let slot = (channel.to_string(), parent.clone());
        let unchanged = match self.fetched.get(&slot) {
            Some(previous) => *previous == properties,
            None => properties.is_empty(),
        };
        if unchanged {
            return Ok(None);
        }
        self.fetched.insert(slot, properties.clone());
        Ok(Some(properties))
    }
}
