//! Read-only access to settings channels.
//!
//! `get` below a parent key whose value names a channel (`/path/to/<channel>`,
//! only the basename counts) returns one key per channel property, or no
//! update while the channel is unchanged since the last fetch. Writing is
//! not supported; `set` reports no update.
mod channel;

use std::path::{Path, PathBuf};

use kdb_core::kernel::constants::ERROR_RESOURCE;
use kdb_core::plugin_system::contract::answer_contract_request;
use kdb_core::{Key, KeyName, KeySet, Operation, Operations, Plugin, PluginStatus};

pub use channel::{ChannelError, ChannelStore};

pub const PLUGIN_NAME: &str = "xfconf";

/// Configuration key naming the channel directory
pub const DIRECTORY_PATH: &str = "/xfconf/directory";

#[derive(Debug, Default)]
pub struct XfconfPlugin {
    store: ChannelStore,
}

impl XfconfPlugin {
    pub fn new() -> Self {
        Self {
            store: ChannelStore::new(),
        }
    }
}

/// `$XDG_CONFIG_HOME/kdb/xfconf`, falling back to `$HOME/.config/kdb/xfconf`.
pub fn default_directory() -> Option<PathBuf> {
    let config_home = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;
    Some(config_home.join("kdb").join(PLUGIN_NAME))
}

fn configured_directory(config: &KeySet) -> Result<Option<PathBuf>, String> {
    let name = KeyName::new(DIRECTORY_PATH).map_err(|e| e.to_string())?;
    match config.lookup_cascading(&name) {
        None => Ok(None),
        Some(key) => match key.string() {
            Some(dir) if !dir.is_empty() => Ok(Some(PathBuf::from(dir))),
            _ => Err(format!("configuration key {} must hold a directory path", DIRECTORY_PATH)),
        },
    }
}

/// Channel addressed by `parent`: basename of its value, else its own base name.
fn channel_name(parent: &Key) -> Option<String> {
    parent
        .string()
        .and_then(|value| Path::new(value).file_name())
        .and_then(|name| name.to_str())
        .or_else(|| parent.name().base_name())
        .map(str::to_string)
}

impl Plugin for XfconfPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &str {
        "xfconf plugin waits for your orders"
    }

    fn operations(&self) -> Operations {
        Operations::LIFECYCLE.with(Operation::CheckConf)
    }

    fn open(&mut self, config: &KeySet, error_key: &mut Key) -> PluginStatus {
        log::debug!("Initializing channel store");
        let directory = match configured_directory(config) {
            Ok(Some(dir)) => dir,
            Ok(None) => match default_directory() {
                Some(dir) => dir,
                None => {
                    return PluginStatus::error(
                        error_key,
                        ERROR_RESOURCE,
                        "no channel directory configured and no home directory known",
                        PLUGIN_NAME,
                    );
                }
            },
            Err(reason) => return PluginStatus::error(error_key, ERROR_RESOURCE, reason, PLUGIN_NAME),
        };

        match self.store.init(&directory) {
            Ok(()) => PluginStatus::Success,
            Err(e) => {
                log::warn!("Unable to initialize channel store: {}", e);
                PluginStatus::error(error_key, ERROR_RESOURCE, e.to_string(), PLUGIN_NAME)
            }
        }
    }

    fn close(&mut self, _error_key: &mut Key) -> PluginStatus {
        self.store.shutdown();
        PluginStatus::Success
    }

    fn get(&mut self, _config: &KeySet, returned: &mut KeySet, parent: &mut Key) -> PluginStatus {
        if let Some(status) = answer_contract_request(self, returned, parent) {
            return status;
        }

        let Some(channel) = channel_name(parent) else {
            let reason = format!("no channel named by {}", parent.name());
            return PluginStatus::error(parent, ERROR_RESOURCE, reason, PLUGIN_NAME);
        };
        log::debug!("Fetching keys from channel '{}'", channel);

        match self.store.fetch(&channel, parent.name()) {
            Ok(Some(properties)) => {
                returned.extend(properties);
                PluginStatus::Success
            }
            Ok(None) => {
                log::debug!("Channel '{}' unchanged since last fetch", channel);
                PluginStatus::NoUpdate
            }
            Err(e) => PluginStatus::error(parent, ERROR_RESOURCE, e.to_string(), PLUGIN_NAME),
        }
    }

    fn set(&mut self, _config: &KeySet, _returned: &mut KeySet, _parent: &mut Key) -> PluginStatus {
        PluginStatus::NoUpdate
    }

    fn check_conf(&self, config: &mut KeySet, error_key: &mut Key) -> PluginStatus {
        match configured_directory(config) {
            Ok(_) => PluginStatus::NoUpdate,
            Err(reason) => PluginStatus::error(error_key, ERROR_RESOURCE, reason, PLUGIN_NAME),
        }
    }
}

#[cfg(feature = "module-export")]
kdb_core::export_plugin!(XfconfPlugin::new());

#[cfg(test)]
mod tests;
