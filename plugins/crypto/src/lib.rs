//! Cryptographic transform plugin.
//!
//! Keys carrying the metadata `crypto/encrypt` are encrypted on `set` and
//! decrypted on `get`. The plugin configuration must provide a 32 byte key and
//! a 16 byte IV:
//!
//! ```text
//! user:/crypto/key-derivation/key = <32 bytes>
//! user:/crypto/key-derivation/iv  = <16 bytes>
//! ```
//!
//! Both are looked up cascading, so any namespace works.
mod cipher;

use kdb_core::kernel::constants::{ERROR_CRYPTO_CONFIG, ERROR_CRYPTO_OPERATION};
use kdb_core::plugin_system::contract::answer_contract_request;
use kdb_core::plugin_system::validation::{ConfigRequirement, validate};
use kdb_core::{Key, KeySet, KeyValue, Operation, Operations, Plugin, PluginStatus};

use cipher::Session;

pub use cipher::CipherError;

pub const PLUGIN_NAME: &str = "crypto";
pub const RING_PLUGIN_NAME: &str = "crypto_ring";

pub const KEY_PATH: &str = "/crypto/key-derivation/key";
pub const IV_PATH: &str = "/crypto/key-derivation/iv";
pub const KEY_LEN: usize = 32;
pub const IV_LEN: usize = 16;

/// Marks a key whose value is stored encrypted
pub const ENCRYPT_META: &str = "crypto/encrypt";

const REQUIREMENTS: [ConfigRequirement; 2] = [
    ConfigRequirement::binary(KEY_PATH, KEY_LEN),
    ConfigRequirement::binary(IV_PATH, IV_LEN),
];

pub struct CryptoPlugin {
    name: &'static str,
    session: Option<Session>,
}

impl CryptoPlugin {
    pub fn new() -> Self {
        Self::named(PLUGIN_NAME)
    }

    /// The same plugin published under the explicit backend name.
    pub fn ring() -> Self {
        Self::named(RING_PLUGIN_NAME)
    }

    fn named(name: &'static str) -> Self {
        Self { name, session: None }
    }

    /// Validates the configuration and sets up the cipher, once per open.
    fn ensure_session(&mut self, config: &KeySet, error_key: &mut Key) -> Result<&Session, PluginStatus> {
        if self.session.is_none() {
            let keys = validate(config, &REQUIREMENTS)
                .map_err(|e| e.report(error_key, ERROR_CRYPTO_CONFIG, self.name))?;
            let (key, iv) = match (keys[0].binary(), keys[1].binary()) {
                (Some(key), Some(iv)) => (key, iv),
                _ => {
                    return Err(PluginStatus::error(
                        error_key,
                        ERROR_CRYPTO_CONFIG,
                        "crypto configuration lost its binary values",
                        self.name,
                    ));
                }
            };
            let session = Session::new(key, iv)
                .map_err(|e| PluginStatus::error(error_key, ERROR_CRYPTO_CONFIG, e.to_string(), self.name))?;
            log::debug!("Crypto session for '{}' established", self.name);
            self.session = Some(session);
        }
        self.session.as_ref().ok_or_else(|| {
            PluginStatus::error(error_key, ERROR_CRYPTO_CONFIG, "crypto session unavailable", self.name)
        })
    }
}

impl Default for CryptoPlugin {
    fn default() -> Self {
        Self::new()
    }
}

fn is_marked(key: &Key) -> bool {
    key.meta(ENCRYPT_META).is_some_and(|v| v == "1")
}

impl Plugin for CryptoPlugin {
    fn name(&self) -> &str {
        self.name
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn description(&self) -> &str {
        "Encrypts and decrypts marked configuration values"
    }

    fn operations(&self) -> Operations {
        Operations::LIFECYCLE
            .without(Operation::Commit)
            .with(Operation::CheckConf)
    }

    fn open(&mut self, config: &KeySet, error_key: &mut Key) -> PluginStatus {
        // Re-validate on every open, a previous close dropped the session.
        self.session = None;
        match self.ensure_session(config, error_key) {
            Ok(_) => PluginStatus::Success,
            Err(status) => status,
        }
    }

    fn close(&mut self, _error_key: &mut Key) -> PluginStatus {
        self.session = None;
        PluginStatus::Success
    }

    fn get(&mut self, config: &KeySet, returned: &mut KeySet, parent: &mut Key) -> PluginStatus {
        if let Some(status) = answer_contract_request(self, returned, parent) {
            return status;
        }

        let name = self.name;
        let session = match self.ensure_session(config, parent) {
            Ok(session) => session,
            Err(status) => return status,
        };

        // Nothing is written back unless every marked value decrypts
        let parent_name = parent.name().clone();
        let mut decrypted = Vec::new();
        for key in returned.below_mut(&parent_name) {
            if !is_marked(key) {
                continue;
            }
            // Not encrypted yet (e.g. written by a plugin earlier in the chain).
            let Some(data) = key.binary() else { continue };
            match session.decrypt(data) {
                Ok(value) => decrypted.push((key, value)),
                Err(e) => {
                    let reason = format!("decrypting {} failed: {}", key.name(), e);
                    return PluginStatus::error(parent, ERROR_CRYPTO_OPERATION, reason, name);
                }
            }
        }
        for (key, value) in decrypted {
            key.set_value(value);
        }
        PluginStatus::Success
    }

    fn set(&mut self, config: &KeySet, returned: &mut KeySet, parent: &mut Key) -> PluginStatus {
        let name = self.name;
        let session = match self.ensure_session(config, parent) {
            Ok(session) => session,
            Err(status) => return status,
        };

        // A failed set leaves every value as it was
        let parent_name = parent.name().clone();
        let mut encrypted = Vec::new();
        for key in returned.below_mut(&parent_name) {
            if !is_marked(key) {
                continue;
            }
            match session.encrypt(key.value()) {
                Ok(Some(ciphertext)) => encrypted.push((key, ciphertext)),
                Ok(None) => {}
                Err(e) => {
                    let reason = format!("encrypting {} failed: {}", key.name(), e);
                    return PluginStatus::error(parent, ERROR_CRYPTO_OPERATION, reason, name);
                }
            }
        }
        for (key, ciphertext) in encrypted {
            key.set_value(KeyValue::Binary(ciphertext));
        }
        PluginStatus::Success
    }

    fn error(&mut self, _config: &KeySet, _returned: &mut KeySet, _parent: &mut Key) -> PluginStatus {
        PluginStatus::Success
    }

    fn check_conf(&self, config: &mut KeySet, error_key: &mut Key) -> PluginStatus {
        match validate(config, &REQUIREMENTS) {
            Ok(_) => PluginStatus::NoUpdate,
            Err(e) => e.report(error_key, ERROR_CRYPTO_CONFIG, self.name),
        }
    }
}

// The crypto_ring module build exports its own symbol from this crate's code
#[cfg(all(feature = "module-export", not(feature = "ring-module")))]
kdb_core::export_plugin!(CryptoPlugin::new());
