use std::fmt;

use crate::key::{Key, KeySet};
use crate::plugin_system::traits::{Operation, Operations, Plugin, PluginStatus};

/// Where an instance is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Built and configured, never opened (or last open failed)
    Created,
    Open,
    Closed,
}

/// A live plugin bound to its own configuration.
///
/// Produced by one factory call; owns the plugin object and the configuration
/// tree until dropped. Calls to optional operations the plugin does not
/// implement return [`PluginStatus::NoUpdate`] without reaching the plugin.
pub struct PluginInstance {
    module: String,
    plugin: Box<dyn Plugin>,
    config: KeySet,
    operations: Operations,
    state: LifecycleState,
}

impl PluginInstance {
    /// Binds `config` to a freshly built plugin.
    pub fn new(module: &str, plugin: Box<dyn Plugin>, config: KeySet) -> Self {
        // Get is mandatory whatever the plugin claims.
        let operations = plugin.operations().with(Operation::Get);
        Self {
            module: module.to_string(),
            plugin,
            config,
            operations,
            state: LifecycleState::Created,
        }
    }

    /// Declared plugin name.
    pub fn name(&self) -> &str {
        self.plugin.name()
    }

    /// Module name the instance was resolved from.
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn version(&self) -> &str {
        self.plugin.version()
    }

    pub fn config(&self) -> &KeySet {
        &self.config
    }

    pub fn operations(&self) -> Operations {
        self.operations
    }

    pub fn supports(&self, op: Operation) -> bool {
        self.operations.contains(op)
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn open(&mut self, error_key: &mut Key) -> PluginStatus {
        if !self.supports(Operation::Open) {
            self.state = LifecycleState::Open;
            return PluginStatus::NoUpdate;
        }
        log::debug!("Opening plugin '{}'", self.name());
        let status = self.plugin.open(&self.config, error_key);
        self.state = if status.is_error() {
            log::warn!("Plugin '{}' failed to open: {}", self.name(), status);
            LifecycleState::Created
        } else {
            LifecycleState::Open
        };
        status
    }

    pub fn close(&mut self, error_key: &mut Key) -> PluginStatus {
        self.state = LifecycleState::Closed;
        if !self.supports(Operation::Close) {
            return PluginStatus::NoUpdate;
        }
        log::debug!("Closing plugin '{}'", self.name());
        self.plugin.close(error_key)
    }

    pub fn get(&mut self, returned: &mut KeySet, parent: &mut Key) -> PluginStatus {
        let status = self.plugin.get(&self.config, returned, parent);
        self.trace(Operation::Get, parent, &status);
        status
    }

    pub fn set(&mut self, returned: &mut KeySet, parent: &mut Key) -> PluginStatus {
        if !self.supports(Operation::Set) {
            return PluginStatus::NoUpdate;
        }
        let status = self.plugin.set(&self.config, returned, parent);
        self.trace(Operation::Set, parent, &status);
        status
    }

    pub fn commit(&mut self, returned: &mut KeySet, parent: &mut Key) -> PluginStatus {
        if !self.supports(Operation::Commit) {
            return PluginStatus::NoUpdate;
        }
        let status = self.plugin.commit(&self.config, returned, parent);
        self.trace(Operation::Commit, parent, &status);
        status
    }

    pub fn error(&mut self, returned: &mut KeySet, parent: &mut Key) -> PluginStatus {
        if !self.supports(Operation::Error) {
            return PluginStatus::NoUpdate;
        }
        let status = self.plugin.error(&self.config, returned, parent);
        self.trace(Operation::Error, parent, &status);
        status
    }

    /// Runs the plugin's configuration check on a copy of the bound
    /// configuration; the bound tree itself is never modified.
    pub fn check_conf(&self, error_key: &mut Key) -> PluginStatus {
        if !self.supports(Operation::CheckConf) {
            return PluginStatus::NoUpdate;
        }
        let mut config = self.config.clone();
        self.plugin.check_conf(&mut config, error_key)
    }

    fn trace(&self, op: Operation, parent: &Key, status: &PluginStatus) {
        log::debug!("{}::{}({}) -> {}", self.name(), op, parent.name(), status);
    }
}

impl Drop for PluginInstance {
    fn drop(&mut self) {
        if self.state == LifecycleState::Open && self.supports(Operation::Close) {
            log::debug!("Plugin '{}' dropped while open, closing", self.name());
            let mut error_key = Key::from_name(crate::plugin_system::contract::contract_name(self.plugin.name()));
            let status = self.plugin.close(&mut error_key);
            if status.is_error() {
                log::warn!("Closing plugin '{}' on drop failed: {}", self.plugin.name(), status);
            }
        }
    }
}

impl fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("name", &self.plugin.name())
            .field("module", &self.module)
            .field("operations", &self.operations)
            .field("state", &self.state)
            .field("config_keys", &self.config.len())
            .finish()
    }
}
