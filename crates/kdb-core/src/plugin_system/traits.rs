use std::fmt;

use crate::key::{Key, KeySet};

/// One entry point of the lifecycle contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    Open,
    Close,
    Get,
    Set,
    Commit,
    Error,
    CheckConf,
}

impl Operation {
    /// Every operation, in contract export order.
    pub const ALL: [Operation; 7] = [
        Operation::Open,
        Operation::Close,
        Operation::Get,
        Operation::Set,
        Operation::Commit,
        Operation::Error,
        Operation::CheckConf,
    ];

    /// Name used below `exports/` in a contract.
    pub fn export_name(&self) -> &'static str {
        match self {
            Operation::Open => "open",
            Operation::Close => "close",
            Operation::Get => "get",
            Operation::Set => "set",
            Operation::Commit => "commit",
            Operation::Error => "error",
            Operation::CheckConf => "checkconf",
        }
    }

    pub fn from_export_name(name: &str) -> Option<Self> {
        Operation::ALL.into_iter().find(|op| op.export_name() == name)
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.export_name())
    }
}

/// Set of operations a plugin supports. `get` is always part of it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operations(u8);

impl Operations {
    /// The minimal capability set.
    pub const GET_ONLY: Operations = Operations(Operation::Get.bit());

    /// The six lifecycle operations, without `checkconf`.
    pub const LIFECYCLE: Operations = Operations(
        Operation::Open.bit()
            | Operation::Close.bit()
            | Operation::Get.bit()
            | Operation::Set.bit()
            | Operation::Commit.bit()
            | Operation::Error.bit(),
    );

    pub const fn with(self, op: Operation) -> Operations {
        Operations(self.0 | op.bit())
    }

    /// Removes `op`; `get` cannot be removed.
    pub const fn without(self, op: Operation) -> Operations {
        if matches!(op, Operation::Get) {
            return self;
        }
        Operations(self.0 & !op.bit())
    }

    pub const fn contains(&self, op: Operation) -> bool {
        self.0 & op.bit() != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL.into_iter().filter(|op| self.contains(*op))
    }
}

impl FromIterator<Operation> for Operations {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        iter.into_iter().fold(Operations::GET_ONLY, Operations::with)
    }
}

impl fmt::Debug for Operations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Error carried by [`PluginStatus::Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleError {
    pub code: u32,
    pub message: String,
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error {}: {}", self.code, self.message)
    }
}

/// Outcome of a lifecycle call.
///
/// Three-valued: callers must not collapse `NoUpdate` into success or failure,
/// chain logic short-circuits on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginStatus {
    /// Work done, data or configuration changed as requested
    Success,
    /// Accepted, nothing changed
    NoUpdate,
    /// Failed; the parent/error key carries the details too
    Error(LifecycleError),
}

impl PluginStatus {
    pub const SUCCESS_CODE: i32 = 1;
    pub const NO_UPDATE_CODE: i32 = 0;
    pub const ERROR_CODE: i32 = -1;

    /// Records the error on `key` and returns the matching `Error` status.
    pub fn error(key: &mut Key, code: u32, reason: impl Into<String>, module: &str) -> Self {
        let message = reason.into();
        key.set_error(code, message.clone(), module);
        PluginStatus::Error(LifecycleError { code, message })
    }

    /// Integer form: `1` success, `0` no update, `-1` error.
    pub fn code(&self) -> i32 {
        match self {
            PluginStatus::Success => Self::SUCCESS_CODE,
            PluginStatus::NoUpdate => Self::NO_UPDATE_CODE,
            PluginStatus::Error(_) => Self::ERROR_CODE,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PluginStatus::Success)
    }

    pub fn is_no_update(&self) -> bool {
        matches!(self, PluginStatus::NoUpdate)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PluginStatus::Error(_))
    }

    /// `Success` if `changed`, `NoUpdate` otherwise.
    pub fn changed(changed: bool) -> Self {
        if changed {
            PluginStatus::Success
        } else {
            PluginStatus::NoUpdate
        }
    }
}

impl fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginStatus::Success => f.write_str("success"),
            PluginStatus::NoUpdate => f.write_str("no update"),
            PluginStatus::Error(e) => write!(f, "{}", e),
        }
    }
}

/// Lifecycle contract every storage or filter backend implements.
///
/// A factory produces one boxed plugin per call; the plugin never owns its
/// configuration, the [`PluginInstance`](crate::plugin_system::PluginInstance)
/// does and passes it into `open`, `get`, `set`, `commit` and `error`.
///
/// `get` must answer contract requests (parent key named
/// `system:/elektra/modules/<name>`) with [`contract`](Plugin::contract), see
/// [`contract::answer_contract_request`](crate::plugin_system::contract::answer_contract_request).
/// Optional operations are advertised through [`operations`](Plugin::operations);
/// the instance never dispatches an operation the plugin does not list.
pub trait Plugin: Send {
    /// The name of the plugin
    fn name(&self) -> &str;

    /// The version of the plugin, semver formatted
    fn version(&self) -> &str;

    /// Human readable description, published as the contract root value
    fn description(&self) -> &str;

    /// Operations this plugin implements
    fn operations(&self) -> Operations {
        Operations::GET_ONLY
    }

    /// Validate `config` and acquire resources.
    fn open(&mut self, _config: &KeySet, _error_key: &mut Key) -> PluginStatus {
        PluginStatus::Success
    }

    /// Release what `open` acquired. Must be callable right after `open`.
    fn close(&mut self, _error_key: &mut Key) -> PluginStatus {
        PluginStatus::Success
    }

    /// Fetch data below `parent` into `returned`, or answer a contract request.
    fn get(&mut self, config: &KeySet, returned: &mut KeySet, parent: &mut Key) -> PluginStatus;

    /// Write `returned` below `parent`.
    fn set(&mut self, _config: &KeySet, _returned: &mut KeySet, _parent: &mut Key) -> PluginStatus {
        PluginStatus::NoUpdate
    }

    /// Make a previous `set` durable.
    fn commit(&mut self, _config: &KeySet, _returned: &mut KeySet, _parent: &mut Key) -> PluginStatus {
        PluginStatus::Success
    }

    /// Roll back after a failed `set` or `commit` in the chain.
    fn error(&mut self, _config: &KeySet, _returned: &mut KeySet, _parent: &mut Key) -> PluginStatus {
        PluginStatus::Success
    }

    /// Check (and possibly complete) a configuration before it is bound.
    ///
    /// `NoUpdate` means valid and untouched, `Success` valid after changes.
    fn check_conf(&self, _config: &mut KeySet, _error_key: &mut Key) -> PluginStatus {
        PluginStatus::NoUpdate
    }

    /// Self-description published under the contract path.
    fn contract(&self) -> KeySet {
        crate::plugin_system::contract::build_contract(self)
    }
}
