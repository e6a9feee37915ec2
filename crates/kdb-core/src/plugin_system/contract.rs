//! Plugin contracts: the self-description a plugin publishes below
//! `system:/elektra/modules/<name>` when `get` is called with exactly that
//! parent key.
//!
//! [`build_contract`] produces the tree, [`Contract::from_keyset`] reads it back.
use semver::Version;

use crate::kernel::constants::MODULES_ROOT;
use crate::key::{FunctionRef, Key, KeyName, KeySet};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::{Operation, Operations, Plugin, PluginStatus};

/// `system:/elektra/modules/<plugin>`.
pub fn contract_name(plugin: &str) -> KeyName {
    modules_root().child(plugin)
}

/// `system:/elektra/modules`.
pub fn modules_root() -> KeyName {
    // MODULES_ROOT is a well-formed constant
    KeyName::new(MODULES_ROOT).unwrap_or_else(|_| KeyName::root(crate::key::Namespace::System))
}

/// True if `parent` asks `plugin` for its contract rather than for data.
pub fn is_contract_request(plugin: &str, parent: &Key) -> bool {
    *parent.name() == contract_name(plugin)
}

/// Builds the contract tree of `plugin`.
pub fn build_contract<P: Plugin + ?Sized>(plugin: &P) -> KeySet {
    let root = contract_name(plugin.name());
    let exports = root.child("exports");

    let mut contract = KeySet::new();
    contract.append(Key::from_name(root.clone()).with_string(plugin.description()));
    contract.append(Key::from_name(exports.clone()));
    for op in plugin.operations().iter() {
        contract.append(
            Key::from_name(exports.child(op.export_name())).with_function(FunctionRef::Operation(op)),
        );
    }
    contract.append(Key::from_name(root.join("infos/version")).with_string(plugin.version()));
    contract
}

/// Answers a contract request, if `parent` is one.
///
/// Plugins call this first thing in `get`; `None` means data mode.
pub fn answer_contract_request<P: Plugin + ?Sized>(
    plugin: &P,
    returned: &mut KeySet,
    parent: &Key,
) -> Option<PluginStatus> {
    if !is_contract_request(plugin.name(), parent) {
        return None;
    }
    log::debug!("Publishing contract of plugin '{}'", plugin.name());
    returned.append_all(&plugin.contract());
    Some(PluginStatus::Success)
}

/// A contract read back from a key set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub plugin: String,
    pub description: String,
    pub operations: Operations,
    pub version: Version,
}

impl Contract {
    /// Parses the contract of `plugin` out of `ks`.
    pub fn from_keyset(plugin: &str, ks: &KeySet) -> Result<Self, PluginSystemError> {
        let invalid = |message: &str| PluginSystemError::InvalidContract {
            plugin: plugin.to_string(),
            message: message.to_string(),
        };

        let root = contract_name(plugin);
        let description = ks
            .lookup(&root)
            .ok_or_else(|| invalid("missing contract root"))?
            .string()
            .unwrap_or_default()
            .to_string();

        let exports = root.child("exports");
        if ks.lookup(&exports.child(Operation::Get.export_name())).is_none() {
            return Err(invalid("get is not exported"));
        }
        let operations = ks
            .below(&exports)
            .filter_map(|key| match key.function() {
                Some(FunctionRef::Operation(op)) if key.name().parent().as_ref() == Some(&exports) => Some(op),
                _ => None,
            })
            .collect::<Operations>();

        let version_str = ks
            .lookup(&root.join("infos/version"))
            .and_then(Key::string)
            .ok_or_else(|| invalid("missing infos/version"))?;
        let version = Version::parse(version_str)?;

        Ok(Self {
            plugin: plugin.to_string(),
            description,
            operations,
            version,
        })
    }

    pub fn exports(&self, op: Operation) -> bool {
        self.operations.contains(op)
    }
}
