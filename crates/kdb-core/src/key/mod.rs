//! # KDB Core Keys
//!
//! The configuration data model the plugin system works on: [`Key`]s with a
//! hierarchical [`KeyName`], a typed [`KeyValue`] and string metadata, and the
//! ordered [`KeySet`] that holds them.
//!
//! Values are a closed union. Besides text and opaque bytes a key can hold a
//! [`FunctionRef`], which is how the module cache stores factories and how
//! contracts name the operations a plugin exports.
pub mod error;
pub mod keyset;
pub mod name;

pub use error::KeyError;
pub use keyset::KeySet;
pub use name::{KeyName, Namespace};

use std::collections::BTreeMap;
use std::fmt;

use crate::plugin_system::symbols::PluginFactory;
use crate::plugin_system::traits::Operation;

/// Capability reference stored as a key value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionRef {
    /// A module's plugin factory (module cache entries)
    Factory(PluginFactory),
    /// A lifecycle operation a plugin exports (contract entries)
    Operation(Operation),
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionRef::Factory(factory) => write!(f, "factory@{:p}", factory.as_ptr()),
            FunctionRef::Operation(op) => write!(f, "fn({})", op),
        }
    }
}

/// Value of a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeyValue {
    #[default]
    None,
    String(String),
    Binary(Vec<u8>),
    Function(FunctionRef),
}

impl KeyValue {
    /// Size of the payload in bytes; function references have no payload.
    pub fn len(&self) -> usize {
        match self {
            KeyValue::None | KeyValue::Function(_) => 0,
            KeyValue::String(s) => s.len(),
            KeyValue::Binary(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    name: KeyName,
    value: KeyValue,
    meta: BTreeMap<String, String>,
}

impl Key {
    /// Creates a key without value from a textual name.
    pub fn new(name: &str) -> Result<Self, KeyError> {
        Ok(Self::from_name(KeyName::new(name)?))
    }

    pub fn from_name(name: KeyName) -> Self {
        Self {
            name,
            value: KeyValue::None,
            meta: BTreeMap::new(),
        }
    }

    pub fn with_string(mut self, value: impl Into<String>) -> Self {
        self.value = KeyValue::String(value.into());
        self
    }

    pub fn with_binary(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.value = KeyValue::Binary(value.into());
        self
    }

    pub fn with_function(mut self, function: FunctionRef) -> Self {
        self.value = KeyValue::Function(function);
        self
    }

    pub fn with_meta(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_meta(name, value);
        self
    }

    pub fn name(&self) -> &KeyName {
        &self.name
    }

    pub fn value(&self) -> &KeyValue {
        &self.value
    }

    pub fn set_value(&mut self, value: KeyValue) {
        self.value = value;
    }

    /// Text value, if the key holds one.
    pub fn string(&self) -> Option<&str> {
        match &self.value {
            KeyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Binary value, if the key holds one.
    pub fn binary(&self) -> Option<&[u8]> {
        match &self.value {
            KeyValue::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn function(&self) -> Option<FunctionRef> {
        match self.value {
            KeyValue::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn set_string(&mut self, value: impl Into<String>) {
        self.value = KeyValue::String(value.into());
    }

    pub fn set_binary(&mut self, value: impl Into<Vec<u8>>) {
        self.value = KeyValue::Binary(value.into());
    }

    pub fn meta(&self, name: &str) -> Option<&str> {
        self.meta.get(name).map(String::as_str)
    }

    pub fn set_meta(&mut self, name: &str, value: impl Into<String>) {
        self.meta.insert(name.to_string(), value.into());
    }

    pub fn remove_meta(&mut self, name: &str) -> Option<String> {
        self.meta.remove(name)
    }

    pub fn meta_iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.meta.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Records an error on this key (`error/number`, `error/reason`, `error/module`).
    ///
    /// A later error replaces an earlier one.
    pub fn set_error(&mut self, number: u32, reason: impl Into<String>, module: &str) {
        self.set_meta("error", "number reason module");
        self.set_meta("error/number", number.to_string());
        self.set_meta("error/reason", reason);
        self.set_meta("error/module", module);
    }

    /// Appends a warning (`warnings/#NN/...`), keeping earlier ones.
    pub fn add_warning(&mut self, number: u32, reason: impl Into<String>, module: &str) {
        let index = self
            .meta("warnings")
            .and_then(|w| w.parse::<usize>().ok())
            .map_or(0, |last| last + 1);
        let prefix = format!("warnings/#{:02}", index);
        self.set_meta("warnings", format!("{:02}", index));
        self.set_meta(&format!("{}/number", prefix), number.to_string());
        self.set_meta(&format!("{}/reason", prefix), reason);
        self.set_meta(&format!("{}/module", prefix), module);
    }

    pub fn error_number(&self) -> Option<u32> {
        self.meta("error/number").and_then(|n| n.parse().ok())
    }

    pub fn error_reason(&self) -> Option<&str> {
        self.meta("error/reason")
    }

    pub fn clear_error(&mut self) {
        self.meta.retain(|k, _| k != "error" && !k.starts_with("error/"));
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            KeyValue::None => write!(f, "{}", self.name),
            KeyValue::String(s) => write!(f, "{} = {}", self.name, s),
            KeyValue::Binary(b) => write!(f, "{} = <{} bytes>", self.name, b.len()),
            KeyValue::Function(func) => write!(f, "{} = {}", self.name, func),
        }
    }
}
