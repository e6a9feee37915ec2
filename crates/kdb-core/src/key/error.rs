//! Errors raised while parsing or manipulating key names.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("Invalid key name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Unknown namespace '{namespace}' in key name '{name}'")]
    UnknownNamespace { namespace: String, name: String },
}
