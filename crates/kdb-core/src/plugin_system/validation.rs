//! Declarative checks of the configuration bound to a plugin instance.
//!
//! Each [`ConfigRequirement`] is checked on its own against the bound
//! [`KeySet`] with a cascading lookup. A binary value of the wrong length
//! fails exactly like a missing key.
use crate::key::{Key, KeyName, KeySet};
use crate::plugin_system::traits::PluginStatus;

/// Shape a required value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredValue {
    /// Binary value of exactly this many bytes
    BinaryOfLength(usize),
    /// Non-empty string value
    String,
}

/// One required configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigRequirement {
    pub path: &'static str,
    pub value: RequiredValue,
}

impl ConfigRequirement {
    pub const fn binary(path: &'static str, len: usize) -> Self {
        Self {
            path,
            value: RequiredValue::BinaryOfLength(len),
        }
    }

    pub const fn string(path: &'static str) -> Self {
        Self {
            path,
            value: RequiredValue::String,
        }
    }

    /// Checks this requirement against `config`, returning the matching key.
    pub fn check<'a>(&self, config: &'a KeySet) -> Result<&'a Key, ValidationError> {
        let name = KeyName::new(self.path).map_err(|_| self.fail(Problem::Missing))?;
        let key = config
            .lookup_cascading(&name)
            .ok_or_else(|| self.fail(Problem::Missing))?;

        match self.value {
            RequiredValue::BinaryOfLength(expected) => match key.binary() {
                Some(bytes) if bytes.len() == expected => Ok(key),
                Some(bytes) => Err(self.fail(Problem::WrongLength {
                    expected,
                    actual: bytes.len(),
                })),
                None => Err(self.fail(Problem::NotBinary)),
            },
            RequiredValue::String => match key.string() {
                Some(s) if !s.is_empty() => Ok(key),
                _ => Err(self.fail(Problem::Missing)),
            },
        }
    }

    fn fail(&self, problem: Problem) -> ValidationError {
        ValidationError { path: self.path, problem }
    }
}

/// Why a requirement failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Problem {
    #[error("is missing")]
    Missing,
    #[error("has {actual} bytes, expected exactly {expected}")]
    WrongLength { expected: usize, actual: usize },
    #[error("must hold a binary value")]
    NotBinary,
}

/// First failed requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("configuration key {path} {problem}")]
pub struct ValidationError {
    pub path: &'static str,
    pub problem: Problem,
}

impl ValidationError {
    /// Writes the failure to `key` and returns the `Error` status.
    pub fn report(&self, key: &mut Key, code: u32, module: &str) -> PluginStatus {
        PluginStatus::error(key, code, self.to_string(), module)
    }
}

/// Checks all `requirements` in order and returns the matching keys in the same order.
pub fn validate<'a>(config: &'a KeySet, requirements: &[ConfigRequirement]) -> Result<Vec<&'a Key>, ValidationError> {
    requirements.iter().map(|req| req.check(config)).collect()
}
