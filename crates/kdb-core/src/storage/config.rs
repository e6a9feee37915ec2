use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
#[cfg(feature = "yaml-config")]
use serde_yaml;
#[cfg(feature = "toml-config")]
use toml;

use crate::kernel::constants::DEFAULT_LIBRARY_PREFIX;
use crate::kernel::error::{Error, Result};
use crate::key::{Key, KeyName, KeySet, KeyValue};
use crate::plugin_system::loader::DynamicLoader;
use crate::plugin_system::registry::ModuleRegistry;
use crate::plugin_system::symbols::ExportedSymbol;
use crate::storage::error::StorageSystemError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Parse a document in this format
    pub fn parse(&self, data: &str) -> Result<Value> {
        let de_err = |message: String| {
            Error::from(StorageSystemError::DeserializationError {
                format: self.extension().to_string(),
                message,
            })
        };
        match self {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| de_err(e.to_string())),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| de_err(e.to_string())),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| de_err(e.to_string())),
        }
    }

    /// Serialize a document in this format
    pub fn serialize<T: Serialize>(&self, value: &T) -> Result<String> {
        let ser_err = |message: String| {
            Error::from(StorageSystemError::SerializationError {
                format: self.extension().to_string(),
                message,
            })
        };
        match self {
            ConfigFormat::Json => serde_json::to_string_pretty(value).map_err(|e| ser_err(e.to_string())),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(value).map_err(|e| ser_err(e.to_string())),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(value).map_err(|e| ser_err(e.to_string())),
        }
    }
}

fn read_document(path: &Path) -> Result<(String, ConfigFormat)> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| StorageSystemError::UnsupportedConfigFormat {
        path: path.to_path_buf(),
    })?;
    let data = std::fs::read_to_string(path).map_err(|e| Error::io(e, "read_config", path.to_path_buf()))?;
    Ok((data, format))
}

// --- Documents <-> key sets ---

/// Name of array element `index`: `#0` .. `#9`, `#_10` .. `#_99`, `#__100` ...
pub fn array_index(index: usize) -> String {
    let digits = index.to_string();
    format!("#{}{}", "_".repeat(digits.len() - 1), digits)
}

fn is_byte_array(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(|v| v.as_u64().is_some_and(|n| n <= u8::MAX as u64))
}

/// Converts a nested document into keys below `parent`.
///
/// Objects become hierarchy, scalars become string values (booleans as `1`/`0`),
/// non-empty arrays of byte-sized integers become binary values and any other
/// array becomes `#0`, `#1`, ... children.
pub fn document_to_keyset(parent: &KeyName, document: &Value) -> KeySet {
    let mut ks = KeySet::new();
    insert_value(&mut ks, parent.clone(), document);
    ks
}

fn insert_value(ks: &mut KeySet, name: KeyName, value: &Value) {
    match value {
        Value::Object(map) => {
            for (child, child_value) in map {
                insert_value(ks, name.join(child), child_value);
            }
        }
        Value::Array(items) if is_byte_array(items) => {
            let bytes: Vec<u8> = items.iter().filter_map(|v| v.as_u64()).map(|n| n as u8).collect();
            ks.append(Key::from_name(name).with_binary(bytes));
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                insert_value(ks, name.child(&array_index(index)), item);
            }
        }
        Value::Null => {
            ks.append(Key::from_name(name));
        }
        Value::Bool(b) => {
            ks.append(Key::from_name(name).with_string(if *b { "1" } else { "0" }));
        }
        Value::Number(n) => {
            ks.append(Key::from_name(name).with_string(n.to_string()));
        }
        Value::String(s) => {
            ks.append(Key::from_name(name).with_string(s.clone()));
        }
    }
}

/// Converts the keys below `parent` back into a nested document.
///
/// Binary values become byte arrays; function references are skipped. A key
/// with valued children is represented by its children only, `parent` included.
pub fn keyset_to_document(parent: &KeyName, ks: &KeySet) -> Value {
    let mut root = Value::Object(Map::new());
    for key in ks.below(parent) {
        let Some(path) = key.name().relative_to(parent) else { continue };
        let Some(leaf) = document_leaf(key.value()) else { continue };
        if path.is_empty() {
            let has_children = ks
                .below(parent)
                .any(|other| other.name() != parent && document_leaf(other.value()).is_some());
            if has_children {
                continue;
            }
            return leaf;
        }
        let mut node = &mut root;
        for part in &path[..path.len() - 1] {
            let map = ensure_object(node);
            node = map.entry(part.clone()).or_insert_with(|| Value::Object(Map::new()));
        }
        ensure_object(node).insert(path[path.len() - 1].clone(), leaf);
    }
    root
}

fn document_leaf(value: &KeyValue) -> Option<Value> {
    match value {
        KeyValue::String(s) => Some(Value::String(s.clone())),
        KeyValue::Binary(b) => Some(Value::Array(b.iter().map(|byte| Value::from(*byte)).collect())),
        KeyValue::None | KeyValue::Function(_) => None,
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}

/// Loads a plugin configuration file into keys below `parent`.
pub fn load_plugin_config<P: AsRef<Path>>(path: P, parent: &KeyName) -> Result<KeySet> {
    let (data, format) = read_document(path.as_ref())?;
    let document = format.parse(&data)?;
    log::debug!("Loaded plugin configuration from {}", path.as_ref().display());
    Ok(document_to_keyset(parent, &document))
}

// --- Registry settings ---

/// Which loader a registry resolves modules with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    /// Compiled-in symbol table
    #[default]
    Static,
    /// Shared libraries from `module_dirs`
    Dynamic,
}

/// Settings for building a [`ModuleRegistry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub loader: LoaderKind,
    pub module_dirs: Vec<PathBuf>,
    pub library_prefix: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            loader: LoaderKind::Static,
            module_dirs: Vec::new(),
            library_prefix: DEFAULT_LIBRARY_PREFIX.to_string(),
        }
    }
}

impl RegistryConfig {
    /// Reads registry settings from a JSON/YAML/TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let (data, format) = read_document(path.as_ref())?;
        Self::from_str_with_format(&data, format)
    }

    pub fn from_str_with_format(data: &str, format: ConfigFormat) -> Result<Self> {
        let document = format.parse(data)?;
        serde_json::from_value(document).map_err(|e| {
            Error::from(StorageSystemError::DeserializationError {
                format: format.extension().to_string(),
                message: e.to_string(),
            })
        })
    }

    /// Builds a registry; `table` is used by the static loader.
    pub fn build_registry(&self, table: &'static [ExportedSymbol]) -> ModuleRegistry {
        match self.loader {
            LoaderKind::Static => ModuleRegistry::with_static_symbols(table),
            LoaderKind::Dynamic => {
                let mut loader = DynamicLoader::new().with_library_prefix(self.library_prefix.clone());
                for dir in &self.module_dirs {
                    loader.add_module_dir(dir);
                }
                ModuleRegistry::with_loader(Box::new(loader))
            }
        }
    }
}
