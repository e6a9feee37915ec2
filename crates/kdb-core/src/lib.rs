pub mod kernel;
pub mod key;
pub mod plugin_system;
pub mod storage;

// Re-export key public types/traits for the facade crate and plugins
pub use kernel::error::{Error as KernelError, Result};
pub use key::{FunctionRef, Key, KeyName, KeySet, KeyValue, Namespace};
pub use plugin_system::{
    ModuleRegistry, Operation, Operations, Plugin, PluginFactory, PluginInstance, PluginStatus,
};
