//! Exported symbol tables and plugin factories.
//!
//! A symbol table is one flat slice covering many modules:
//!
//! ```text
//! ("crypto", None)                           <- module marker
//! ("elektraPluginSymbol", Some(factory))     <- crypto's symbols
//! ("xfconf", None)                           <- next marker
//! ("elektraPluginSymbol", Some(factory))
//! ```
//!
//! An entry without a function is always read as a marker, so a module
//! cannot export a symbol that has no function.
use std::fmt;

use crate::plugin_system::traits::Plugin;

/// Signature of a module's `elektraPluginSymbol`.
pub type FactoryFn = fn() -> Box<dyn Plugin>;

/// Handle to a module's factory. Equality is function identity.
#[derive(Clone, Copy)]
pub struct PluginFactory(FactoryFn);

impl PluginFactory {
    pub const fn new(factory: FactoryFn) -> Self {
        Self(factory)
    }

    /// Builds a fresh, unconfigured plugin.
    pub fn create(&self) -> Box<dyn Plugin> {
        (self.0)()
    }

    /// Address of the factory function, for diagnostics.
    pub fn as_ptr(&self) -> *const () {
        self.0 as *const ()
    }
}

impl PartialEq for PluginFactory {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::fn_addr_eq(self.0, other.0)
    }
}

impl Eq for PluginFactory {}

impl fmt::Debug for PluginFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PluginFactory({:p})", self.as_ptr())
    }
}

/// One slot of a symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportedSymbol {
    pub name: &'static str,
    pub function: Option<PluginFactory>,
}

impl ExportedSymbol {
    /// Start of the module called `name`.
    pub const fn marker(name: &'static str) -> Self {
        Self { name, function: None }
    }

    pub const fn function(name: &'static str, factory: FactoryFn) -> Self {
        Self {
            name,
            function: Some(PluginFactory::new(factory)),
        }
    }

    pub fn is_marker(&self) -> bool {
        self.function.is_none()
    }
}

/// Exports `elektraPluginSymbol` from a plugin crate built as a `cdylib`.
///
/// The symbol uses the Rust ABI, so host and module must be built by the same
/// compiler against the same `kdb-core`.
#[macro_export]
macro_rules! export_plugin {
    ($constructor:expr) => {
        #[unsafe(no_mangle)]
        #[allow(non_snake_case)]
        pub fn elektraPluginSymbol() -> ::std::boxed::Box<dyn $crate::plugin_system::Plugin> {
            ::std::boxed::Box::new($constructor)
        }
    };
}
