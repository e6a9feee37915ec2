use std::fmt;

use crate::key::{FunctionRef, Key, KeyName, KeySet};
use crate::plugin_system::contract::modules_root;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::instance::PluginInstance;
use crate::plugin_system::loader::{ModuleLoader, StaticLoader, is_module_name};
use crate::plugin_system::symbols::{ExportedSymbol, PluginFactory};
use crate::plugin_system::traits::PluginStatus;
use crate::kernel::constants::FACTORY_SYMBOL;

/// Resolves module names to plugin factories.
///
/// Resolved factories are cached in a [`KeySet`] below
/// `system:/elektra/modules`, one key per module holding a
/// [`FunctionRef::Factory`]. A cached module is never looked up in the loader
/// again; failed lookups are not cached. There is no internal locking: share
/// a registry between threads only behind your own mutex.
pub struct ModuleRegistry {
    /// Module cache
    modules: KeySet,
    root: KeyName,
    loader: Box<dyn ModuleLoader>,
    active: bool,
}

impl ModuleRegistry {
    /// Create a registry over `loader`.
    pub fn with_loader(loader: Box<dyn ModuleLoader>) -> Self {
        let mut registry = Self {
            modules: KeySet::new(),
            root: modules_root(),
            loader,
            active: false,
        };
        registry.initialize();
        registry
    }

    /// Create a registry over a compiled-in symbol table.
    pub fn with_static_symbols(table: &'static [ExportedSymbol]) -> Self {
        Self::with_loader(Box::new(StaticLoader::new(table)))
    }

    /// Creates the cache root. Constructors call this; after [`shutdown`](Self::shutdown)
    /// it brings the registry back with an empty cache. No-op while active.
    pub fn initialize(&mut self) {
        if self.active {
            return;
        }
        self.modules.append(Key::from_name(self.root.clone()));
        self.active = true;
        log::debug!("Module registry initialized at {}", self.root);
    }

    /// Resolves `name` to its factory, loading the module on first use.
    pub fn resolve(&mut self, name: &str) -> Result<PluginFactory, PluginSystemError> {
        if !self.active {
            return Err(PluginSystemError::RegistryShutDown);
        }
        if !is_module_name(name) {
            return Err(PluginSystemError::ModuleNotFound { module: name.to_string() });
        }

        let cache_name = self.root.child(name);
        if let Some(FunctionRef::Factory(factory)) = self.modules.lookup(&cache_name).and_then(Key::function) {
            log::debug!("Module '{}' resolved from cache", name);
            return Ok(factory);
        }

        let module = self.loader.load_module(name)?.ok_or_else(|| {
            log::warn!("Did not find module {}", name);
            PluginSystemError::ModuleNotFound { module: name.to_string() }
        })?;

        let factory = module.symbol(FACTORY_SYMBOL).ok_or_else(|| {
            log::warn!("Module '{}' has no symbol {}", name, FACTORY_SYMBOL);
            PluginSystemError::MissingFactorySymbol { module: name.to_string() }
        })?;

        self.modules
            .append(Key::from_name(cache_name).with_function(FunctionRef::Factory(factory)));
        log::debug!("Module '{}' loaded and cached", name);
        Ok(factory)
    }

    /// Like [`resolve`](Self::resolve), but reports failures on `error_key`
    /// (`error/number` 70 or 71) and returns no factory.
    pub fn resolve_or_report(&mut self, name: &str, error_key: &mut Key) -> Option<PluginFactory> {
        match self.resolve(name) {
            Ok(factory) => Some(factory),
            Err(e) => {
                let code = e.code().unwrap_or(crate::kernel::constants::ERROR_MODULE_NOT_FOUND);
                error_key.set_error(code, e.to_string(), name);
                None
            }
        }
    }

    /// Resolves `name`, builds a plugin and binds `config` to it. Nothing is opened.
    pub fn instantiate(&mut self, name: &str, config: KeySet) -> Result<PluginInstance, PluginSystemError> {
        let factory = self.resolve(name)?;
        Ok(PluginInstance::new(name, factory.create(), config))
    }

    /// Instantiates `name` and opens it; an `Error` from open fails the whole call.
    pub fn open_plugin(
        &mut self,
        name: &str,
        config: KeySet,
        error_key: &mut Key,
    ) -> Result<PluginInstance, PluginSystemError> {
        let mut instance = self.instantiate(name, config)?;
        match instance.open(error_key) {
            PluginStatus::Error(e) => Err(PluginSystemError::OpenFailed {
                plugin: instance.name().to_string(),
                code: e.code,
                message: e.message,
            }),
            _ => Ok(instance),
        }
    }

    /// Runs the configuration check of module `name` against `config`.
    pub fn check_conf(
        &mut self,
        name: &str,
        config: &mut KeySet,
        error_key: &mut Key,
    ) -> Result<PluginStatus, PluginSystemError> {
        let plugin = self.resolve(name)?.create();
        if !plugin.operations().contains(crate::plugin_system::traits::Operation::CheckConf) {
            return Ok(PluginStatus::NoUpdate);
        }
        Ok(plugin.check_conf(config, error_key))
    }

    /// The cache tree, for inspection.
    pub fn cache(&self) -> &KeySet {
        &self.modules
    }

    /// Names of the cached modules, in key order.
    pub fn cached_modules(&self) -> Vec<String> {
        self.modules
            .below(&self.root)
            .filter(|key| key.name().parent().as_ref() == Some(&self.root))
            .filter_map(|key| key.name().base_name().map(str::to_string))
            .collect()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Drops every cached factory. Factories handed out before stay callable,
    /// but this registry resolves nothing afterwards.
    pub fn shutdown(&mut self) {
        log::debug!("Module registry shutting down, {} cached module(s)", self.cached_modules().len());
        self.modules.clear();
        self.active = false;
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("root", &self.root.to_string())
            .field("modules", &self.cached_modules())
            .field("active", &self.active)
            .finish()
    }
}
