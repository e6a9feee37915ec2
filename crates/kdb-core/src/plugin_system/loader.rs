use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use crate::kernel::constants::{DEFAULT_LIBRARY_PREFIX, FACTORY_SYMBOL};
use crate::plugin_system::error::{PluginSystemError, PluginSystemErrorSource};
use crate::plugin_system::symbols::{ExportedSymbol, FactoryFn, PluginFactory};

/// Symbols of one loaded module.
pub trait ModuleSymbols {
    /// Looks up an exported symbol by exact name.
    fn symbol(&self, name: &str) -> Option<PluginFactory>;
}

/// Source of modules for the [`ModuleRegistry`](crate::plugin_system::ModuleRegistry).
pub trait ModuleLoader {
    /// Loads the module called `name`; `Ok(None)` if no such module exists.
    fn load_module(&mut self, name: &str) -> Result<Option<Box<dyn ModuleSymbols>>, PluginSystemError>;
}

// --- Static symbol table ---

/// Symbols between a module's marker and the next marker.
#[derive(Debug, Clone, Copy)]
pub struct StaticModule {
    symbols: &'static [ExportedSymbol],
}

impl ModuleSymbols for StaticModule {
    fn symbol(&self, name: &str) -> Option<PluginFactory> {
        self.symbols
            .iter()
            .take_while(|sym| !sym.is_marker())
            .find(|sym| sym.name == name)
            .and_then(|sym| sym.function)
    }
}

/// Loader over a compiled-in symbol table.
#[derive(Debug, Clone, Copy)]
pub struct StaticLoader {
    table: &'static [ExportedSymbol],
}

impl StaticLoader {
    pub const fn new(table: &'static [ExportedSymbol]) -> Self {
        Self { table }
    }

    /// Module names present in the table, in table order.
    pub fn module_names(&self) -> impl Iterator<Item = &'static str> {
        self.table.iter().filter(|sym| sym.is_marker()).map(|sym| sym.name)
    }

    fn find(&self, name: &str) -> Option<StaticModule> {
        // Markers only; per-module symbols are skipped on the way.
        let marker = self
            .table
            .iter()
            .position(|sym| sym.is_marker() && sym.name == name)?;
        Some(StaticModule {
            symbols: &self.table[marker + 1..],
        })
    }
}

impl ModuleLoader for StaticLoader {
    fn load_module(&mut self, name: &str) -> Result<Option<Box<dyn ModuleSymbols>>, PluginSystemError> {
        Ok(self
            .find(name)
            .map(|module| Box::new(module) as Box<dyn ModuleSymbols>))
    }
}

// --- Dynamic libraries ---

/// A module backed by a shared library that stays mapped for the rest of the process.
pub struct DynamicModule {
    module: String,
    library: &'static Library,
}

impl ModuleSymbols for DynamicModule {
    fn symbol(&self, name: &str) -> Option<PluginFactory> {
        // Only the factory has a known signature.
        if name != FACTORY_SYMBOL {
            return None;
        }
        let symbol: Result<Symbol<FactoryFn>, _> = unsafe { self.library.get(name.as_bytes()) };
        match symbol {
            Ok(factory) => Some(PluginFactory::new(*factory)),
            Err(e) => {
                log::debug!("Module '{}' has no symbol {}: {}", self.module, name, e);
                None
            }
        }
    }
}

/// Module names are plain names, never paths: non-empty, without `/`, `\` or `..`.
pub fn is_module_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && !name.contains("..")
}

/// Loader opening `<dir>/lib<prefix><name>.so` (platform naming) from a list of directories.
pub struct DynamicLoader {
    module_dirs: Vec<PathBuf>,
    library_prefix: String,
    /// Libraries opened so far; never unloaded
    libraries: HashMap<String, &'static Library>,
}

impl DynamicLoader {
    pub fn new() -> Self {
        Self {
            module_dirs: Vec::new(),
            library_prefix: DEFAULT_LIBRARY_PREFIX.to_string(),
            libraries: HashMap::new(),
        }
    }

    /// Add a module directory to search
    pub fn add_module_dir<P: AsRef<Path>>(&mut self, dir: P) {
        self.module_dirs.push(dir.as_ref().to_path_buf());
    }

    pub fn with_library_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.library_prefix = prefix.into();
        self
    }

    /// Path of the library file for `name` in `dir`.
    pub fn library_path(&self, dir: &Path, name: &str) -> PathBuf {
        dir.join(libloading::library_filename(format!("{}{}", self.library_prefix, name)))
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        if !is_module_name(name) {
            return None;
        }
        self.module_dirs
            .iter()
            .map(|dir| self.library_path(dir, name))
            .find(|path| path.is_file())
    }
}

impl Default for DynamicLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DynamicLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicLoader")
            .field("module_dirs", &self.module_dirs)
            .field("library_prefix", &self.library_prefix)
            .field("loaded", &self.libraries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ModuleLoader for DynamicLoader {
    fn load_module(&mut self, name: &str) -> Result<Option<Box<dyn ModuleSymbols>>, PluginSystemError> {
        if let Some(&library) = self.libraries.get(name) {
            return Ok(Some(Box::new(DynamicModule {
                module: name.to_string(),
                library,
            })));
        }

        let Some(path) = self.locate(name) else {
            log::debug!("No library for module '{}' in {:?}", name, self.module_dirs);
            return Ok(None);
        };

        log::debug!("Opening module library {}", path.display());
        let library = unsafe { Library::new(&path) }.map_err(|e| PluginSystemError::LoadingError {
            module: name.to_string(),
            path: Some(path.clone()),
            source: Box::new(PluginSystemErrorSource::Library(e)),
        })?;
        // Factories handed out must outlive any registry, so the library is never closed.
        let library: &'static Library = Box::leak(Box::new(library));
        self.libraries.insert(name.to_string(), library);

        Ok(Some(Box::new(DynamicModule {
            module: name.to_string(),
            library,
        })))
    }
}
