//! Compiled-in symbol table of the bundled modules.
use kdb_core::kernel::constants::FACTORY_SYMBOL;
use kdb_core::plugin_system::ExportedSymbol;
use kdb_core::Plugin;

use kdb_plugin_crypto::CryptoPlugin;
use kdb_plugin_xfconf::XfconfPlugin;

fn crypto_factory() -> Box<dyn Plugin> {
    Box::new(CryptoPlugin::new())
}

fn crypto_ring_factory() -> Box<dyn Plugin> {
    Box::new(CryptoPlugin::ring())
}

fn xfconf_factory() -> Box<dyn Plugin> {
    Box::new(XfconfPlugin::new())
}

pub static EXPORTED_SYMBOLS: &[ExportedSymbol] = &[
    ExportedSymbol::marker(kdb_plugin_crypto::PLUGIN_NAME),
    ExportedSymbol::function(FACTORY_SYMBOL, crypto_factory),
    ExportedSymbol::marker(kdb_plugin_crypto::RING_PLUGIN_NAME),
    ExportedSymbol::function(FACTORY_SYMBOL, crypto_ring_factory),
    ExportedSymbol::marker(kdb_plugin_xfconf::PLUGIN_NAME),
    ExportedSymbol::function(FACTORY_SYMBOL, xfconf_factory),
];
