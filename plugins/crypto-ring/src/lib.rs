//! Module build of the crypto plugin under its backend name `crypto_ring`.
//!
//! All behaviour lives in `kdb-plugin-crypto`; this crate only gives the
//! dynamic loader a `libkdb_plugin_crypto_ring` library to open.
pub use kdb_plugin_crypto::{CryptoPlugin, RING_PLUGIN_NAME};

#[cfg(feature = "module-export")]
kdb_core::export_plugin!(CryptoPlugin::ring());

#[cfg(test)]
mod tests {
    use super::*;
    use kdb_core::Plugin;

    #[test]
    fn test_module_builds_ring_plugin() {
        assert_eq!(CryptoPlugin::ring().name(), RING_PLUGIN_NAME);
    }
}
