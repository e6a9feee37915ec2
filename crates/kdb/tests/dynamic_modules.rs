use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use kdb::{Key, KeySet, LoaderKind, PluginStatus, RegistryConfig, modules_from_config};
use kdb_core::plugin_system::contract::contract_name;
use kdb_core::plugin_system::{Contract, DynamicLoader};
use tempfile::{TempDir, tempdir};

const KEY: [u8; 32] = [7; 32];
const IV: [u8; 16] = [3; 16];

fn key(name: &str) -> Key {
    Key::new(name).expect("valid key name")
}

// Builds workspace plugin crates as loadable modules and returns the directory
// holding the libraries (plus the TempDir keeping the build output alive).
fn compile_modules(args: &[&str]) -> Result<(PathBuf, TempDir), String> {
    let workspace = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let target_dir = tempdir().map_err(|e| format!("Failed to create temp dir for compilation: {}", e))?;

    let output = Command::new(env!("CARGO"))
        .current_dir(&workspace)
        .arg("build")
        .args(args)
        .arg("--target-dir")
        .arg(target_dir.path())
        .output()
        .map_err(|e| format!("Failed to execute cargo build in {}: {}", workspace.display(), e))?;

    if !output.status.success() {
        return Err(format!(
            "cargo build {:?} exited with {:?}.\nStderr:\n{}",
            args,
            output.status,
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    Ok((target_dir.path().join("debug"), target_dir))
}

fn contract_of(plugin: &mut kdb_core::plugin_system::PluginInstance, name: &str) -> Contract {
    let mut parent = Key::from_name(contract_name(name));
    let mut returned = KeySet::new();
    assert_eq!(plugin.get(&mut returned, &mut parent), PluginStatus::Success, "{}", name);
    Contract::from_keyset(name, &returned).expect("contract parses")
}

#[test]
fn test_bundled_plugins_load_as_modules() {
    let (module_dir, _target) = compile_modules(&[
        "-p",
        "kdb-plugin-crypto",
        "-p",
        "kdb-plugin-xfconf",
        "--features",
        "kdb-plugin-crypto/module-export,kdb-plugin-xfconf/module-export",
    ])
    .expect("Failed to compile plugin modules");
    // The crypto_ring build switches off the crypto crate's own export, so it gets a target of its own
    let (ring_dir, _ring_target) = compile_modules(&["-p", "kdb-plugin-crypto-ring", "--features", "module-export"])
        .expect("Failed to compile crypto_ring module");

    let loader = DynamicLoader::new();
    for (dir, name) in [(&module_dir, "crypto"), (&module_dir, "xfconf"), (&ring_dir, "crypto_ring")] {
        let library = loader.library_path(dir, name);
        assert!(library.exists(), "module {} not found at {}", name, library.display());
    }

    let config = RegistryConfig {
        loader: LoaderKind::Dynamic,
        module_dirs: vec![module_dir.clone(), ring_dir.clone()],
        ..RegistryConfig::default()
    };
    let mut registry = modules_from_config(&config);

    // xfconf reads a channel
    let channels = tempdir().unwrap();
    fs::write(channels.path().join("xsettings.json"), r#"{ "/Net/ThemeName": "Adwaita" }"#).unwrap();
    let xfconf_config: KeySet = [key("system:/xfconf/directory").with_string(channels.path().to_string_lossy())]
        .into_iter()
        .collect();
    let mut parent = key("user:/sw/xsettings");
    let mut xfconf = registry
        .open_plugin("xfconf", xfconf_config, &mut parent)
        .expect("xfconf module opens");
    let mut returned = KeySet::new();
    assert_eq!(xfconf.get(&mut returned, &mut parent), PluginStatus::Success);
    assert_eq!(
        returned.lookup_name("user:/sw/xsettings/Net/ThemeName").and_then(Key::string),
        Some("Adwaita")
    );
    assert_eq!(contract_of(&mut xfconf, "xfconf").plugin, "xfconf");

    // crypto encrypts and decrypts
    let crypto_config: KeySet = [
        key("user:/crypto/key-derivation/key").with_binary(KEY),
        key("user:/crypto/key-derivation/iv").with_binary(IV),
    ]
    .into_iter()
    .collect();
    let mut parent = key("user:/app");
    let mut crypto = registry
        .open_plugin("crypto", crypto_config.clone(), &mut parent)
        .expect("crypto module opens");
    let mut data: KeySet = [key("user:/app/secret").with_string("s3cret").with_meta("crypto/encrypt", "1")]
        .into_iter()
        .collect();
    assert_eq!(crypto.set(&mut data, &mut parent), PluginStatus::Success);
    assert!(data.lookup_name("user:/app/secret").unwrap().binary().is_some());
    assert_eq!(crypto.get(&mut data, &mut parent), PluginStatus::Success);
    assert_eq!(data.lookup_name("user:/app/secret").and_then(Key::string), Some("s3cret"));

    // crypto_ring is its own module
    let mut ring = registry.instantiate("crypto_ring", crypto_config).expect("crypto_ring resolves");
    assert_eq!(ring.name(), "crypto_ring");
    assert_eq!(contract_of(&mut ring, "crypto_ring").plugin, "crypto_ring");

    let mut cached = registry.cached_modules();
    cached.sort();
    assert_eq!(cached, vec!["crypto", "crypto_ring", "xfconf"]);
}
