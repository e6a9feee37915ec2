use super::*;
use kdb_core::plugin_system::contract::contract_name;
use kdb_core::plugin_system::{Contract, LifecycleState, PluginInstance};
use std::fs;
use tempfile::tempdir;

fn key(name: &str) -> Key {
    Key::new(name).expect("valid key name")
}

fn config_for(dir: &Path) -> KeySet {
    [key("user:/xfconf/directory").with_string(dir.to_string_lossy())]
        .into_iter()
        .collect()
}

fn instance(config: KeySet) -> PluginInstance {
    PluginInstance::new(PLUGIN_NAME, Box::new(XfconfPlugin::new()), config)
}

#[test]
fn test_contract_exports_full_lifecycle() {
    let mut plugin = instance(KeySet::new());
    let mut parent = Key::from_name(contract_name(PLUGIN_NAME));
    let mut returned = KeySet::new();

    // Contract requests work without an open store
    assert_eq!(plugin.get(&mut returned, &mut parent), PluginStatus::Success);
    let contract = Contract::from_keyset(PLUGIN_NAME, &returned).expect("contract parses");
    for op in Operation::ALL {
        assert!(contract.exports(op), "{} not exported", op);
    }
    assert_eq!(contract.description, "xfconf plugin waits for your orders");
}

#[test]
fn test_open_close_reopen() {
    let dir = tempdir().unwrap();
    let mut plugin = instance(config_for(dir.path()));
    let mut error_key = key("system");

    assert_eq!(plugin.open(&mut error_key), PluginStatus::Success);
    assert_eq!(plugin.state(), LifecycleState::Open);
    assert_eq!(plugin.close(&mut error_key), PluginStatus::Success);
    assert_eq!(plugin.open(&mut error_key), PluginStatus::Success);
    assert_eq!(plugin.close(&mut error_key), PluginStatus::Success);
}

#[test]
fn test_open_with_missing_directory_fails() {
    let dir = tempdir().unwrap();
    let mut plugin = instance(config_for(&dir.path().join("absent")));
    let mut error_key = key("system");

    assert!(plugin.open(&mut error_key).is_error());
    assert_eq!(error_key.error_number(), Some(ERROR_RESOURCE));
    assert_eq!(error_key.meta("error/module"), Some(PLUGIN_NAME));
    assert_eq!(plugin.state(), LifecycleState::Created);
}

#[test]
fn test_open_with_file_instead_of_directory_fails() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("not-a-dir");
    fs::write(&file, "{}").unwrap();
    let mut plugin = instance(config_for(&file));
    let mut error_key = key("system");

    assert!(plugin.open(&mut error_key).is_error());
}

#[test]
fn test_get_reads_channel_properties() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("xfwm4.json"),
        r#"{ "/general/theme": "Default", "/general/workspace_count": 4, "/general/snap_to_border": true }"#,
    )
    .unwrap();

    let mut plugin = instance(config_for(dir.path()));
    let mut parent = key("user:/sw/xfce").with_string("/channels/xfwm4");
    assert_eq!(plugin.open(&mut parent), PluginStatus::Success);

    let mut returned = KeySet::new();
    assert_eq!(plugin.get(&mut returned, &mut parent), PluginStatus::Success);
    assert_eq!(returned.len(), 3);
    assert_eq!(
        returned.lookup_name("user:/sw/xfce/general/theme").and_then(Key::string),
        Some("Default")
    );
    assert_eq!(
        returned.lookup_name("user:/sw/xfce/general/workspace_count").and_then(Key::string),
        Some("4")
    );
    assert_eq!(
        returned.lookup_name("user:/sw/xfce/general/snap_to_border").and_then(Key::string),
        Some("1")
    );
}

#[test]
fn test_channel_name_falls_back_to_parent_base_name() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("thunar.json"), r#"{ "last-view": "ThunarIconView" }"#).unwrap();

    let mut plugin = instance(config_for(dir.path()));
    let mut parent = key("user:/sw/thunar");
    assert_eq!(plugin.open(&mut parent), PluginStatus::Success);

    let mut returned = KeySet::new();
    assert_eq!(plugin.get(&mut returned, &mut parent), PluginStatus::Success);
    assert!(returned.lookup_name("user:/sw/thunar/last-view").is_some());
}

#[test]
fn test_empty_channel_is_no_update() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("empty.json"), "{}").unwrap();

    let mut plugin = instance(config_for(dir.path()));
    let mut parent = key("user:/sw/empty");
    plugin.open(&mut parent);

    let mut returned = KeySet::new();
    assert_eq!(plugin.get(&mut returned, &mut parent), PluginStatus::NoUpdate);
    assert!(returned.is_empty());
}

#[test]
fn test_get_unknown_channel_fails() {
    let dir = tempdir().unwrap();
    let mut plugin = instance(config_for(dir.path()));
    let mut parent = key("user:/sw/missing");
    plugin.open(&mut parent);

    assert!(plugin.get(&mut KeySet::new(), &mut parent).is_error());
    assert_eq!(parent.error_number(), Some(ERROR_RESOURCE));
}

#[test]
fn test_get_before_open_fails() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("xfwm4.json"), "{}").unwrap();
    let mut plugin = instance(config_for(dir.path()));
    let mut parent = key("user:/sw/xfwm4");

    let status = plugin.get(&mut KeySet::new(), &mut parent);
    assert!(status.is_error());
    assert!(parent.error_reason().unwrap().contains("not initialized"));
}

#[test]
fn test_malformed_channel_fails() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("broken.json"), "[1, 2, 3]").unwrap();
    let mut plugin = instance(config_for(dir.path()));
    let mut parent = key("user:/sw/broken");
    plugin.open(&mut parent);

    assert!(plugin.get(&mut KeySet::new(), &mut parent).is_error());
}

#[test]
fn test_set_is_read_only_and_commit_error_succeed() {
    let dir = tempdir().unwrap();
    let mut plugin = instance(config_for(dir.path()));
    let mut parent = key("user:/sw/xfwm4");
    let mut data: KeySet = [key("user:/sw/xfwm4/general/theme").with_string("Other")]
        .into_iter()
        .collect();

    assert_eq!(plugin.set(&mut data, &mut parent), PluginStatus::NoUpdate);
    assert_eq!(plugin.commit(&mut data, &mut parent), PluginStatus::Success);
    assert_eq!(plugin.error(&mut data, &mut parent), PluginStatus::Success);
    assert_eq!(data.len(), 1);
}

#[test]
fn test_check_conf() {
    let plugin = instance(KeySet::new());
    assert_eq!(plugin.check_conf(&mut key("system")), PluginStatus::NoUpdate);

    let config: KeySet = [key("user:/xfconf/directory").with_binary([1, 2])].into_iter().collect();
    let plugin = instance(config);
    let mut error_key = key("system");
    assert!(plugin.check_conf(&mut error_key).is_error());
    assert!(error_key.error_reason().unwrap().contains(DIRECTORY_PATH));
}

#[test]
fn test_channel_store_rejects_path_names() {
    let dir = tempdir().unwrap();
    let mut store = ChannelStore::new();
    store.init(dir.path()).unwrap();
    let parent = KeyName::new("user:/x").unwrap();

    assert!(matches!(store.properties("../etc", &parent), Err(ChannelError::InvalidName(_))));
    assert!(matches!(store.properties("", &parent), Err(ChannelError::InvalidName(_))));

    store.shutdown();
    assert!(!store.is_initialized());
    assert!(matches!(store.properties("x", &parent), Err(ChannelError::NotInitialized)));
}

#[test]
fn test_unchanged_channel_is_no_update() {
    let dir = tempdir().unwrap();
    let channel = dir.path().join("xsettings.json");
    fs::write(&channel, r#"{ "/Net/ThemeName": "Adwaita" }"#).unwrap();

    let mut plugin = instance(config_for(dir.path()));
    let mut parent = key("user:/sw/xsettings");
    assert_eq!(plugin.open(&mut parent), PluginStatus::Success);

    let mut returned = KeySet::new();
    assert_eq!(plugin.get(&mut returned, &mut parent), PluginStatus::Success);
    assert_eq!(returned.len(), 1);

    let mut again = KeySet::new();
    assert_eq!(plugin.get(&mut again, &mut parent), PluginStatus::NoUpdate);
    assert!(again.is_empty());

    fs::write(&channel, r#"{ "/Net/ThemeName": "Greybird" }"#).unwrap();
    let mut changed = KeySet::new();
    assert_eq!(plugin.get(&mut changed, &mut parent), PluginStatus::Success);
    assert_eq!(
        changed.lookup_name("user:/sw/xsettings/Net/ThemeName").and_then(Key::string),
        Some("Greybird")
    );

    // A channel emptied after a fetch is a change too
    fs::write(&channel, "{}").unwrap();
    assert_eq!(plugin.get(&mut KeySet::new(), &mut parent), PluginStatus::Success);
    assert_eq!(plugin.get(&mut KeySet::new(), &mut parent), PluginStatus::NoUpdate);
}

#[test]
fn test_close_forgets_fetch_history() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("xsettings.json"), r#"{ "/Net/ThemeName": "Adwaita" }"#).unwrap();

    let mut plugin = instance(config_for(dir.path()));
    let mut parent = key("user:/sw/xsettings");
    plugin.open(&mut parent);
    assert_eq!(plugin.get(&mut KeySet::new(), &mut parent), PluginStatus::Success);

    // Another parent has its own history
    let mut other = key("user:/other").with_string("xsettings");
    assert_eq!(plugin.get(&mut KeySet::new(), &mut other), PluginStatus::Success);

    assert_eq!(plugin.close(&mut parent), PluginStatus::Success);
    assert_eq!(plugin.open(&mut parent), PluginStatus::Success);
    assert_eq!(plugin.get(&mut KeySet::new(), &mut parent), PluginStatus::Success);
}
