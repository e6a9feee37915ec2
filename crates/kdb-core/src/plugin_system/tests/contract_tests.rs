use super::MockPlugin;
use crate::key::{FunctionRef, Key, KeySet};
use crate::plugin_system::contract::{
    Contract, answer_contract_request, build_contract, contract_name, is_contract_request, modules_root,
};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::{Operation, Operations, Plugin};

fn mock(operations: Operations) -> MockPlugin {
    MockPlugin::new("mock", operations)
}

#[test]
fn test_contract_names() {
    assert_eq!(modules_root().to_string(), "system:/elektra/modules");
    assert_eq!(contract_name("crypto").to_string(), "system:/elektra/modules/crypto");

    let plugin = mock(Operations::GET_ONLY);
    assert!(is_contract_request(plugin.name(), &Key::from_name(contract_name("mock"))));
    assert!(!is_contract_request(plugin.name(), &Key::new("system:/elektra/modules/mock/x").unwrap()));
    assert!(!is_contract_request(plugin.name(), &Key::new("user:/elektra/modules/mock").unwrap()));
}

#[test]
fn test_build_contract_layout() {
    let plugin = mock(Operations::LIFECYCLE.without(Operation::Commit));
    let contract = build_contract(&plugin);

    let root = contract.lookup_name("system:/elektra/modules/mock").unwrap();
    assert_eq!(root.string(), Some("mock plugin"));
    assert!(contract.lookup_name("system:/elektra/modules/mock/exports").is_some());
    assert_eq!(
        contract
            .lookup_name("system:/elektra/modules/mock/exports/get")
            .and_then(Key::function),
        Some(FunctionRef::Operation(Operation::Get))
    );
    assert!(contract.lookup_name("system:/elektra/modules/mock/exports/commit").is_none());
    assert!(contract.lookup_name("system:/elektra/modules/mock/exports/checkconf").is_none());
    assert_eq!(
        contract
            .lookup_name("system:/elektra/modules/mock/infos/version")
            .and_then(Key::string),
        Some("1.2.3")
    );
    assert_eq!(plugin.contract(), contract);
}

#[test]
fn test_answer_contract_request() {
    let plugin = mock(Operations::GET_ONLY);
    let mut returned = KeySet::new();

    let data_parent = Key::new("user:/app").unwrap();
    assert!(answer_contract_request(&plugin, &mut returned, &data_parent).is_none());
    assert!(returned.is_empty());

    let contract_parent = Key::from_name(contract_name("mock"));
    let status = answer_contract_request(&plugin, &mut returned, &contract_parent).unwrap();
    assert!(status.is_success());
    assert_eq!(returned, plugin.contract());
}

#[test]
fn test_contract_reads_back() {
    let plugin = mock(Operations::LIFECYCLE.with(Operation::CheckConf));
    let contract = Contract::from_keyset("mock", &build_contract(&plugin)).unwrap();

    assert_eq!(contract.plugin, "mock");
    assert_eq!(contract.description, "mock plugin");
    assert_eq!(contract.version, semver::Version::new(1, 2, 3));
    assert_eq!(contract.operations, plugin.operations());
    assert!(Operation::ALL.iter().all(|op| contract.exports(*op)));
}

#[test]
fn test_contract_ignores_nested_exports() {
    let plugin = mock(Operations::GET_ONLY);
    let mut ks = build_contract(&plugin);
    ks.append(
        Key::from_name(contract_name("mock").join("exports/deep/set"))
            .with_function(FunctionRef::Operation(Operation::Set)),
    );
    let contract = Contract::from_keyset("mock", &ks).unwrap();
    assert!(!contract.exports(Operation::Set));
}

#[test]
fn test_invalid_contracts() {
    let plugin = mock(Operations::GET_ONLY);

    let err = Contract::from_keyset("other", &build_contract(&plugin)).unwrap_err();
    assert!(matches!(err, PluginSystemError::InvalidContract { .. }));

    let mut no_get = build_contract(&plugin);
    no_get.remove(&contract_name("mock").join("exports/get"));
    let err = Contract::from_keyset("mock", &no_get).unwrap_err();
    assert!(err.to_string().contains("get is not exported"));

    let mut bad_version = build_contract(&plugin);
    bad_version.append(Key::from_name(contract_name("mock").join("infos/version")).with_string("one"));
    assert!(matches!(
        Contract::from_keyset("mock", &bad_version),
        Err(PluginSystemError::VersionParsing(_))
    ));

    let mut no_version = build_contract(&plugin);
    no_version.remove(&contract_name("mock").join("infos/version"));
    assert!(Contract::from_keyset("mock", &no_version).is_err());
}
