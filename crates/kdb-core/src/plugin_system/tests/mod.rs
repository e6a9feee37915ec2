pub mod contract_tests;

use std::sync::{Arc, Mutex};

use crate::key::{Key, KeySet};
use crate::plugin_system::contract::answer_contract_request;
use crate::plugin_system::traits::{Operation, Operations, Plugin, PluginStatus};

/// Error code the mock reports when told to fail.
pub const MOCK_ERROR: u32 = 99;

/// Records every call it receives.
pub struct MockPlugin {
    pub name: &'static str,
    pub operations: Operations,
    pub fail_open: bool,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl MockPlugin {
    pub fn new(name: &'static str, operations: Operations) -> Self {
        Self {
            name,
            operations,
            fail_open: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

impl Plugin for MockPlugin {
    fn name(&self) -> &str {
        self.name
    }

    fn version(&self) -> &str {
        "1.2.3"
    }

    fn description(&self) -> &str {
        "mock plugin"
    }

    fn operations(&self) -> Operations {
        self.operations
    }

    fn open(&mut self, _config: &KeySet, error_key: &mut Key) -> PluginStatus {
        self.record("open");
        if self.fail_open {
            return PluginStatus::error(error_key, MOCK_ERROR, "open refused", self.name);
        }
        PluginStatus::Success
    }

    fn close(&mut self, _error_key: &mut Key) -> PluginStatus {
        self.record("close");
        PluginStatus::Success
    }

    fn get(&mut self, config: &KeySet, returned: &mut KeySet, parent: &mut Key) -> PluginStatus {
        if let Some(status) = answer_contract_request(self, returned, parent) {
            return status;
        }
        self.record("get");
        returned.append_all(config);
        PluginStatus::changed(!config.is_empty())
    }

    fn set(&mut self, _config: &KeySet, _returned: &mut KeySet, _parent: &mut Key) -> PluginStatus {
        self.record("set");
        PluginStatus::Success
    }

    fn commit(&mut self, _config: &KeySet, _returned: &mut KeySet, _parent: &mut Key) -> PluginStatus {
        self.record("commit");
        PluginStatus::Success
    }

    fn error(&mut self, _config: &KeySet, _returned: &mut KeySet, _parent: &mut Key) -> PluginStatus {
        self.record("error");
        PluginStatus::Success
    }

    fn check_conf(&self, config: &mut KeySet, _error_key: &mut Key) -> PluginStatus {
        self.record("checkconf");
        // Completes the configuration with a default
        config.append(Key::new("user:/mock/default").unwrap().with_string("1"));
        PluginStatus::Success
    }
}

pub fn full_mock() -> Box<dyn Plugin> {
    Box::new(MockPlugin::new("full", Operations::LIFECYCLE.with(Operation::CheckConf)))
}

pub fn get_only_mock() -> Box<dyn Plugin> {
    Box::new(MockPlugin::new("getonly", Operations::GET_ONLY))
}

pub fn failing_mock() -> Box<dyn Plugin> {
    Box::new(MockPlugin::new("failing", Operations::LIFECYCLE).failing_open())
}
