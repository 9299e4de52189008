//! Node configuration blobs and well-known setting keys.
//!
//! Each node set carries a configuration blob that is rendered into the
//! nodes' configuration file by the outer reconciler. The quorum subsystem
//! mutates these blobs (and nothing else on a node set) before the specs are
//! applied to the platform.

use std::collections::BTreeMap;

/// Legacy discovery protocol: minimum number of master-eligible members
/// required to commit a membership change.
pub const DISCOVERY_MINIMUM_MASTERS: &str = "discovery.minimum_master_nodes";

/// Modern discovery protocol: the frozen set of node names a brand-new
/// cluster forms its first voting configuration from.
pub const INITIAL_MASTER_NODES: &str = "cluster.initial_master_nodes";

/// A node configuration blob.
///
/// A thin, order-stable wrapper over key/value settings. Values are JSON so
/// both scalar settings and string lists render without a bespoke encoding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeConfig(BTreeMap<String, serde_json::Value>);

impl NodeConfig {
    /// An empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from declared user settings.
    pub fn from_map(map: BTreeMap<String, serde_json::Value>) -> Self {
        Self(map)
    }

    /// Set an integer-valued setting.
    pub fn set_int(&mut self, key: &str, value: i32) {
        self.0.insert(key.to_string(), serde_json::json!(value));
    }

    /// Set a string-list-valued setting.
    pub fn set_strings(&mut self, key: &str, values: &[String]) {
        self.0.insert(key.to_string(), serde_json::json!(values));
    }

    /// Read a setting, if present.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// True if no settings are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render the configuration to its serialized form.
    pub fn render(&self) -> serde_json::Value {
        serde_json::json!(self.0)
    }
}
