//! Rendered node-set resources pending apply.
//!
//! The outer reconciler renders one workload set per declared node set, plus
//! the configuration blob that will be distributed to its nodes. Both are
//! handed to the quorum and transition coordinators before being applied, so
//! configuration patches land strictly before the specs do.

use k8s_openapi::api::apps::v1::StatefulSet;
use kube::ResourceExt;

use crate::label;
use crate::settings::NodeConfig;
use crate::workload::pod_names;

/// One rendered node set: its workload-set spec and the configuration blob
/// to be applied with it. The coordinators mutate only the configuration.
#[derive(Clone, Debug)]
pub struct NodeSetResources {
    pub statefulset: StatefulSet,
    pub config: NodeConfig,
}

impl NodeSetResources {
    pub fn new(statefulset: StatefulSet) -> Self {
        Self {
            statefulset,
            config: NodeConfig::new(),
        }
    }

    pub fn with_config(statefulset: StatefulSet, config: NodeConfig) -> Self {
        Self {
            statefulset,
            config,
        }
    }
}

/// All rendered node sets of one cluster, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct ResourcesList(Vec<NodeSetResources>);

impl From<Vec<NodeSetResources>> for ResourcesList {
    fn from(resources: Vec<NodeSetResources>) -> Self {
        Self(resources)
    }
}

impl ResourcesList {
    pub fn iter(&self) -> impl Iterator<Item = &NodeSetResources> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut NodeSetResources> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The workload-set specs of the list, in order.
    pub fn statefulsets(&self) -> impl Iterator<Item = &StatefulSet> {
        self.0.iter().map(|r| &r.statefulset)
    }

    /// The configuration blob rendered for the given node set, if present.
    pub fn config_for(&self, set_name: &str) -> Option<&NodeConfig> {
        self.0
            .iter()
            .find(|r| r.statefulset.name_any() == set_name)
            .map(|r| &r.config)
    }

    /// Node names of every node set declaring the master role, concatenated
    /// across sets with order preserved: node-set order, then ordinal order.
    pub fn master_node_names(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|r| label::is_master_node_set(&r.statefulset))
            .flat_map(|r| pod_names(&r.statefulset))
            .collect()
    }
}
