//! DataCluster Custom Resource Definition.
//!
//! Defines the DataCluster CRD describing one managed quorum-based data
//! cluster: a declared cluster version plus a list of homogeneous node sets.
//! The resource's annotation map also carries the durable discovery-protocol
//! transition state (see `transition::state`).

use std::collections::BTreeMap;

use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// DataCluster is a custom resource describing a managed data cluster.
///
/// Example:
/// ```yaml
/// apiVersion: quorumoperator.dev/v1alpha1
/// kind: DataCluster
/// metadata:
///   name: my-cluster
/// spec:
///   version: 7.5.0
///   nodeSets:
///     - name: master
///       count: 3
///       roles:
///         master: true
///     - name: data
///       count: 6
///       roles:
///         data: true
///         ingest: true
/// ```
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "quorumoperator.dev",
    version = "v1alpha1",
    kind = "DataCluster",
    plural = "dataclusters",
    shortname = "dc",
    status = "DataClusterStatus",
    namespaced,
    printcolumn = r#"{"name":"Version", "type":"string", "jsonPath":".spec.version"}"#,
    printcolumn = r#"{"name":"Phase", "type":"string", "jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Nodes", "type":"string", "jsonPath":".status.availableNodes"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct DataClusterSpec {
    /// Declared cluster version for all node sets, unless overridden per set.
    pub version: String,

    /// Homogeneous groups of nodes managed as one scalable unit each.
    #[serde(default)]
    pub node_sets: Vec<NodeSetSpec>,
}

/// One homogeneous group of nodes (a "node set").
///
/// Replica counts and roles are owned by the user and the outer reconciler;
/// the quorum subsystem only ever mutates the rendered configuration of a
/// node set, never its count or roles.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeSetSpec {
    /// Node set name, unique within the cluster.
    pub name: String,

    /// Desired number of nodes in this set.
    #[serde(default)]
    pub count: i32,

    /// Roles granted to every node in this set.
    #[serde(default)]
    pub roles: NodeRoles,

    /// Version override for this node set; defaults to the cluster version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Additional node configuration applied to every node in this set.
    #[serde(default)]
    pub config: BTreeMap<String, serde_json::Value>,
}

impl NodeSetSpec {
    /// Effective version of this node set: its override, or the cluster version.
    pub fn effective_version<'a>(&'a self, cluster: &'a DataClusterSpec) -> &'a str {
        self.version.as_deref().unwrap_or(&cluster.version)
    }
}

/// Role flags for the nodes of a node set.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeRoles {
    /// Master-eligible: may participate in membership/voting decisions.
    #[serde(default)]
    pub master: bool,

    /// Holds and serves data.
    #[serde(default)]
    pub data: bool,

    /// Accepts and pre-processes ingest traffic.
    #[serde(default)]
    pub ingest: bool,
}

/// Status of a DataCluster.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataClusterStatus {
    /// Current reconciliation phase.
    #[serde(default)]
    pub phase: ReconcilePhase,

    /// Available nodes in "ready/total" format (e.g., "9/9").
    #[serde(default)]
    pub available_nodes: String,

    /// The generation most recently observed by the controller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// ReconcilePhase represents the lifecycle phase of a DataCluster.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize, JsonSchema)]
pub enum ReconcilePhase {
    /// Initial state, waiting for reconciliation.
    #[default]
    Pending,
    /// Topology changes are being applied.
    Applying,
    /// Cluster matches its declared topology.
    Ready,
    /// Cluster is operational but some nodes are unavailable.
    Degraded,
    /// Reconciliation cannot proceed without intervention.
    Invalid,
}

impl std::fmt::Display for ReconcilePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcilePhase::Pending => write!(f, "Pending"),
            ReconcilePhase::Applying => write!(f, "Applying"),
            ReconcilePhase::Ready => write!(f, "Ready"),
            ReconcilePhase::Degraded => write!(f, "Degraded"),
            ReconcilePhase::Invalid => write!(f, "Invalid"),
        }
    }
}

/// Namespace + name identifying one managed data cluster.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ClusterRef {
    pub namespace: String,
    pub name: String,
}

impl ClusterRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Reference the given DataCluster resource.
    pub fn from_cluster(cluster: &DataCluster) -> Self {
        Self {
            namespace: cluster.namespace().unwrap_or_else(|| "default".to_string()),
            name: cluster.name_any(),
        }
    }
}

impl std::fmt::Display for ClusterRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
