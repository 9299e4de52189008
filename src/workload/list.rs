//! Workload-set list queries.

use std::collections::BTreeSet;

use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use tracing::debug;

use super::pods::{get_replicas, pod_names};
use crate::crd::ClusterRef;
use crate::error::Result;
use crate::label;
use crate::platform::PlatformClient;

/// The workload sets currently labeled for one cluster.
///
/// Always constructed ordered by name so algorithms consuming the list are
/// deterministic and stable across reconciliation passes.
#[derive(Clone, Debug, Default)]
pub struct WorkloadSetList(Vec<StatefulSet>);

/// Retrieve all workload sets labeled for the given cluster, ordered by name.
pub async fn retrieve_workload_sets<P: PlatformClient>(
    platform: &P,
    cluster: &ClusterRef,
) -> Result<WorkloadSetList> {
    let mut sets = platform.list_workload_sets(cluster).await?;
    sets.sort_by_key(|s| s.name_any());
    Ok(WorkloadSetList(sets))
}

impl From<Vec<StatefulSet>> for WorkloadSetList {
    fn from(mut sets: Vec<StatefulSet>) -> Self {
        sets.sort_by_key(|s| s.name_any());
        Self(sets)
    }
}

impl WorkloadSetList {
    pub fn iter(&self) -> impl Iterator<Item = &StatefulSet> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The workload set with the given name, if present.
    pub fn get_by_name(&self, name: &str) -> Option<&StatefulSet> {
        self.0.iter().find(|s| s.name_any() == name)
    }

    /// The set of workload set names.
    pub fn names(&self) -> BTreeSet<String> {
        self.0.iter().map(|s| s.name_any()).collect()
    }

    /// The list updated to contain the given workload set, replacing any
    /// existing entry with the same namespace and name.
    pub fn with_workload_set(mut self, sset: StatefulSet) -> Self {
        match self.0.iter_mut().find(|s| {
            s.name_any() == sset.name_any() && s.metadata.namespace == sset.metadata.namespace
        }) {
            Some(existing) => *existing = sset,
            None => {
                self.0.push(sset);
                self.0.sort_by_key(|s| s.name_any());
            }
        }
        self
    }

    /// Names of the pods expected for all workload sets in the list.
    pub fn pod_names(&self) -> Vec<String> {
        self.0.iter().flat_map(pod_names).collect()
    }

    /// Sum of desired replicas across the list.
    pub fn expected_node_count(&self) -> i32 {
        self.0.iter().map(get_replicas).sum()
    }

    /// Number of master-eligible nodes expected from the list.
    pub fn expected_master_count(&self) -> i32 {
        self.role_count(label::is_master_node_set)
    }

    /// Number of data nodes expected from the list.
    pub fn expected_data_count(&self) -> i32 {
        self.role_count(label::is_data_node_set)
    }

    /// Number of ingest nodes expected from the list.
    pub fn expected_ingest_count(&self) -> i32 {
        self.role_count(label::is_ingest_node_set)
    }

    fn role_count(&self, predicate: impl Fn(&StatefulSet) -> bool) -> i32 {
        self.0
            .iter()
            .filter(|s| predicate(s))
            .map(get_replicas)
            .sum()
    }

    /// Workload sets that still have a rollout pending.
    ///
    /// A set needs an update while `updatedReplicas != replicas` as reported
    /// by the platform's own status. Comparing revision strings instead gives
    /// constant false positives once a rollout completes (current revision is
    /// never reset under an on-delete strategy) and false negatives on manual
    /// rollback.
    pub fn needing_update(&self) -> WorkloadSetList {
        WorkloadSetList(
            self.0
                .iter()
                .filter(|s| {
                    let status = s.status.as_ref();
                    let updated = status.and_then(|st| st.updated_replicas).unwrap_or(0);
                    let replicas = status.map(|st| st.replicas).unwrap_or(0);
                    updated != replicas
                })
                .cloned()
                .collect(),
        )
    }

    /// Workload sets the platform controller has not observed yet
    /// (`metadata.generation != status.observedGeneration`).
    ///
    /// While a set is pending observation, status fields such as the update
    /// revision may be stale and must not be acted upon.
    pub fn pending_reconciliation(&self) -> WorkloadSetList {
        WorkloadSetList(
            self.0
                .iter()
                .filter(|s| {
                    s.metadata.generation != s.status.as_ref().and_then(|st| st.observed_generation)
                })
                .cloned()
                .collect(),
        )
    }

    /// All pods currently existing for the workload sets in the list.
    pub async fn actual_pods<P: PlatformClient>(
        &self,
        platform: &P,
        cluster: &ClusterRef,
    ) -> Result<Vec<Pod>> {
        let mut pods = Vec::new();
        for sset in &self.0 {
            pods.extend(
                platform
                    .pods_for_node_set(cluster, &sset.name_any())
                    .await?,
            );
        }
        Ok(pods)
    }

    /// Returns true once actual pods match what the list specifies.
    ///
    /// For every workload set, the set of expected pod names (derived from
    /// the replica count) is compared against the set of observed pod names.
    /// Returns false with a human-readable reason if any expected pod is
    /// missing (pending creation) or any unexpected pod remains (pending
    /// termination). Pod readiness is explicitly ignored at this layer; only
    /// presence matters.
    pub async fn pod_reconciliation_done<P: PlatformClient>(
        &self,
        platform: &P,
        cluster: &ClusterRef,
    ) -> Result<(bool, String)> {
        for sset in &self.0 {
            let set_name = sset.name_any();
            let expected: BTreeSet<String> = pod_names(sset).into_iter().collect();
            let actual: BTreeSet<String> = platform
                .pods_for_node_set(cluster, &set_name)
                .await?
                .iter()
                .map(|p| p.name_any())
                .collect();

            let pending_creations: Vec<&str> =
                expected.difference(&actual).map(String::as_str).collect();
            let pending_deletions: Vec<&str> =
                actual.difference(&expected).map(String::as_str).collect();
            if pending_creations.is_empty() && pending_deletions.is_empty() {
                continue;
            }

            debug!(
                workload_set = %set_name,
                ?pending_creations,
                ?pending_deletions,
                "some pods still need to be created or deleted"
            );
            let mut reason = format!("workload set {} has pending pod operations", set_name);
            if !pending_creations.is_empty() {
                reason.push_str(&format!(", creations: {}", pending_creations.join(" ")));
            }
            if !pending_deletions.is_empty() {
                reason.push_str(&format!(", deletions: {}", pending_deletions.join(" ")));
            }
            return Ok((false, reason));
        }
        Ok((true, String::new()))
    }
}
