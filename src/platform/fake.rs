//! In-memory platform for tests.
//!
//! Holds workload sets, pods, and per-cluster annotations behind a mutex and
//! answers the same label-selector queries the production client issues.
//! Only external state is simulated; all decision logic under test stays in
//! production code.

use std::collections::BTreeMap;
use std::sync::Mutex;

use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;

use super::{AnnotationPatch, PlatformClient};
use crate::crd::ClusterRef;
use crate::error::Result;
use crate::label;

#[derive(Debug, Default)]
struct FakeState {
    workload_sets: Vec<StatefulSet>,
    pods: Vec<Pod>,
    annotations: BTreeMap<(String, String), BTreeMap<String, String>>,
}

/// An in-memory platform.
#[derive(Debug, Default)]
pub struct FakePlatform {
    state: Mutex<FakeState>,
}

fn label_value<'a>(labels: Option<&'a BTreeMap<String, String>>, key: &str) -> Option<&'a str> {
    labels.and_then(|l| l.get(key)).map(String::as_str)
}

fn pod_in_cluster(pod: &Pod, cluster: &ClusterRef) -> bool {
    pod.metadata.namespace.as_deref() == Some(cluster.namespace.as_str())
        && label_value(pod.metadata.labels.as_ref(), label::CLUSTER_NAME_LABEL)
            == Some(cluster.name.as_str())
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the platform with workload sets.
    pub fn with_workload_sets(self, sets: Vec<StatefulSet>) -> Self {
        self.lock().workload_sets = sets;
        self
    }

    /// Seed the platform with pods.
    pub fn with_pods(self, pods: Vec<Pod>) -> Self {
        self.lock().pods = pods;
        self
    }

    /// Seed annotations for one cluster.
    pub fn with_annotations(self, cluster: &ClusterRef, annotations: BTreeMap<String, String>) -> Self {
        self.lock()
            .annotations
            .insert((cluster.namespace.clone(), cluster.name.clone()), annotations);
        self
    }

    /// Add a pod after construction.
    pub fn add_pod(&self, pod: Pod) {
        self.lock().pods.push(pod);
    }

    /// Remove a pod by name.
    pub fn remove_pod(&self, name: &str) {
        self.lock().pods.retain(|p| p.name_any() != name);
    }

    /// Current annotations of one cluster, for assertions.
    pub fn annotations(&self, cluster: &ClusterRef) -> BTreeMap<String, String> {
        self.lock()
            .annotations
            .get(&(cluster.namespace.clone(), cluster.name.clone()))
            .cloned()
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PlatformClient for FakePlatform {
    async fn list_workload_sets(&self, cluster: &ClusterRef) -> Result<Vec<StatefulSet>> {
        let mut sets: Vec<StatefulSet> = self
            .lock()
            .workload_sets
            .iter()
            .filter(|s| {
                s.metadata.namespace.as_deref() == Some(cluster.namespace.as_str())
                    && label_value(s.metadata.labels.as_ref(), label::CLUSTER_NAME_LABEL)
                        == Some(cluster.name.as_str())
            })
            .cloned()
            .collect();
        sets.sort_by_key(|s| s.name_any());
        Ok(sets)
    }

    async fn pods_for_cluster(&self, cluster: &ClusterRef) -> Result<Vec<Pod>> {
        Ok(self
            .lock()
            .pods
            .iter()
            .filter(|p| pod_in_cluster(p, cluster))
            .cloned()
            .collect())
    }

    async fn pods_for_node_set(&self, cluster: &ClusterRef, set_name: &str) -> Result<Vec<Pod>> {
        Ok(self
            .lock()
            .pods
            .iter()
            .filter(|p| {
                pod_in_cluster(p, cluster)
                    && label_value(p.metadata.labels.as_ref(), label::NODESET_NAME_LABEL)
                        == Some(set_name)
            })
            .cloned()
            .collect())
    }

    async fn master_pods(&self, cluster: &ClusterRef) -> Result<Vec<Pod>> {
        Ok(self
            .lock()
            .pods
            .iter()
            .filter(|p| pod_in_cluster(p, cluster) && label::is_master_node(p))
            .cloned()
            .collect())
    }

    async fn get_pod(&self, cluster: &ClusterRef, pod_name: &str) -> Result<Option<Pod>> {
        Ok(self
            .lock()
            .pods
            .iter()
            .find(|p| pod_in_cluster(p, cluster) && p.name_any() == pod_name)
            .cloned())
    }

    async fn update_annotations(
        &self,
        cluster: &ClusterRef,
        patch: &AnnotationPatch,
    ) -> Result<()> {
        let mut state = self.lock();
        let annotations = state
            .annotations
            .entry((cluster.namespace.clone(), cluster.name.clone()))
            .or_default();
        for (key, value) in patch {
            match value {
                Some(v) => {
                    annotations.insert(key.clone(), v.clone());
                }
                None => {
                    annotations.remove(key);
                }
            }
        }
        Ok(())
    }
}
