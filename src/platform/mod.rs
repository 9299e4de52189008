//! Narrow interface to the orchestration platform.
//!
//! The quorum subsystem consumes a handful of label-selector reads and one
//! annotation write from the platform; everything else (applying workload
//! manifests, watches, diffing) belongs to the outer reconcile framework.
//!
//! One trait, two implementations:
//! - [`KubePlatformClient`]: production client over the Kubernetes API
//! - [`fake::FakePlatform`]: in-memory implementation for tests

pub mod fake;

use std::future::Future;

use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams, PostParams};
use kube::{Client, ResourceExt};

use crate::crd::{ClusterRef, DataCluster};
use crate::error::Result;
use crate::label;

/// A single annotation change: `Some(value)` sets the key, `None` removes it.
pub type AnnotationPatch = Vec<(String, Option<String>)>;

/// Platform reads and writes needed by the quorum subsystem.
///
/// All reads are label-selector queries against the platform's object store;
/// the one write is a read-modify-replace of the managed resource's
/// annotations, relying on the platform's optimistic-concurrency primitive.
/// A conflicting concurrent write surfaces as an API error and is retried on
/// the next reconciliation pass.
pub trait PlatformClient: Send + Sync {
    /// All workload sets labeled for the given cluster, ordered by name.
    ///
    /// Stable ordering is required so downstream algorithms are
    /// deterministic across calls.
    fn list_workload_sets(
        &self,
        cluster: &ClusterRef,
    ) -> impl Future<Output = Result<Vec<StatefulSet>>> + Send;

    /// All pods labeled for the given cluster.
    fn pods_for_cluster(&self, cluster: &ClusterRef)
    -> impl Future<Output = Result<Vec<Pod>>> + Send;

    /// All pods of one node set of the given cluster.
    fn pods_for_node_set(
        &self,
        cluster: &ClusterRef,
        set_name: &str,
    ) -> impl Future<Output = Result<Vec<Pod>>> + Send;

    /// All master-eligible pods of the given cluster.
    fn master_pods(&self, cluster: &ClusterRef) -> impl Future<Output = Result<Vec<Pod>>> + Send;

    /// A single pod by name, or None if it does not exist.
    fn get_pod(
        &self,
        cluster: &ClusterRef,
        pod_name: &str,
    ) -> impl Future<Output = Result<Option<Pod>>> + Send;

    /// Apply annotation changes to the managed DataCluster resource.
    fn update_annotations(
        &self,
        cluster: &ClusterRef,
        patch: &AnnotationPatch,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Production platform client over the Kubernetes API.
#[derive(Clone)]
pub struct KubePlatformClient {
    client: Client,
}

impl KubePlatformClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }

    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<Pod>> {
        let params = ListParams::default().labels(selector);
        Ok(self.pods(namespace).list(&params).await?.items)
    }
}

impl PlatformClient for KubePlatformClient {
    async fn list_workload_sets(&self, cluster: &ClusterRef) -> Result<Vec<StatefulSet>> {
        let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), &cluster.namespace);
        let params = ListParams::default().labels(&label::cluster_selector(&cluster.name));
        let mut items = api.list(&params).await?.items;
        items.sort_by_key(|s| s.name_any());
        Ok(items)
    }

    async fn pods_for_cluster(&self, cluster: &ClusterRef) -> Result<Vec<Pod>> {
        self.list_pods(&cluster.namespace, &label::cluster_selector(&cluster.name))
            .await
    }

    async fn pods_for_node_set(&self, cluster: &ClusterRef, set_name: &str) -> Result<Vec<Pod>> {
        self.list_pods(
            &cluster.namespace,
            &label::node_set_selector(&cluster.name, set_name),
        )
        .await
    }

    async fn master_pods(&self, cluster: &ClusterRef) -> Result<Vec<Pod>> {
        self.list_pods(&cluster.namespace, &label::master_selector(&cluster.name))
            .await
    }

    async fn get_pod(&self, cluster: &ClusterRef, pod_name: &str) -> Result<Option<Pod>> {
        Ok(self.pods(&cluster.namespace).get_opt(pod_name).await?)
    }

    async fn update_annotations(
        &self,
        cluster: &ClusterRef,
        patch: &AnnotationPatch,
    ) -> Result<()> {
        let api: Api<DataCluster> = Api::namespaced(self.client.clone(), &cluster.namespace);
        let mut resource = api.get(&cluster.name).await?;
        let annotations = resource.metadata.annotations.get_or_insert_with(Default::default);
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
        // replace keeps the read resourceVersion: a concurrent writer makes
        // this fail with a conflict, retried on the next pass
        api.replace(&cluster.name, &PostParams::default(), &resource)
            .await?;
        Ok(())
    }
}
