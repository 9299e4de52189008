//! Builders for workload sets and pods used across tests.
//!
//! Exported (not `cfg(test)`) so the integration test targets can share the
//! same fixtures as the in-module unit tests.

use k8s_openapi::api::apps::v1::{
    RollingUpdateStatefulSetStrategy, StatefulSet, StatefulSetSpec, StatefulSetStatus,
    StatefulSetUpdateStrategy,
};
use k8s_openapi::api::core::v1::{Pod, PodCondition, PodStatus, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

use crate::crd::NodeRoles;
use crate::label;
use crate::workload::REVISION_LABEL;

/// Default namespace used by fixtures.
pub const TEST_NAMESPACE: &str = "ns";

/// Builder for a workload set (StatefulSet) fixture.
#[derive(Clone, Debug)]
pub struct TestWorkloadSet {
    cluster: String,
    name: String,
    namespace: String,
    version: String,
    replicas: i32,
    roles: NodeRoles,
    update_revision: Option<String>,
    partition: Option<i32>,
    status_replicas: Option<i32>,
    updated_replicas: Option<i32>,
    generation: Option<i64>,
    observed_generation: Option<i64>,
}

impl TestWorkloadSet {
    pub fn new(cluster: &str, name: &str) -> Self {
        Self {
            cluster: cluster.to_string(),
            name: name.to_string(),
            namespace: TEST_NAMESPACE.to_string(),
            version: "7.5.0".to_string(),
            replicas: 0,
            roles: NodeRoles::default(),
            update_revision: None,
            partition: None,
            status_replicas: None,
            updated_replicas: None,
            generation: None,
            observed_generation: None,
        }
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn replicas(mut self, replicas: i32) -> Self {
        self.replicas = replicas;
        self
    }

    pub fn master(mut self) -> Self {
        self.roles.master = true;
        self
    }

    pub fn data(mut self) -> Self {
        self.roles.data = true;
        self
    }

    pub fn ingest(mut self) -> Self {
        self.roles.ingest = true;
        self
    }

    pub fn update_revision(mut self, revision: &str) -> Self {
        self.update_revision = Some(revision.to_string());
        self
    }

    pub fn partition(mut self, partition: i32) -> Self {
        self.partition = Some(partition);
        self
    }

    pub fn status_replicas(mut self, replicas: i32) -> Self {
        self.status_replicas = Some(replicas);
        self
    }

    pub fn updated_replicas(mut self, replicas: i32) -> Self {
        self.updated_replicas = Some(replicas);
        self
    }

    pub fn generation(mut self, generation: i64) -> Self {
        self.generation = Some(generation);
        self
    }

    pub fn observed_generation(mut self, generation: i64) -> Self {
        self.observed_generation = Some(generation);
        self
    }

    pub fn build(self) -> StatefulSet {
        let labels = label::node_set_labels(&self.cluster, &self.name, &self.version, self.roles);
        let update_strategy = self.partition.map(|partition| StatefulSetUpdateStrategy {
            rolling_update: Some(RollingUpdateStatefulSetStrategy {
                partition: Some(partition),
                ..Default::default()
            }),
            ..Default::default()
        });
        let status = if self.update_revision.is_some()
            || self.status_replicas.is_some()
            || self.updated_replicas.is_some()
            || self.observed_generation.is_some()
        {
            Some(StatefulSetStatus {
                update_revision: self.update_revision,
                replicas: self.status_replicas.unwrap_or(self.replicas),
                updated_replicas: self.updated_replicas,
                observed_generation: self.observed_generation,
                ..Default::default()
            })
        } else {
            None
        };
        StatefulSet {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace),
                generation: self.generation,
                labels: Some(labels.clone()),
                ..Default::default()
            },
            spec: Some(StatefulSetSpec {
                replicas: Some(self.replicas),
                update_strategy,
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(labels),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ..Default::default()
            }),
            status,
        }
    }
}

/// Builder for a pod fixture belonging to a workload set.
#[derive(Clone, Debug)]
pub struct TestPod {
    cluster: String,
    set_name: String,
    ordinal: i32,
    namespace: String,
    version: String,
    roles: NodeRoles,
    revision: Option<String>,
    ready: bool,
}

impl TestPod {
    pub fn new(cluster: &str, set_name: &str, ordinal: i32) -> Self {
        Self {
            cluster: cluster.to_string(),
            set_name: set_name.to_string(),
            ordinal,
            namespace: TEST_NAMESPACE.to_string(),
            version: "7.5.0".to_string(),
            roles: NodeRoles::default(),
            revision: None,
            ready: false,
        }
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn master(mut self) -> Self {
        self.roles.master = true;
        self
    }

    pub fn data(mut self) -> Self {
        self.roles.data = true;
        self
    }

    pub fn revision(mut self, revision: &str) -> Self {
        self.revision = Some(revision.to_string());
        self
    }

    pub fn ready(mut self) -> Self {
        self.ready = true;
        self
    }

    pub fn build(self) -> Pod {
        let mut labels =
            label::node_set_labels(&self.cluster, &self.set_name, &self.version, self.roles);
        if let Some(revision) = &self.revision {
            labels.insert(REVISION_LABEL.to_string(), revision.clone());
        }
        let status = if self.ready {
            Some(PodStatus {
                conditions: Some(vec![PodCondition {
                    type_: "Ready".to_string(),
                    status: "True".to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            })
        } else {
            None
        };
        Pod {
            metadata: ObjectMeta {
                name: Some(crate::workload::pod_name(&self.set_name, self.ordinal)),
                namespace: Some(self.namespace),
                labels: Some(labels),
                ..Default::default()
            },
            status,
            ..Default::default()
        }
    }
}
