//! Pod-level helpers shared by the reconciliation-status queries.

use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use tracing::debug;

use super::list::WorkloadSetList;
use crate::crd::ClusterRef;
use crate::error::Result;
use crate::platform::PlatformClient;

/// Label carrying a pod's current rollout revision, maintained by the
/// platform's workload controller.
pub const REVISION_LABEL: &str = "controller-revision-hash";

/// Name of the pod at the given ordinal of a workload set.
///
/// This `{set}-{ordinal}` contract is shared by every query comparing
/// expected against observed pods.
pub fn pod_name(set_name: &str, ordinal: i32) -> String {
    format!("{}-{}", set_name, ordinal)
}

/// Desired replica count of a workload set (0 when unset).
pub fn get_replicas(sset: &StatefulSet) -> i32 {
    sset.spec.as_ref().and_then(|s| s.replicas).unwrap_or(0)
}

/// Rolling-update partition ordinal of a workload set (0 when unset:
/// the whole set is in scope of the rollout).
pub fn get_partition(sset: &StatefulSet) -> i32 {
    sset.spec
        .as_ref()
        .and_then(|s| s.update_strategy.as_ref())
        .and_then(|u| u.rolling_update.as_ref())
        .and_then(|r| r.partition)
        .unwrap_or(0)
}

/// Names of all pods expected for a workload set, in ordinal order.
pub fn pod_names(sset: &StatefulSet) -> Vec<String> {
    let name = sset.name_any();
    (0..get_replicas(sset)).map(|i| pod_name(&name, i)).collect()
}

/// Whether the pod reports the Ready condition.
pub fn is_pod_ready(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .is_some_and(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Ready" && c.status == "True")
        })
}

/// Returns true once every scheduled upgrade has been applied.
///
/// For every workload set with a target update revision, only the pods at
/// ordinal >= the rollout partition are checked (descending from
/// replicas - 1 down to the partition), and each must carry the target
/// revision label. A pod expected but not found (e.g. mid-restart) counts as
/// not done rather than as an error.
pub async fn scheduled_upgrades_done<P: PlatformClient>(
    platform: &P,
    cluster: &ClusterRef,
    workload_sets: &WorkloadSetList,
) -> Result<bool> {
    for sset in workload_sets.iter() {
        let update_revision = sset
            .status
            .as_ref()
            .and_then(|s| s.update_revision.as_deref())
            .unwrap_or("");
        if update_revision.is_empty() {
            // no upgrade scheduled
            continue;
        }
        let set_name = sset.name_any();
        let partition = get_partition(sset);
        for ordinal in (partition..get_replicas(sset)).rev() {
            let name = pod_name(&set_name, ordinal);
            let Some(pod) = platform.get_pod(cluster, &name).await? else {
                debug!(pod = %name, "expected pod not found, upgrade not done");
                return Ok(false);
            };
            let pod_revision = pod
                .metadata
                .labels
                .as_ref()
                .and_then(|l| l.get(REVISION_LABEL))
                .map(String::as_str)
                .unwrap_or("");
            if pod_revision != update_revision {
                return Ok(false);
            }
        }
    }
    Ok(true)
}
