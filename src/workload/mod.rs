//! Expected-vs-actual workload-set reconciliation tracking.
//!
//! Given a cluster, retrieves the workload sets and pods belonging to it and
//! answers the reconciliation-status queries the quorum and transition
//! coordinators depend on: are expected pods present? are scheduled upgrades
//! applied? which sets still have a rollout pending?

mod list;
mod pods;

pub use list::{WorkloadSetList, retrieve_workload_sets};
pub use pods::{
    REVISION_LABEL, get_partition, get_replicas, is_pod_ready, pod_name, pod_names,
    scheduled_upgrades_done,
};
