//! Voting exclusions for planned master removal.
//!
//! Before a master-eligible node is removed, it is excluded from the voting
//! set so it cannot block quorum once gone; the exclusion is cleared only
//! after the removal has fully reconciled. Both operations are idempotent
//! through the exclusion annotation: an exclusion set is only sent to the
//! live API when it differs from the last confirmed one.

use tracing::{debug, info};

use super::state::{self, TransitionState};
use crate::client::DiscoveryClient;
use crate::compat;
use crate::crd::{ClusterRef, DataCluster};
use crate::error::Result;
use crate::platform::PlatformClient;
use crate::workload::WorkloadSetList;

/// Exclude the given nodes from the voting set.
///
/// Skipped unless every currently-observed master runs the modern protocol:
/// mutating voting membership while protocols are mixed is unsafe. Skipped
/// without a live call when the confirmed exclusion set already equals the
/// requested one. The caller's slice is never mutated.
pub async fn add_voting_exclusions<P: PlatformClient, D: DiscoveryClient>(
    platform: &P,
    discovery: &D,
    cluster: &DataCluster,
    node_names: &[String],
) -> Result<()> {
    let cluster_ref = ClusterRef::from_cluster(cluster);
    let masters = platform.master_pods(&cluster_ref).await?;
    if !compat::all_masters_match(&masters, compat::is_modern_compatible)? {
        debug!(cluster = %cluster_ref, "skipping voting exclusions: masters not all modern");
        return Ok(());
    }

    let normalized = state::normalize_exclusions(node_names);
    let current = TransitionState::load(cluster);
    if current.exclusions_match(&normalized) {
        debug!(cluster = %cluster_ref, exclusions = %normalized, "voting exclusions already applied");
        return Ok(());
    }

    info!(cluster = %cluster_ref, exclusions = %normalized, "adding voting exclusions");
    let mut sorted = node_names.to_vec();
    sorted.sort();
    discovery.add_voting_exclusions(&sorted).await?;
    platform
        .update_annotations(&cluster_ref, &TransitionState::record_exclusions(&normalized))
        .await
}

/// Clear all voting exclusions once master removal has fully reconciled.
///
/// Returns true (without erroring) when clearing must be retried later
/// because pods are not reconciled yet: exclusions exist specifically to
/// protect masters being removed, and clearing early while removal is in
/// flight risks re-admitting a half-removed node to voting.
pub async fn clear_voting_exclusions<P: PlatformClient, D: DiscoveryClient>(
    platform: &P,
    discovery: &D,
    cluster: &DataCluster,
    actual_sets: &WorkloadSetList,
) -> Result<bool> {
    let cluster_ref = ClusterRef::from_cluster(cluster);
    let masters = platform.master_pods(&cluster_ref).await?;
    if !compat::all_masters_match(&masters, compat::is_modern_compatible)? {
        return Ok(false);
    }

    let current = TransitionState::load(cluster);
    if current.exclusions_cleared() {
        // already confirmed cleared
        return Ok(false);
    }

    let (done, reason) = actual_sets
        .pod_reconciliation_done(platform, &cluster_ref)
        .await?;
    if !done {
        info!(
            cluster = %cluster_ref,
            reason = %reason,
            "cannot clear voting exclusions: pods not yet reconciled"
        );
        return Ok(true);
    }

    info!(cluster = %cluster_ref, "clearing voting exclusions");
    discovery.delete_voting_exclusions(false).await?;
    platform
        .update_annotations(&cluster_ref, &TransitionState::record_cleared())
        .await?;
    Ok(false)
}
