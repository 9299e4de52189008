//! Legacy-protocol minimum-master-count coordination.
//!
//! Keeps the legacy discovery protocol's minimum-master setting consistent
//! with reality, both in declared configuration (before workload specs are
//! applied) and through a live API call (after pods are verified present).
//! All decisions are recomputed on every pass from observed master-eligible
//! membership; nothing is cached.

use kube::ResourceExt;
use tracing::{debug, info};

use crate::client::DiscoveryClient;
use crate::compat;
use crate::crd::ClusterRef;
use crate::error::Result;
use crate::label;
use crate::nodeset::ResourcesList;
use crate::platform::PlatformClient;
use crate::settings::DISCOVERY_MINIMUM_MASTERS;
use crate::workload::{WorkloadSetList, get_replicas, is_pod_ready};

/// Majority of the given master count.
///
/// Ties round toward requiring a strict majority: 2 masters need 2, 3 need
/// 2, 4 need 3. Zero masters is the degenerate "no masters" case and yields
/// zero so it never blocks patching.
pub fn quorum(n_masters: i32) -> i32 {
    if n_masters == 0 {
        return 0;
    }
    n_masters / 2 + 1
}

/// Patch the minimum-master setting into the configuration of legacy
/// node sets, before their specs are applied.
///
/// Skipped entirely unless at least one node set declaration or one
/// currently-running master pod is legacy-compatible: during a rolling
/// upgrade the specs may already be modern while legacy masters still run,
/// so both must be checked.
///
/// The master count crosses a subtle but deliberate line between trusting
/// the spec and trusting observed pods. A node set declaring the master role
/// contributes its declared replica count. A node set that no longer
/// declares it (mid-role-change) contributes the master-eligible pods
/// actually observed for it instead: the spec can say "no masters" while
/// legacy masters are still alive, and trusting it would shrink the setting
/// prematurely and risk split-brain on a container restart.
pub async fn setup_minimum_masters_config<P: PlatformClient>(
    platform: &P,
    cluster: &ClusterRef,
    resources: &mut ResourcesList,
) -> Result<()> {
    let masters = platform.master_pods(cluster).await?;
    if !compat::any_legacy(resources.statefulsets(), &masters)? {
        return Ok(());
    }

    let mut master_count = 0;
    let mut contributes = vec![false; resources.len()];
    for (i, res) in resources.iter().enumerate() {
        if label::is_master_node_set(&res.statefulset) {
            master_count += get_replicas(&res.statefulset);
            contributes[i] = true;
        } else {
            let pods = platform
                .pods_for_node_set(cluster, &res.statefulset.name_any())
                .await?;
            let observed = label::filter_master_pods(&pods).len() as i32;
            master_count += observed;
            contributes[i] = observed > 0;
        }
    }

    let minimum_masters = quorum(master_count);
    if minimum_masters == 0 {
        // degenerate no-masters case: leave configurations untouched
        return Ok(());
    }

    debug!(
        cluster = %cluster,
        master_count,
        minimum_masters,
        "patching legacy minimum master nodes configuration"
    );
    for (i, res) in resources.iter_mut().enumerate() {
        if !contributes[i]
            || !compat::node_set_matches(&res.statefulset, compat::is_legacy_compatible)
        {
            continue;
        }
        res.config.set_int(DISCOVERY_MINIMUM_MASTERS, minimum_masters);
    }
    Ok(())
}

/// Update the minimum-master setting through the live API.
///
/// Returns true (without erroring) when the call must be retried later:
/// issuing it while fewer masters are available than the target would
/// temporarily demand more available masters than exist.
pub async fn update_minimum_masters<P: PlatformClient, D: DiscoveryClient>(
    platform: &P,
    discovery: &D,
    cluster: &ClusterRef,
    actual_sets: &WorkloadSetList,
) -> Result<bool> {
    let masters = platform.master_pods(cluster).await?;
    if !compat::any_legacy(actual_sets.iter(), &masters)? {
        return Ok(false);
    }

    let total = masters.len() as i32;
    let available = masters.iter().filter(|p| is_pod_ready(p)).count() as i32;
    let minimum_masters = quorum(total);

    if available < minimum_masters {
        debug!(
            cluster = %cluster,
            available,
            minimum_masters,
            "not enough available masters to set minimum master nodes, will retry"
        );
        return Ok(true);
    }

    info!(cluster = %cluster, minimum_masters, "updating minimum master nodes through the API");
    discovery.set_minimum_master_nodes(minimum_masters).await?;
    Ok(false)
}
