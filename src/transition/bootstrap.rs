//! One-time bootstrap of the modern discovery protocol.
//!
//! A brand-new modern cluster (or a non-HA legacy cluster whose masters are
//! upgraded in place) must be told its initial voting set. The computed set
//! is frozen into an annotation before specs are applied, so a controller
//! crash between "patch config" and "apply" cannot make the value drift on
//! the next pass. Once the protocol confirms it has formed around the
//! frozen set, the annotation is deleted.

use std::collections::BTreeSet;

use kube::ResourceExt;
use tracing::{debug, info};

use super::state::TransitionState;
use crate::client::DiscoveryClient;
use crate::compat;
use crate::crd::{ClusterRef, DataCluster};
use crate::error::{Error, Result};
use crate::label;
use crate::nodeset::ResourcesList;
use crate::platform::PlatformClient;
use crate::settings::INITIAL_MASTER_NODES;
use crate::workload::pod_names;

/// Set the initial voting set on modern master node sets, if necessary.
///
/// If a frozen value exists it is re-applied verbatim and never recomputed.
/// Otherwise the value is computed for modern clusters that have never
/// formed (or that qualify for the non-HA in-place upgrade, see
/// [`non_ha_legacy_master_upgrade`]), patched into every modern master node
/// set's configuration, and then persisted into the annotation.
pub async fn setup_initial_masters<P: PlatformClient>(
    platform: &P,
    cluster: &DataCluster,
    resources: &mut ResourcesList,
) -> Result<()> {
    let state = TransitionState::load(cluster);
    if let Some(frozen) = state.initial_master_nodes() {
        // bootstrap in progress: the value must not vary over time
        let frozen = frozen.to_vec();
        patch_initial_masters_config(resources, &frozen);
        return Ok(());
    }

    if !should_set_initial_masters(platform, cluster, resources).await? {
        return Ok(());
    }

    let initial_masters = resources.master_node_names();
    if initial_masters.is_empty() {
        return Err(Error::NoMasterNodes);
    }

    let cluster_ref = ClusterRef::from_cluster(cluster);
    info!(
        cluster = %cluster_ref,
        initial_master_nodes = %initial_masters.join(","),
        "setting the initial voting set"
    );
    patch_initial_masters_config(resources, &initial_masters);
    // keep the computed value for reuse in subsequent reconciliations
    platform
        .update_annotations(
            &cluster_ref,
            &TransitionState::freeze_initial_masters(&initial_masters),
        )
        .await
}

/// Delete the bootstrap annotation once the protocol has confirmed forming.
///
/// Returns true (without erroring) when bootstrap is still pending and the
/// check should be retried on a later pass.
pub async fn clear_bootstrap_annotation<P: PlatformClient, D: DiscoveryClient>(
    platform: &P,
    discovery: &D,
    cluster: &DataCluster,
) -> Result<bool> {
    let version = label::parse_version(&cluster.spec.version)?;
    if !compat::is_modern_compatible(&version) {
        return Ok(false);
    }
    let state = TransitionState::load(cluster);
    if state.initial_master_nodes().is_none() {
        // most common case: no bootstrap in progress
        return Ok(false);
    }
    if !discovery.is_bootstrapped().await? {
        return Ok(true);
    }
    let cluster_ref = ClusterRef::from_cluster(cluster);
    info!(cluster = %cluster_ref, "protocol bootstrap is complete");
    platform
        .update_annotations(&cluster_ref, &TransitionState::complete_bootstrap())
        .await?;
    Ok(false)
}

async fn should_set_initial_masters<P: PlatformClient>(
    platform: &P,
    cluster: &DataCluster,
    resources: &ResourcesList,
) -> Result<bool> {
    let version = label::parse_version(&cluster.spec.version)?;
    if !compat::is_modern_compatible(&version) {
        // only modern clusters bootstrap a voting configuration
        return Ok(false);
    }
    // a cluster that never formed needs the initial voting set
    if !cluster_formed(cluster) {
        return Ok(true);
    }
    // a formed cluster only needs it again for the non-HA in-place upgrade
    non_ha_legacy_master_upgrade(platform, cluster, resources).await
}

/// The "has this cluster ever formed" signal, maintained by the surrounding
/// framework and only consumed here.
fn cluster_formed(cluster: &DataCluster) -> bool {
    cluster
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(label::CLUSTER_UUID_ANNOTATION))
        .is_some_and(|v| !v.is_empty())
}

/// True if the declared node sets will replace the one or two legacy masters
/// currently running, in place and all at once.
///
/// One- and two-master clusters upgrade all masters simultaneously, so there
/// is no surviving cluster to join once the legacy masters terminate and the
/// initial voting set must be provided again. The match is deliberately
/// all-or-nothing: any already-modern master, any target set larger than
/// two, and any current master absent from the target disables the trigger
/// (extra masters get created before existing ones restart, and renamed
/// masters get created before the old ones are removed).
async fn non_ha_legacy_master_upgrade<P: PlatformClient>(
    platform: &P,
    cluster: &DataCluster,
    resources: &ResourcesList,
) -> Result<bool> {
    let cluster_ref = ClusterRef::from_cluster(cluster);
    let masters = platform.master_pods(&cluster_ref).await?;
    if masters.len() > 2 {
        return Ok(false);
    }

    let mut current_masters = BTreeSet::new();
    for master in &masters {
        current_masters.insert(master.name_any());
        let version = label::pod_version(master)?;
        if compat::is_modern_compatible(&version) {
            // at least one master already runs the modern protocol
            return Ok(false);
        }
    }

    let target_masters: BTreeSet<String> = resources
        .iter()
        .filter(|r| label::is_master_node_set(&r.statefulset))
        .flat_map(|r| pod_names(&r.statefulset))
        .collect();
    if target_masters.is_empty() || target_masters.len() > 2 {
        return Ok(false);
    }
    if current_masters.difference(&target_masters).next().is_some() {
        return Ok(false);
    }
    debug!(cluster = %cluster_ref, "non-HA legacy masters will be replaced in place");
    Ok(true)
}

fn patch_initial_masters_config(resources: &mut ResourcesList, initial_masters: &[String]) {
    for res in resources.iter_mut() {
        if !label::is_master_node_set(&res.statefulset)
            || !compat::node_set_matches(&res.statefulset, compat::is_modern_compatible)
        {
            // only modern masters carry the initial voting set
            continue;
        }
        res.config.set_strings(INITIAL_MASTER_NODES, initial_masters);
    }
}
