//! Discovery-protocol compatibility gates.
//!
//! Classifies a node's data-cluster version as compatible with the legacy
//! (quorum-based) or the modern (voting-configuration-based) discovery
//! protocol. The threshold is fixed by the protocol's own history: major
//! version 7 introduced the modern protocol.

use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use semver::Version;
use tracing::error;

use crate::error::Result;
use crate::label;

/// First major version speaking the modern discovery protocol.
const MODERN_MIN_MAJOR: u64 = 7;

/// True if the version uses the legacy quorum-based protocol.
pub fn is_legacy_compatible(version: &Version) -> bool {
    version.major < MODERN_MIN_MAJOR
}

/// True if the version uses the modern voting-configuration-based protocol.
pub fn is_modern_compatible(version: &Version) -> bool {
    version.major >= MODERN_MIN_MAJOR
}

/// Apply a version predicate to a workload set's declared version.
///
/// Fails closed: an unparsable or absent version label is logged and never
/// matches.
pub fn node_set_matches(sset: &StatefulSet, predicate: impl Fn(&Version) -> bool) -> bool {
    match label::node_set_version(sset) {
        Ok(version) => predicate(&version),
        Err(err) => {
            error!(
                workload_set = %sset.name_any(),
                error = %err,
                "cannot parse version from workload set"
            );
            false
        }
    }
}

/// True if at least one workload set's declared version matches.
pub fn any_node_set_matches<'a>(
    ssets: impl IntoIterator<Item = &'a StatefulSet>,
    predicate: impl Fn(&Version) -> bool,
) -> bool {
    ssets.into_iter().any(|s| node_set_matches(s, &predicate))
}

/// True if at least one of the given pods' versions matches.
///
/// Unlike workload-set matching this is a hard error on an unparsable pod
/// version: a running node without a valid version label is an operator bug,
/// not a user input to tolerate.
pub fn any_master_matches(masters: &[Pod], predicate: impl Fn(&Version) -> bool) -> Result<bool> {
    for pod in masters {
        if predicate(&label::pod_version(pod)?) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// True if every one of the given master pods' versions matches.
///
/// Zero masters yields false: with no observed masters there is no basis to
/// assert "all compatible", and callers must not mutate voting membership.
pub fn all_masters_match(masters: &[Pod], predicate: impl Fn(&Version) -> bool) -> Result<bool> {
    if masters.is_empty() {
        return Ok(false);
    }
    for pod in masters {
        if !predicate(&label::pod_version(pod)?) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// The dual legacy check of the quorum coordinator: true if at least one
/// workload set declaration, or at least one currently-running master pod,
/// is legacy-compatible.
///
/// Both sides matter during a rolling upgrade: specs may already be modern
/// while legacy masters still run, because specs lag reality mid-rollout.
pub fn any_legacy<'a>(
    ssets: impl IntoIterator<Item = &'a StatefulSet>,
    masters: &[Pod],
) -> Result<bool> {
    if any_node_set_matches(ssets, is_legacy_compatible) {
        return Ok(true);
    }
    any_master_matches(masters, is_legacy_compatible)
}
