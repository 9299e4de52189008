//! Durable transition state, backed by annotations on the DataCluster.
//!
//! The two annotations below are the only source of truth for "already
//! performed" transition decisions. They survive controller restarts, and
//! once one exists it must never be recomputed from current specs: specs may
//! reflect a later desired state than what was actually applied.
//!
//! All parsing and rendering of the annotation values lives here; call sites
//! work with the typed [`TransitionState`] record and its explicit
//! transition methods.
//!
//! # Schema
//!
//! - `datacluster.quorumoperator.dev/initial-master-nodes`: comma-joined
//!   node names (no whitespace), frozen at the first bootstrap decision.
//!   Absent once bootstrap is confirmed complete. An empty value is treated
//!   as absent.
//! - `datacluster.quorumoperator.dev/voting-config-exclusions`: comma-joined
//!   node names, sorted lexicographically. The empty string means "no
//!   exclusions, and this has been confirmed applied"; an absent key means
//!   no confirmation either way. Sorting exists solely to make annotation
//!   comparisons stable; the protocol itself does not care about order.

use crate::crd::DataCluster;
use crate::platform::AnnotationPatch;

/// Annotation holding the frozen initial voting set while bootstrap is in
/// progress.
pub const INITIAL_MASTER_NODES_ANNOTATION: &str =
    "datacluster.quorumoperator.dev/initial-master-nodes";

/// Annotation holding the currently-confirmed voting exclusion set.
pub const VOTING_EXCLUSIONS_ANNOTATION: &str =
    "datacluster.quorumoperator.dev/voting-config-exclusions";

/// Confirmed voting-exclusion state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExclusionRecord {
    /// The given nodes are excluded, confirmed applied.
    Applied(Vec<String>),
    /// No exclusions, confirmed cleared.
    Cleared,
}

/// Typed view of the transition annotations of one DataCluster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionState {
    initial_master_nodes: Option<Vec<String>>,
    exclusions: Option<ExclusionRecord>,
}

impl TransitionState {
    /// Read the transition state from a cluster's annotations.
    pub fn load(cluster: &DataCluster) -> Self {
        let annotations = cluster.metadata.annotations.as_ref();
        let initial_master_nodes = annotations
            .and_then(|a| a.get(INITIAL_MASTER_NODES_ANNOTATION))
            .filter(|v| !v.is_empty())
            .map(|v| split_names(v));
        let exclusions = annotations
            .and_then(|a| a.get(VOTING_EXCLUSIONS_ANNOTATION))
            .map(|v| {
                if v.is_empty() {
                    ExclusionRecord::Cleared
                } else {
                    ExclusionRecord::Applied(split_names(v))
                }
            });
        Self {
            initial_master_nodes,
            exclusions,
        }
    }

    /// The frozen initial voting set, if bootstrap is in progress.
    pub fn initial_master_nodes(&self) -> Option<&[String]> {
        self.initial_master_nodes.as_deref()
    }

    /// The confirmed exclusion record, if any confirmation exists.
    pub fn exclusions(&self) -> Option<&ExclusionRecord> {
        self.exclusions.as_ref()
    }

    /// True once the exclusion set is confirmed cleared.
    pub fn exclusions_cleared(&self) -> bool {
        matches!(self.exclusions, Some(ExclusionRecord::Cleared))
    }

    /// True if the confirmed exclusion set equals the given normalized set.
    pub fn exclusions_match(&self, normalized: &str) -> bool {
        match &self.exclusions {
            Some(ExclusionRecord::Applied(names)) => names.join(",") == normalized,
            Some(ExclusionRecord::Cleared) => normalized.is_empty(),
            None => false,
        }
    }

    /// Transition: freeze the initial voting set.
    ///
    /// Valid only while no frozen value exists; the frozen value must never
    /// be recomputed, only reproduced.
    pub fn freeze_initial_masters(names: &[String]) -> AnnotationPatch {
        vec![(
            INITIAL_MASTER_NODES_ANNOTATION.to_string(),
            Some(names.join(",")),
        )]
    }

    /// Transition: bootstrap confirmed complete, drop the frozen value.
    pub fn complete_bootstrap() -> AnnotationPatch {
        vec![(INITIAL_MASTER_NODES_ANNOTATION.to_string(), None)]
    }

    /// Transition: record a confirmed-applied exclusion set (normalized).
    pub fn record_exclusions(normalized: &str) -> AnnotationPatch {
        vec![(
            VOTING_EXCLUSIONS_ANNOTATION.to_string(),
            Some(normalized.to_string()),
        )]
    }

    /// Transition: record that the exclusion set is confirmed cleared.
    pub fn record_cleared() -> AnnotationPatch {
        vec![(VOTING_EXCLUSIONS_ANNOTATION.to_string(), Some(String::new()))]
    }
}

/// Normalize an exclusion set for comparison and persistence: sorted
/// lexicographically and comma-joined. The caller's slice is left untouched.
pub fn normalize_exclusions(node_names: &[String]) -> String {
    let mut sorted = node_names.to_vec();
    sorted.sort();
    sorted.join(",")
}

fn split_names(value: &str) -> Vec<String> {
    value.split(',').map(str::to_string).collect()
}
