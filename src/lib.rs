//! quorum-operator library crate
//!
//! Safely evolves the topology of quorum-based DataCluster deployments
//! during scale-up/down, version upgrades, and rolling restarts: the cluster
//! must never be left with ambiguous or insufficient master-eligible
//! membership while it migrates between the legacy (quorum-based) and the
//! modern (voting-configuration-based) discovery protocol.
//!
//! This crate owns the decision logic only. It is invoked as a library by an
//! outer reconcile loop, which applies workload manifests and serializes
//! reconciliations per cluster; everything here is single-threaded within
//! one pass and recomputes from freshly-read state.
//!
//! ## Modules
//!
//! - [`workload`]: expected-vs-actual reconciliation tracking for the
//!   cluster's workload sets and pods
//! - [`compat`]: legacy/modern discovery-protocol compatibility gates
//! - [`quorum`]: legacy minimum-master-count coordination
//! - [`transition`]: modern-protocol bootstrap and voting exclusions
//! - [`platform`] / [`client`]: the narrow interfaces to the orchestration
//!   platform and the cluster's own administration API, each with one
//!   production implementation and one in-memory fake
//!
//! ## Ordering within one reconciliation pass
//!
//! Quorum and voting decisions are made strictly after the current workload
//! set and pod state has been read. Configuration patches
//! ([`quorum::setup_minimum_masters_config`],
//! [`transition::setup_initial_masters`]) happen before specs are applied to
//! the platform; live API calls ([`quorum::update_minimum_masters`],
//! [`transition::add_voting_exclusions`],
//! [`transition::clear_voting_exclusions`],
//! [`transition::clear_bootstrap_annotation`]) happen after pods are
//! verified present.

pub mod client;
pub mod compat;
pub mod crd;
pub mod error;
pub mod label;
pub mod nodeset;
pub mod platform;
pub mod quorum;
pub mod settings;
pub mod testing;
pub mod transition;
pub mod workload;

pub use error::{Error, Result};
