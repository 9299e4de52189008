//! Discovery-protocol API client for the managed data cluster.
//!
//! The cluster exposes an HTTP/JSON administration API for the handful of
//! discovery-protocol operations this subsystem drives: setting the legacy
//! minimum-master-count, mutating the modern protocol's voting exclusion
//! set, and reporting whether the modern protocol has bootstrapped.
//!
//! One trait, two implementations:
//! - [`HttpDiscoveryClient`]: production client with a fixed request timeout
//! - [`fake::FakeDiscoveryClient`]: in-memory recording client for tests

pub mod fake;
mod http;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

pub use http::{DiscoveryClientConfig, HttpDiscoveryClient};

/// Errors from the discovery-protocol API.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Transport-level failure (connect, TLS, timeout).
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error: status {status}: {body}")]
    Api { status: u16, body: String },

    /// The API answered with a body we could not interpret.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Timeout after the configured request budget.
    #[error("timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },
}

impl DiscoveryError {
    /// Check if this error is worth retrying on a later reconciliation pass.
    pub fn is_retryable(&self) -> bool {
        match self {
            DiscoveryError::Request(_) | DiscoveryError::Timeout { .. } => true,
            DiscoveryError::Api { status, .. } => *status >= 500 || *status == 429,
            DiscoveryError::UnexpectedResponse(_) => false,
        }
    }
}

/// Operations of the discovery-protocol administration API.
///
/// Every call is a single synchronous network round-trip bounded by the
/// client's request timeout; retry is the caller's concern (next
/// reconciliation pass), never this trait's.
pub trait DiscoveryClient: Send + Sync {
    /// Set the legacy protocol's minimum master count.
    fn set_minimum_master_nodes(
        &self,
        count: i32,
    ) -> impl Future<Output = Result<(), DiscoveryError>> + Send;

    /// Exclude the given nodes from the modern protocol's voting set.
    fn add_voting_exclusions(
        &self,
        node_names: &[String],
    ) -> impl Future<Output = Result<(), DiscoveryError>> + Send;

    /// Delete all voting exclusions.
    ///
    /// When `wait_for_removal` is true the API blocks until the excluded
    /// nodes have left the cluster; this subsystem always passes false and
    /// relies on the reconciliation-done gate instead.
    fn delete_voting_exclusions(
        &self,
        wait_for_removal: bool,
    ) -> impl Future<Output = Result<(), DiscoveryError>> + Send;

    /// Whether the modern protocol has committed its first voting
    /// configuration.
    fn is_bootstrapped(&self) -> impl Future<Output = Result<bool, DiscoveryError>> + Send;
}
