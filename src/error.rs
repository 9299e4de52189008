//! Error types for the quorum subsystem.
//!
//! Defines the crate-wide error type with classification for retry behavior.
//! Transient "unsafe to act yet" conditions (not enough available masters,
//! pods not reconciled, bootstrap not confirmed) are NOT errors: the
//! functions concerned return an explicit retry-later boolean instead.

use thiserror::Error;

use crate::client::DiscoveryError;

/// Error type for quorum and discovery-transition operations
#[derive(Error, Debug)]
pub enum Error {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// Discovery-protocol API error
    #[error("discovery API error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// A version label could not be parsed
    #[error("cannot parse version {value:?}: {source}")]
    InvalidVersion {
        value: String,
        #[source]
        source: semver::Error,
    },

    /// A required version label is absent
    #[error("missing version label on {0}")]
    MissingVersion(String),

    /// No master node name could be computed when one is required
    #[error("no master node found to compute the initial voting set")]
    NoMasterNodes,

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Check if this error indicates a not-found condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Kube(kube::Error::Api(e)) if e.code == 404)
    }

    /// Check if this error should be retried by the caller's backoff policy
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Kube(e) => {
                // Retry on conflicts, rate limiting, and server errors
                matches!(
                    e,
                    kube::Error::Api(api_err) if api_err.code >= 500 || api_err.code == 429 || api_err.code == 409
                ) || matches!(e, kube::Error::Service(_))
            }
            Error::Discovery(e) => e.is_retryable(),
            Error::InvalidVersion { .. }
            | Error::MissingVersion(_)
            | Error::NoMasterNodes
            | Error::Serialization(_) => false,
        }
    }
}

/// Result type alias for quorum subsystem operations
pub type Result<T> = std::result::Result<T, Error>;
