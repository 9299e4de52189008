//! In-memory discovery client for tests.
//!
//! Records every live call so tests can assert how often (and with what) the
//! discovery API was hit, and lets tests script the bootstrap answer or force
//! call failures.

use std::sync::Mutex;

use super::{DiscoveryClient, DiscoveryError};

#[derive(Debug, Default)]
struct FakeState {
    minimum_master_calls: Vec<i32>,
    added_exclusions: Vec<Vec<String>>,
    delete_exclusion_calls: Vec<bool>,
    bootstrapped: bool,
    fail_requests: bool,
}

/// A discovery client that performs no I/O.
#[derive(Debug, Default)]
pub struct FakeDiscoveryClient {
    state: Mutex<FakeState>,
}

impl FakeDiscoveryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the answer of [`DiscoveryClient::is_bootstrapped`].
    pub fn set_bootstrapped(&self, bootstrapped: bool) {
        self.lock().bootstrapped = bootstrapped;
    }

    /// Make every subsequent call fail with a server error.
    pub fn fail_requests(&self, fail: bool) {
        self.lock().fail_requests = fail;
    }

    /// Arguments of every minimum-master-nodes call so far.
    pub fn minimum_master_calls(&self) -> Vec<i32> {
        self.lock().minimum_master_calls.clone()
    }

    /// Node-name lists of every add-voting-exclusions call so far.
    pub fn added_exclusions(&self) -> Vec<Vec<String>> {
        self.lock().added_exclusions.clone()
    }

    /// `wait_for_removal` flags of every delete-voting-exclusions call so far.
    pub fn delete_exclusion_calls(&self) -> Vec<bool> {
        self.lock().delete_exclusion_calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_failure(&self) -> Result<(), DiscoveryError> {
        if self.lock().fail_requests {
            return Err(DiscoveryError::Api {
                status: 503,
                body: "fake unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl DiscoveryClient for FakeDiscoveryClient {
    async fn set_minimum_master_nodes(&self, count: i32) -> Result<(), DiscoveryError> {
        self.check_failure()?;
        self.lock().minimum_master_calls.push(count);
        Ok(())
    }

    async fn add_voting_exclusions(&self, node_names: &[String]) -> Result<(), DiscoveryError> {
        self.check_failure()?;
        self.lock().added_exclusions.push(node_names.to_vec());
        Ok(())
    }

    async fn delete_voting_exclusions(&self, wait_for_removal: bool) -> Result<(), DiscoveryError> {
        self.check_failure()?;
        self.lock().delete_exclusion_calls.push(wait_for_removal);
        Ok(())
    }

    async fn is_bootstrapped(&self) -> Result<bool, DiscoveryError> {
        self.check_failure()?;
        Ok(self.lock().bootstrapped)
    }
}
