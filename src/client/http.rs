//! HTTP implementation of the discovery-protocol client.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::{DiscoveryClient, DiscoveryError};

/// Default per-request timeout for discovery API calls.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for connecting to a cluster's administration API.
#[derive(Clone, Debug)]
pub struct DiscoveryClientConfig {
    /// Base URL of the administration API (e.g. `https://my-cluster.ns.svc:9200`).
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Basic-auth credentials, if the API requires them.
    pub credentials: Option<(String, String)>,
}

impl DiscoveryClientConfig {
    /// Create a new configuration for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            credentials: None,
        }
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set basic-auth credentials.
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((user.into(), password.into()));
        self
    }
}

/// Production discovery-protocol client speaking the cluster's HTTP/JSON
/// administration API.
#[derive(Clone, Debug)]
pub struct HttpDiscoveryClient {
    http: reqwest::Client,
    config: DiscoveryClientConfig,
}

/// Shape of the coordination-state response.
#[derive(Debug, Deserialize)]
struct CoordinationState {
    /// Node IDs of the last committed voting configuration; empty until the
    /// modern protocol has bootstrapped.
    #[serde(default)]
    last_committed_config: Vec<String>,
}

impl HttpDiscoveryClient {
    /// Build a client from the given configuration.
    pub fn new(config: DiscoveryClientConfig) -> Result<Self, DiscoveryError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, self.url(path));
        if let Some((user, password)) = &self.config.credentials {
            req = req.basic_auth(user, Some(password));
        }
        req
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, DiscoveryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(DiscoveryError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

impl DiscoveryClient for HttpDiscoveryClient {
    async fn set_minimum_master_nodes(&self, count: i32) -> Result<(), DiscoveryError> {
        debug!(count, "setting minimum master nodes");
        let body = serde_json::json!({
            "transient": { "discovery.minimum_master_nodes": count }
        });
        let response = self
            .request(reqwest::Method::PUT, "/_cluster/settings")
            .json(&body)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn add_voting_exclusions(&self, node_names: &[String]) -> Result<(), DiscoveryError> {
        debug!(nodes = %node_names.join(","), "adding voting exclusions");
        let path = format!(
            "/_cluster/voting_exclusions?node_names={}",
            node_names.join(",")
        );
        let response = self.request(reqwest::Method::POST, &path).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn delete_voting_exclusions(&self, wait_for_removal: bool) -> Result<(), DiscoveryError> {
        debug!(wait_for_removal, "deleting voting exclusions");
        let path = format!(
            "/_cluster/voting_exclusions?wait_for_removal={}",
            wait_for_removal
        );
        let response = self.request(reqwest::Method::DELETE, &path).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn is_bootstrapped(&self) -> Result<bool, DiscoveryError> {
        let response = self
            .request(reqwest::Method::GET, "/_cluster/state/coordination")
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let state: CoordinationState = response
            .json()
            .await
            .map_err(|e| DiscoveryError::UnexpectedResponse(e.to_string()))?;
        Ok(!state.last_committed_config.is_empty())
    }
}
