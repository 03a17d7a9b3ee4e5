//! Fetcher trait and request option types.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;

/// Which nodes a nodes-stats call covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeScope {
    /// Every node in the cluster.
    #[default]
    All,
    /// Only the node that answers the request.
    Local,
}

/// Options shared by the stats/state endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Server-side timeout in seconds, sent as `timeout=<n>s`.
    pub timeout_secs: Option<u64>,
}

impl RequestOptions {
    /// Options with a server-side timeout.
    #[must_use]
    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            timeout_secs: Some(timeout_secs),
        }
    }
}

/// Options for the cluster health endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterHealthOptions {
    /// Level of detail (`cluster`, `indices`, `shards`), passed through as-is.
    pub level: Option<String>,
    /// Answer from the local node instead of the master.
    pub local: bool,
    /// Restrict health to an index or index pattern.
    pub index: Option<String>,
    /// Block until the cluster reaches this status (e.g. `green`).
    pub wait_for_status: Option<String>,
    /// Server-side timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Read-only view of the cluster's administrative statistics API.
///
/// Every method returns the raw JSON payload; interpretation happens in the
/// checks.
#[async_trait]
pub trait StatsFetcher: Send + Sync {
    /// `GET /_nodes/stats` (or `/_nodes/_local/stats`).
    async fn nodes_stats(
        &self,
        scope: NodeScope,
        options: &RequestOptions,
    ) -> Result<Value, FetchError>;

    /// `GET /_nodes`.
    async fn nodes_info(&self) -> Result<Value, FetchError>;

    /// `GET /_cluster/health`.
    async fn cluster_health(&self, options: &ClusterHealthOptions) -> Result<Value, FetchError>;

    /// `GET /_cluster/state/master_node`.
    async fn cluster_state(&self, options: &RequestOptions) -> Result<Value, FetchError>;

    /// `GET /_cluster/stats`.
    async fn cluster_stats(&self, options: &RequestOptions) -> Result<Value, FetchError>;
}
