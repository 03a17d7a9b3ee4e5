//! In-memory [`StatsFetcher`] for pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use es_client::{ClusterHealthOptions, FetchError, NodeScope, RequestOptions, StatsFetcher};
use serde_json::Value;

/// Serves canned payloads keyed by endpoint and records every call.
#[derive(Debug, Default)]
pub struct FakeFetcher {
    responses: HashMap<&'static str, Value>,
    calls: Mutex<Vec<String>>,
    health_options: Mutex<Option<ClusterHealthOptions>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the payload for `endpoint` (`nodes_stats`, `local_nodes_stats`,
    /// `nodes_info`, `cluster_health`, `cluster_state`, `cluster_stats`).
    pub fn with(mut self, endpoint: &'static str, payload: Value) -> Self {
        self.responses.insert(endpoint, payload);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn health_options(&self) -> Option<ClusterHealthOptions> {
        self.health_options.lock().unwrap().clone()
    }

    fn respond(&self, endpoint: &'static str) -> Result<Value, FetchError> {
        self.calls.lock().unwrap().push(endpoint.to_string());
        self.responses
            .get(endpoint)
            .cloned()
            .ok_or_else(|| FetchError::Api {
                status: 404,
                message: format!("no fixture for {endpoint}"),
            })
    }
}

#[async_trait]
impl StatsFetcher for FakeFetcher {
    async fn nodes_stats(
        &self,
        scope: NodeScope,
        _options: &RequestOptions,
    ) -> Result<Value, FetchError> {
        match scope {
            NodeScope::All => self.respond("nodes_stats"),
            NodeScope::Local => self.respond("local_nodes_stats"),
        }
    }

    async fn nodes_info(&self) -> Result<Value, FetchError> {
        self.respond("nodes_info")
    }

    async fn cluster_health(&self, options: &ClusterHealthOptions) -> Result<Value, FetchError> {
        *self.health_options.lock().unwrap() = Some(options.clone());
        self.respond("cluster_health")
    }

    async fn cluster_state(&self, _options: &RequestOptions) -> Result<Value, FetchError> {
        self.respond("cluster_state")
    }

    async fn cluster_stats(&self, _options: &RequestOptions) -> Result<Value, FetchError> {
        self.respond("cluster_stats")
    }
}
