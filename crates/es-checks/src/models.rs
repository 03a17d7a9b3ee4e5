//! Statistics API payload models.
//!
//! Only the fields the checks read are modelled. Everything below the
//! top-level `nodes` key is optional because the layout drifts between server
//! versions; absence is kept distinct from zero.

use std::collections::BTreeMap;

use serde::Deserialize;

// ============================================================================
// Nodes stats / nodes info
// ============================================================================

/// `GET /_nodes/stats` response.
#[derive(Debug, Deserialize)]
pub struct NodesStatsResponse {
    /// Per-node statistics keyed by node ID.
    pub nodes: BTreeMap<String, NodeStats>,
}

/// Statistics for one node.
#[derive(Debug, Default, Deserialize)]
pub struct NodeStats {
    /// Node name.
    pub name: Option<String>,
    /// Process statistics.
    pub process: Option<ProcessStats>,
    /// JVM statistics.
    pub jvm: Option<JvmStats>,
    /// Circuit breakers keyed by breaker name.
    pub breakers: Option<BTreeMap<String, BreakerStats>>,
}

/// Process section of nodes stats / nodes info.
///
/// Servers report `-1` when a figure is unavailable on the platform.
#[derive(Debug, Default, Deserialize)]
pub struct ProcessStats {
    /// Currently open file descriptors.
    pub open_file_descriptors: Option<i64>,
    /// File descriptor limit (nodes stats from 2.0, nodes info before).
    pub max_file_descriptors: Option<i64>,
}

/// JVM section.
#[derive(Debug, Default, Deserialize)]
pub struct JvmStats {
    /// Memory figures.
    pub mem: Option<JvmMem>,
}

/// JVM memory figures.
#[derive(Debug, Default, Deserialize)]
pub struct JvmMem {
    /// Heap in use.
    pub heap_used_in_bytes: Option<u64>,
    /// Heap limit.
    pub heap_max_in_bytes: Option<u64>,
}

/// One circuit breaker.
#[derive(Debug, Default, Deserialize)]
pub struct BreakerStats {
    /// Number of times the breaker has tripped.
    pub tripped: Option<u64>,
}

/// `GET /_nodes` response.
#[derive(Debug, Deserialize)]
pub struct NodesInfoResponse {
    /// Per-node info keyed by node ID.
    pub nodes: BTreeMap<String, NodeInfo>,
}

/// Info for one node.
#[derive(Debug, Default, Deserialize)]
pub struct NodeInfo {
    /// Process info.
    pub process: Option<ProcessStats>,
}

// ============================================================================
// Cluster endpoints
// ============================================================================

/// `GET /_cluster/health` response.
#[derive(Debug, Deserialize)]
pub struct ClusterHealthResponse {
    /// Cluster name.
    pub cluster_name: Option<String>,
    /// `green`, `yellow` or `red`.
    pub status: Option<String>,
    /// Set when `wait_for_status` gave up.
    pub timed_out: Option<bool>,
}

/// `GET /_cluster/state/master_node` response.
#[derive(Debug, Deserialize)]
pub struct ClusterStateResponse {
    /// ID of the elected master, if any.
    pub master_node: Option<String>,
}

/// `GET /_cluster/stats` response.
#[derive(Debug, Deserialize)]
pub struct ClusterStatsResponse {
    /// Node-level aggregates.
    pub nodes: ClusterStatsNodes,
}

/// `nodes` section of cluster stats.
#[derive(Debug, Default, Deserialize)]
pub struct ClusterStatsNodes {
    /// Versions running in the cluster.
    pub versions: Option<Vec<String>>,
    /// Cluster-wide JVM aggregates.
    pub jvm: Option<JvmStats>,
}
