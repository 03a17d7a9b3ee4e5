//! Extraction of version-appropriate fields into a stable metric model.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::CheckError;
use crate::models::{
    ClusterHealthResponse, ClusterStateResponse, ClusterStatsResponse, NodesInfoResponse,
    NodesStatsResponse,
};
use crate::snapshot::StatsSnapshot;
use crate::version::{FdLimitSource, ServerVersion};

/// Identifier of one cluster member, unique within a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-node figures. `None` means the server did not report the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedNodeMetrics {
    pub name: Option<String>,
    pub open_fds: Option<u64>,
    pub max_fds: Option<u64>,
    /// Trip counters keyed by breaker name.
    pub breaker_trips: Option<BTreeMap<String, u64>>,
    pub heap_used_bytes: Option<u64>,
    pub heap_max_bytes: Option<u64>,
}

impl NormalizedNodeMetrics {
    /// Names of breakers whose trip counter is non-zero.
    pub fn tripped_breakers(&self) -> impl Iterator<Item = &str> + '_ {
        self.breaker_trips
            .iter()
            .flatten()
            .filter(|(_, trips)| **trips != 0)
            .map(|(name, _)| name.as_str())
    }
}

/// Normalized metrics for every node in nodes-stats.
pub type NodeMetrics = BTreeMap<NodeId, NormalizedNodeMetrics>;

/// Elected master as reported by cluster state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MasterNode {
    /// Cluster state was not part of the snapshot.
    #[default]
    NotQueried,
    /// Cluster state reports no elected master.
    NoneElected,
    Elected(NodeId),
}

/// Cluster-scope figures read directly from the cluster endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterFacts {
    pub heap_used_bytes: Option<u64>,
    pub heap_max_bytes: Option<u64>,
    /// Raw health status string.
    pub health_status: Option<String>,
    /// Health request gave up waiting for the requested status.
    pub health_timed_out: bool,
    pub master: MasterNode,
    /// Node that answered the node-scoped stats call.
    pub local: Option<NodeId>,
}

fn parse<T: DeserializeOwned>(payload: &Value, endpoint: &str) -> Result<T, CheckError> {
    T::deserialize(payload).map_err(|e| CheckError::shape(format!("{endpoint}: {e}")))
}

fn nonnegative(value: i64) -> Option<u64> {
    u64::try_from(value).ok()
}

/// First entry of `nodes.versions` in a cluster-stats payload.
pub fn server_version(cluster_stats: &Value) -> Result<Option<ServerVersion>, CheckError> {
    let stats: ClusterStatsResponse = parse(cluster_stats, "cluster-stats")?;
    debug!(versions = ?stats.nodes.versions, "Cluster versions");
    stats
        .nodes
        .versions
        .as_ref()
        .and_then(|versions| versions.first())
        .map(|v| v.parse())
        .transpose()
}

/// ID of the node answering a node-scoped stats call.
///
/// Only the keys of `nodes` are read; the first one in the document wins.
pub fn local_node_id(nodes_stats: &Value) -> Result<Option<NodeId>, CheckError> {
    let nodes = nodes_stats
        .get("nodes")
        .and_then(Value::as_object)
        .ok_or_else(|| CheckError::shape("nodes-stats: missing `nodes` object"))?;
    let id = nodes.keys().next().cloned().map(NodeId);
    debug!(node = ?id, "This node");
    Ok(id)
}

/// Elected master from a cluster-state payload.
pub fn master_node_id(cluster_state: &Value) -> Result<MasterNode, CheckError> {
    let state: ClusterStateResponse = parse(cluster_state, "cluster-state")?;
    debug!(master = ?state.master_node, "Master node");
    Ok(match state.master_node {
        Some(id) => MasterNode::Elected(NodeId(id)),
        None => MasterNode::NoneElected,
    })
}

/// One [`NormalizedNodeMetrics`] per node in the nodes-stats payload.
pub fn normalize_nodes(snapshot: &StatsSnapshot) -> Result<NodeMetrics, CheckError> {
    let payloads = snapshot.payloads();
    let raw = payloads
        .nodes_stats
        .as_ref()
        .ok_or_else(|| CheckError::shape("nodes-stats payload was not fetched"))?;
    let stats: NodesStatsResponse = parse(raw, "nodes-stats")?;

    let info: Option<NodesInfoResponse> = match snapshot.selection().fd_limit {
        FdLimitSource::NodesInfo => {
            let raw = payloads.nodes_info.as_ref().ok_or_else(|| {
                CheckError::shape(format!(
                    "nodes-info is required for server version {}",
                    snapshot
                        .version()
                        .map_or_else(|| "unknown".to_string(), |v| v.to_string())
                ))
            })?;
            Some(parse(raw, "nodes-info")?)
        }
        FdLimitSource::NodesStats => None,
    };

    let mut nodes = NodeMetrics::new();
    for (id, node) in stats.nodes {
        let process = node.process.as_ref();
        let open_fds = process
            .and_then(|p| p.open_file_descriptors)
            .and_then(nonnegative);
        let max_fds = match &info {
            Some(info) => info
                .nodes
                .get(&id)
                .and_then(|n| n.process.as_ref())
                .and_then(|p| p.max_file_descriptors),
            None => process.and_then(|p| p.max_file_descriptors),
        }
        .and_then(nonnegative);

        let breaker_trips = node.breakers.map(|breakers| {
            breakers
                .into_iter()
                .filter_map(|(name, stats)| stats.tripped.map(|trips| (name, trips)))
                .collect()
        });

        let mem = node.jvm.and_then(|jvm| jvm.mem);
        let metrics = NormalizedNodeMetrics {
            name: node.name,
            open_fds,
            max_fds,
            breaker_trips,
            heap_used_bytes: mem.as_ref().and_then(|m| m.heap_used_in_bytes),
            heap_max_bytes: mem.as_ref().and_then(|m| m.heap_max_in_bytes),
        };
        debug!(
            node = %id,
            open_fds = ?metrics.open_fds,
            max_fds = ?metrics.max_fds,
            "Normalized node"
        );
        nodes.insert(NodeId(id), metrics);
    }

    Ok(nodes)
}

/// Cluster-scope facts from whichever cluster payloads the snapshot holds.
pub fn cluster_facts(snapshot: &StatsSnapshot) -> Result<ClusterFacts, CheckError> {
    let payloads = snapshot.payloads();
    let mut facts = ClusterFacts::default();

    if let Some(raw) = &payloads.cluster_stats {
        let stats: ClusterStatsResponse = parse(raw, "cluster-stats")?;
        let mem = stats.nodes.jvm.and_then(|jvm| jvm.mem);
        facts.heap_used_bytes = mem.as_ref().and_then(|m| m.heap_used_in_bytes);
        facts.heap_max_bytes = mem.as_ref().and_then(|m| m.heap_max_in_bytes);
    }
    if let Some(raw) = &payloads.cluster_health {
        let health: ClusterHealthResponse = parse(raw, "cluster-health")?;
        debug!(
            cluster = ?health.cluster_name,
            status = ?health.status,
            timed_out = ?health.timed_out,
            "Cluster health"
        );
        facts.health_status = health.status;
        facts.health_timed_out = health.timed_out.unwrap_or(false);
    }
    if let Some(raw) = &payloads.cluster_state {
        facts.master = master_node_id(raw)?;
    }
    if let Some(raw) = &payloads.local_node_stats {
        facts.local = local_node_id(raw)?;
    }

    Ok(facts)
}
