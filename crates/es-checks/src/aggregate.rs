//! Reduction of per-node metrics into cluster-wide derived values.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tracing::debug;

use crate::normalize::{ClusterFacts, MasterNode, NodeId, NodeMetrics};

/// Categorical cluster health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthStatus {
    Green,
    Yellow,
    Red,
    Unknown,
}

impl HealthStatus {
    /// Map a raw status string; anything but green/yellow/red is `Unknown`.
    #[must_use]
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::to_lowercase).as_deref() {
            Some("green") => Self::Green,
            Some("yellow") => Self::Yellow,
            Some("red") => Self::Red,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Green => write!(f, "green"),
            Self::Yellow => write!(f, "yellow"),
            Self::Red => write!(f, "red"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Cluster-scalar values derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterDerivedMetrics {
    /// Highest open file descriptor count; `None` when no node reported one.
    pub max_open_fds: Option<u64>,
    /// Node holding `max_open_fds` (lowest ID on ties).
    pub max_open_fds_node: Option<NodeId>,
    /// File descriptor limit of `max_open_fds_node`.
    pub max_open_fds_limit: Option<u64>,
    /// Union of tripped breaker names across all nodes.
    pub any_tripped_breaker_names: BTreeSet<String>,
    /// Tripped breaker names per node, only for nodes with at least one.
    pub tripped_breakers_by_node: BTreeMap<NodeId, BTreeSet<String>>,
    pub heap_used_bytes: Option<u64>,
    pub heap_max_bytes: Option<u64>,
    pub health_status: HealthStatus,
    /// Raw status string the categorical status was mapped from.
    pub raw_health_status: Option<String>,
    pub health_timed_out: bool,
    /// `None` when the local node or the cluster state is unknown.
    pub is_local_node_master: Option<bool>,
}

/// Whether the local node is the elected master.
///
/// Node IDs are compared exactly. A cluster state without an elected master
/// means the local node is not the master.
#[must_use]
pub fn is_local_master(local: Option<&NodeId>, master: &MasterNode) -> Option<bool> {
    match (local, master) {
        (None, _) | (_, MasterNode::NotQueried) => None,
        (Some(_), MasterNode::NoneElected) => Some(false),
        (Some(local), MasterNode::Elected(master)) => Some(local == master),
    }
}

/// Reduce per-node metrics and cluster facts into derived values.
#[must_use]
pub fn aggregate(nodes: &NodeMetrics, facts: &ClusterFacts) -> ClusterDerivedMetrics {
    let mut max_open: Option<(&NodeId, u64)> = None;
    for (id, node) in nodes {
        if let Some(open) = node.open_fds {
            // Strictly greater keeps the first (lowest) ID on ties.
            if max_open.map_or(true, |(_, current)| open > current) {
                max_open = Some((id, open));
            }
        }
    }

    let mut any_tripped_breaker_names = BTreeSet::new();
    let mut tripped_breakers_by_node = BTreeMap::new();
    for (id, node) in nodes {
        let tripped: BTreeSet<String> = node.tripped_breakers().map(str::to_string).collect();
        if !tripped.is_empty() {
            any_tripped_breaker_names.extend(tripped.iter().cloned());
            tripped_breakers_by_node.insert(id.clone(), tripped);
        }
    }

    let derived = ClusterDerivedMetrics {
        max_open_fds: max_open.map(|(_, open)| open),
        max_open_fds_node: max_open.map(|(id, _)| id.clone()),
        max_open_fds_limit: max_open
            .and_then(|(id, _)| nodes.get(id))
            .and_then(|node| node.max_fds),
        any_tripped_breaker_names,
        tripped_breakers_by_node,
        heap_used_bytes: facts.heap_used_bytes,
        heap_max_bytes: facts.heap_max_bytes,
        health_status: HealthStatus::from_raw(facts.health_status.as_deref()),
        raw_health_status: facts.health_status.clone(),
        health_timed_out: facts.health_timed_out,
        is_local_node_master: is_local_master(facts.local.as_ref(), &facts.master),
    };

    debug!(
        max_open_fds = ?derived.max_open_fds,
        node = ?derived.max_open_fds_node,
        tripped = ?derived.any_tripped_breaker_names,
        health = %derived.health_status,
        is_master = ?derived.is_local_node_master,
        "Aggregated cluster metrics"
    );

    derived
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NormalizedNodeMetrics;

    fn node(open: Option<u64>, max: Option<u64>, trips: &[(&str, u64)]) -> NormalizedNodeMetrics {
        NormalizedNodeMetrics {
            open_fds: open,
            max_fds: max,
            breaker_trips: Some(
                trips
                    .iter()
                    .map(|(name, count)| ((*name).to_string(), *count))
                    .collect(),
            ),
            ..NormalizedNodeMetrics::default()
        }
    }

    fn nodes(entries: Vec<(&str, NormalizedNodeMetrics)>) -> NodeMetrics {
        entries
            .into_iter()
            .map(|(id, metrics)| (NodeId::new(id), metrics))
            .collect()
    }

    #[test]
    fn test_empty_node_set_has_no_max() {
        let derived = aggregate(&NodeMetrics::new(), &ClusterFacts::default());
        assert_eq!(derived.max_open_fds, None);
        assert_eq!(derived.max_open_fds_node, None);
        assert!(derived.any_tripped_breaker_names.is_empty());
    }

    #[test]
    fn test_all_absent_has_no_max() {
        let metrics = nodes(vec![("a", node(None, Some(10), &[])), ("b", node(None, None, &[]))]);
        assert_eq!(aggregate(&metrics, &ClusterFacts::default()).max_open_fds, None);
    }

    #[test]
    fn test_max_open_fds_and_its_limit() {
        let metrics = nodes(vec![
            ("a", node(Some(100), Some(1000), &[])),
            ("b", node(Some(900), Some(4096), &[])),
            ("c", node(None, Some(10), &[])),
        ]);
        let derived = aggregate(&metrics, &ClusterFacts::default());
        assert_eq!(derived.max_open_fds, Some(900));
        assert_eq!(derived.max_open_fds_node, Some(NodeId::new("b")));
        assert_eq!(derived.max_open_fds_limit, Some(4096));
    }

    #[test]
    fn test_max_open_fds_tie_picks_lowest_id() {
        let metrics = nodes(vec![
            ("b", node(Some(5), Some(50), &[])),
            ("a", node(Some(5), Some(10), &[])),
        ]);
        let derived = aggregate(&metrics, &ClusterFacts::default());
        assert_eq!(derived.max_open_fds_node, Some(NodeId::new("a")));
        assert_eq!(derived.max_open_fds_limit, Some(10));
    }

    #[test]
    fn test_breaker_union_across_nodes() {
        let metrics = nodes(vec![
            ("a", node(None, None, &[("fielddata", 0), ("request", 2)])),
            ("b", node(None, None, &[("parent", 1), ("request", 0)])),
            ("c", node(None, None, &[("fielddata", 0)])),
        ]);
        let derived = aggregate(&metrics, &ClusterFacts::default());
        let names: Vec<_> = derived.any_tripped_breaker_names.iter().cloned().collect();
        assert_eq!(names, vec!["parent".to_string(), "request".to_string()]);
        assert_eq!(derived.tripped_breakers_by_node.len(), 2);
        assert!(!derived
            .tripped_breakers_by_node
            .contains_key(&NodeId::new("c")));
    }

    #[test]
    fn test_health_status_mapping_is_total() {
        assert_eq!(HealthStatus::from_raw(Some("green")), HealthStatus::Green);
        assert_eq!(HealthStatus::from_raw(Some("YELLOW")), HealthStatus::Yellow);
        assert_eq!(HealthStatus::from_raw(Some("Red")), HealthStatus::Red);
        assert_eq!(HealthStatus::from_raw(Some("")), HealthStatus::Unknown);
        assert_eq!(HealthStatus::from_raw(Some("blue")), HealthStatus::Unknown);
        assert_eq!(HealthStatus::from_raw(None), HealthStatus::Unknown);
    }

    #[test]
    fn test_master_detection_is_exact() {
        let local = NodeId::new("abc");
        assert_eq!(
            is_local_master(Some(&local), &MasterNode::Elected(NodeId::new("abc"))),
            Some(true)
        );
        assert_eq!(
            is_local_master(Some(&local), &MasterNode::Elected(NodeId::new("ABC"))),
            Some(false)
        );
        assert_eq!(
            is_local_master(Some(&local), &MasterNode::NoneElected),
            Some(false)
        );
        assert_eq!(is_local_master(Some(&local), &MasterNode::NotQueried), None);
        assert_eq!(
            is_local_master(None, &MasterNode::Elected(NodeId::new("abc"))),
            None
        );
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let metrics = nodes(vec![
            ("a", node(Some(1), Some(2), &[("x", 1)])),
            ("b", node(Some(3), Some(4), &[])),
        ]);
        let facts = ClusterFacts {
            health_status: Some("yellow".to_string()),
            ..ClusterFacts::default()
        };
        assert_eq!(aggregate(&metrics, &facts), aggregate(&metrics, &facts));
    }
}
