//! One-shot collection of the statistics payloads a check needs.

use es_client::{ClusterHealthOptions, NodeScope, RequestOptions, StatsFetcher};
use serde_json::Value;
use tracing::debug;

use crate::aggregate;
use crate::error::CheckError;
use crate::normalize;
use crate::version::{FieldSelection, ServerVersion};

/// When the cluster health payload is fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HealthGate {
    /// Always fetch health.
    #[default]
    Always,
    /// Only fetch health when the queried node is the elected master.
    MasterOnly,
}

/// Which endpoints a check reads, with their options.
#[derive(Debug, Clone, Default)]
pub struct SnapshotPlan {
    /// `/_cluster/stats`; also the source of the server version.
    pub cluster_stats: Option<RequestOptions>,
    /// `/_nodes/stats` for all nodes or the local node.
    pub nodes_stats: Option<(NodeScope, RequestOptions)>,
    /// `/_nodes/_local/stats`, used to identify the queried node.
    pub local_node_stats: Option<RequestOptions>,
    /// Fetch `/_nodes` when the resolved field selection needs it.
    pub nodes_info_if_required: bool,
    /// `/_cluster/state/master_node`.
    pub cluster_state: Option<RequestOptions>,
    /// `/_cluster/health`.
    pub cluster_health: Option<ClusterHealthOptions>,
    /// Gate for the health request.
    pub health_gate: HealthGate,
}

/// Raw payloads, one per endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payloads {
    pub nodes_stats: Option<Value>,
    pub local_node_stats: Option<Value>,
    pub nodes_info: Option<Value>,
    pub cluster_health: Option<Value>,
    pub cluster_state: Option<Value>,
    pub cluster_stats: Option<Value>,
}

/// Immutable statistics fetched once for a single evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    payloads: Payloads,
    version: Option<ServerVersion>,
    selection: FieldSelection,
}

impl StatsSnapshot {
    /// Execute `plan` against `fetcher`, one request at a time.
    pub async fn collect(
        fetcher: &dyn StatsFetcher,
        plan: &SnapshotPlan,
    ) -> Result<Self, CheckError> {
        let mut payloads = Payloads::default();

        if let Some(options) = &plan.cluster_stats {
            payloads.cluster_stats = Some(fetcher.cluster_stats(options).await?);
        }
        let version = resolve_version(payloads.cluster_stats.as_ref())?;
        let selection = FieldSelection::for_version(version);

        if let Some((scope, options)) = &plan.nodes_stats {
            payloads.nodes_stats = Some(fetcher.nodes_stats(*scope, options).await?);
        }
        if let Some(options) = &plan.local_node_stats {
            payloads.local_node_stats = Some(fetcher.nodes_stats(NodeScope::Local, options).await?);
        }
        if plan.nodes_info_if_required && selection.needs_nodes_info() {
            payloads.nodes_info = Some(fetcher.nodes_info().await?);
        }
        if let Some(options) = &plan.cluster_state {
            payloads.cluster_state = Some(fetcher.cluster_state(options).await?);
        }
        if let Some(options) = &plan.cluster_health {
            let fetch = match plan.health_gate {
                HealthGate::Always => true,
                HealthGate::MasterOnly => is_local_master(&payloads)? == Some(true),
            };
            if fetch {
                payloads.cluster_health = Some(fetcher.cluster_health(options).await?);
            } else {
                debug!("Skipping cluster health: queried node is not the master");
            }
        }

        Ok(Self {
            payloads,
            version,
            selection,
        })
    }

    /// Build a snapshot from payloads obtained elsewhere.
    pub fn from_payloads(payloads: Payloads) -> Result<Self, CheckError> {
        let version = resolve_version(payloads.cluster_stats.as_ref())?;
        Ok(Self {
            payloads,
            version,
            selection: FieldSelection::for_version(version),
        })
    }

    #[must_use]
    pub fn payloads(&self) -> &Payloads {
        &self.payloads
    }

    /// Server version from cluster stats, if that payload was fetched.
    #[must_use]
    pub fn version(&self) -> Option<ServerVersion> {
        self.version
    }

    /// Field sources resolved for this snapshot's server version.
    #[must_use]
    pub fn selection(&self) -> FieldSelection {
        self.selection
    }
}

fn resolve_version(cluster_stats: Option<&Value>) -> Result<Option<ServerVersion>, CheckError> {
    let Some(cluster_stats) = cluster_stats else {
        return Ok(None);
    };
    let version = normalize::server_version(cluster_stats)?;
    debug!(version = ?version, "Resolved server version");
    Ok(version)
}

fn is_local_master(payloads: &Payloads) -> Result<Option<bool>, CheckError> {
    let local = payloads
        .local_node_stats
        .as_ref()
        .map(normalize::local_node_id)
        .transpose()?
        .flatten();
    let master = payloads
        .cluster_state
        .as_ref()
        .map(normalize::master_node_id)
        .transpose()?
        .unwrap_or_default();
    Ok(aggregate::is_local_master(local.as_ref(), &master))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFetcher;
    use serde_json::json;

    #[test]
    fn test_from_payloads_resolves_selection() {
        let snapshot = StatsSnapshot::from_payloads(Payloads {
            cluster_stats: Some(json!({ "nodes": { "versions": ["1.7.6"] } })),
            ..Payloads::default()
        })
        .unwrap();
        assert_eq!(snapshot.version(), Some(ServerVersion::new(1, 7, 6)));
        assert!(snapshot.selection().needs_nodes_info());
    }

    #[test]
    fn test_from_payloads_without_cluster_stats() {
        let snapshot = StatsSnapshot::from_payloads(Payloads::default()).unwrap();
        assert_eq!(snapshot.version(), None);
        assert!(!snapshot.selection().needs_nodes_info());
    }

    #[test]
    fn test_malformed_cluster_stats_is_shape_error() {
        let result = StatsSnapshot::from_payloads(Payloads {
            cluster_stats: Some(json!({ "cluster_name": "x" })),
            ..Payloads::default()
        });
        assert!(matches!(result, Err(CheckError::Shape(_))));
    }

    fn full_plan(gate: HealthGate) -> SnapshotPlan {
        SnapshotPlan {
            cluster_stats: Some(RequestOptions::default()),
            nodes_stats: Some((NodeScope::All, RequestOptions::default())),
            local_node_stats: Some(RequestOptions::default()),
            nodes_info_if_required: true,
            cluster_state: Some(RequestOptions::default()),
            cluster_health: Some(ClusterHealthOptions::default()),
            health_gate: gate,
        }
    }

    fn fetcher(version: &str, master: &str) -> FakeFetcher {
        FakeFetcher::new()
            .with("cluster_stats", json!({ "nodes": { "versions": [version] } }))
            .with("nodes_stats", json!({ "nodes": { "n1": {}, "n2": {} } }))
            .with("local_nodes_stats", json!({ "nodes": { "n1": {} } }))
            .with("nodes_info", json!({ "nodes": { "n1": {}, "n2": {} } }))
            .with("cluster_state", json!({ "master_node": master }))
            .with("cluster_health", json!({ "status": "green" }))
    }

    #[tokio::test]
    async fn test_collect_fixed_order_on_old_server() {
        let fake = fetcher("1.7.6", "n1");
        let snapshot = StatsSnapshot::collect(&fake, &full_plan(HealthGate::Always))
            .await
            .unwrap();
        assert_eq!(
            fake.calls(),
            vec![
                "cluster_stats",
                "nodes_stats",
                "local_nodes_stats",
                "nodes_info",
                "cluster_state",
                "cluster_health"
            ]
        );
        assert!(snapshot.payloads().nodes_info.is_some());
    }

    #[tokio::test]
    async fn test_collect_skips_nodes_info_on_new_server() {
        let fake = fetcher("7.10.2", "n1");
        let snapshot = StatsSnapshot::collect(&fake, &full_plan(HealthGate::Always))
            .await
            .unwrap();
        assert!(!fake.calls().contains(&"nodes_info".to_string()));
        assert_eq!(snapshot.payloads().nodes_info, None);
    }

    #[tokio::test]
    async fn test_master_gate_skips_health_on_non_master() {
        let fake = fetcher("7.10.2", "n2");
        let snapshot = StatsSnapshot::collect(&fake, &full_plan(HealthGate::MasterOnly))
            .await
            .unwrap();
        assert!(!fake.calls().contains(&"cluster_health".to_string()));
        assert_eq!(snapshot.payloads().cluster_health, None);
    }

    #[tokio::test]
    async fn test_master_gate_fetches_health_on_master() {
        let fake = fetcher("7.10.2", "n1");
        let snapshot = StatsSnapshot::collect(&fake, &full_plan(HealthGate::MasterOnly))
            .await
            .unwrap();
        assert!(snapshot.payloads().cluster_health.is_some());
    }

    #[tokio::test]
    async fn test_fetch_failure_stops_collection() {
        let fake = FakeFetcher::new();
        let result = StatsSnapshot::collect(&fake, &full_plan(HealthGate::Always)).await;
        assert!(matches!(result, Err(CheckError::Fetch(_))));
        assert_eq!(fake.calls(), vec!["cluster_stats"]);
    }
}
