//! Cluster status check with master-only gating and wait-for-green.

use es_client::{ClusterHealthOptions, RequestOptions};
use tracing::debug;

use crate::aggregate::{aggregate, HealthStatus};
use crate::checks::Check;
use crate::error::CheckError;
use crate::evaluate::{health_severity, master_gate};
use crate::normalize::{cluster_facts, NodeMetrics};
use crate::snapshot::{HealthGate, SnapshotPlan, StatsSnapshot};
use crate::verdict::Verdict;

#[derive(Debug, Clone, Default)]
pub struct ClusterStatus {
    /// Report OK without checking health unless the queried node is master.
    pub master_only: bool,
    /// Block up to this many seconds for the cluster to turn green.
    pub status_timeout: Option<u64>,
    pub timeout_secs: u64,
}

impl ClusterStatus {
    fn server_timeout(&self) -> u64 {
        self.status_timeout.unwrap_or(self.timeout_secs)
    }
}

impl Check for ClusterStatus {
    fn name(&self) -> &'static str {
        "ESClusterStatus"
    }

    fn plan(&self) -> SnapshotPlan {
        let options = RequestOptions::with_timeout(self.server_timeout());
        let mut plan = SnapshotPlan {
            cluster_health: Some(ClusterHealthOptions {
                wait_for_status: self.status_timeout.map(|_| "green".to_string()),
                timeout_secs: Some(self.server_timeout()),
                ..ClusterHealthOptions::default()
            }),
            ..SnapshotPlan::default()
        };
        if self.master_only {
            plan.local_node_stats = Some(options.clone());
            plan.cluster_state = Some(options);
            plan.health_gate = HealthGate::MasterOnly;
        }
        plan
    }

    fn evaluate(&self, snapshot: &StatsSnapshot) -> Result<Verdict, CheckError> {
        let derived = aggregate(&NodeMetrics::new(), &cluster_facts(snapshot)?);
        if let Some(verdict) = master_gate(self.master_only, derived.is_local_node_master) {
            return Ok(verdict);
        }
        if derived.health_timed_out {
            debug!(status = %derived.health_status, "Gave up waiting for green");
        }

        let message = match derived.health_status {
            HealthStatus::Unknown => format!(
                "Cluster is in an unknown state: {}",
                derived.raw_health_status.as_deref().unwrap_or_default()
            ),
            status => format!("Cluster is {status}"),
        };
        Ok(Verdict::new(health_severity(derived.health_status), message))
    }
}
