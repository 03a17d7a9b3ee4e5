//! Cluster health check with a pass-through level of detail.

use std::fmt;

use clap::ValueEnum;
use es_client::ClusterHealthOptions;

use crate::aggregate::{aggregate, HealthStatus};
use crate::checks::Check;
use crate::error::CheckError;
use crate::evaluate::health_severity;
use crate::normalize::{cluster_facts, NodeMetrics};
use crate::snapshot::{SnapshotPlan, StatsSnapshot};
use crate::verdict::Verdict;

/// Level of detail requested from the health endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum HealthLevel {
    #[default]
    Cluster,
    Indices,
    Shards,
}

impl fmt::Display for HealthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cluster => write!(f, "cluster"),
            Self::Indices => write!(f, "indices"),
            Self::Shards => write!(f, "shards"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClusterHealth {
    pub level: HealthLevel,
    /// Ask the receiving node instead of the master.
    pub local: bool,
    /// Index or index pattern to scope health to.
    pub index: Option<String>,
    pub timeout_secs: u64,
}

impl Check for ClusterHealth {
    fn name(&self) -> &'static str {
        "ESClusterHealth"
    }

    fn plan(&self) -> SnapshotPlan {
        SnapshotPlan {
            cluster_health: Some(ClusterHealthOptions {
                level: Some(self.level.to_string()),
                local: self.local,
                index: self.index.clone(),
                wait_for_status: None,
                timeout_secs: Some(self.timeout_secs),
            }),
            ..SnapshotPlan::default()
        }
    }

    fn evaluate(&self, snapshot: &StatsSnapshot) -> Result<Verdict, CheckError> {
        let derived = aggregate(&NodeMetrics::new(), &cluster_facts(snapshot)?);
        let level = self.level;
        let message = match derived.health_status {
            HealthStatus::Green => format!("{level} state is green"),
            HealthStatus::Yellow => format!("{level} state is Yellow"),
            HealthStatus::Red => format!("{level} state is Red"),
            HealthStatus::Unknown => format!(
                "{level} state is in an unknown health: {}",
                derived.raw_health_status.as_deref().unwrap_or_default()
            ),
        };
        Ok(Verdict::new(health_severity(derived.health_status), message))
    }
}
