//! Cluster-wide JVM heap usage check.

use es_client::RequestOptions;

use crate::aggregate::aggregate;
use crate::checks::Check;
use crate::error::CheckError;
use crate::evaluate::{ThresholdConfig, Unit};
use crate::normalize::{cluster_facts, NodeMetrics};
use crate::snapshot::{SnapshotPlan, StatsSnapshot};
use crate::verdict::Verdict;

/// Heap used in bytes, or as a percentage of the heap limit.
#[derive(Debug, Clone)]
pub struct Heap {
    pub thresholds: ThresholdConfig,
    pub timeout_secs: u64,
}

impl Default for Heap {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::absolute(None, None),
            timeout_secs: es_client::config::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Check for Heap {
    fn name(&self) -> &'static str {
        "ESHeap"
    }

    fn plan(&self) -> SnapshotPlan {
        SnapshotPlan {
            cluster_stats: Some(RequestOptions::with_timeout(self.timeout_secs)),
            ..SnapshotPlan::default()
        }
    }

    fn evaluate(&self, snapshot: &StatsSnapshot) -> Result<Verdict, CheckError> {
        let derived = aggregate(&NodeMetrics::new(), &cluster_facts(snapshot)?);
        let used = derived
            .heap_used_bytes
            .ok_or_else(|| CheckError::computation("Failed to obtain heap used in bytes"))?;

        let eval = self.thresholds.evaluate(Some(used), derived.heap_max_bytes)?;
        let message = match self.thresholds.unit {
            Unit::AbsoluteBytes => format!("Heap used in bytes {used}"),
            Unit::Percentage => format!("Heap used in bytes {used} ({}% full)", eval.value),
        };
        Ok(Verdict::new(eval.severity, message))
    }
}
