//! Open file descriptor usage check.

use es_client::{NodeScope, RequestOptions};
use tracing::debug;

use crate::aggregate::aggregate;
use crate::checks::Check;
use crate::error::CheckError;
use crate::evaluate::ThresholdConfig;
use crate::normalize::{cluster_facts, normalize_nodes};
use crate::snapshot::{SnapshotPlan, StatsSnapshot};
use crate::verdict::{Severity, Verdict};

pub const DEFAULT_WARNING_PERCENT: u64 = 80;
pub const DEFAULT_CRITICAL_PERCENT: u64 = 90;

/// Compares the busiest node's open descriptors against that node's limit.
#[derive(Debug, Clone)]
pub struct FileDescriptors {
    pub thresholds: ThresholdConfig,
    pub timeout_secs: u64,
}

impl Default for FileDescriptors {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::percentage(
                Some(DEFAULT_WARNING_PERCENT),
                Some(DEFAULT_CRITICAL_PERCENT),
            ),
            timeout_secs: es_client::config::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Check for FileDescriptors {
    fn name(&self) -> &'static str {
        "ESFileDescriptors"
    }

    fn plan(&self) -> SnapshotPlan {
        let options = RequestOptions::with_timeout(self.timeout_secs);
        SnapshotPlan {
            cluster_stats: Some(options.clone()),
            nodes_stats: Some((NodeScope::All, options)),
            nodes_info_if_required: true,
            ..SnapshotPlan::default()
        }
    }

    fn evaluate(&self, snapshot: &StatsSnapshot) -> Result<Verdict, CheckError> {
        let nodes = normalize_nodes(snapshot)?;
        for (id, node) in &nodes {
            debug!(node = %id, open = ?node.open_fds, limit = ?node.max_fds, "File descriptors");
        }
        let derived = aggregate(&nodes, &cluster_facts(snapshot)?);

        let open = derived.max_open_fds.ok_or_else(|| {
            CheckError::computation("No node reported open file descriptors")
        })?;
        let node = derived
            .max_open_fds_node
            .as_ref()
            .map_or_else(String::new, ToString::to_string);
        let limit = derived.max_open_fds_limit.ok_or_else(|| {
            CheckError::computation(format!("No file descriptor limit reported for node {node}"))
        })?;
        debug!(%node, open, limit, "Busiest node");

        let eval = self.thresholds.evaluate(Some(open), Some(limit))?;
        let message = match (eval.severity, eval.threshold) {
            (Severity::Warning | Severity::Critical, Some(threshold)) => format!(
                "fd usage {}% exceeds {threshold}% ({open}/{limit})",
                eval.value
            ),
            _ => format!("fd usage at {}% ({open}/{limit})", eval.value),
        };
        Ok(Verdict::new(eval.severity, message))
    }
}
