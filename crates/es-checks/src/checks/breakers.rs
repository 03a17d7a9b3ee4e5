//! Circuit breaker trip check.

use es_client::{NodeScope, RequestOptions};
use tracing::debug;

use crate::aggregate::aggregate;
use crate::checks::Check;
use crate::error::CheckError;
use crate::evaluate::breaker_severity;
use crate::normalize::{cluster_facts, normalize_nodes};
use crate::snapshot::{SnapshotPlan, StatsSnapshot};
use crate::verdict::{Severity, Verdict};

/// CRITICAL when any node reports any tripped breaker.
#[derive(Debug, Clone, Default)]
pub struct CircuitBreakers {
    /// Only inspect the node answering the request.
    pub localhost: bool,
    pub timeout_secs: u64,
}

impl Check for CircuitBreakers {
    fn name(&self) -> &'static str {
        "ESCircuitBreaker"
    }

    fn plan(&self) -> SnapshotPlan {
        let scope = if self.localhost {
            NodeScope::Local
        } else {
            NodeScope::All
        };
        SnapshotPlan {
            nodes_stats: Some((scope, RequestOptions::with_timeout(self.timeout_secs))),
            ..SnapshotPlan::default()
        }
    }

    fn evaluate(&self, snapshot: &StatsSnapshot) -> Result<Verdict, CheckError> {
        let nodes = normalize_nodes(snapshot)?;
        for (id, node) in &nodes {
            debug!(node = %id, breakers = ?node.breaker_trips, "Breaker counters");
        }
        let derived = aggregate(&nodes, &cluster_facts(snapshot)?);

        Ok(match breaker_severity(&derived.any_tripped_breaker_names) {
            Severity::Ok => Verdict::ok("All circuit breakers okay"),
            severity => {
                let names: Vec<&str> = derived
                    .any_tripped_breaker_names
                    .iter()
                    .map(String::as_str)
                    .collect();
                Verdict::new(
                    severity,
                    format!("Circuit Breakers: {} tripped!", names.join(", ")),
                )
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::run_check;
    use crate::testing::FakeFetcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_all_zero_counters_are_ok() {
        let fake = FakeFetcher::new().with(
            "nodes_stats",
            json!({ "nodes": {
                "a": { "breakers": { "fielddata": { "tripped": 0 }, "parent": { "tripped": 0 } } },
                "b": { "breakers": { "request": { "tripped": 0 } } }
            } }),
        );
        let verdict = run_check(&CircuitBreakers::default(), &fake).await;
        assert_eq!(verdict, Verdict::ok("All circuit breakers okay"));
    }

    #[tokio::test]
    async fn test_any_trip_on_any_node_is_critical() {
        let fake = FakeFetcher::new().with(
            "nodes_stats",
            json!({ "nodes": {
                "a": { "breakers": { "fielddata": { "tripped": 0 } } },
                "b": { "breakers": { "parent": { "tripped": 4 }, "fielddata": { "tripped": 1 } } }
            } }),
        );
        let verdict = run_check(&CircuitBreakers::default(), &fake).await;
        assert_eq!(
            verdict,
            Verdict::critical("Circuit Breakers: fielddata, parent tripped!")
        );
    }

    #[tokio::test]
    async fn test_localhost_uses_local_scope() {
        let fake = FakeFetcher::new().with("local_nodes_stats", json!({ "nodes": { "a": {} } }));
        let check = CircuitBreakers {
            localhost: true,
            timeout_secs: 30,
        };
        let verdict = run_check(&check, &fake).await;
        assert_eq!(verdict.severity, Severity::Ok);
        assert_eq!(fake.calls(), vec!["local_nodes_stats"]);
    }

    #[tokio::test]
    async fn test_missing_nodes_is_unknown() {
        let fake = FakeFetcher::new().with("nodes_stats", json!({ "error": "boom" }));
        let verdict = run_check(&CircuitBreakers::default(), &fake).await;
        assert_eq!(verdict.severity, Severity::Unknown);
    }
}
