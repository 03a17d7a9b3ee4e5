//! The five check pipelines.
//!
//! Each check declares which endpoints it needs ([`Check::plan`]) and how the
//! collected snapshot maps to a verdict ([`Check::evaluate`]). [`run_check`]
//! wires the two together around one [`StatsSnapshot::collect`] call and turns
//! every failure into an UNKNOWN verdict.

pub mod breakers;
pub mod cluster_health;
pub mod cluster_status;
pub mod file_descriptors;
pub mod heap;

use es_client::StatsFetcher;
use tracing::{debug, warn};

use crate::error::CheckError;
use crate::snapshot::{SnapshotPlan, StatsSnapshot};
use crate::verdict::Verdict;

pub use breakers::CircuitBreakers;
pub use cluster_health::{ClusterHealth, HealthLevel};
pub use cluster_status::ClusterStatus;
pub use file_descriptors::FileDescriptors;
pub use heap::Heap;

/// One health check.
pub trait Check: Send + Sync {
    /// Name printed in front of the verdict, e.g. `ESHeap`.
    fn name(&self) -> &'static str;

    /// Endpoints to fetch, with their options.
    fn plan(&self) -> SnapshotPlan;

    /// Decide the verdict from a collected snapshot.
    fn evaluate(&self, snapshot: &StatsSnapshot) -> Result<Verdict, CheckError>;
}

/// Collect the snapshot for `check` once and evaluate it.
pub async fn run_check(check: &dyn Check, fetcher: &dyn StatsFetcher) -> Verdict {
    let plan = check.plan();
    debug!(check = check.name(), plan = ?plan, "Running check");

    let result = match StatsSnapshot::collect(fetcher, &plan).await {
        Ok(snapshot) => check.evaluate(&snapshot),
        Err(e) => Err(e),
    };

    match result {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!(check = check.name(), error = %e, "Check failed");
            e.into()
        }
    }
}
