//! Elasticsearch health checks.
//!
//! Every check follows the same pipeline:
//!
//! 1. [`snapshot`] fetches the payloads a check needs, once, in a fixed order.
//! 2. [`normalize`] extracts version-appropriate fields into per-node metrics.
//! 3. [`aggregate`] reduces them to cluster-wide derived values.
//! 4. [`evaluate`] applies thresholds or state mappings.
//! 5. [`verdict`] renders the result and its exit code.
//!
//! The five checks live in [`checks`]; [`cli`] holds the argument parsing and
//! runner shared by the `check-es-*` binaries.

pub mod aggregate;
pub mod checks;
pub mod cli;
pub mod error;
pub mod evaluate;
pub mod models;
pub mod normalize;
pub mod snapshot;
pub mod verdict;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;

pub use checks::{run_check, Check};
pub use error::CheckError;
pub use evaluate::ThresholdConfig;
pub use snapshot::{SnapshotPlan, StatsSnapshot};
pub use verdict::{Severity, Verdict};
