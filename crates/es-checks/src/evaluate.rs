//! Threshold and state policies that turn derived values into severities.

use std::collections::BTreeSet;

use crate::aggregate::HealthStatus;
use crate::error::CheckError;
use crate::verdict::{Severity, Verdict};

/// Message of the master-only gate when the queried node is not the master.
pub const NOT_MASTER: &str = "not the master";

/// Unit the thresholds are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Compare the raw value.
    AbsoluteBytes,
    /// Compare `floor(100 * used / max)`.
    Percentage,
}

/// Comparison direction. Only higher-is-worse metrics exist today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    HigherIsWorse,
}

/// Warning/critical limits for one numeric check.
///
/// `None` never triggers; `Some(0)` is a real threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdConfig {
    pub warning: Option<u64>,
    pub critical: Option<u64>,
    pub unit: Unit,
    pub direction: Direction,
}

/// Outcome of a numeric comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub severity: Severity,
    /// Compared value, in the configured unit.
    pub value: u64,
    /// Threshold that was breached, if any.
    pub threshold: Option<u64>,
}

impl ThresholdConfig {
    #[must_use]
    pub const fn absolute(warning: Option<u64>, critical: Option<u64>) -> Self {
        Self {
            warning,
            critical,
            unit: Unit::AbsoluteBytes,
            direction: Direction::HigherIsWorse,
        }
    }

    #[must_use]
    pub const fn percentage(warning: Option<u64>, critical: Option<u64>) -> Self {
        Self {
            warning,
            critical,
            unit: Unit::Percentage,
            direction: Direction::HigherIsWorse,
        }
    }

    /// Severity of `value` and the threshold it reached.
    #[must_use]
    pub fn classify(&self, value: u64) -> (Severity, Option<u64>) {
        let reached = |threshold: Option<u64>| match self.direction {
            Direction::HigherIsWorse => threshold.filter(|t| value >= *t),
        };
        if let Some(t) = reached(self.critical) {
            (Severity::Critical, Some(t))
        } else if let Some(t) = reached(self.warning) {
            (Severity::Warning, Some(t))
        } else {
            (Severity::Ok, None)
        }
    }

    /// Compare `used` (or `used` as a share of `max`) against the limits.
    ///
    /// `max` is only read in percentage mode.
    pub fn evaluate(&self, used: Option<u64>, max: Option<u64>) -> Result<Evaluation, CheckError> {
        let used = used.ok_or_else(|| CheckError::computation("value is not available"))?;
        let value = match self.unit {
            Unit::AbsoluteBytes => used,
            Unit::Percentage => percentage(used, max)?,
        };
        let (severity, threshold) = self.classify(value);
        Ok(Evaluation {
            severity,
            value,
            threshold,
        })
    }
}

/// `floor(100 * used / max)`.
pub fn percentage(used: u64, max: Option<u64>) -> Result<u64, CheckError> {
    match max {
        None => Err(CheckError::computation(
            "cannot compute percentage: maximum is not available",
        )),
        Some(0) => Err(CheckError::computation(
            "cannot compute percentage: maximum is zero",
        )),
        Some(max) => {
            let ratio = u128::from(used) * 100 / u128::from(max);
            Ok(u64::try_from(ratio).unwrap_or(u64::MAX))
        }
    }
}

/// green → OK, yellow → WARNING, red → CRITICAL, anything else → UNKNOWN.
#[must_use]
pub const fn health_severity(status: HealthStatus) -> Severity {
    match status {
        HealthStatus::Green => Severity::Ok,
        HealthStatus::Yellow => Severity::Warning,
        HealthStatus::Red => Severity::Critical,
        HealthStatus::Unknown => Severity::Unknown,
    }
}

/// Any tripped breaker anywhere is CRITICAL.
#[must_use]
pub fn breaker_severity(tripped: &BTreeSet<String>) -> Severity {
    if tripped.is_empty() {
        Severity::Ok
    } else {
        Severity::Critical
    }
}

/// Short-circuit verdict for master-only checks, evaluated before health.
///
/// Returns `None` when evaluation should continue.
#[must_use]
pub fn master_gate(master_only: bool, is_local_node_master: Option<bool>) -> Option<Verdict> {
    if !master_only {
        return None;
    }
    match is_local_node_master {
        Some(true) => None,
        Some(false) => Some(Verdict::ok(NOT_MASTER)),
        None => Some(Verdict::unknown(
            "Unable to determine whether this node is the master",
        )),
    }
}
