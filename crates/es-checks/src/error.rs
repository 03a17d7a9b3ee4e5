//! Error types for check evaluation.

use es_client::FetchError;
use thiserror::Error;

use crate::verdict::Verdict;

/// Errors that stop a check from reaching a threshold decision.
///
/// Every variant is reported as an UNKNOWN verdict.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The cluster could not be queried.
    #[error("Request failed: {0}")]
    Fetch(#[from] FetchError),

    /// A payload lacked an expected field or had the wrong type.
    #[error("Unexpected response: {0}")]
    Shape(String),

    /// A derived value could not be computed.
    #[error("{0}")]
    Computation(String),
}

impl CheckError {
    pub(crate) fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }

    pub(crate) fn computation(message: impl Into<String>) -> Self {
        Self::Computation(message.into())
    }
}

impl From<CheckError> for Verdict {
    fn from(error: CheckError) -> Self {
        Verdict::unknown(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::Severity;

    #[test]
    fn test_errors_become_unknown() {
        let verdict: Verdict = CheckError::shape("nodes-stats: missing field `nodes`").into();
        assert_eq!(verdict.severity, Severity::Unknown);
        assert_eq!(
            verdict.message,
            "Unexpected response: nodes-stats: missing field `nodes`"
        );

        let verdict: Verdict = CheckError::from(FetchError::Timeout(30)).into();
        assert_eq!(verdict.severity, Severity::Unknown);
        assert_eq!(
            verdict.message,
            "Request failed: Request timed out after 30 seconds"
        );
    }
}
