//! Check verdicts and the exit-code convention.

use std::fmt;
use std::process::ExitCode;

/// Outcome severity of one check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    /// Process exit code: OK=0, WARNING=1, CRITICAL=2, UNKNOWN=3.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Critical => 2,
            Self::Unknown => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Final result of a check: a severity and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub severity: Severity,
    pub message: String,
}

impl Verdict {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(Severity::Ok, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(Severity::Unknown, message)
    }

    /// Single output line, e.g. `ESHeap OK: Heap used in bytes 1024`.
    #[must_use]
    pub fn render(&self, check_name: &str) -> String {
        // Keep the verdict on one line whatever the message carries.
        let message = self.message.replace(['\r', '\n'], " ");
        format!("{check_name} {}: {message}", self.severity)
    }

    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.severity.exit_code())
    }
}
