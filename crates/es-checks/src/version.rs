//! Server versions and the version-dependent field-selection table.

use std::fmt;
use std::str::FromStr;

use crate::error::CheckError;

/// Parsed `major.minor.patch` server version.
///
/// Pre-release and build suffixes (`-SNAPSHOT`, `+build`) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for ServerVersion {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let core = s
            .trim()
            .split(['-', '+'])
            .next()
            .unwrap_or_default();
        let mut parts = core.split('.');
        let mut next = |required: bool| -> Result<u32, CheckError> {
            match parts.next() {
                Some(part) => part
                    .parse()
                    .map_err(|_| CheckError::shape(format!("invalid server version '{s}'"))),
                None if required => Err(CheckError::shape(format!("invalid server version '{s}'"))),
                None => Ok(0),
            }
        };
        Ok(Self {
            major: next(true)?,
            minor: next(false)?,
            patch: next(false)?,
        })
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Payload that carries each node's file-descriptor limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdLimitSource {
    /// `nodes.<id>.process.max_file_descriptors` of nodes-info.
    NodesInfo,
    /// `nodes.<id>.process.max_file_descriptors` of nodes-stats.
    NodesStats,
}

/// Field sources resolved for one server version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub fd_limit: FdLimitSource,
}

/// Ordered by the first version each selection applies to.
const FIELD_TABLE: &[(ServerVersion, FieldSelection)] = &[
    (
        ServerVersion::new(0, 0, 0),
        FieldSelection {
            fd_limit: FdLimitSource::NodesInfo,
        },
    ),
    (
        ServerVersion::new(2, 0, 0),
        FieldSelection {
            fd_limit: FdLimitSource::NodesStats,
        },
    ),
];

impl FieldSelection {
    /// Selection for `version`; an unknown version gets the newest layout.
    #[must_use]
    pub fn for_version(version: Option<ServerVersion>) -> Self {
        let newest = FIELD_TABLE[FIELD_TABLE.len() - 1].1;
        match version {
            Some(version) => FIELD_TABLE
                .iter()
                .rev()
                .find(|(since, _)| *since <= version)
                .map_or(newest, |(_, selection)| *selection),
            None => newest,
        }
    }

    /// Whether the nodes-info payload must be fetched.
    #[must_use]
    pub fn needs_nodes_info(&self) -> bool {
        self.fd_limit == FdLimitSource::NodesInfo
    }
}

impl Default for FieldSelection {
    fn default() -> Self {
        Self::for_version(None)
    }
}
