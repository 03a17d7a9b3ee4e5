//! Connection configuration for the statistics client.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::FetchError;

/// Default Elasticsearch HTTP port.
pub const DEFAULT_PORT: u16 = 9200;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How requests reach the cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transport {
    /// Plain HTTP(S), optionally with basic auth.
    #[default]
    Default,
    /// AWS-hosted domain; every request is SigV4 signed.
    Aws,
}

impl FromStr for Transport {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "default" | "http" => Ok(Self::Default),
            "aws" | "signed-cloud" => Ok(Self::Aws),
            other => Err(FetchError::Config(format!("unknown transport: {other}"))),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Aws => write!(f, "aws"),
        }
    }
}

/// URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl FromStr for Scheme {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(FetchError::Config(format!("unknown scheme: {other}"))),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

/// Everything the client needs to reach one cluster.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Transport kind.
    pub transport: Transport,
    /// AWS region (signed transport only).
    pub region: Option<String>,
    /// AWS shared-credentials profile (signed transport only).
    pub profile: Option<String>,
    /// Cluster host name or address.
    pub host: String,
    /// Cluster HTTP port.
    pub port: u16,
    /// Basic auth user.
    pub user: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
    /// Explicit scheme; derived from credentials when unset.
    pub scheme: Option<Scheme>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Default,
            region: None,
            profile: None,
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            user: None,
            password: None,
            scheme: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ConnectionConfig {
    /// Whether basic-auth credentials are fully configured.
    #[must_use]
    pub fn has_basic_auth(&self) -> bool {
        self.user.is_some() && self.password.is_some()
    }

    /// Scheme actually used: an explicit scheme wins, otherwise https iff
    /// credentials are present.
    #[must_use]
    pub fn effective_scheme(&self) -> Scheme {
        match self.scheme {
            Some(scheme) => scheme,
            None if self.has_basic_auth() || self.transport == Transport::Aws => Scheme::Https,
            None => Scheme::Http,
        }
    }

    /// Base URL of the cluster, e.g. `http://localhost:9200`.
    pub fn base_url(&self) -> Result<url::Url, FetchError> {
        if self.host.trim().is_empty() {
            return Err(FetchError::Config("host must not be empty".to_string()));
        }
        let raw = format!("{}://{}:{}", self.effective_scheme(), self.host, self.port);
        Ok(url::Url::parse(&raw)?)
    }

    /// Per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
