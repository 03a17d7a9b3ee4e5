//! AWS credential resolution for the signed transport.
//!
//! Credentials come from the AWS default provider chain (environment, shared
//! config and credentials files, SSO, `credential_process`, container and
//! instance roles), optionally pinned to a named profile.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::Credentials;
use tracing::debug;

use crate::error::FetchError;

/// Static AWS credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl From<&Credentials> for AwsCredentials {
    fn from(credentials: &Credentials) -> Self {
        Self {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().map(str::to_string),
        }
    }
}

/// Credentials plus the region the AWS configuration chain settled on.
#[derive(Debug, Clone)]
pub struct AwsSession {
    pub credentials: AwsCredentials,
    pub region: Option<String>,
}

impl AwsSession {
    /// Load credentials and region through the AWS default chain.
    ///
    /// An explicit `region` wins over whatever the environment or profile
    /// names.
    pub async fn load(profile: Option<&str>, region: Option<&str>) -> Result<Self, FetchError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = region.filter(|r| !r.trim().is_empty()) {
            loader = loader.region(Region::new(region.to_string()));
        }
        Self::from_sdk_config(&loader.load().await).await
    }

    async fn from_sdk_config(config: &SdkConfig) -> Result<Self, FetchError> {
        let provider = config.credentials_provider().ok_or_else(|| {
            FetchError::Credentials("no AWS credentials provider configured".to_string())
        })?;
        let credentials = provider
            .provide_credentials()
            .await
            .map_err(|e| FetchError::Credentials(e.to_string()))?;

        let region = config.region().map(|r| r.as_ref().to_string());
        debug!(region = ?region, "Resolved AWS credentials");

        Ok(Self {
            credentials: AwsCredentials::from(&credentials),
            region,
        })
    }
}
