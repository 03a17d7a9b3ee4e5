//! reqwest-backed implementation of [`StatsFetcher`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ConnectionConfig, Transport};
use crate::credentials::{AwsCredentials, AwsSession};
use crate::error::FetchError;
use crate::sigv4::{SigV4Signer, ES_SERVICE};
use crate::traits::{ClusterHealthOptions, NodeScope, RequestOptions, StatsFetcher};

/// How each request is authenticated.
#[derive(Debug, Clone)]
enum Auth {
    None,
    Basic { user: String, password: String },
    SigV4(SigV4Signer),
}

/// Statistics client for one cluster.
///
/// The underlying connection pool lives exactly as long as this value.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// HTTP client.
    client: Client,
    /// Scheme, host and port of the cluster.
    base_url: Url,
    /// Per-request timeout in seconds.
    timeout_secs: u64,
    /// Request authentication.
    auth: Auth,
}

impl HttpFetcher {
    /// Create a client for `config`, resolving AWS credentials and region
    /// through the AWS default chain when the signed transport is selected.
    ///
    /// # Errors
    /// Returns error if the configuration is incomplete, no AWS credentials
    /// can be resolved, or the HTTP client cannot be created.
    pub async fn new(config: &ConnectionConfig) -> Result<Self, FetchError> {
        let session = match config.transport {
            Transport::Aws => Some(
                AwsSession::load(config.profile.as_deref(), config.region.as_deref()).await?,
            ),
            Transport::Default => None,
        };
        Self::build(config, session)
    }

    /// Create a client with explicit AWS credentials for the signed transport.
    ///
    /// The region must be set on `config`.
    pub fn with_credentials(
        config: &ConnectionConfig,
        credentials: AwsCredentials,
    ) -> Result<Self, FetchError> {
        let session = AwsSession {
            credentials,
            region: config.region.clone(),
        };
        Self::build(config, Some(session))
    }

    fn build(config: &ConnectionConfig, session: Option<AwsSession>) -> Result<Self, FetchError> {
        let auth = match (config.transport, session) {
            (Transport::Aws, Some(session)) => {
                let region = session
                    .region
                    .filter(|r| !r.trim().is_empty())
                    .ok_or_else(|| {
                        FetchError::Config("region is required for the aws transport".to_string())
                    })?;
                Auth::SigV4(SigV4Signer::new(session.credentials, region, ES_SERVICE))
            }
            (Transport::Aws, None) => {
                return Err(FetchError::Credentials(
                    "no credentials for the aws transport".to_string(),
                ))
            }
            (Transport::Default, _) => match (&config.user, &config.password) {
                (Some(user), Some(password)) => Auth::Basic {
                    user: user.clone(),
                    password: password.clone(),
                },
                _ => Auth::None,
            },
        };

        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout())
            .build()?;

        let base_url = config.base_url()?;
        debug!(base_url = %base_url, transport = %config.transport, "Statistics client ready");

        Ok(Self {
            client,
            base_url,
            timeout_secs: config.timeout_secs,
            auth,
        })
    }

    /// Build an endpoint URL from path segments and query pairs.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::Config(format!("cannot use {} as a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Issue an authenticated GET and parse the JSON body.
    ///
    /// `also_accept` lists non-2xx statuses whose JSON body is still a valid
    /// answer.
    async fn get(
        &self,
        url: Url,
        request_timeout_secs: u64,
        also_accept: &[StatusCode],
    ) -> Result<Value, FetchError> {
        debug!(url = %url, "GET request");

        let mut request = self
            .client
            .get(url.clone())
            .timeout(Duration::from_secs(request_timeout_secs));

        match &self.auth {
            Auth::None => {}
            Auth::Basic { user, password } => {
                request = request.basic_auth(user, Some(password));
            }
            Auth::SigV4(signer) => {
                for (name, value) in signer.sign("GET", &url, chrono::Utc::now())? {
                    request = request.header(name, value);
                }
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| timeout_aware(e, request_timeout_secs))?;
        self.handle_response(response, request_timeout_secs, also_accept)
            .await
    }

    /// Handle API response, parsing JSON or error.
    async fn handle_response(
        &self,
        response: reqwest::Response,
        request_timeout_secs: u64,
        also_accept: &[StatusCode],
    ) -> Result<Value, FetchError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| timeout_aware(e, request_timeout_secs))?;

        if status.is_success() || also_accept.contains(&status) {
            match serde_json::from_str(&text) {
                Ok(value) => Ok(value),
                Err(_) if !status.is_success() => Err(FetchError::Api {
                    status: status.as_u16(),
                    message: text,
                }),
                Err(e) => {
                    warn!(error = %e, body = %text, "Failed to parse response");
                    Err(FetchError::Serialization(e))
                }
            }
        } else {
            Err(FetchError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

fn timeout_aware(error: reqwest::Error, timeout_secs: u64) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout(timeout_secs)
    } else {
        FetchError::Http(error)
    }
}

fn timeout_param(timeout_secs: Option<u64>) -> Option<(&'static str, String)> {
    timeout_secs.map(|secs| ("timeout", format!("{secs}s")))
}

#[async_trait]
impl StatsFetcher for HttpFetcher {
    async fn nodes_stats(
        &self,
        scope: NodeScope,
        options: &RequestOptions,
    ) -> Result<Value, FetchError> {
        let segments: &[&str] = match scope {
            NodeScope::All => &["_nodes", "stats"],
            NodeScope::Local => &["_nodes", "_local", "stats"],
        };
        let query: Vec<_> = timeout_param(options.timeout_secs).into_iter().collect();
        let url = self.endpoint(segments, &query)?;
        self.get(url, self.timeout_secs, &[]).await
    }

    async fn nodes_info(&self) -> Result<Value, FetchError> {
        // 1.x servers reject the `<n>s` timeout form here, so none is sent.
        let url = self.endpoint(&["_nodes"], &[])?;
        self.get(url, self.timeout_secs, &[]).await
    }

    async fn cluster_health(&self, options: &ClusterHealthOptions) -> Result<Value, FetchError> {
        let mut segments = vec!["_cluster", "health"];
        if let Some(index) = options.index.as_deref() {
            segments.push(index);
        }

        let mut query = Vec::new();
        if let Some(level) = &options.level {
            query.push(("level", level.clone()));
        }
        if options.local {
            query.push(("local", "true".to_string()));
        }
        if let Some(status) = &options.wait_for_status {
            query.push(("wait_for_status", status.clone()));
        }
        query.extend(timeout_param(options.timeout_secs));

        // Leave room for the server-side wait before the transport gives up.
        let request_timeout = match (&options.wait_for_status, options.timeout_secs) {
            (Some(_), Some(wait)) => self.timeout_secs.saturating_add(wait),
            _ => self.timeout_secs,
        };

        let url = self.endpoint(&segments, &query)?;
        self.get(url, request_timeout, &[StatusCode::REQUEST_TIMEOUT])
            .await
    }

    async fn cluster_state(&self, options: &RequestOptions) -> Result<Value, FetchError> {
        let query: Vec<_> = timeout_param(options.timeout_secs).into_iter().collect();
        let url = self.endpoint(&["_cluster", "state", "master_node"], &query)?;
        self.get(url, self.timeout_secs, &[]).await
    }

    async fn cluster_stats(&self, options: &RequestOptions) -> Result<Value, FetchError> {
        let query: Vec<_> = timeout_param(options.timeout_secs).into_iter().collect();
        let url = self.endpoint(&["_cluster", "stats"], &query)?;
        self.get(url, self.timeout_secs, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::build(&ConnectionConfig::default(), None).unwrap()
    }

    #[test]
    fn test_endpoint_without_query_has_no_question_mark() {
        let url = fetcher().endpoint(&["_nodes"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9200/_nodes");
    }

    #[test]
    fn test_endpoint_encodes_index_segment() {
        let url = fetcher()
            .endpoint(
                &["_cluster", "health", "logs 2024"],
                &[("timeout", "30s".to_string())],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9200/_cluster/health/logs%202024?timeout=30s"
        );
    }

    #[test]
    fn test_aws_transport_requires_region() {
        let config = ConnectionConfig {
            transport: Transport::Aws,
            region: Some(String::new()),
            ..ConnectionConfig::default()
        };
        let creds = AwsCredentials {
            access_key_id: "AKIA".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: None,
        };
        let result = HttpFetcher::with_credentials(&config, creds);
        assert!(matches!(result, Err(FetchError::Config(_))));
    }
}
