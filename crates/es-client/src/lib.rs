//! Read-only Elasticsearch statistics client.
//!
//! This crate is the fetch side of the es-checks health checks: it knows how to reach
//! a cluster (plain HTTP(S), basic auth, or SigV4-signed requests against an
//! AWS-hosted domain) and returns the raw JSON payloads of the administrative
//! statistics endpoints. It does not interpret them.
//!
//! ## Endpoints
//!
//! | Method | Endpoint |
//! |---|---|
//! | [`StatsFetcher::nodes_stats`] | `/_nodes/stats`, `/_nodes/_local/stats` |
//! | [`StatsFetcher::nodes_info`] | `/_nodes` |
//! | [`StatsFetcher::cluster_health`] | `/_cluster/health[/<index>]` |
//! | [`StatsFetcher::cluster_state`] | `/_cluster/state/master_node` |
//! | [`StatsFetcher::cluster_stats`] | `/_cluster/stats` |
//!
//! ## Example
//!
//! ```no_run
//! use es_client::{ConnectionConfig, HttpFetcher, RequestOptions, StatsFetcher};
//!
//! # async fn example() -> Result<(), es_client::FetchError> {
//! let fetcher = HttpFetcher::new(&ConnectionConfig::default()).await?;
//! let stats = fetcher.cluster_stats(&RequestOptions::with_timeout(30)).await?;
//! println!("{}", stats["nodes"]["versions"]);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod sigv4;
pub mod traits;

pub use client::HttpFetcher;
pub use config::{ConnectionConfig, Scheme, Transport};
pub use credentials::{AwsCredentials, AwsSession};
pub use error::FetchError;
pub use traits::{ClusterHealthOptions, NodeScope, RequestOptions, StatsFetcher};
