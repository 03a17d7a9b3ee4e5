//! AWS Signature Version 4 signing for the signed-cloud transport.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};
use url::Url;

use crate::credentials::AwsCredentials;
use crate::error::FetchError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Everything but the RFC 3986 unreserved characters is escaped.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Service name for Amazon OpenSearch/Elasticsearch domains.
pub const ES_SERVICE: &str = "es";

/// Signs requests for one region/service with static credentials.
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: AwsCredentials,
    region: String,
    service: String,
}

impl SigV4Signer {
    #[must_use]
    pub fn new(
        credentials: AwsCredentials,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: service.into(),
        }
    }

    /// Headers to attach to a body-less request for `url`, signed at `timestamp`.
    pub fn sign(
        &self,
        method: &str,
        url: &Url,
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<(String, String)>, FetchError> {
        let host = url
            .host_str()
            .ok_or_else(|| FetchError::Config(format!("missing host in {url}")))?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        let amz_date = timestamp.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = timestamp.format("%Y%m%d").to_string();

        // Header names are already lowercase and sorted.
        let mut headers = vec![
            ("host".to_string(), host),
            ("x-amz-date".to_string(), amz_date.clone()),
        ];
        if let Some(token) = &self.credentials.session_token {
            headers.push(("x-amz-security-token".to_string(), token.clone()));
        }

        let canonical_headers: String = headers
            .iter()
            .map(|(k, v)| format!("{k}:{}\n", v.trim()))
            .collect();
        let signed_headers = headers
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let payload_hash = hex::encode(Sha256::digest(b""));
        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            method.to_uppercase(),
            canonical_uri(url),
            canonical_query(url),
            canonical_headers,
            signed_headers,
            payload_hash
        );

        let credential_scope = format!(
            "{date_stamp}/{}/{}/aws4_request",
            self.region, self.service
        );
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{credential_scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signature = self.signature(&string_to_sign, &date_stamp)?;
        let authorization = format!(
            "{ALGORITHM} Credential={}/{credential_scope}, SignedHeaders={signed_headers}, Signature={signature}",
            self.credentials.access_key_id
        );

        // `host` is set by the HTTP client itself.
        let mut out: Vec<(String, String)> = headers
            .into_iter()
            .filter(|(k, _)| k != "host")
            .collect();
        out.push(("authorization".to_string(), authorization));
        Ok(out)
    }

    fn signature(&self, string_to_sign: &str, date_stamp: &str) -> Result<String, FetchError> {
        let k_date = hmac_sha256(
            format!("AWS4{}", self.credentials.secret_access_key).as_bytes(),
            date_stamp.as_bytes(),
        )?;
        let k_region = hmac_sha256(&k_date, self.region.as_bytes())?;
        let k_service = hmac_sha256(&k_region, self.service.as_bytes())?;
        let k_signing = hmac_sha256(&k_service, b"aws4_request")?;
        Ok(hex::encode(hmac_sha256(
            &k_signing,
            string_to_sign.as_bytes(),
        )?))
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, FetchError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| FetchError::Credentials(format!("HMAC key error: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Path with every already-escaped segment encoded a second time.
fn canonical_uri(url: &Url) -> String {
    match url.path_segments() {
        Some(segments) => {
            let encoded: Vec<String> = segments.map(uri_encode).collect();
            format!("/{}", encoded.join("/"))
        }
        None => "/".to_string(),
    }
}

/// Sorted, RFC 3986 encoded query string.
fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (uri_encode(&k), uri_encode(&v)))
        .collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn uri_encode(input: &str) -> String {
    utf8_percent_encode(input, UNRESERVED).to_string()
}
