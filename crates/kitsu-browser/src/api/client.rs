//! Kitsu transport client.
//!
//! Issues GET requests against the configured base URL with the JSON:API
//! headers and a bounded timeout. Failures are reported raw; turning them into
//! something a view can act on is the job of [`crate::error::classify`].

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// JSON:API media type sent in both `Accept` and `Content-Type`
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Catalog request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw transport-level failure
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("request to {url} failed with status {status}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
}

impl TransportError {
    pub(crate) fn from_reqwest(url: impl ToString, err: reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            TransportError::Timeout { url }
        } else if err.is_connect() {
            TransportError::Connect {
                url,
                message: err.to_string(),
            }
        } else if err.is_decode() {
            TransportError::Decode {
                url,
                message: err.to_string(),
            }
        } else {
            TransportError::Request {
                url,
                message: err.to_string(),
            }
        }
    }

    /// HTTP status of the failed response, if one was received
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Successful response: status and decoded JSON body
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Kitsu API transport client
#[derive(Debug, Clone)]
pub struct KitsuClient {
    /// HTTP client
    client: Client,
    /// Base URL for the Kitsu API
    base_url: Url,
}

impl KitsuClient {
    /// Create a new client for the given base URL
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TransportError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_API_MEDIA_TYPE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_API_MEDIA_TYPE));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .user_agent(concat!("kitsu-browser/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TransportError::Build)?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the URL for a path below the base URL.
    ///
    /// Each segment is percent-encoded on its own, so an identifier can never
    /// escape its path position.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET `segments` below the base URL with the given query parameters
    pub async fn get(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<TransportResponse, TransportError> {
        let url = self.endpoint(segments)?;

        debug!(url = %url, query = ?query, "Making API request");

        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            warn!(url = %url, status = %status, "Request failed");
            return Err(TransportError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::from_reqwest(&url, e))?;

        debug!(url = %url, status = %status, "Request successful");
        Ok(TransportResponse { status, body })
    }
}
