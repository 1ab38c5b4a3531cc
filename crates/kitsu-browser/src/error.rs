//! Error classification.
//!
//! Raw failures from the transport (and payload validation) are mapped to a
//! closed taxonomy that views match on to choose a recovery affordance.

use crate::api::TransportError;
use thiserror::Error;

pub const NETWORK_MESSAGE: &str = "Connection error. Check your internet connection.";
pub const SERVICE_MESSAGE: &str = "Could not load content. Please try again.";
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response from server.";
pub const NOT_FOUND_MESSAGE: &str = "Anime not found.";

/// Classified catalog error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Connectivity problem (timeout, unreachable host)
    #[error("{0}")]
    Network(String),

    /// Upstream failure or unusable response; safe to retry
    #[error("{0}")]
    Service(String),

    /// The requested entity does not exist
    #[error("{0}")]
    NotFound(String),
}

/// What a view should offer the user after an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Connectivity-specific retry
    RetryConnection,
    /// Generic retry showing the error message
    Retry,
    /// Nothing to retry; navigate away
    NavigateAway,
}

impl CatalogError {
    pub fn network() -> Self {
        CatalogError::Network(NETWORK_MESSAGE.to_string())
    }

    pub fn service() -> Self {
        CatalogError::Service(SERVICE_MESSAGE.to_string())
    }

    pub fn not_found() -> Self {
        CatalogError::NotFound(NOT_FOUND_MESSAGE.to_string())
    }

    pub fn message(&self) -> &str {
        match self {
            CatalogError::Network(msg) | CatalogError::Service(msg) | CatalogError::NotFound(msg) => {
                msg
            }
        }
    }

    pub fn recovery(&self) -> Recovery {
        match self {
            CatalogError::Network(_) => Recovery::RetryConnection,
            CatalogError::Service(_) => Recovery::Retry,
            CatalogError::NotFound(_) => Recovery::NavigateAway,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.recovery() != Recovery::NavigateAway
    }
}

/// Anything that can go wrong while fetching from the catalog
#[derive(Debug, Error)]
pub enum Failure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Successful status but the payload is not what we expect
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Already classified; passes through untouched
    #[error(transparent)]
    Classified(#[from] CatalogError),
}

/// Map a failure onto the error taxonomy.
///
/// Rules, first match wins:
/// 1. no response (timeout, connection failure) → `Network`
/// 2. status >= 500 → `Service`
/// 3. status 404 → `NotFound`
/// 4. anything else (other statuses, undecodable or malformed payloads) → `Service`
/// 5. already classified → unchanged
pub fn classify(failure: Failure) -> CatalogError {
    match failure {
        Failure::Classified(err) => err,
        Failure::MalformedPayload(reason) => {
            tracing::warn!(reason = %reason, "Malformed catalog payload");
            CatalogError::Service(INVALID_RESPONSE_MESSAGE.to_string())
        }
        Failure::Transport(err) => match err {
            TransportError::Timeout { .. }
            | TransportError::Connect { .. }
            | TransportError::Request { .. } => CatalogError::network(),
            TransportError::Status { status, .. } if status.is_server_error() => {
                CatalogError::service()
            }
            TransportError::Status { status, .. } if status == reqwest::StatusCode::NOT_FOUND => {
                CatalogError::not_found()
            }
            TransportError::Decode { .. } => {
                CatalogError::Service(INVALID_RESPONSE_MESSAGE.to_string())
            }
            TransportError::Status { .. }
            | TransportError::InvalidBaseUrl(_)
            | TransportError::Build(_) => CatalogError::service(),
        },
    }
}
