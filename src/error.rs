// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types shared by the credential, fetch and aggregation layers.

use serde_json::Value;

/// Failure of an authenticated API call.
///
/// This is a closed set: every call through [`crate::services::ApiClient`]
/// ends in exactly one of these.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// No usable access token; the user has to go through OAuth again.
    #[error("Authentication required")]
    AuthRequired,

    /// Transport failure before any response arrived.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status or an unusable body.
    #[error("Strava API error (HTTP {status}): {message}")]
    Remote {
        status: u16,
        message: String,
        body: Value,
    },
}

impl FetchError {
    /// Message Strava sends when the token lacks the `activity:read` scope.
    pub const READ_PERMISSION_MISSING: &'static str = "activity:read_permission";

    /// Whether the caller should prompt the user to re-authenticate.
    ///
    /// True for a missing token, an HTTP 401, and Strava's scope error
    /// (`{"field": "activity:read_permission", "code": "missing"}`).
    pub fn is_auth_error(&self) -> bool {
        match self {
            FetchError::AuthRequired => true,
            FetchError::Network(_) => false,
            FetchError::Remote { status, body, .. } => {
                if *status == 401 {
                    return true;
                }
                let raw = body.to_string();
                raw.contains(Self::READ_PERMISSION_MISSING) && raw.contains("missing")
            }
        }
    }
}

/// Failure while reading one page of the activity feed.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A success response whose payload is an `error`/`errors` object.
    #[error("Strava reported an error: {message}")]
    ApiReported { message: String, body: Value },

    #[error("Malformed activity payload: {0}")]
    Malformed(String),
}

impl PageError {
    pub fn is_auth_error(&self) -> bool {
        match self {
            PageError::Fetch(e) => e.is_auth_error(),
            PageError::ApiReported { body, .. } => {
                let raw = body.to_string();
                raw.contains(FetchError::READ_PERMISSION_MISSING) && raw.contains("missing")
            }
            PageError::Malformed(_) => false,
        }
    }
}

/// Credential store failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Credential storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential storage is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of one OAuth authorization attempt.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Token exchange request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Token exchange failed: {0}")]
    Exchange(String),

    #[error("Invalid callback URL: {0}")]
    InvalidCallback(#[from] url::ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for authenticated calls.
pub type Result<T> = std::result::Result<T, FetchError>;
