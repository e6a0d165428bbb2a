// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Low-level Strava HTTP client.
//!
//! Handles:
//! - The OAuth token endpoint (code exchange and refresh)
//! - Bearer-authenticated requests with a normalized error shape
//!
//! Token lifecycle decisions live in [`super::token::TokenManager`].

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::Config;
use crate::error::FetchError;

const GENERIC_ERROR_MESSAGE: &str = "An error occurred during the fetch request";

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client from configuration.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.http_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            token_url: config.token_url(),
            client_id: config.strava_client_id.clone(),
            client_secret: config.strava_client_secret.clone(),
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Exchange an authorization code for the initial token set.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, TokenEndpointError> {
        self.post_token(serde_json::json!({
            "client_id": self.client_id,
            "client_secret": self.client_secret,
            "code": code,
            "grant_type": "authorization_code",
        }))
        .await
    }

    /// Refresh an expired access token.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, TokenEndpointError> {
        self.post_token(serde_json::json!({
            "client_id": self.client_id,
            "client_secret": self.client_secret,
            "refresh_token": refresh_token,
            "grant_type": "refresh_token",
        }))
        .await
    }

    async fn post_token(&self, body: Value) -> Result<TokenResponse, TokenEndpointError> {
        let response = self.http.post(&self.token_url).json(&body).send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(TokenEndpointError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| TokenEndpointError::Parse(e.to_string()))
    }

    /// Perform a request with a bearer token and return the JSON body.
    ///
    /// Caller headers are kept; only `Authorization` is overwritten.
    pub async fn send_authorized(
        &self,
        method: Method,
        url: &str,
        access_token: &str,
        options: RequestOptions,
    ) -> Result<Value, FetchError> {
        let mut headers = options.headers;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", access_token)).map_err(|_| {
            FetchError::Remote {
                status: 0,
                message: "Access token is not a valid header value".to_string(),
                body: Value::Null,
            }
        })?;
        headers.insert(AUTHORIZATION, bearer);

        let mut request = self.http.request(method, url).headers(headers);
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = options.json {
            request = request.json(&body);
        }

        let response = request.send().await?;
        check_response_json(response).await
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json(response: reqwest::Response) -> Result<Value, FetchError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        // Best-effort: keep the raw text when the body isn't JSON
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(GENERIC_ERROR_MESSAGE)
            .to_string();

        if status.as_u16() == 429 {
            tracing::warn!("Strava rate limit hit (429)");
        }

        return Err(FetchError::Remote {
            status: status.as_u16(),
            message,
            body,
        });
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&text).map_err(|e| FetchError::Remote {
        status: status.as_u16(),
        message: format!("JSON parse error: {}", e),
        body: Value::String(text),
    })
}

/// Extra request parts supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub json: Option<Value>,
}

impl RequestOptions {
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// Token endpoint response.
///
/// Every field is optional so a response missing one is detected by the
/// caller instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    /// Only guaranteed on code exchange; Strava rotates it on refresh.
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// Token endpoint failure.
#[derive(Debug, thiserror::Error)]
pub enum TokenEndpointError {
    #[error("Token request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Token endpoint returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("Failed to parse token response: {0}")]
    Parse(String),
}
