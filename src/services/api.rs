// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated fetch: every API call goes through here.

use reqwest::Method;
use serde_json::Value;

use crate::error::{FetchError, Result};
use crate::services::strava::RequestOptions;
use crate::services::{StravaClient, TokenManager};

/// Wraps API calls with token resolution and a uniform error shape.
#[derive(Clone)]
pub struct ApiClient {
    client: StravaClient,
    tokens: TokenManager,
}

impl ApiClient {
    pub fn new(client: StravaClient, tokens: TokenManager) -> Self {
        Self { client, tokens }
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Resolve a token, attach it, perform the call and return the JSON body.
    ///
    /// Fails with [`FetchError::AuthRequired`] before anything is sent when no
    /// usable token exists.
    pub async fn authenticated_request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Value> {
        let Some(access_token) = self.tokens.resolve_access_token().await else {
            tracing::warn!(url, "No usable access token, authentication required");
            return Err(FetchError::AuthRequired);
        };

        let result = self
            .client
            .send_authorized(method.clone(), url, &access_token, options)
            .await;

        if let Err(e) = &result {
            tracing::warn!(%method, url, error = %e, "Authenticated request failed");
        }
        result
    }

    /// Convenience GET.
    pub async fn get_json(&self, url: &str, options: RequestOptions) -> Result<Value> {
        self.authenticated_request(Method::GET, url, options).await
    }
}
