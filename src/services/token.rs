// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access token lifecycle: validity check and just-in-time refresh.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db::{keys, CredentialStore};
use crate::services::StravaClient;
use crate::time_utils;

/// Decides on every call whether the stored access token can be used or has to
/// be exchanged for a new one.
///
/// Validity is purely time-based; a token revoked on the server side is only
/// noticed when the API rejects it.
#[derive(Clone)]
pub struct TokenManager {
    client: StravaClient,
    store: Arc<dyn CredentialStore>,
    /// Seconds before `expires_at` at which a token already counts as expired.
    margin_secs: i64,
    /// Serializes refreshes so concurrent callers share one token request.
    refresh_lock: Arc<Mutex<()>>,
}

impl TokenManager {
    pub fn new(client: StravaClient, store: Arc<dyn CredentialStore>, margin_secs: i64) -> Self {
        Self {
            client,
            store,
            margin_secs,
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Get a valid access token, refreshing it if it has expired.
    ///
    /// Returns `None` when there is nothing to refresh with or the refresh
    /// failed; the caller must then run the OAuth flow again. Stored state is
    /// left untouched on failure.
    pub async fn resolve_access_token(&self) -> Option<String> {
        // Fast path: fresh token, no lock and no network
        match self.read_state().await? {
            TokenState::Fresh(token) => return Some(token),
            TokenState::Expired(_) => {}
        }

        let _guard = self.refresh_lock.lock().await;

        // Another task may have refreshed while we were waiting.
        let refresh_token = match self.read_state().await? {
            TokenState::Fresh(token) => return Some(token),
            TokenState::Expired(refresh_token) => refresh_token,
        };

        tracing::info!("Access token expired, refreshing");
        self.refresh(&refresh_token).await
    }

    async fn read_state(&self) -> Option<TokenState> {
        let values = match self
            .store
            .get_many(&[keys::REFRESH_TOKEN, keys::EXPIRES_AT, keys::ACCESS_TOKEN])
            .await
        {
            Ok(values) => values,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read credentials");
                return None;
            }
        };
        let mut values = values.into_iter();
        let refresh_token = values.next().flatten()?;
        let expires_raw = values.next().flatten()?;
        let access_token = values.next().flatten();

        let Ok(expires_at) = expires_raw.trim().parse::<i64>() else {
            tracing::warn!(value = %expires_raw, "Stored token expiry is not an integer");
            return None;
        };

        let now = time_utils::now_unix();
        match access_token {
            Some(token) if expires_at.saturating_sub(self.margin_secs) > now => {
                Some(TokenState::Fresh(token))
            }
            _ => Some(TokenState::Expired(refresh_token)),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Option<String> {
        let response = match self.client.refresh_token(refresh_token).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Error refreshing access token");
                return None;
            }
        };

        let (Some(access_token), Some(expires_at)) = (response.access_token, response.expires_at)
        else {
            tracing::error!("Failed to refresh token: response missing access_token or expires_at");
            return None;
        };

        let expires_raw = expires_at.to_string();
        let mut entries = vec![
            (keys::ACCESS_TOKEN, access_token.as_str()),
            (keys::EXPIRES_AT, expires_raw.as_str()),
        ];
        // Strava may rotate the refresh token; keep the one it handed back.
        if let Some(rotated) = response.refresh_token.as_deref() {
            entries.push((keys::REFRESH_TOKEN, rotated));
        }

        if let Err(e) = self.store.set_many(&entries).await {
            tracing::error!(error = %e, "Failed to persist refreshed token");
            return None;
        }

        tracing::info!(expires_at, "Token refreshed and stored");
        Some(access_token)
    }
}

enum TokenState {
    Fresh(String),
    /// Carries the refresh token to exchange.
    Expired(String),
}
