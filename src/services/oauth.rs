// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth authorization-code flow against Strava.
//!
//! ```text
//! Unauthenticated ──initiate()──▶ AwaitingRedirect ──callback with code──▶ Exchanging
//!        ▲                              │ (no code: stay)                    │
//!        │                              ▼                                    ▼
//!        └──────── logout() ──── Authenticated ◀──────── exchange ok ────────┘
//!                                 (exchange failure → Unauthenticated)
//! ```

use std::sync::Arc;

use crate::config::Config;
use crate::db::{self, keys, CredentialStore};
use crate::error::OAuthError;
use crate::models::CredentialRecord;
use crate::services::StravaClient;

/// Scope requested from Strava.
pub const OAUTH_SCOPE: &str = "activity:read_all";

/// Where the client is in the authorization flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    AwaitingRedirect,
    Exchanging,
    Authenticated,
}

/// Drives the authorization-code flow and owns the resulting credentials.
pub struct OAuthController {
    client: StravaClient,
    store: Arc<dyn CredentialStore>,
    authorize_url: String,
    redirect_uri: String,
    state: AuthState,
}

impl OAuthController {
    pub fn new(config: &Config, client: StravaClient, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            client,
            store,
            authorize_url: config.authorize_url(),
            redirect_uri: config.redirect_uri.clone(),
            state: AuthState::Unauthenticated,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Resolve the startup state from the store.
    ///
    /// Authenticated iff an access token is stored; expiry is not checked here,
    /// the token manager deals with it on first use.
    pub async fn load(&mut self) -> Result<AuthState, OAuthError> {
        let token = self.store.get(keys::ACCESS_TOKEN).await?;
        self.state = if token.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        };
        tracing::debug!(state = ?self.state, "Loaded authentication state");
        Ok(self.state)
    }

    /// Build the authorization URL the user must open, and start waiting for
    /// the redirect.
    pub fn initiate(&mut self) -> String {
        let url = build_authorization_url(
            &self.authorize_url,
            self.client.client_id(),
            &self.redirect_uri,
        );
        self.transition(AuthState::AwaitingRedirect);
        url
    }

    /// Handle the redirect URL delivered by the platform.
    ///
    /// Without a `code` parameter (the user declined, or an unrelated link) the
    /// controller keeps waiting. With one, the code is exchanged and the tokens
    /// persisted in one batch.
    pub async fn handle_callback(&mut self, callback_url: &str) -> Result<AuthState, OAuthError> {
        if !matches!(self.state, AuthState::Unauthenticated | AuthState::AwaitingRedirect) {
            tracing::warn!(state = ?self.state, "Ignoring OAuth callback in current state");
            return Ok(self.state);
        }

        let params = CallbackParams::parse(callback_url)?;
        if let Some(error) = &params.error {
            tracing::warn!(error = %error, "OAuth error from Strava");
        }
        let Some(code) = params.code else {
            tracing::info!("OAuth callback without code, still waiting for authorization");
            self.transition(AuthState::AwaitingRedirect);
            return Ok(self.state);
        };

        self.transition(AuthState::Exchanging);
        match self.exchange(&code).await {
            Ok(expires_at) => {
                tracing::info!(expires_at, "OAuth successful, tokens stored");
                self.transition(AuthState::Authenticated);
                Ok(self.state)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to exchange authorization code");
                self.transition(AuthState::Unauthenticated);
                Err(e)
            }
        }
    }

    /// Delete all stored credentials.
    pub async fn logout(&mut self) -> Result<(), OAuthError> {
        db::clear_credentials(self.store.as_ref()).await?;
        self.transition(AuthState::Unauthenticated);
        Ok(())
    }

    async fn exchange(&self, code: &str) -> Result<i64, OAuthError> {
        let response = self.client.exchange_code(code).await.map_err(|e| match e {
            crate::services::strava::TokenEndpointError::Network(e) => OAuthError::Network(e),
            other => OAuthError::Exchange(other.to_string()),
        })?;

        let (Some(access_token), Some(refresh_token), Some(expires_at)) = (
            response.access_token,
            response.refresh_token,
            response.expires_at,
        ) else {
            return Err(OAuthError::Exchange(
                "response missing access_token, refresh_token or expires_at".to_string(),
            ));
        };

        let record = CredentialRecord {
            access_token,
            refresh_token,
            expires_at,
        };
        db::save_credentials(self.store.as_ref(), &record).await?;
        Ok(expires_at)
    }

    fn transition(&mut self, next: AuthState) {
        if self.state != next {
            tracing::info!(from = ?self.state, to = ?next, "Authentication state changed");
            self.state = next;
        }
    }
}

/// Build `{authorize}?client_id=..&response_type=code&redirect_uri=..&scope=..`.
pub fn build_authorization_url(authorize_url: &str, client_id: &str, redirect_uri: &str) -> String {
    format!(
        "{}?\
         client_id={}&\
         response_type=code&\
         redirect_uri={}&\
         scope={}",
        authorize_url,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        OAUTH_SCOPE
    )
}

/// Query parameters of the redirect callback.
#[derive(Debug, Default, PartialEq)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
}

impl CallbackParams {
    fn parse(callback_url: &str) -> Result<Self, url::ParseError> {
        let url = url::Url::parse(callback_url)?;
        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" if !value.is_empty() => params.code = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                _ => {}
            }
        }
        Ok(params)
    }
}
