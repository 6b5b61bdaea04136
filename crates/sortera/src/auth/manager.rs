//! Bearer token acquisition and renewal.

use serde::Deserialize;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::error::{AuthError, Error, ProtocolError, TransientError};
use crate::http::{ClientConfig, is_retryable_status};

use super::credentials::Credentials;
use super::token::{AccessToken, TokenState};

/// Path of the credential exchange endpoint.
const TOKEN_PATH: &str = "connect/token";

/// Obtains bearer tokens and renews them ahead of expiry.
///
/// The manager owns the credentials and the cached token. Callers receive a
/// formatted header snapshot; the token itself never leaves this module.
/// Renewal is serialized behind the write lock, so concurrent callers that
/// observe a stale token produce a single renewal call and then share the
/// result.
#[derive(Debug)]
pub(crate) struct TokenManager {
    credentials: Credentials,
    http: reqwest::Client,
    config: ClientConfig,
    state: RwLock<Option<TokenState>>,
}

impl TokenManager {
    pub(crate) fn new(
        credentials: Credentials,
        http: reqwest::Client,
        config: ClientConfig,
    ) -> Self {
        Self {
            credentials,
            http,
            config,
            state: RwLock::new(None),
        }
    }

    /// Returns a `Bearer` header value, renewing first if no token is
    /// cached or the cached one is due.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the renewal call is rejected or fails after
    /// the configured transient retries.
    pub(crate) async fn authorization_header(&self) -> crate::Result<String> {
        {
            let state = self.state.read().await;
            if let Some(current) = state.as_ref() {
                if !current.needs_renewal() {
                    return Ok(current.header_value());
                }
            }
        }

        let mut state = self.state.write().await;
        // Another caller may have renewed while we waited on the write lock
        if let Some(current) = state.as_ref() {
            if !current.needs_renewal() {
                return Ok(current.header_value());
            }
        }

        let fresh = self.renew().await?;
        let header = fresh.header_value();
        *state = Some(fresh);
        Ok(header)
    }

    /// Drop the cached token and fetch a new one unconditionally.
    ///
    /// Used after a 401 to rule out a race between the local expiry check
    /// and server-side invalidation.
    pub(crate) async fn force_renew(&self) -> crate::Result<()> {
        let mut state = self.state.write().await;
        state.take();
        *state = Some(self.renew().await?);
        Ok(())
    }

    #[instrument(skip(self), fields(client_id = %self.credentials.client_id()))]
    async fn renew(&self) -> crate::Result<TokenState> {
        let grant = self.exchange_credentials().await.map_err(|err| match err {
            Error::Auth(auth) => Error::Auth(auth),
            other => Error::Auth(AuthError::RenewalFailed {
                source: Box::new(other),
            }),
        })?;

        info!("renewed access token");

        Ok(TokenState::new(
            AccessToken::new(grant.access_token),
            grant.expires_in,
        ))
    }

    /// One credential exchange against the token endpoint, with bounded
    /// retry on 429/5xx and network failures. Any other non-success status
    /// is terminal.
    async fn exchange_credentials(&self) -> crate::Result<TokenGrant> {
        let url = self.credentials.server_url().url_for(TOKEN_PATH);
        let form = [
            ("client_id", self.credentials.client_id()),
            ("client_secret", self.credentials.client_secret()),
            ("grant_type", "client_credentials"),
        ];

        let mut attempt: u32 = 0;
        loop {
            match self.http.post(&url).form(&form).send().await {
                Ok(response) if response.status().is_success() => {
                    let status = response.status().as_u16();
                    let bytes = response.bytes().await.map_err(TransientError::Network)?;
                    let grant = serde_json::from_slice(&bytes)
                        .map_err(|e| ProtocolError::new(status, e.to_string()))?;
                    return Ok(grant);
                }
                Ok(response) if is_retryable_status(response.status()) => {
                    if attempt >= self.config.max_retries {
                        let status = response.status().as_u16();
                        let body = response.text().await.unwrap_or_default();
                        return Err(TransientError::RetriesExhausted {
                            status,
                            attempts: attempt + 1,
                            body,
                        }
                        .into());
                    }
                    warn!(status = %response.status(), attempt, "token endpoint busy, retrying");
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AuthError::RenewalRejected { status, body }.into());
                }
                Err(err) => {
                    if attempt >= self.config.max_retries {
                        return Err(TransientError::Network(err).into());
                    }
                    warn!(error = %err, attempt, "token endpoint unreachable, retrying");
                }
            }

            sleep(self.config.backoff_delay(attempt)).await;
            attempt += 1;
        }
    }
}

/// Token endpoint response, OAuth2 client-credentials shape.
#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    expires_in: i64,
}
