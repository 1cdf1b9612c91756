//! Access tokens and the in-memory token cache.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;

use super::{AuthError, three_legged::ThreeLeggedFlow};

/// Validity assumed for every token, regardless of what the issuer reports.
pub const TOKEN_VALIDITY: TimeDelta = TimeDelta::seconds(3600);

/// A bearer token and the instant it stops being used.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Token valid for [`TOKEN_VALIDITY`] starting at `now`.
    pub fn issued_at(token: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::new(token, now + TOKEN_VALIDITY)
    }

    pub fn secret(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Source of access tokens for upstream calls.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken, AuthError>;
}

/// Always hands out the same token. Used for tests and for callers that manage tokens themselves.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: AccessToken,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::issued_at(token, Utc::now()),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        Ok(self.token.clone())
    }
}

/// Caches the current token in memory and refreshes it on expiry.
///
/// Refresh order: a pre-issued token if one was configured, otherwise the interactive
/// three-legged flow. Concurrent refreshes are not coalesced; the last one to finish is kept.
pub struct CachedTokenProvider {
    preissued: Option<String>,
    flow: Option<ThreeLeggedFlow>,
    cache: RwLock<Option<AccessToken>>,
}

impl CachedTokenProvider {
    pub fn new(preissued: Option<String>, flow: Option<ThreeLeggedFlow>) -> Self {
        Self {
            preissued,
            flow,
            cache: RwLock::new(None),
        }
    }

    async fn cached(&self, now: DateTime<Utc>) -> Option<AccessToken> {
        self.cache
            .read()
            .await
            .as_ref()
            .filter(|token| !token.is_expired(now))
            .cloned()
    }

    async fn acquire(&self) -> Result<String, AuthError> {
        if let Some(token) = &self.preissued {
            tracing::debug!("using pre-issued APS token");
            return Ok(token.clone());
        }
        let flow = self.flow.as_ref().ok_or(AuthError::MissingCredentials)?;
        tracing::info!("starting interactive APS authorization");
        flow.run().await
    }
}

#[async_trait]
impl TokenProvider for CachedTokenProvider {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        if let Some(token) = self.cached(Utc::now()).await {
            return Ok(token);
        }

        let secret = self.acquire().await?;
        let token = AccessToken::issued_at(secret, Utc::now());
        *self.cache.write().await = Some(token.clone());
        tracing::debug!(expires_at = %token.expires_at(), "cached APS token");
        Ok(token)
    }
}
