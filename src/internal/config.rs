//! Environment configuration for the APS connection.
//!
//! Values come from the process environment; a `.env` file in the working directory is loaded
//! first by the binary (see `main.rs`). Empty variables count as unset.

use std::fmt;

use crate::internal::aps::client::DEFAULT_BASE_URL;

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/api/auth/callback";
pub const DEFAULT_SCOPES: &str = "data:read viewables:read account:read";

/// APS credentials and endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct ApsConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Callback URL registered for the APS application (three-legged flow).
    pub redirect_uri: String,
    /// Space separated OAuth scopes.
    pub scopes: String,
    /// Pre-issued access token. When set, interactive authorization is skipped.
    pub token: Option<String>,
    pub base_url: String,
}

impl Default for ApsConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scopes: DEFAULT_SCOPES.to_string(),
            token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl fmt::Debug for ApsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "***");
        f.debug_struct("ApsConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("token", &redact(&self.token))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ApsConfig {
    /// Reads `APS_CLIENT_ID`, `APS_CLIENT_SECRET`, `APS_REDIRECT_URI`, `APS_SCOPES`, `APS_TOKEN`
    /// and `APS_BASE_URL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Self {
            client_id: get("APS_CLIENT_ID"),
            client_secret: get("APS_CLIENT_SECRET"),
            redirect_uri: get("APS_REDIRECT_URI").unwrap_or(defaults.redirect_uri),
            scopes: get("APS_SCOPES").unwrap_or(defaults.scopes),
            token: get("APS_TOKEN"),
            base_url: get("APS_BASE_URL").unwrap_or(defaults.base_url),
        }
    }

    /// Whether interactive authorization can be attempted.
    pub fn has_client_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}
