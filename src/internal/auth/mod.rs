//! Token acquisition for APS.
//!
//! Tools ask a [`TokenProvider`] for a token before every upstream call. The production provider
//! is [`CachedTokenProvider`]: a pre-issued `APS_TOKEN` if configured, otherwise the interactive
//! [`ThreeLeggedFlow`], either way cached in memory for one hour.

pub mod three_legged;
pub mod token;

use thiserror::Error;

pub use three_legged::ThreeLeggedFlow;
pub use token::{AccessToken, CachedTokenProvider, StaticTokenProvider, TOKEN_VALIDITY, TokenProvider};

use crate::internal::config::ApsConfig;

/// Errors raised while obtaining a token. Tools do not turn these into text; they fail the call.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No APS_TOKEN and no APS_CLIENT_ID/APS_CLIENT_SECRET configured")]
    MissingCredentials,

    #[error("Invalid redirect URI: {0}")]
    InvalidRedirect(String),

    #[error("OAuth callback failed: {0}")]
    Callback(String),

    #[error("Authorization denied: {0}")]
    Denied(String),

    #[error("Token exchange failed with {status}: {body}")]
    Exchange { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the production token provider from configuration.
///
/// A pre-issued token always wins, so the interactive flow is only prepared without one. Missing
/// client credentials are not an error here; the failure surfaces on the first tool call.
pub fn provider_from_config(config: &ApsConfig) -> Result<CachedTokenProvider, AuthError> {
    let flow = if config.token.is_none() && config.has_client_credentials() {
        Some(ThreeLeggedFlow::from_config(config)?)
    } else {
        None
    };
    Ok(CachedTokenProvider::new(config.token.clone(), flow))
}
