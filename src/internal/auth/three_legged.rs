//! Interactive (three-legged) OAuth authorization against APS.
//!
//! 1. Open the `/authentication/v2/authorize` page in the user's browser.
//! 2. Listen on the host/port of the registered redirect URI for the callback.
//! 3. Exchange the returned code at `/authentication/v2/token`.

use std::{net::SocketAddr, process::Command, time::Duration};

use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tokio::sync::{mpsc, oneshot};
use url::Url;

use super::AuthError;
use crate::internal::config::ApsConfig;

/// How long the callback listener waits for the browser to come back.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

const CALLBACK_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head><meta charset="UTF-8" /><title>APS authorization</title></head>
  <body><p>Authorization received. You can close this window.</p></body>
</html>"#;

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

pub struct ThreeLeggedFlow {
    client_id: String,
    client_secret: String,
    redirect_uri: Url,
    scopes: String,
    base_url: Url,
    http_client: HttpClient,
}

impl ThreeLeggedFlow {
    pub fn from_config(config: &ApsConfig) -> Result<Self, AuthError> {
        let (Some(client_id), Some(client_secret)) = (&config.client_id, &config.client_secret)
        else {
            return Err(AuthError::MissingCredentials);
        };
        let redirect_uri = Url::parse(&config.redirect_uri)
            .map_err(|e| AuthError::InvalidRedirect(format!("{}: {}", config.redirect_uri, e)))?;
        if redirect_uri.scheme() != "http" {
            return Err(AuthError::InvalidRedirect(format!(
                "{}: only http callbacks can be served locally",
                config.redirect_uri
            )));
        }
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AuthError::Callback(format!("invalid base URL {}: {}", config.base_url, e))
        })?;

        Ok(Self {
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
            redirect_uri,
            scopes: config.scopes.clone(),
            base_url,
            http_client: HttpClient::new(),
        })
    }

    /// The page the user must visit to grant access.
    pub fn authorize_url(&self) -> Url {
        let mut url = self
            .base_url
            .join("/authentication/v2/authorize")
            .unwrap_or_else(|_| self.base_url.clone());
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("scope", &self.scopes);
        url
    }

    fn callback_addr(&self) -> Result<(String, u16), AuthError> {
        let host = self
            .redirect_uri
            .host_str()
            .ok_or_else(|| AuthError::InvalidRedirect(self.redirect_uri.to_string()))?;
        let port = self.redirect_uri.port_or_known_default().unwrap_or(80);
        Ok((host.to_string(), port))
    }

    /// Runs the full flow and returns the access token.
    pub async fn run(&self) -> Result<String, AuthError> {
        let (host, port) = self.callback_addr()?;
        let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
        let local_addr: SocketAddr = listener.local_addr()?;
        tracing::debug!(%local_addr, path = self.redirect_uri.path(), "waiting for OAuth callback");

        let (code_tx, mut code_rx) = mpsc::channel::<CallbackParams>(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = Router::new()
            .route(self.redirect_uri.path(), get(callback))
            .with_state(code_tx);
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let authorize_url = self.authorize_url();
        eprintln!("Open this URL to authorize APS access:\n{}", authorize_url);
        if let Err(e) = open_browser(authorize_url.as_str()) {
            tracing::warn!(error = %e, "failed to open browser");
        }

        let received = tokio::time::timeout(CALLBACK_TIMEOUT, code_rx.recv()).await;
        let _ = shutdown_tx.send(());
        let _ = server.await;

        let params = match received {
            Ok(Some(params)) => params,
            Ok(None) => return Err(AuthError::Callback("callback listener closed".to_string())),
            Err(_) => {
                return Err(AuthError::Callback(format!(
                    "no callback within {} seconds",
                    CALLBACK_TIMEOUT.as_secs()
                )));
            }
        };

        if let Some(error) = params.error {
            let detail = params.error_description.unwrap_or_default();
            return Err(AuthError::Denied(format!("{error} {detail}").trim().to_string()));
        }
        let code = params
            .code
            .ok_or_else(|| AuthError::Callback("callback carried no code".to_string()))?;

        self.exchange(&code).await
    }

    async fn exchange(&self, code: &str) -> Result<String, AuthError> {
        let url = self
            .base_url
            .join("/authentication/v2/token")
            .map_err(|e| AuthError::Callback(e.to_string()))?;
        let resp = self
            .http_client
            .post(url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Exchange {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = resp.json().await?;
        tracing::info!(expires_in = ?token.expires_in, "APS authorization complete");
        Ok(token.access_token)
    }
}

async fn callback(
    State(code_tx): State<mpsc::Sender<CallbackParams>>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    let _ = code_tx.send(params).await;
    Html(CALLBACK_PAGE)
}

fn open_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "windows")]
    {
        Command::new("cmd").args(["/C", "start", "", url]).spawn()?;
    }
    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg(url).spawn()?;
    }
    #[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
    {
        Command::new("xdg-open").arg(url).spawn()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ApsConfig {
        ApsConfig {
            client_id: Some("cid".to_string()),
            client_secret: Some("csecret".to_string()),
            ..ApsConfig::default()
        }
    }

    #[test]
    fn test_requires_client_credentials() {
        let err = ThreeLeggedFlow::from_config(&ApsConfig::default())
            .err()
            .expect("missing credentials");
        assert!(matches!(err, AuthError::MissingCredentials));
    }

    #[test]
    fn test_rejects_https_redirect() {
        let config = ApsConfig {
            redirect_uri: "https://example.com/callback".to_string(),
            ..config()
        };
        let err = ThreeLeggedFlow::from_config(&config).err().expect("https redirect");
        assert!(matches!(err, AuthError::InvalidRedirect(_)));
    }

    #[test]
    fn test_authorize_url() {
        let flow = ThreeLeggedFlow::from_config(&config()).unwrap();
        let url = flow.authorize_url();
        assert_eq!(url.path(), "/authentication/v2/authorize");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("response_type".to_string(), "code".to_string())));
        assert!(pairs.contains(&("client_id".to_string(), "cid".to_string())));
        assert!(pairs.contains(&(
            "redirect_uri".to_string(),
            "http://localhost:8080/api/auth/callback".to_string()
        )));
        assert!(pairs.contains(&(
            "scope".to_string(),
            "data:read viewables:read account:read".to_string()
        )));
        assert!(!url.as_str().contains("csecret"));
    }

    #[test]
    fn test_callback_addr_from_redirect() {
        let flow = ThreeLeggedFlow::from_config(&config()).unwrap();
        assert_eq!(
            flow.callback_addr().unwrap(),
            ("localhost".to_string(), 8080)
        );
    }
}
