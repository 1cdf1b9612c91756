//! HTTP implementation of [`DataManagement`] on top of `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use url::Url;

use super::{
    DataManagement,
    error::{ApsError, ApsResult},
    types::{FolderEntry, Hub, JsonApi, Project, Version},
};
use crate::internal::auth::AccessToken;

pub const DEFAULT_BASE_URL: &str = "https://developer.api.autodesk.com";

/// Longest error body kept in [`ApsError::Status`].
const ERROR_BODY_LIMIT: usize = 1024;

/// APS Data Management client.
///
/// Holds the shared HTTP client and the API root; the bearer token is supplied per call.
#[derive(Clone, Debug)]
pub struct ApsClient {
    base_url: Url,
    http_client: HttpClient,
}

impl ApsClient {
    /// Creates a client rooted at `base_url` (normally [`DEFAULT_BASE_URL`]).
    ///
    /// The HTTP client uses a 30 second timeout and honours system proxy variables.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(base_url)?;
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(
                    "Failed to build HTTP client with timeout: {}. Using default client.",
                    e
                );
                HttpClient::new()
            });

        Ok(Self {
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded path segments to the API root.
    fn endpoint(&self, segments: &[&str]) -> ApsResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApsError::Decode(format!("invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        segments: &[&str],
    ) -> ApsResult<JsonApi<T>> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "APS request");

        let resp = self
            .http_client
            .get(url.clone())
            .bearer_auth(token.secret())
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        tracing::debug!(%url, status = status.as_u16(), len = bytes.len(), "APS response");

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes[..bytes.len().min(ERROR_BODY_LIMIT)]);
            return Err(ApsError::Status {
                status: status.as_u16(),
                body: body.into_owned(),
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| ApsError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DataManagement for ApsClient {
    async fn get_hubs(&self, token: &AccessToken) -> ApsResult<JsonApi<Hub>> {
        self.get_json(token, &["project", "v1", "hubs"]).await
    }

    async fn get_projects(&self, token: &AccessToken, hub_id: &str) -> ApsResult<JsonApi<Project>> {
        self.get_json(token, &["project", "v1", "hubs", hub_id, "projects"])
            .await
    }

    async fn get_top_folders(
        &self,
        token: &AccessToken,
        hub_id: &str,
        project_id: &str,
    ) -> ApsResult<JsonApi<FolderEntry>> {
        self.get_json(
            token,
            &[
                "project",
                "v1",
                "hubs",
                hub_id,
                "projects",
                project_id,
                "topFolders",
            ],
        )
        .await
    }

    async fn get_folder_contents(
        &self,
        token: &AccessToken,
        project_id: &str,
        folder_id: &str,
    ) -> ApsResult<JsonApi<FolderEntry>> {
        self.get_json(
            token,
            &["data", "v1", "projects", project_id, "folders", folder_id, "contents"],
        )
        .await
    }

    async fn get_item_versions(
        &self,
        token: &AccessToken,
        project_id: &str,
        item_id: &str,
    ) -> ApsResult<JsonApi<Version>> {
        self.get_json(
            token,
            &["data", "v1", "projects", project_id, "items", item_id, "versions"],
        )
        .await
    }
}
