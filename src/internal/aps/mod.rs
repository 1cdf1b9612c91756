//! APS Data Management API: the upstream hub/project/folder/item/version hierarchy.
//!
//! Tools talk to the hierarchy through the [`DataManagement`] trait so they can be driven by the
//! HTTP [`ApsClient`] in production and by an in-memory fake in tests.

pub mod client;
pub mod error;
pub mod types;

use async_trait::async_trait;

pub use client::ApsClient;
pub use error::{ApsError, ApsResult};
pub use types::{FolderEntry, Hub, JsonApi, Project, Version};

use crate::internal::auth::AccessToken;

/// Read-only view of the Data Management hierarchy.
///
/// One request per call; no retries and no pagination.
#[async_trait]
pub trait DataManagement: Send + Sync {
    async fn get_hubs(&self, token: &AccessToken) -> ApsResult<JsonApi<Hub>>;

    async fn get_projects(&self, token: &AccessToken, hub_id: &str) -> ApsResult<JsonApi<Project>>;

    async fn get_top_folders(
        &self,
        token: &AccessToken,
        hub_id: &str,
        project_id: &str,
    ) -> ApsResult<JsonApi<FolderEntry>>;

    async fn get_folder_contents(
        &self,
        token: &AccessToken,
        project_id: &str,
        folder_id: &str,
    ) -> ApsResult<JsonApi<FolderEntry>>;

    async fn get_item_versions(
        &self,
        token: &AccessToken,
        project_id: &str,
        item_id: &str,
    ) -> ApsResult<JsonApi<Version>>;
}
