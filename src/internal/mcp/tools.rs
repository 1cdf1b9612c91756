use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars, tool, tool_router,
};

use super::{
    format::{self, BLOCK_SEPARATOR},
    server::ApsMcpServer,
    walker::FolderWalker,
};
use crate::internal::{
    aps::{ApsError, ApsResult, FolderEntry},
    auth::AccessToken,
    mask::EntityKind,
};

/// Display name of the top folder that holds a project's documents.
const PROJECT_FILES_FOLDER: &str = "Project Files";

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ListProjectsParams {
    /// The ID or masked ID of the hub to get projects from
    pub hub_id: String,
}

#[derive(Debug, Default, serde::Deserialize, schemars::JsonSchema)]
pub struct ListProjectFilesParams {
    /// The ID or masked ID of the project
    pub project_id: String,
    /// Optional folder ID or masked ID to start from (defaults to the "Project Files" folder)
    #[serde(default)]
    pub folder_id: Option<String>,
    /// Optional filter for file type (e.g. "rvt" for Revit files)
    #[serde(default)]
    pub file_type: Option<String>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ListVersionsParams {
    /// The ID or masked ID of the project
    pub project_id: String,
    /// The ID or masked ID of the item to get versions for
    pub item_id: String,
}

/// Blank optional inputs count as absent.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn text_result(text: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

fn upstream_error(e: ApsError) -> ErrorData {
    tracing::error!(error = %e, "APS request failed");
    ErrorData::internal_error(e.to_string(), None)
}

/// Outcome of collecting files before rendering.
enum FileListing {
    NoTopFolders,
    Files(Vec<FolderEntry>),
}

#[tool_router(vis = "pub(crate)")]
impl ApsMcpServer {
    #[tool(description = "Get all available hubs the user has access to.")]
    pub async fn list_hubs(&self) -> Result<CallToolResult, ErrorData> {
        self.list_hubs_impl().await.map(text_result)
    }

    #[tool(description = "Get all projects within a specified hub. Accepts a hub ID or masked ID.")]
    pub async fn list_projects(
        &self,
        Parameters(params): Parameters<ListProjectsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        self.list_projects_impl(params).await.map(text_result)
    }

    #[tool(
        description = "Get all files in a project recursively. Optionally start from a folder and filter by file type (e.g. \"rvt\")."
    )]
    pub async fn list_project_files(
        &self,
        Parameters(params): Parameters<ListProjectFilesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        self.list_project_files_impl(params).await.map(text_result)
    }

    #[tool(description = "Get version information for a specific item.")]
    pub async fn list_versions(
        &self,
        Parameters(params): Parameters<ListVersionsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        self.list_versions_impl(params).await.map(text_result)
    }
}

impl ApsMcpServer {
    pub(crate) fn build_tool_router() -> ToolRouter<Self> {
        Self::tool_router()
    }

    pub async fn list_hubs_impl(&self) -> Result<String, ErrorData> {
        let token = self.access_token().await?;
        let response = self
            .upstream
            .get_hubs(&token)
            .await
            .map_err(upstream_error)?;

        let Some(hubs) = response.data else {
            return Ok("Unable to fetch hubs or no hubs found.".to_string());
        };
        if hubs.is_empty() {
            return Ok("No hubs found for this account.".to_string());
        }

        let mut masks = self.masks.lock().await;
        let blocks: Vec<String> = hubs
            .iter()
            .map(|hub| format::format_hub(&mut masks, hub))
            .collect();
        Ok(blocks.join(BLOCK_SEPARATOR))
    }

    pub async fn list_projects_impl(&self, params: ListProjectsParams) -> Result<String, ErrorData> {
        let token = self.access_token().await?;
        let hub_id = self
            .masks
            .lock()
            .await
            .resolve(EntityKind::Hub, &params.hub_id);

        let response = self
            .upstream
            .get_projects(&token, &hub_id)
            .await
            .map_err(upstream_error)?;

        let Some(projects) = response.data else {
            return Ok("Unable to fetch projects or no projects found.".to_string());
        };
        if projects.is_empty() {
            return Ok("No projects found for this hub.".to_string());
        }

        let mut masks = self.masks.lock().await;
        for project_id in projects.iter().filter_map(|p| p.id.as_deref()) {
            masks.register_project_hub(project_id, &hub_id);
        }
        let blocks: Vec<String> = projects
            .iter()
            .map(|project| format::format_project(&mut masks, project))
            .collect();
        Ok(blocks.join(BLOCK_SEPARATOR))
    }

    pub async fn list_project_files_impl(
        &self,
        params: ListProjectFilesParams,
    ) -> Result<String, ErrorData> {
        let token = self.access_token().await?;

        let (project_id, hub_id, folder_id) = {
            let masks = self.masks.lock().await;
            let project_id = masks.resolve(EntityKind::Project, &params.project_id);
            let hub_id = masks.hub_of(&project_id).map(str::to_string);
            let folder_id = non_blank(params.folder_id.as_deref())
                .map(|folder| masks.resolve(EntityKind::Folder, folder));
            (project_id, hub_id, folder_id)
        };

        let Some(hub_id) = hub_id else {
            return Ok(format!(
                "Cannot find hub ID for project {}. Please use list_projects first to establish the relationship.",
                params.project_id
            ));
        };

        let file_type = non_blank(params.file_type.as_deref());
        let listing = self
            .collect_files(&token, &hub_id, &project_id, folder_id.as_deref(), file_type)
            .await;

        let files = match listing {
            Ok(FileListing::NoTopFolders) => {
                return Ok("No top folders found in this project.".to_string());
            }
            Ok(FileListing::Files(files)) => files,
            Err(e) => {
                tracing::warn!(error = %e, "file listing failed");
                return Ok(format!("Error accessing project or folder: {e}"));
            }
        };

        if files.is_empty() {
            let filter_msg = file_type
                .map(|t| format!(" matching type '{t}'"))
                .unwrap_or_default();
            return Ok(format!("No files{filter_msg} found in the project."));
        }

        let mut masks = self.masks.lock().await;
        let blocks: Vec<String> = files
            .iter()
            .map(|entry| format::format_entry(&mut masks, entry))
            .collect();
        Ok(format!(
            "Found {} files:\n\n{}",
            files.len(),
            blocks.join(BLOCK_SEPARATOR)
        ))
    }

    /// Picks the traversal roots and walks them.
    ///
    /// Without an explicit folder the "Project Files" top folder is the root; when a project has
    /// none, every top folder is walked in turn.
    async fn collect_files(
        &self,
        token: &AccessToken,
        hub_id: &str,
        project_id: &str,
        folder_id: Option<&str>,
        file_type: Option<&str>,
    ) -> ApsResult<FileListing> {
        let walker = FolderWalker::new(
            self.upstream.as_ref(),
            token,
            &self.masks,
            project_id,
            file_type,
        );
        let mut found = Vec::new();

        if let Some(folder_id) = folder_id {
            walker.walk(folder_id, &mut found).await?;
            return Ok(FileListing::Files(found));
        }

        let top_folders = self
            .upstream
            .get_top_folders(token, hub_id, project_id)
            .await?
            .data
            .unwrap_or_default();
        if top_folders.is_empty() {
            return Ok(FileListing::NoTopFolders);
        }

        let roots: Vec<&str> = {
            let mut masks = self.masks.lock().await;
            for folder in &top_folders {
                masks.mask_opt(EntityKind::Folder, folder.id.as_deref());
            }
            let project_files = top_folders
                .iter()
                .find(|folder| folder.display_name() == Some(PROJECT_FILES_FOLDER))
                .and_then(|folder| folder.id.as_deref());
            match project_files {
                Some(root) => vec![root],
                None => top_folders.iter().filter_map(|f| f.id.as_deref()).collect(),
            }
        };
        tracing::debug!(roots = roots.len(), "walking top folders");

        for root in roots {
            walker.walk(root, &mut found).await?;
        }
        Ok(FileListing::Files(found))
    }

    pub async fn list_versions_impl(&self, params: ListVersionsParams) -> Result<String, ErrorData> {
        let token = self.access_token().await?;

        let (project_id, item_id) = {
            let masks = self.masks.lock().await;
            (
                masks.resolve(EntityKind::Project, &params.project_id),
                masks.resolve(EntityKind::Item, &params.item_id),
            )
        };

        let versions = match self
            .upstream
            .get_item_versions(&token, &project_id, &item_id)
            .await
        {
            Ok(response) => response.data.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "version listing failed");
                return Ok(format!("Error getting versions: {e}"));
            }
        };

        if versions.is_empty() {
            return Ok("No versions available for this item.".to_string());
        }

        let item_name = versions
            .first()
            .and_then(|v| v.attributes.display_name.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or("Item");

        let mut masks = self.masks.lock().await;
        let blocks: Vec<String> = versions
            .iter()
            .map(|version| format::format_version(&mut masks, version))
            .collect();
        Ok(format!(
            "Found {} versions for {}:\n\n{}",
            blocks.len(),
            item_name,
            blocks.join(BLOCK_SEPARATOR)
        ))
    }
}
