use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
};

use async_trait::async_trait;
use rmcp::{ServerHandler, model::RawContent};
use serde_json::json;

use crate::internal::{
    aps::{ApsError, ApsResult, DataManagement, FolderEntry, Hub, JsonApi, Project, Version},
    auth::{AccessToken, AuthError, StaticTokenProvider, TokenProvider},
    mask::EntityKind,
    mcp::{server::ApsMcpServer, tools::ListProjectFilesParams},
};

fn folder(id: &str, name: &str) -> FolderEntry {
    serde_json::from_value(json!({"type": "folders", "id": id, "attributes": {"displayName": name}}))
        .unwrap()
}

fn item(id: &str, name: &str, file_type: &str) -> FolderEntry {
    serde_json::from_value(json!({
        "type": "items",
        "id": id,
        "attributes": {"displayName": name, "fileType": file_type}
    }))
    .unwrap()
}

/// Folder tree keyed by folder id. Records every contents request.
#[derive(Default)]
struct TreeUpstream {
    top: Vec<FolderEntry>,
    folders: HashMap<String, Vec<FolderEntry>>,
    failing_folder: Option<String>,
    visited: StdMutex<Vec<String>>,
}

#[async_trait]
impl DataManagement for TreeUpstream {
    async fn get_hubs(&self, _token: &AccessToken) -> ApsResult<JsonApi<Hub>> {
        Ok(JsonApi::missing())
    }

    async fn get_projects(&self, _token: &AccessToken, _hub_id: &str) -> ApsResult<JsonApi<Project>> {
        let project: Project = serde_json::from_value(json!({"id": "b.project", "attributes": {"name": "Tower"}})).unwrap();
        Ok(JsonApi::new(vec![project]))
    }

    async fn get_top_folders(
        &self,
        _token: &AccessToken,
        _hub_id: &str,
        _project_id: &str,
    ) -> ApsResult<JsonApi<FolderEntry>> {
        Ok(JsonApi::new(self.top.clone()))
    }

    async fn get_folder_contents(
        &self,
        _token: &AccessToken,
        _project_id: &str,
        folder_id: &str,
    ) -> ApsResult<JsonApi<FolderEntry>> {
        self.visited.lock().unwrap().push(folder_id.to_string());
        if self.failing_folder.as_deref() == Some(folder_id) {
            return Err(ApsError::Status {
                status: 404,
                body: "folder not found".to_string(),
            });
        }
        Ok(self
            .folders
            .get(folder_id)
            .cloned()
            .map(JsonApi::new)
            .unwrap_or_else(JsonApi::missing))
    }

    async fn get_item_versions(
        &self,
        _token: &AccessToken,
        _project_id: &str,
        _item_id: &str,
    ) -> ApsResult<JsonApi<Version>> {
        Ok(JsonApi::new(Vec::new()))
    }
}

fn deep_tree() -> TreeUpstream {
    let mut folders = HashMap::new();
    folders.insert(
        "urn:root".to_string(),
        vec![
            item("urn:i1", "a.rvt", "rvt"),
            folder("urn:sub1", "Sub 1"),
            item("urn:i2", "b.dwg", "dwg"),
            folder("urn:sub2", "Sub 2"),
        ],
    );
    folders.insert(
        "urn:sub1".to_string(),
        vec![folder("urn:sub1a", "Sub 1a"), item("urn:i3", "c.RVT", "RVT")],
    );
    folders.insert("urn:sub1a".to_string(), vec![item("urn:i4", "d.rvt", "rvt")]);
    folders.insert("urn:sub2".to_string(), vec![item("urn:i5", "e.pdf", "pdf")]);
    TreeUpstream {
        top: vec![folder("urn:plans", "Plans"), folder("urn:root", "Project Files")],
        folders,
        ..TreeUpstream::default()
    }
}

async fn server_with(upstream: TreeUpstream) -> (ApsMcpServer, Arc<TreeUpstream>) {
    let upstream = Arc::new(upstream);
    let server = ApsMcpServer::new(upstream.clone(), Arc::new(StaticTokenProvider::new("token")));
    server.masks.lock().await.register_project_hub("b.project", "b.hub");
    (server, upstream)
}

fn names(text: &str) -> Vec<&str> {
    text.lines()
        .filter_map(|line| line.strip_prefix("Name: "))
        .collect()
}

#[tokio::test]
async fn test_walk_is_depth_first_in_upstream_order() {
    let (server, upstream) = server_with(deep_tree()).await;
    let text = server
        .list_project_files_impl(ListProjectFilesParams {
            project_id: "b.project".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(text.starts_with("Found 5 files:\n\n"), "{text}");
    assert_eq!(names(&text), vec!["a.rvt", "d.rvt", "c.RVT", "b.dwg", "e.pdf"]);
    assert_eq!(
        *upstream.visited.lock().unwrap(),
        vec!["urn:root", "urn:sub1", "urn:sub1a", "urn:sub2"]
    );

    let masks = server.masks.lock().await;
    // Both top folders plus the three walked sub-folders.
    assert_eq!(masks.len(EntityKind::Folder), 5);
    assert_eq!(masks.len(EntityKind::Item), 5);
}

#[tokio::test]
async fn test_file_type_filter_is_case_insensitive_substring() {
    let (server, _) = server_with(deep_tree()).await;
    let text = server
        .list_project_files_impl(ListProjectFilesParams {
            project_id: "b.project".to_string(),
            file_type: Some("Rv".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(text.starts_with("Found 3 files:"), "{text}");
    assert_eq!(names(&text), vec!["a.rvt", "d.rvt", "c.RVT"]);

    // Non-matching items are still registered.
    assert_eq!(server.masks.lock().await.len(EntityKind::Item), 5);
}

#[tokio::test]
async fn test_without_project_files_every_top_folder_is_walked() {
    let mut upstream = deep_tree();
    upstream.top = vec![folder("urn:sub2", "Plans"), folder("urn:sub1a", "Shared")];
    let (server, upstream) = server_with(upstream).await;
    let text = server
        .list_project_files_impl(ListProjectFilesParams {
            project_id: "b.project".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(names(&text), vec!["e.pdf", "d.rvt"]);
    assert_eq!(*upstream.visited.lock().unwrap(), vec!["urn:sub2", "urn:sub1a"]);
}

#[tokio::test]
async fn test_explicit_folder_accepts_surrogate() {
    let (server, upstream) = server_with(deep_tree()).await;
    let surrogate = server.masks.lock().await.mask(EntityKind::Folder, "urn:sub1");
    let text = server
        .list_project_files_impl(ListProjectFilesParams {
            project_id: "b.project".to_string(),
            folder_id: Some(surrogate),
            file_type: None,
        })
        .await
        .unwrap();
    assert_eq!(names(&text), vec!["d.rvt", "c.RVT"]);
    assert_eq!(*upstream.visited.lock().unwrap(), vec!["urn:sub1", "urn:sub1a"]);
}

#[tokio::test]
async fn test_blank_folder_id_falls_back_to_top_folders() {
    let (server, upstream) = server_with(deep_tree()).await;
    server
        .list_project_files_impl(ListProjectFilesParams {
            project_id: "b.project".to_string(),
            folder_id: Some("  ".to_string()),
            file_type: Some(String::new()),
        })
        .await
        .unwrap();
    assert_eq!(upstream.visited.lock().unwrap()[0], "urn:root");
}

#[tokio::test]
async fn test_walk_error_is_reported_as_text() {
    let mut upstream = deep_tree();
    upstream.failing_folder = Some("urn:sub1a".to_string());
    let (server, _) = server_with(upstream).await;
    let text = server
        .list_project_files_impl(ListProjectFilesParams {
            project_id: "b.project".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(
        text,
        "Error accessing project or folder: APS returned 404: folder not found"
    );
}

#[tokio::test]
async fn test_no_top_folders() {
    let mut upstream = deep_tree();
    upstream.top.clear();
    let (server, _) = server_with(upstream).await;
    let text = server
        .list_project_files_impl(ListProjectFilesParams {
            project_id: "b.project".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(text, "No top folders found in this project.");
}

#[tokio::test]
async fn test_no_matching_files_message() {
    let (server, _) = server_with(deep_tree()).await;
    let text = server
        .list_project_files_impl(ListProjectFilesParams {
            project_id: "b.project".to_string(),
            file_type: Some("nwd".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(text, "No files matching type 'nwd' found in the project.");
}

struct FailingTokens;

#[async_trait]
impl TokenProvider for FailingTokens {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        Err(AuthError::MissingCredentials)
    }
}

#[tokio::test]
async fn test_auth_failure_fails_the_call() {
    let server = ApsMcpServer::new(Arc::new(deep_tree()), Arc::new(FailingTokens));
    let err = server.list_hubs_impl().await.unwrap_err();
    assert!(err.message.contains("Authentication failed"), "{}", err.message);
}

#[tokio::test]
async fn test_missing_hub_data_message() {
    let (server, _) = server_with(deep_tree()).await;
    let result = server.list_hubs().await.unwrap();
    match &result.content[0].raw {
        RawContent::Text(text_content) => {
            assert_eq!(text_content.text, "Unable to fetch hubs or no hubs found.");
        }
        _ => panic!("Expected text content"),
    }
}

#[test]
fn test_server_info() {
    let server = ApsMcpServer::new(Arc::new(deep_tree()), Arc::new(StaticTokenProvider::new("t")));
    let info = ServerHandler::get_info(&server);
    assert_eq!(info.server_info.name, "aps-mcp");
    assert!(info.capabilities.tools.is_some());
    assert!(info.instructions.unwrap().contains("list_projects"));
}
