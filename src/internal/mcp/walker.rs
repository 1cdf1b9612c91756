//! Depth-first walk over a project's folder tree collecting file items.
//!
//! The tree is walked with an explicit stack of child iterators instead of recursion, so a deep
//! hierarchy costs heap rather than call stack. Output order is still depth-first with siblings
//! in the order APS returned them: a sub-folder's files come before the files listed after that
//! sub-folder in its parent.

use tokio::sync::Mutex;

use crate::internal::{
    aps::{ApsResult, DataManagement, FolderEntry},
    auth::AccessToken,
    mask::{EntityKind, MaskRegistry},
};

pub struct FolderWalker<'a> {
    upstream: &'a dyn DataManagement,
    token: &'a AccessToken,
    masks: &'a Mutex<MaskRegistry>,
    project_id: &'a str,
    /// Lower-cased file type filter.
    file_type: Option<String>,
}

impl<'a> FolderWalker<'a> {
    pub fn new(
        upstream: &'a dyn DataManagement,
        token: &'a AccessToken,
        masks: &'a Mutex<MaskRegistry>,
        project_id: &'a str,
        file_type: Option<&str>,
    ) -> Self {
        Self {
            upstream,
            token,
            masks,
            project_id,
            file_type: file_type.map(str::to_lowercase),
        }
    }

    /// Whether `entry` passes the file type filter (substring match, case-insensitive).
    fn matches(&self, entry: &FolderEntry) -> bool {
        let Some(filter) = &self.file_type else {
            return true;
        };
        let item_type = entry
            .attributes
            .file_type
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();
        !item_type.is_empty() && item_type.contains(filter.as_str())
    }

    async fn contents(&self, folder_id: &str) -> ApsResult<Vec<FolderEntry>> {
        let contents = self
            .upstream
            .get_folder_contents(self.token, self.project_id, folder_id)
            .await?;
        Ok(contents.data.unwrap_or_default())
    }

    /// Walks everything below `root_folder_id`, appending matching items to `found`.
    ///
    /// Every folder and item seen is registered in the mask registry, matched or not.
    pub async fn walk(&self, root_folder_id: &str, found: &mut Vec<FolderEntry>) -> ApsResult<()> {
        let mut stack = vec![self.contents(root_folder_id).await?.into_iter()];

        while let Some(children) = stack.last_mut() {
            let Some(entry) = children.next() else {
                stack.pop();
                continue;
            };

            if entry.is_folder() {
                let Some(folder_id) = entry.id.as_deref() else {
                    tracing::warn!(name = ?entry.display_name(), "skipping folder without id");
                    continue;
                };
                self.masks.lock().await.mask(EntityKind::Folder, folder_id);
                tracing::trace!(depth = stack.len(), "descending into folder");
                let children = self.contents(folder_id).await?;
                stack.push(children.into_iter());
            } else if entry.is_item() {
                self.masks
                    .lock()
                    .await
                    .mask_opt(EntityKind::Item, entry.id.as_deref());
                if self.matches(&entry) {
                    found.push(entry);
                }
            }
        }

        Ok(())
    }
}
