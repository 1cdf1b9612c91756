//! APS MCP (Model Context Protocol) implementation.
//!
//! This module builds an MCP server on top of `rmcp` by implementing `ServerHandler`, exposing
//! four read-only tools over the APS Data Management hierarchy (hubs → projects → folders/items
//! → versions).
//!
//! # Tools
//!
//! - `list_hubs`: hubs the authenticated user can see.
//! - `list_projects(hub_id)`: projects of a hub. Also records which hub each project belongs to.
//! - `list_project_files(project_id, folder_id?, file_type?)`: every file below the project's
//!   "Project Files" folder (or below `folder_id`), optionally filtered by file type.
//! - `list_versions(project_id, item_id)`: version history of one item.
//!
//! # Masked identifiers
//!
//! Every identifier in a tool result is replaced by a surrogate such as `hub_1` or `item_12`
//! (see `crate::internal::mask`). Tools accept either form back; surrogates are resolved before
//! calling APS.
//!
//! `list_project_files` needs the project's hub to find its top folders. That relationship is
//! only learned from `list_projects`, so a project whose hub was never listed in this process
//! gets a message asking the client to call `list_projects` first.
//!
//! # Error conventions
//!
//! - Authentication failures fail the call with an MCP error, as do upstream failures in
//!   `list_hubs` and `list_projects`.
//! - Missing or empty upstream data is reported as a descriptive text result.
//! - Failures while walking folders or fetching versions are returned as
//!   `"Error accessing project or folder: ..."` / `"Error getting versions: ..."` text.
pub mod format;
pub mod server;
#[cfg(test)]
mod tests;
pub mod tools;
pub mod walker;
