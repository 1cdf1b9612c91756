//! MCP `ServerHandler` implementation.
//!
//! `ApsMcpServer` declares the tools capability and owns the session state: the upstream client,
//! the token provider and the mask registry. Tool implementations live in
//! `crate::internal::mcp::tools` and are registered via `rmcp`'s `#[tool_router]`.
//!
//! The server is cheap to clone; clones share the same registry, so surrogates issued through
//! one transport session stay valid for the life of the process.

use std::sync::Arc;

use rmcp::{
    ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{ErrorData, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool_handler,
};
use tokio::sync::Mutex;

use crate::internal::{
    aps::DataManagement,
    auth::{AccessToken, TokenProvider},
    mask::MaskRegistry,
};

const INSTRUCTIONS: &str = "Browse Autodesk Platform Services (APS) Data Management content. \
Start with list_hubs, then list_projects for a hub, then list_project_files and list_versions. \
Identifiers are returned as short masked ids such as hub_1, project_2 or item_7; pass them back \
as-is to any tool. list_projects must be called for a hub before listing files of its projects.";

#[derive(Clone)]
pub struct ApsMcpServer {
    pub(crate) upstream: Arc<dyn DataManagement>,
    pub(crate) tokens: Arc<dyn TokenProvider>,
    pub(crate) masks: Arc<Mutex<MaskRegistry>>,
    tool_router: ToolRouter<ApsMcpServer>,
}

impl ApsMcpServer {
    pub fn new(upstream: Arc<dyn DataManagement>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_registry(upstream, tokens, Arc::new(Mutex::new(MaskRegistry::new())))
    }

    /// Builds a server around an existing registry, e.g. one shared with another server.
    pub fn with_registry(
        upstream: Arc<dyn DataManagement>,
        tokens: Arc<dyn TokenProvider>,
        masks: Arc<Mutex<MaskRegistry>>,
    ) -> Self {
        Self {
            upstream,
            tokens,
            masks,
            tool_router: Self::build_tool_router(),
        }
    }

    pub fn registry(&self) -> Arc<Mutex<MaskRegistry>> {
        self.masks.clone()
    }

    /// Fetches a token. Authentication failures fail the tool call instead of becoming text.
    pub(crate) async fn access_token(&self) -> Result<AccessToken, ErrorData> {
        self.tokens.access_token().await.map_err(|e| {
            tracing::error!(error = %e, "APS authentication failed");
            ErrorData::internal_error(format!("Authentication failed: {e}"), None)
        })
    }
}

#[tool_handler]
impl ServerHandler for ApsMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::new(
                "aps-mcp",
                env!("CARGO_PKG_VERSION"),
            ))
            .with_instructions(INSTRUCTIONS)
    }
}
