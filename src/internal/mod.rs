//! Internal layer exports: APS client, authentication, configuration, identifier masking and the
//! MCP server.

pub mod aps;
pub mod auth;
pub mod config;
pub mod mask;
pub mod mcp;
