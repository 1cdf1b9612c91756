//! MCP server exposing the APS Data Management hierarchy (hubs, projects, files, versions) to AI
//! agents, with session-scoped masking of upstream identifiers.

pub mod cli;
pub mod command;
pub mod internal;
