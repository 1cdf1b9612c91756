//! Subcommand implementations.

pub mod login;
pub mod serve;
