//! CLI entry for aps-mcp, defining clap subcommands and dispatching each command handler.
use clap::{Parser, Subcommand};

use crate::command;

// The Cli struct represents the root of the command line interface.
#[derive(Parser, Debug)]
#[command(
    name = "aps-mcp",
    about = "MCP server for browsing APS Data Management hubs, projects, files and versions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// The Commands enum represents the subcommands that can be used with the CLI.
/// Without a subcommand the server is started on stdio, which is how MCP clients launch it.
#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Run the MCP server (stdio by default)")]
    Serve(command::serve::ServeArgs),
    #[command(about = "Authenticate against APS and report the token expiry")]
    Login(command::login::LoginArgs),
}

/// Parses the command-line arguments and executes the corresponding command.
/// - `args`: parse from command line if it's `None`, otherwise parse from the given args
#[tokio::main]
pub async fn parse(args: Option<&[&str]>) -> anyhow::Result<()> {
    parse_async(args).await
}

/// `async` version of the [parse] function
pub async fn parse_async(args: Option<&[&str]>) -> anyhow::Result<()> {
    let args = match args {
        Some(args) => Cli::try_parse_from(args)?,
        None => Cli::parse(),
    };

    match args.command {
        Some(Commands::Serve(args)) => command::serve::execute(args).await,
        Some(Commands::Login(args)) => command::login::execute(args).await,
        None => command::serve::execute(command::serve::ServeArgs::parse_from(["serve"])).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_is_accepted() {
        let cli = Cli::try_parse_from(["aps-mcp"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_serve_http_flags() {
        let cli = Cli::try_parse_from(["aps-mcp", "serve", "--http", "--port", "7001"]).unwrap();
        match cli.command {
            Some(Commands::Serve(args)) => {
                assert!(args.http);
                assert_eq!(args.port, 7001);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["aps-mcp", "push"]).is_err());
    }
}
