//! This is the main entry point for aps-mcp.

use aps_mcp::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    // A `.env` next to the binary's working directory is optional.
    let _ = dotenvy::dotenv();

    // stdout carries the stdio transport, so logs always go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    if let Err(e) = cli::parse(None) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
