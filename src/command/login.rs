//! Login command: obtain an APS token once, outside of an MCP session.
//!
//! Useful to check credentials and the redirect URI registration, or to capture a token for
//! `APS_TOKEN` with `--print-token`.

use clap::Parser;

use super::serve::load_config;
use crate::internal::auth::{self, TokenProvider};

#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Print the access token to stdout
    #[arg(long)]
    pub print_token: bool,

    /// APS API root, overrides APS_BASE_URL
    #[arg(long)]
    pub base_url: Option<String>,
}

pub async fn execute(args: LoginArgs) -> anyhow::Result<()> {
    let config = load_config(args.base_url);
    let provider = auth::provider_from_config(&config)?;
    let token = provider.access_token().await?;

    eprintln!(
        "Authenticated. Token assumed valid until {}.",
        token.expires_at().to_rfc3339()
    );
    if args.print_token {
        println!("{}", token.secret());
    }
    Ok(())
}
