//! Entry point for haru, a tool-calling LLM assistant for the terminal.
//!
//! This binary loads environment variables, installs the tracing
//! subscriber, parses CLI arguments via [`cli`], and dispatches to the
//! appropriate subcommand handler.

mod chat;
mod cli;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Runs the haru CLI.
///
/// Loads `.env` files (silently ignored if absent), initializes logging to
/// stderr honoring `RUST_LOG`, parses command-line arguments into a
/// [`cli::Cli`] struct, and dispatches the chosen subcommand via
/// [`cli::run`].
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("haru=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::parse();
    cli::run(cli).await
}
