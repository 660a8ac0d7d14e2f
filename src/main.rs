mod cache;
mod cli;
mod config;
mod gemini;
mod justify;
mod pubmed;
mod render;

pub const USER_AGENT: &str = concat!("cmcintel/", env!("CARGO_PKG_VERSION"));

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cmcintel=info")),
        )
        .init();

    let cli = Cli::parse();
    debug!(?cli, "starting command");

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
