use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

mod commands;
mod handler;
mod output;
pub mod ux_error;

use commands::{Cli, Commands};
use ux_error::UxError;

type FilterHandle = reload::Handle<EnvFilter, Registry>;

#[tokio::main]
async fn main() -> Result<()> {
    let (filter, filter_handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = run(cli, &filter_handle).await;
    if let Err(err) = &result {
        if let Some(ux) = err.downcast_ref::<UxError>() {
            ux.display();
            std::process::exit(1);
        }
    }
    result
}

async fn run(cli: Cli, filter_handle: &FilterHandle) -> Result<()> {
    let config = commands::load_config(cli.config.as_deref())?;

    // RUST_LOG wins over the configured level.
    if std::env::var_os("RUST_LOG").is_none() {
        match EnvFilter::try_new(&config.observability.log_level) {
            Ok(filter) => filter_handle.reload(filter)?,
            Err(e) => tracing::warn!(
                "Ignoring log level '{}': {}",
                config.observability.log_level,
                e
            )
        }
    }

    match cli.command {
        Commands::Explain(args) => commands::explain::run(args, config).await,
        Commands::Request(args) => commands::request::run(args, config).await,
        Commands::Levels(args) => commands::levels::run(args),
        Commands::Completion(args) => commands::completion::run(args)
    }
}
