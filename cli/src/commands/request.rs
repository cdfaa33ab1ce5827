use std::io::Read;

use anyhow::{Result, bail};
use clap::Args;
use config::Config;

use super::{build_orchestrator, default_options};
use crate::handler::handle_request;
use crate::ux_error;

#[derive(Args)]
pub struct RequestArgs {
    #[arg(long, help = "Pretty-print the JSON response")]
    pub pretty: bool
}

/// Reads one request body from stdin, writes the response body to stdout
/// and fails when the status is not 200.
pub async fn run(args: RequestArgs, config: Config) -> Result<()> {
    let mut body = String::new();
    std::io::stdin()
        .read_to_string(&mut body)
        .map_err(|e| ux_error::input_unreadable("stdin", &e.to_string()))?;

    let orchestrator = build_orchestrator(&config)?;
    let response = handle_request(&orchestrator, &default_options(&config), &body).await;

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&response.body)?
    } else {
        serde_json::to_string(&response.body)?
    };
    println!("{rendered}");

    if !response.is_success() {
        bail!("request failed with status {}", response.status);
    }
    Ok(())
}
