pub mod completion;
pub mod explain;
pub mod levels;
pub mod request;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use config::{Config, ConfigLayer, load_from_env, load_from_file, merge_configs, validate};
use oracle::OpenAiOracle;
use synthesis::{ExplainOptions, Orchestrator};

use crate::ux_error::{self, UxError};

#[derive(Parser)]
#[command(
    name = "lucid",
    author,
    version,
    about = "Lucid - layered explanations of any text",
    long_about = "Breaks a document into topics and concepts and explains each one in \
                  What/Why/How layers, either in beginner/detailed/technical depth or at a \
                  single reading level.\n\nConfiguration comes from --config, LUCID_* \
                  environment variables and command flags, in increasing precedence."
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "LUCID_CONFIG",
        help = "Configuration file (.toml, .yaml or .yml)"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Explain a text as topics, concepts and layers")]
    Explain(explain::ExplainArgs),

    #[command(about = "Answer a JSON explain request read from stdin")]
    Request(request::RequestArgs),

    #[command(about = "List the supported reading levels")]
    Levels(levels::LevelsArgs),

    #[command(about = "Generate shell completions")]
    Completion(completion::CompletionArgs)
}

/// File and environment configuration, merged over the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, UxError> {
    let from_file = match path {
        Some(path) => {
            load_from_file(path).map_err(|e| ux_error::config_error(&e.to_string()))?
        }
        None => ConfigLayer::default()
    };
    let from_env = load_from_env().map_err(|e| ux_error::config_error(&e.to_string()))?;

    Ok(merge_configs(
        Config::default(),
        from_file,
        "file",
        from_env,
        "env",
        None,
        "cli"
    ))
}

pub fn build_orchestrator(config: &Config) -> Result<Orchestrator, UxError> {
    validate(config).map_err(|e| ux_error::config_error(&e.to_string()))?;

    let oracle = OpenAiOracle::from_config(&config.oracle)
        .map_err(|e| ux_error::oracle_not_configured(&e.to_string()))?;
    tracing::debug!(model = oracle.model(), "Oracle client ready");

    Ok(Orchestrator::from_config(
        Arc::new(oracle),
        &config.synthesis,
        &config.oracle
    ))
}

pub fn default_options(config: &Config) -> ExplainOptions {
    ExplainOptions {
        strategy: config.synthesis.strategy,
        leveled: config.synthesis.leveled,
        reading_level: config.synthesis.reading_level
    }
}
