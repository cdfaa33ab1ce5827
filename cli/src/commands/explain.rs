use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use config::{Config, ConfigLayer, apply_layer};
use lucid_core::{ReadingLevel, StrategyKind};

use super::{build_orchestrator, default_options};
use crate::output;
use crate::ux_error::{self, UxError};

#[derive(Args)]
pub struct ExplainArgs {
    #[arg(long, short, conflicts_with = "file", help = "Text to explain")]
    pub text: Option<String>,

    #[arg(long, short, help = "Read the text from a file (stdin when neither is given)")]
    pub file: Option<PathBuf>,

    #[arg(
        long,
        short,
        help = "Reading level, e.g. Basic, K6, \"High School\", Graduate; implies --leveled"
    )]
    pub level: Option<String>,

    #[arg(long, help = "One layer per concept at the reading level instead of three")]
    pub leveled: bool,

    #[arg(long, short, help = "Synthesis strategy: structured or chained")]
    pub strategy: Option<StrategyKind>,

    #[arg(long, help = "Maximum oracle calls in flight")]
    pub concurrency: Option<usize>,

    #[arg(long, help = "Output the tree as JSON")]
    pub json: bool
}

pub async fn run(args: ExplainArgs, mut config: Config) -> Result<()> {
    let text = read_input(&args)?;
    if text.trim().is_empty() {
        return Err(ux_error::empty_input().into());
    }

    apply_overrides(&mut config, &args)?;
    let orchestrator = build_orchestrator(&config)?;
    let options = default_options(&config);

    let (tree, report) = orchestrator
        .explain_with_report(&text, &options)
        .await
        .map_err(|e| ux_error::explain_failed(&e))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        output::print_tree(&tree, options.mode());
        output::hint(&format!(
            "{} strategy, {} oracle call(s), {:.1}s",
            report.strategy,
            report.oracle_calls,
            report.elapsed.as_secs_f64()
        ));
    }

    Ok(())
}

fn read_input(args: &ExplainArgs) -> Result<String, UxError> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }

    if let Some(path) = &args.file {
        return std::fs::read_to_string(path).map_err(|e| {
            ux_error::input_unreadable(&path.display().to_string(), &e.to_string())
        });
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        output::warn("Reading text from stdin; finish with Ctrl-D");
    }
    let mut text = String::new();
    stdin
        .read_to_string(&mut text)
        .map_err(|e| ux_error::input_unreadable("stdin", &e.to_string()))?;
    Ok(text)
}

/// Flags win over file and environment settings.
fn apply_overrides(config: &mut Config, args: &ExplainArgs) -> Result<(), UxError> {
    let mut layer = ConfigLayer::default();
    if let Some(level) = &args.level {
        let level =
            ReadingLevel::parse(level).map_err(|_| ux_error::invalid_reading_level(level))?;
        layer.synthesis.reading_level = Some(level);
        layer.synthesis.leveled = Some(true);
    }
    if args.leveled {
        layer.synthesis.leveled = Some(true);
    }
    layer.synthesis.strategy = args.strategy;
    layer.synthesis.max_concurrency = args.concurrency;

    apply_layer(config, layer, "cli");
    Ok(())
}
