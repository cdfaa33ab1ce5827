use anyhow::Result;
use clap::Args;
use lucid_core::ReadingLevel;
use serde_json::json;

use crate::output;

#[derive(Args)]
pub struct LevelsArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool
}

pub fn run(args: LevelsArgs) -> Result<()> {
    if args.json {
        let levels: Vec<_> = ReadingLevel::ALL
            .iter()
            .map(|level| {
                json!({
                    "label": level.label(),
                    "code": level.grade_code(),
                    "ages": level.age_range(),
                    "description": level.description()
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&levels)?);
        return Ok(());
    }

    output::print_levels();
    Ok(())
}
