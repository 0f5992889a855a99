use std::path::{Path, PathBuf};

use clap::Args;
use dayslot_core::error::Result;

#[derive(Args)]
pub struct ValidateArgs {
    /// JSON file with tasks, events and blocks (stdin if omitted)
    #[arg(long, short)]
    input: Option<PathBuf>,
    /// Reference timezone override
    #[arg(long)]
    timezone: Option<String>,
}

pub fn run(args: ValidateArgs, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path, args.timezone.as_deref())?;
    let data = super::read_input(args.input.as_ref())?.into_data(&config.timezone)?;
    let all_day = data.events.iter().filter(|e| e.is_all_day()).count();
    println!("tasks: {}", data.tasks.len());
    println!("events: {} ({all_day} all-day)", data.events.len());
    println!("blocks: {}", data.blocks.len());
    Ok(())
}
