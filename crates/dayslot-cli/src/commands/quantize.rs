use std::path::Path;

use clap::Args;
use dayslot_core::error::Result;
use dayslot_core::time::{format_instant, parse_instant};
use dayslot_core::{quantize, Rounding};

#[derive(Args)]
pub struct QuantizeArgs {
    /// ISO-8601 instant; naive values are read in the reference timezone
    instant: String,
    /// Round up instead of down
    #[arg(long)]
    ceil: bool,
    /// Reference timezone override
    #[arg(long)]
    timezone: Option<String>,
}

pub fn run(args: QuantizeArgs, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path, args.timezone.as_deref())?;
    let instant = parse_instant(&args.instant, &config.timezone)?;
    let rounding = if args.ceil { Rounding::Ceil } else { Rounding::Floor };
    println!("{}", format_instant(&quantize(&instant, rounding)));
    Ok(())
}
