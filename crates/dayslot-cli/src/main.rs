use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dayslot_core::ErrorKind;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "dayslot", version, about = "Single-day slot scheduler")]
struct Cli {
    /// Config file to use instead of ~/.config/dayslot/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the slot grid for one day
    Generate(commands::generate::GenerateArgs),
    /// Round an instant to a slot boundary
    Quantize(commands::quantize::QuantizeArgs),
    /// Check that an input file holds valid tasks, events and blocks
    Validate(commands::validate::ValidateArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Generate(args) => commands::generate::run(args, config_path),
        Commands::Quantize(args) => commands::quantize::run(args, config_path),
        Commands::Validate(args) => commands::validate::run(args, config_path),
        Commands::Config { action } => commands::config::run(action, config_path),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        let code = match e.kind() {
            ErrorKind::Validation => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}
