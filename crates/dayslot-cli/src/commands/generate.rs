use std::path::{Path, PathBuf};

use clap::Args;
use dayslot_core::error::Result;
use dayslot_core::time::{format_instant, parse_target_day};
use dayslot_core::{DayScheduler, PlacementStrategy, ScheduleRequest, Stores};

#[derive(Args)]
pub struct GenerateArgs {
    /// Target day: YYYY-MM-DD, or an ISO-8601 datetime
    #[arg(long)]
    date: String,
    /// Placement algorithm (greedy | compact); defaults to the config value
    #[arg(long)]
    algo: Option<String>,
    /// JSON file with tasks, events and blocks (stdin if omitted)
    #[arg(long, short)]
    input: Option<PathBuf>,
    /// Reference timezone override (e.g. "+09:00", "UTC", "Asia/Tokyo")
    #[arg(long)]
    timezone: Option<String>,
    /// Include the algorithm name in the report
    #[arg(long)]
    echo_algo: bool,
    /// Include per-task placements in the output
    #[arg(long)]
    placements: bool,
    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

pub fn run(args: GenerateArgs, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path, args.timezone.as_deref())?;
    let zone = config.timezone;
    let day = parse_target_day(&args.date, &zone)?;
    let strategy = match args.algo.as_deref() {
        Some(name) => name.parse::<PlacementStrategy>()?,
        None => config.default_algorithm,
    };

    let data = super::read_input(args.input.as_ref())?.into_data(&zone)?;
    let stores = Stores::from_data(data);
    let request = ScheduleRequest::new(day, stores.snapshot())
        .with_strategy(strategy)
        .with_echo_algo(args.echo_algo || config.echo_algo);
    let report = DayScheduler::from_config(&config).generate(&request);

    let mut output = serde_json::to_value(&report)?;
    if args.placements {
        let placements: Vec<serde_json::Value> = report
            .placements()
            .iter()
            .map(|p| {
                serde_json::json!({
                    "task_id": p.task_id,
                    "start_slot": p.start_slot,
                    "slots": p.slots,
                    "start_utc": format_instant(&p.start_utc),
                    "end_utc": format_instant(&p.end_utc),
                })
            })
            .collect();
        if let Some(obj) = output.as_object_mut() {
            obj.insert("placements".into(), placements.into());
        }
    }

    let text = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{text}");
    Ok(())
}
