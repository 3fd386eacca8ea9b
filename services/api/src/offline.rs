use chrono::Utc;
use clap::Args;
use fleet_induction::error::AppError;
use fleet_induction::planning::induction::{alerts, optimizer, PlanningConstraints, Train};
use serde_json::json;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PlanArgs {
    /// Path to a JSON fleet snapshot (an array of trains)
    pub(crate) fleet: PathBuf,
    /// Pretty-print the resulting plan JSON
    #[arg(long)]
    pub(crate) pretty: bool,
}

/// Run the local optimizer over a fleet snapshot file and print the ranking
/// with its alerts, without touching any store. Useful for dry-running a
/// night plan against an exported fleet state.
pub(crate) fn run_offline_plan(args: PlanArgs) -> Result<(), AppError> {
    let raw = fs::read_to_string(&args.fleet)?;
    let trains: Vec<Train> = serde_json::from_str(&raw)?;

    let now = Utc::now();
    let outcome = optimizer::optimize(&trains, &PlanningConstraints::default(), now);
    let alerts = alerts::generate_alerts(&trains, now);

    let payload = json!({
        "rankedTrains": outcome.ranked_trains,
        "alerts": alerts,
        "optimizationMetrics": outcome.metrics,
        "aiModelInfo": outcome.model_info,
    });

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&payload)?
    } else {
        serde_json::to_string(&payload)?
    };
    println!("{rendered}");

    Ok(())
}
