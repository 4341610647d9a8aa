// Usage: cargo run --example compare-routes <backup.json> [out.csv]
//
// Loads a backup, pairs reference waypoints by name where the user has not paired them yet,
// and prints (or writes) the first day of the comparison as CSV.

use std::{env, fs::File, io};

use itinerary::{Backup, Planner, PlannerConfig, export::write_csv};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <backup.json> [out.csv]", args[0]);
        std::process::exit(1);
    }

    let json = std::fs::read_to_string(&args[1])?;
    let mut planner = Planner::from_backup(Backup::from_json(&json)?, &PlannerConfig::default())?;

    let references: Vec<String> = planner.routes()[1..].iter().map(|r| r.id.clone()).collect();
    for route_id in &references {
        let written = planner.apply_suggestions(route_id)?;
        println!("{route_id}: {written} waypoints paired by name");
    }

    for day in planner.comparison_table().days() {
        let paired = day
            .rows
            .iter()
            .filter(|row| row.per_route.iter().skip(1).any(Option::is_some))
            .count();
        println!("{}: {}/{} points paired", day.day, paired, day.rows.len());
    }

    let grid = planner
        .day_grid(0)
        .ok_or_else(|| anyhow::anyhow!("primary route has no days"))?;

    match args.get(2) {
        Some(path) => write_csv(&grid, File::create(path)?)?,
        None => write_csv(&grid, io::stdout().lock())?,
    }

    Ok(())
}
