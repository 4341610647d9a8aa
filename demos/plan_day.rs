// Usage: cargo run --example plan-day [backup.json]
//
// Builds (or loads) a one-day plan, edits a few fields and prints the resulting chain.
// Set RUST_LOG=itinerary=debug to see every edit.

use std::{env, fs, time::Duration};

use humantime::format_duration;
use itinerary::{Field, Planner, PlannerConfig, Route, Waypoint, time::TimeOfDay};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = PlannerConfig::default().with_seed(7);
    let mut planner = match env::args().nth(1) {
        Some(path) => {
            let json = fs::read_to_string(&path)?;
            Planner::from_backup(itinerary::Backup::from_json(&json)?, &config)?
        }
        None => Planner::new(vec![sample_route()], &config)?,
    };

    let route_id = planner.routes()[0].id.clone();
    let (date, first) = planner.routes()[0]
        .day_at(0)
        .map(|(date, day)| (date.to_string(), day.first().map(|w| w.id.clone())))
        .ok_or_else(|| anyhow::anyhow!("route '{}' has no days", route_id))?;
    let first = first.ok_or_else(|| anyhow::anyhow!("day '{}' is empty", date))?;

    // Start half an hour later; everything downstream follows
    planner.edit_waypoint_field(&route_id, &date, &first, Field::Depart, "07:30")?;
    planner.edit_waypoint_field(&route_id, &date, &first, Field::Duration, "75")?;

    print_day(&planner.routes()[0], &date);

    for anomaly in planner.anomalies(&route_id, &date)? {
        println!("! {} has {} = {}'", anomaly.waypoint, anomaly.field, anomaly.minutes);
    }

    Ok(())
}

fn sample_route() -> Route {
    let mut route = Route::new("plan");
    let points = [
        ("Trailhead", None, Some((7, 0)), 60, 0),
        ("Saddle", Some((8, 0)), Some((8, 15)), 90, 15),
        ("Summit", Some((9, 45)), Some((10, 15)), 120, 30),
        ("Hut", Some((12, 15)), None, 0, 0),
    ];

    let day = points
        .into_iter()
        .enumerate()
        .map(|(i, (name, arrive, depart, duration, rest))| Waypoint {
            arrive: arrive.map(|(h, m)| TimeOfDay::from_hm(h, m)),
            depart: depart.map(|(h, m)| TimeOfDay::from_hm(h, m)),
            duration,
            rest,
            ..Waypoint::new(format!("w{i}"), name)
        })
        .collect();
    route.days.insert("2025-05-01".into(), day);
    route
}

fn print_day(route: &Route, date: &str) {
    let Some(day) = route.day(date) else {
        return;
    };

    println!("{} on {}:", route.id, date);
    for waypoint in day {
        let leg = Duration::from_secs(waypoint.duration.max(0) as u64 * 60);
        println!(
            "  {:<10} arrive {:>5}  depart {:>5}  rest {:>3}'  then {}",
            waypoint.name,
            itinerary::time::format_optional(waypoint.arrive),
            itinerary::time::format_optional(waypoint.depart),
            waypoint.rest,
            format_duration(leg),
        );
    }
}
