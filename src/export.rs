//! Flattens a comparison day into the text grid printed in the overview document.

use std::io;

use crate::compare::{AlignedPoint, DayTable};
use crate::route::Route;
use crate::time::format_optional;

pub type Grid = Vec<Vec<String>>;

/// Column titles: the primary route, then each reference route by number.
pub fn route_labels(routes: &[Route]) -> Vec<String> {
    (0..routes.len())
        .map(|idx| match idx {
            0 => "Planned".to_string(),
            n => format!("Reference {n}"),
        })
        .collect()
}

/// What a cell shows for one route at one point: the departure for the first waypoint of a
/// day, otherwise the arrival with any rest noted.
fn time_cell(point: &AlignedPoint) -> String {
    let waypoint = &point.waypoint;
    if point.opens_day {
        return format_optional(waypoint.depart);
    }

    match waypoint.arrive {
        Some(arrive) if waypoint.rest > 0 => format!("{arrive} (rest {}')", waypoint.rest),
        arrive => format_optional(arrive),
    }
}

fn duration_cell(point: &AlignedPoint) -> String {
    format!("{}'", point.waypoint.duration)
}

impl DayTable {
    /// Header, team size and weather rows, then per point a time row and a travel row.
    /// The travel row after the last point is left out.
    pub fn to_grid(&self, routes: &[Route]) -> Grid {
        let mut grid: Grid = vec![
            std::iter::once(String::new()).chain(route_labels(routes)).collect(),
            std::iter::once("Team size".to_string())
                .chain(routes.iter().map(|r| r.team_size.to_string()))
                .collect(),
            std::iter::once("Weather".to_string())
                .chain(routes.iter().map(|r| r.weather.clone()))
                .collect(),
        ];

        for row in &self.rows {
            let cells = |render: fn(&AlignedPoint) -> String| {
                row.per_route
                    .iter()
                    .map(move |p| p.as_ref().map(render).unwrap_or_default())
            };

            grid.push(std::iter::once(row.point_label.clone()).chain(cells(time_cell)).collect());
            grid.push(std::iter::once(String::new()).chain(cells(duration_cell)).collect());
        }

        if !self.rows.is_empty() {
            grid.pop();
        }
        grid
    }
}

/// Writes a grid as CSV. Rows may differ in length.
pub fn write_csv<W: io::Write>(grid: &Grid, out: W) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(out);
    for row in grid {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::ComparisonRow;
    use crate::time::TimeOfDay;
    use crate::waypoint::Waypoint;

    fn aligned(route: &str, arrive: &str, depart: &str, rest: i32, opens_day: bool) -> AlignedPoint {
        AlignedPoint {
            waypoint: Waypoint {
                arrive: TimeOfDay::parse(arrive),
                depart: TimeOfDay::parse(depart),
                duration: 40,
                rest,
                ..Waypoint::new("w", "W")
            },
            date: "d".into(),
            route_id: route.into(),
            opens_day,
        }
    }

    fn routes() -> Vec<Route> {
        let mut main = Route::new("main");
        main.weather = "sunny".into();
        let mut other = Route::new("other");
        other.team_size = 4;
        vec![main, other]
    }

    fn day() -> DayTable {
        DayTable {
            day: "Day 1".into(),
            rows: vec![
                ComparisonRow {
                    point_label: "Trailhead".into(),
                    per_route: vec![
                        Some(aligned("main", "", "08:00", 0, true)),
                        Some(aligned("other", "", "07:40", 0, true)),
                    ],
                },
                ComparisonRow {
                    point_label: "Hut".into(),
                    per_route: vec![Some(aligned("main", "08:40", "09:00", 20, false)), None],
                },
            ],
        }
    }

    #[test]
    fn grid_matches_document_layout() {
        let grid = day().to_grid(&routes());

        assert_eq!(grid[0], ["", "Planned", "Reference 1"]);
        assert_eq!(grid[1], ["Team size", "1", "4"]);
        assert_eq!(grid[2], ["Weather", "sunny", ""]);
        assert_eq!(grid[3], ["Trailhead", "08:00", "07:40"]);
        assert_eq!(grid[4], ["", "40'", "40'"]);
        assert_eq!(grid[5], ["Hut", "08:40 (rest 20')", ""]);
        assert_eq!(grid.len(), 6);
    }

    #[test]
    fn csv_output_is_quoted_where_needed() {
        let grid = vec![
            vec!["a".to_string(), "b,c".to_string()],
            vec!["d".to_string()],
        ];
        let mut out = Vec::new();
        write_csv(&grid, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "a,\"b,c\"\nd\n");
    }
}
