//! Per-day side-by-side alignment of the primary route with every reference route.

use std::collections::HashMap;

use serde::Serialize;

use crate::RouteId;
use crate::mapping::RoutesMapping;
use crate::route::Route;
use crate::waypoint::Waypoint;

/// A waypoint placed in a comparison row, with the day and route it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedPoint {
    #[serde(flatten)]
    pub waypoint: Waypoint,
    pub date: String,
    pub route_id: RouteId,
    /// Whether this is the first waypoint of its day.
    #[serde(skip)]
    pub opens_day: bool,
}

/// One primary waypoint and what each route has at that point, primary first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    #[serde(rename = "point")]
    pub point_label: String,
    #[serde(rename = "routes")]
    pub per_route: Vec<Option<AlignedPoint>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayTable {
    /// `Day 1`, `Day 2`, ... Days are matched by position, never by date.
    pub day: String,
    #[serde(rename = "dayPoints")]
    pub rows: Vec<ComparisonRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ComparisonTable {
    days: Vec<DayTable>,
}

/// Where a reference waypoint currently lives.
#[derive(Clone, Copy)]
struct Located<'a> {
    date: &'a str,
    waypoint: &'a Waypoint,
    opens_day: bool,
}

/// Every waypoint of every route, findable by (route, date, id) and by (route, id).
///
/// Ids are only unique within a day, so the dated key is tried first. The id-only key
/// keeps a friend visible after its day has been relabeled.
#[derive(Default)]
struct WaypointIndex<'a> {
    by_date: HashMap<(&'a str, &'a str, &'a str), Located<'a>>,
    by_id: HashMap<(&'a str, &'a str), Located<'a>>,
}

impl WaypointIndex<'_> {
    fn find<'s>(&'s self, route: &'s str, date: &'s str, id: &'s str) -> Option<Located<'s>> {
        self.by_date
            .get(&(route, date, id))
            .or_else(|| self.by_id.get(&(route, id)))
            .copied()
    }
}

impl ComparisonTable {
    pub fn build(routes: &[Route], mapping: &RoutesMapping) -> Self {
        let Some(primary) = routes.first() else {
            return Self::default();
        };

        // Phase 1: index every waypoint of every route
        let located = Self::locate_waypoints(routes);

        // Phase 2: one row per primary waypoint, friends resolved against current data
        let days = primary
            .days
            .iter()
            .enumerate()
            .map(|(idx, (date, points))| DayTable {
                day: format!("Day {}", idx + 1),
                rows: points
                    .iter()
                    .enumerate()
                    .map(|(pos, point)| Self::build_row(routes, mapping, &located, date, pos, point))
                    .collect(),
            })
            .collect();

        Self { days }
    }

    fn locate_waypoints(routes: &[Route]) -> WaypointIndex<'_> {
        let mut index = WaypointIndex::default();

        for route in routes {
            for (date, points) in &route.days {
                for (pos, waypoint) in points.iter().enumerate() {
                    let found = Located {
                        date: date.as_str(),
                        waypoint,
                        opens_day: pos == 0,
                    };
                    let id = waypoint.id.as_str();
                    index.by_date.insert((route.id.as_str(), date.as_str(), id), found);
                    index.by_id.entry((route.id.as_str(), id)).or_insert(found);
                }
            }
        }

        index
    }

    fn build_row(
        routes: &[Route],
        mapping: &RoutesMapping,
        located: &WaypointIndex<'_>,
        date: &str,
        pos: usize,
        point: &Waypoint,
    ) -> ComparisonRow {
        let per_route = routes
            .iter()
            .enumerate()
            .map(|(route_idx, route)| {
                if route_idx == 0 {
                    return Some(AlignedPoint {
                        waypoint: point.clone(),
                        date: date.to_string(),
                        route_id: route.id.clone(),
                        opens_day: pos == 0,
                    });
                }

                let friend = mapping.friend_of(&point.id, &route.id)?;
                let found = located.find(&route.id, &friend.date, &friend.waypoint.id)?;
                Some(AlignedPoint {
                    waypoint: found.waypoint.clone(),
                    date: found.date.to_string(),
                    route_id: route.id.clone(),
                    opens_day: found.opens_day,
                })
            })
            .collect();

        ComparisonRow {
            point_label: point.name.clone(),
            per_route,
        }
    }

    pub fn days(&self) -> &[DayTable] {
        &self.days
    }

    pub fn day(&self, index: usize) -> Option<&DayTable> {
        self.days.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ColorPicker, Luminosity};
    use crate::mapping::Friend;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn add_day(route: &mut Route, date: &str, ids: &[&str]) {
        let points = ids.iter().map(|p| Waypoint::new(*p, p.to_uppercase())).collect();
        route.days.insert(date.to_string(), points);
    }

    fn routes() -> Vec<Route> {
        let mut main = Route::new("main");
        add_day(&mut main, "2025-05-01", &["a", "b"]);
        add_day(&mut main, "2025-05-02", &["c"]);

        let mut r1 = Route::new("r1");
        add_day(&mut r1, "2023-10-10", &["x", "y"]);
        add_day(&mut r1, "2023-10-11", &["z"]);

        let mut r2 = Route::new("r2");
        add_day(&mut r2, "2022-01-01", &["m"]);

        vec![main, r1, r2]
    }

    fn pair(mapping: &mut RoutesMapping, main: &Waypoint, route: &str, friend: &Waypoint, date: &str) {
        let mut colors = ColorPicker::new(StdRng::seed_from_u64(5), Luminosity::Dark, 16);
        mapping.create_entry(main, &mut colors);
        mapping
            .set_friend(&main.id, route, Some(Friend::new(friend.clone(), date)))
            .unwrap();
    }

    #[test]
    fn rows_follow_the_primary_route() {
        let table = ComparisonTable::build(&routes(), &RoutesMapping::new());

        let days: Vec<_> = table.days().iter().map(|d| (d.day.as_str(), d.rows.len())).collect();
        assert_eq!(days, [("Day 1", 2), ("Day 2", 1)]);

        let row = &table.days()[0].rows[1];
        assert_eq!(row.point_label, "B");
        assert_eq!(row.per_route.len(), 3);
        assert_eq!(row.per_route[0].as_ref().map(|p| p.route_id.as_str()), Some("main"));
        assert!(row.per_route[1].is_none() && row.per_route[2].is_none());
    }

    #[test]
    fn friends_fill_reference_columns() {
        let routes = routes();
        let mut mapping = RoutesMapping::new();
        let a = &routes[0].days["2025-05-01"][0];
        let z = &routes[1].days["2023-10-11"][0];
        pair(&mut mapping, a, "r1", z, "2023-10-11");

        let table = ComparisonTable::build(&routes, &mapping);
        let cell = table.days()[0].rows[0].per_route[1].as_ref().unwrap();

        assert_eq!(cell.waypoint.id, "z");
        assert_eq!(cell.date, "2023-10-11");
        assert_eq!(cell.route_id, "r1");
        assert!(cell.opens_day);
        assert!(table.days()[0].rows[0].per_route[2].is_none());
    }

    #[test]
    fn friends_reflect_current_waypoint_data() {
        let mut routes = routes();
        let mut mapping = RoutesMapping::new();
        let a = routes[0].days["2025-05-01"][0].clone();
        let y = routes[1].days["2023-10-10"][1].clone();
        pair(&mut mapping, &a, "r1", &y, "2023-10-10");

        routes[1].days["2023-10-10"][1].name = "Renamed".into();
        let table = ComparisonTable::build(&routes, &mapping);
        let cell = table.days()[0].rows[0].per_route[1].as_ref().unwrap();
        assert_eq!(cell.waypoint.name, "Renamed");

        routes[1].days["2023-10-10"].remove(1);
        let table = ComparisonTable::build(&routes, &mapping);
        assert!(table.days()[0].rows[0].per_route[1].is_none());
    }

    #[test]
    fn friends_resolve_on_their_own_day() {
        let mut routes = routes();
        add_day(&mut routes[1], "2023-10-12", &["x"]);
        routes[1].days["2023-10-12"][0].name = "Second X".into();

        let mut mapping = RoutesMapping::new();
        let a = routes[0].days["2025-05-01"][0].clone();
        let later_x = routes[1].days["2023-10-12"][0].clone();
        pair(&mut mapping, &a, "r1", &later_x, "2023-10-12");

        let table = ComparisonTable::build(&routes, &mapping);
        let cell = table.days()[0].rows[0].per_route[1].as_ref().unwrap();
        assert_eq!(cell.date, "2023-10-12");
        assert_eq!(cell.waypoint.name, "Second X");
        assert!(cell.opens_day);
    }

    #[test]
    fn relabeled_days_still_resolve_by_id() {
        let mut routes = routes();
        let mut mapping = RoutesMapping::new();
        let a = routes[0].days["2025-05-01"][0].clone();
        let z = routes[1].days["2023-10-11"][0].clone();
        pair(&mut mapping, &a, "r1", &z, "2023-10-11");

        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        routes[1].set_date_range(start, end).unwrap();

        let table = ComparisonTable::build(&routes, &mapping);
        let cell = table.days()[0].rows[0].per_route[1].as_ref().unwrap();
        assert_eq!(cell.waypoint.id, "z");
        assert_eq!(cell.date, "2024-01-02");
    }

    #[test]
    fn serializes_in_export_shape() {
        let table = ComparisonTable::build(&routes()[..1], &RoutesMapping::new());
        let json = serde_json::to_value(&table).unwrap();

        assert_eq!(json[0]["day"], "Day 1");
        assert_eq!(json[0]["dayPoints"][0]["point"], "A");
        assert_eq!(json[0]["dayPoints"][0]["routes"][0]["routeId"], "main");
        assert_eq!(json[0]["dayPoints"][0]["routes"][0]["date"], "2025-05-01");
    }

    #[test]
    fn no_routes_no_days() {
        assert!(ComparisonTable::build(&[], &RoutesMapping::new()).is_empty());
    }
}
