//! The owned route collection. Every write goes through the time-chain engine and replaces
//! the stored collection copy-on-write, so snapshots handed out earlier never change.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::chain::{self, Anomaly};
use crate::error::{EditError, ImportError};
use crate::route::Route;
use crate::waypoint::{Field, Waypoint};
use crate::{RouteId, WaypointId};

/// What happened to an accepted single-field edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// The value was already present.
    Unchanged,
    /// The waypoint was not in the day, so the edit was ignored.
    Dropped,
}

#[derive(Debug, Clone)]
pub struct RouteRepository {
    routes: Arc<Vec<Route>>,
    // could be a linear scan, collections rarely hold more than a handful of routes
    route_id_to_idx: HashMap<RouteId, usize>,
}

impl RouteRepository {
    pub fn new(routes: Vec<Route>) -> Result<Self, ImportError> {
        validate(&routes)?;
        let route_id_to_idx = build_route_index(&routes);

        Ok(Self {
            routes: Arc::new(routes),
            route_id_to_idx,
        })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// A frozen view of the collection; later writes do not show up in it.
    pub fn snapshot(&self) -> Arc<Vec<Route>> {
        Arc::clone(&self.routes)
    }

    pub fn primary(&self) -> &Route {
        &self.routes[0]
    }

    pub fn references(&self) -> &[Route] {
        &self.routes[1..]
    }

    pub fn route(&self, id: &str) -> Option<&Route> {
        self.route_id_to_idx.get(id).map(|&idx| &self.routes[idx])
    }

    pub fn is_primary(&self, id: &str) -> bool {
        self.route_id_to_idx.get(id) == Some(&0)
    }

    fn route_idx(&self, id: &str) -> Result<usize, EditError> {
        self.route_id_to_idx
            .get(id)
            .copied()
            .ok_or_else(|| EditError::RouteNotFound { id: id.to_string() })
    }

    fn day(&self, route_idx: usize, date: &str) -> Result<&[Waypoint], EditError> {
        let route = &self.routes[route_idx];
        route.day(date).ok_or_else(|| EditError::DayNotFound {
            route: route.id.clone(),
            date: date.to_string(),
        })
    }

    fn store_day(&mut self, route_idx: usize, date: &str, day: Vec<Waypoint>) {
        let routes = Arc::make_mut(&mut self.routes);
        if let Some(slot) = routes[route_idx].days.get_mut(date) {
            *slot = day;
        }
    }

    fn commit(&mut self, routes: Vec<Route>) {
        self.route_id_to_idx = build_route_index(&routes);
        self.routes = Arc::new(routes);
    }

    /// Applies a single-field edit through the time-chain engine.
    ///
    /// Invalid values are rejected with the stored day left as it was. An unknown waypoint
    /// id is logged and otherwise ignored.
    pub fn edit_waypoint_field(
        &mut self,
        route_id: &str,
        date: &str,
        waypoint_id: &str,
        field: Field,
        value: &str,
    ) -> Result<EditOutcome, EditError> {
        let route_idx = self.route_idx(route_id)?;
        let day = self.day(route_idx, date)?;

        let edited = match chain::apply_edit(day, waypoint_id, field, value) {
            Ok(edited) => edited,
            Err(EditError::WaypointNotFound { id }) => {
                warn!(route_id, date, waypoint_id = %id, %field, "edit dropped, waypoint not in day");
                return Ok(EditOutcome::Dropped);
            }
            Err(err) => {
                warn!(route_id, date, waypoint_id, %field, value, error = %err, "edit rejected");
                return Err(err);
            }
        };

        if edited == day {
            return Ok(EditOutcome::Unchanged);
        }

        for Anomaly {
            waypoint,
            field: flagged,
            minutes,
        } in chain::anomalies(&edited)
        {
            warn!(route_id, date, %waypoint, field = %flagged, minutes, "negative span after edit");
        }

        debug!(route_id, date, waypoint_id, %field, value, "edit applied");
        self.store_day(route_idx, date, edited);
        Ok(EditOutcome::Applied)
    }

    pub fn anomalies(&self, route_id: &str, date: &str) -> Result<Vec<Anomaly>, EditError> {
        let day = self.day(self.route_idx(route_id)?, date)?;
        Ok(chain::anomalies(day).into_vec())
    }

    /// Swaps in a whole new collection after checking it.
    pub fn replace_routes(&mut self, routes: Vec<Route>) -> Result<(), ImportError> {
        validate(&routes)?;
        info!(routes = routes.len(), "route collection replaced");
        self.commit(routes);
        Ok(())
    }

    /// Appends a reference route with one empty day per date.
    pub fn add_route(&mut self, start: NaiveDate, end: NaiveDate) -> Result<RouteId, EditError> {
        let route = Route::spanning(start, end)?;
        let id = route.id.clone();

        let mut routes = self.routes.as_ref().clone();
        routes.push(route);
        self.commit(routes);

        info!(route_id = %id, %start, %end, "route added");
        Ok(id)
    }

    pub fn remove_route(&mut self, id: &str) -> Result<(), EditError> {
        let idx = self.route_idx(id)?;
        if idx == 0 {
            return Err(EditError::PrimaryRouteRemoval);
        }

        let mut routes = self.routes.as_ref().clone();
        routes.remove(idx);
        self.commit(routes);

        info!(route_id = id, "route removed");
        Ok(())
    }

    pub fn set_date_range(&mut self, id: &str, start: NaiveDate, end: NaiveDate) -> Result<(), EditError> {
        let idx = self.route_idx(id)?;
        let mut route = self.routes[idx].clone();
        route.set_date_range(start, end)?;

        Arc::make_mut(&mut self.routes)[idx] = route;
        info!(route_id = id, %start, %end, "route dates changed");
        Ok(())
    }

    pub fn update_route_info(
        &mut self,
        id: &str,
        team_size: u32,
        weather: &str,
        source: &str,
    ) -> Result<(), EditError> {
        if team_size == 0 {
            return Err(EditError::InvalidTeamSize);
        }
        let idx = self.route_idx(id)?;

        let route = &mut Arc::make_mut(&mut self.routes)[idx];
        route.team_size = team_size;
        route.weather = weather.to_string();
        route.source = source.to_string();

        debug!(route_id = id, team_size, weather, source, "route info updated");
        Ok(())
    }

    /// Inserts a blank waypoint after position `after` (or at the end of the day).
    pub fn insert_waypoint(
        &mut self,
        route_id: &str,
        date: &str,
        after: Option<usize>,
    ) -> Result<WaypointId, EditError> {
        let route_idx = self.route_idx(route_id)?;
        let (day, id) = chain::insert_after(self.day(route_idx, date)?, after);

        self.store_day(route_idx, date, day);
        debug!(route_id, date, waypoint_id = %id, "waypoint inserted");
        Ok(id)
    }

    pub fn remove_waypoint(&mut self, route_id: &str, date: &str, waypoint_id: &str) -> Result<(), EditError> {
        let route_idx = self.route_idx(route_id)?;
        let day = chain::remove(self.day(route_idx, date)?, waypoint_id)?;

        self.store_day(route_idx, date, day);
        debug!(route_id, date, waypoint_id, "waypoint removed");
        Ok(())
    }
}

fn build_route_index(routes: &[Route]) -> HashMap<RouteId, usize> {
    routes
        .iter()
        .enumerate()
        .map(|(idx, route)| (route.id.clone(), idx))
        .collect()
}

fn validate(routes: &[Route]) -> Result<(), ImportError> {
    if routes.is_empty() {
        return Err(ImportError::NoPrimaryRoute);
    }

    let mut seen = HashSet::with_capacity(routes.len());
    for route in routes {
        if !seen.insert(route.id.as_str()) {
            return Err(ImportError::DuplicateRouteId {
                id: route.id.clone(),
            });
        }
        if route.team_size == 0 {
            return Err(ImportError::InvalidTeamSize {
                id: route.id.clone(),
            });
        }

        for (date, points) in &route.days {
            let mut ids = HashSet::with_capacity(points.len());
            if let Some(dup) = points.iter().find(|p| !ids.insert(p.id.as_str())) {
                return Err(ImportError::DuplicateWaypointId {
                    route: route.id.clone(),
                    date: date.clone(),
                    id: dup.id.clone(),
                });
            }
        }
    }

    Ok(())
}
