//! The state container the UI talks to.
//!
//! A [`Planner`] owns the routes, the mapping and the comparison table derived from both.
//! Every write ends in [`Planner::notify`], which rebuilds the table before any listener
//! runs, so listeners and readers always see a table that matches the latest write.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::backup::Backup;
use crate::chain::Anomaly;
use crate::color::ColorPicker;
use crate::compare::ComparisonTable;
use crate::config::PlannerConfig;
use crate::error::{EditError, ImportError, MappingError};
use crate::export::Grid;
use crate::mapping::{Friend, Friends, RoutesMapping};
use crate::repository::{EditOutcome, RouteRepository};
use crate::route::Route;
use crate::similarity::{NameMatcher, Suggestion};
use crate::waypoint::{Field, Waypoint};
use crate::{RouteId, WaypointId};

/// Which half of the state a write touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Routes,
    Mapping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(Change, &Planner)>;

pub struct Planner {
    repository: RouteRepository,
    mapping: RoutesMapping,
    table: ComparisonTable,
    colors: ColorPicker,
    matcher: NameMatcher,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Planner {
    pub fn new(routes: Vec<Route>, config: &PlannerConfig) -> Result<Self, ImportError> {
        let repository = RouteRepository::new(routes)?;
        let mapping = RoutesMapping::new();
        let table = ComparisonTable::build(repository.routes(), &mapping);

        Ok(Self {
            repository,
            mapping,
            table,
            colors: ColorPicker::from_seed(config.seed, config.color_luminosity, config.color_attempts),
            matcher: config.name_matcher(),
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    pub fn from_backup(backup: Backup, config: &PlannerConfig) -> Result<Self, ImportError> {
        let mut planner = Self::new(backup.routes, config)?;
        planner.replace_mapping(backup.routes_mapping);
        Ok(planner)
    }

    /// Replaces routes and mapping from a backup file. Nothing changes if the backup is
    /// unreadable or its routes are invalid.
    pub fn import_backup(&mut self, json: &str) -> Result<(), ImportError> {
        let backup = Backup::from_json(json)?;
        self.replace_routes(backup.routes)?;
        self.replace_mapping(backup.routes_mapping);
        info!("backup imported");
        Ok(())
    }

    pub fn backup(&self) -> Backup {
        Backup {
            routes: self.repository.routes().to_vec(),
            routes_mapping: self.mapping.clone(),
        }
    }

    pub fn routes(&self) -> &[Route] {
        self.repository.routes()
    }

    pub fn snapshot(&self) -> Arc<Vec<Route>> {
        self.repository.snapshot()
    }

    pub fn mapping(&self) -> &RoutesMapping {
        &self.mapping
    }

    pub fn comparison_table(&self) -> &ComparisonTable {
        &self.table
    }

    /// The overview grid for the `day`-th day of the comparison table.
    pub fn day_grid(&self, day: usize) -> Option<Grid> {
        self.table
            .day(day)
            .map(|table| table.to_grid(self.repository.routes()))
    }

    pub fn subscribe(&mut self, listener: impl FnMut(Change, &Planner) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    /// Rebuilds the comparison table, then tells every listener what changed.
    fn notify(&mut self, change: Change) {
        self.table = ComparisonTable::build(self.repository.routes(), &self.mapping);

        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in &mut listeners {
            listener(change, self);
        }
        // listeners subscribed from inside a callback land in self.listeners meanwhile
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
    }

    // route writes

    /// The single write path for waypoint fields.
    pub fn edit_waypoint_field(
        &mut self,
        route_id: &str,
        date: &str,
        waypoint_id: &str,
        field: Field,
        value: &str,
    ) -> Result<EditOutcome, EditError> {
        let outcome = self
            .repository
            .edit_waypoint_field(route_id, date, waypoint_id, field, value)?;
        if outcome == EditOutcome::Applied {
            self.notify(Change::Routes);
        }
        Ok(outcome)
    }

    pub fn anomalies(&self, route_id: &str, date: &str) -> Result<Vec<Anomaly>, EditError> {
        self.repository.anomalies(route_id, date)
    }

    pub fn replace_routes(&mut self, routes: Vec<Route>) -> Result<(), ImportError> {
        self.repository.replace_routes(routes)?;
        self.notify(Change::Routes);
        Ok(())
    }

    pub fn add_route(&mut self, start: NaiveDate, end: NaiveDate) -> Result<RouteId, EditError> {
        let id = self.repository.add_route(start, end)?;
        self.notify(Change::Routes);
        Ok(id)
    }

    pub fn remove_route(&mut self, id: &str) -> Result<(), EditError> {
        self.repository.remove_route(id)?;
        self.notify(Change::Routes);
        Ok(())
    }

    pub fn set_date_range(&mut self, id: &str, start: NaiveDate, end: NaiveDate) -> Result<(), EditError> {
        self.repository.set_date_range(id, start, end)?;
        self.notify(Change::Routes);
        Ok(())
    }

    pub fn update_route_info(
        &mut self,
        id: &str,
        team_size: u32,
        weather: &str,
        source: &str,
    ) -> Result<(), EditError> {
        self.repository.update_route_info(id, team_size, weather, source)?;
        self.notify(Change::Routes);
        Ok(())
    }

    pub fn insert_waypoint(
        &mut self,
        route_id: &str,
        date: &str,
        after: Option<usize>,
    ) -> Result<WaypointId, EditError> {
        let id = self.repository.insert_waypoint(route_id, date, after)?;
        self.notify(Change::Routes);
        Ok(id)
    }

    pub fn remove_waypoint(&mut self, route_id: &str, date: &str, waypoint_id: &str) -> Result<(), EditError> {
        self.repository.remove_waypoint(route_id, date, waypoint_id)?;
        self.notify(Change::Routes);
        Ok(())
    }

    // mapping writes

    /// Makes sure `waypoint` has a mapping entry and returns the entry's color.
    pub fn create_entry(&mut self, waypoint: &Waypoint) -> String {
        let before = self.mapping.entries().len();
        let color = self.mapping.create_entry(waypoint, &mut self.colors).to_string();

        if self.mapping.entries().len() != before {
            debug!(waypoint_id = %waypoint.id, %color, "mapping entry created");
            self.notify(Change::Mapping);
        }
        color
    }

    pub fn toggle_selection(&mut self, waypoint: &Waypoint) -> Result<Option<String>, MappingError> {
        let color = self.mapping.toggle_selection(waypoint)?;
        debug!(waypoint_id = %waypoint.id, active = color.is_some(), "selection toggled");
        self.notify(Change::Mapping);
        Ok(color)
    }

    /// Pairs (or unpairs) the selected primary waypoint with a waypoint of `route_id`.
    pub fn assign_friend(&mut self, route_id: &str, friend: Option<Friend>) -> Result<String, MappingError> {
        let color = match self.mapping.assign_friend(route_id, friend) {
            Ok(color) => color.to_string(),
            Err(err) => {
                warn!(route_id, error = %err, "friend assignment ignored");
                return Err(err);
            }
        };

        self.notify(Change::Mapping);
        Ok(color)
    }

    pub fn top_entry_friends(&self) -> Result<&Friends, MappingError> {
        self.mapping.top_entry_friends()
    }

    pub fn replace_mapping(&mut self, mut mapping: RoutesMapping) {
        mapping.normalize();
        info!(entries = mapping.entries().len(), "mapping replaced");
        self.mapping = mapping;
        self.notify(Change::Mapping);
    }

    // name matching

    /// Name-based pairings between the primary route and `route_id`.
    pub fn suggest_friends(&self, route_id: &str) -> Result<Vec<Suggestion>, EditError> {
        let reference = self
            .repository
            .route(route_id)
            .ok_or_else(|| EditError::RouteNotFound { id: route_id.to_string() })?;
        Ok(self.matcher.align(self.repository.primary(), reference))
    }

    /// Writes name-based pairings as friends, creating entries as needed. Existing friends
    /// and the selection are left alone. Returns how many friends were written.
    pub fn apply_suggestions(&mut self, route_id: &str) -> Result<usize, EditError> {
        let suggestions = self.suggest_friends(route_id)?;
        let primary = self.repository.primary();

        let mut written = 0;
        for Suggestion { main_id, friend } in suggestions {
            if self.mapping.friend_of(&main_id, route_id).is_some() {
                continue;
            }
            let Some((_, main)) = primary.flattened().find(|(_, w)| w.id == main_id) else {
                continue;
            };

            self.mapping.create_entry(main, &mut self.colors);
            if self.mapping.set_friend(&main_id, route_id, Some(friend)).is_ok() {
                written += 1;
            }
        }

        info!(route_id, written, "name suggestions applied");
        if written > 0 {
            self.notify(Change::Mapping);
        }
        Ok(written)
    }
}
