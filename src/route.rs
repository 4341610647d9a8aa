use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::RouteId;
use crate::error::EditError;
use crate::waypoint::{Waypoint, empty_day};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date label to that day's ordered waypoints, in day order.
pub type Days = IndexMap<String, Vec<Waypoint>>;

/// One itinerary. Position 0 of a collection is the primary route, everything after it is a
/// reference route compared against the primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: RouteId,
    #[serde(default)]
    pub source: String,
    #[serde(default = "Route::default_team_size")]
    pub team_size: u32,
    #[serde(default)]
    pub weather: String,
    #[serde(default)]
    pub days: Days,
}

impl Route {
    const fn default_team_size() -> u32 {
        1
    }

    pub fn new(id: impl Into<RouteId>) -> Self {
        Self {
            id: id.into(),
            source: String::new(),
            team_size: Self::default_team_size(),
            weather: String::new(),
            days: Days::new(),
        }
    }

    /// A route with a fresh id and one empty day per date from `start` to `end` inclusive.
    pub fn spanning(start: NaiveDate, end: NaiveDate) -> Result<Self, EditError> {
        let mut route = Self::new(Uuid::now_v7().to_string());
        for date in dates_between(start, end)? {
            route.days.insert(date, empty_day());
        }
        Ok(route)
    }

    pub fn day(&self, date: &str) -> Option<&[Waypoint]> {
        self.days.get(date).map(Vec::as_slice)
    }

    /// The `index`-th day regardless of its date label.
    pub fn day_at(&self, index: usize) -> Option<(&str, &[Waypoint])> {
        self.days
            .get_index(index)
            .map(|(date, points)| (date.as_str(), points.as_slice()))
    }

    /// Every waypoint of the route in order, paired with its date.
    pub fn flattened(&self) -> impl Iterator<Item = (&str, &Waypoint)> {
        self.days
            .iter()
            .flat_map(|(date, points)| points.iter().map(move |p| (date.as_str(), p)))
    }

    /// Relabels the days to consecutive dates from `start` to `end`. Existing days are kept
    /// by position; missing ones are added empty and surplus ones dropped.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<(), EditError> {
        let dates = dates_between(start, end)?;
        let mut old = std::mem::take(&mut self.days).into_values();

        self.days = dates
            .into_iter()
            .map(|date| (date, old.next().unwrap_or_else(empty_day)))
            .collect();
        Ok(())
    }
}

/// `YYYY-MM-DD` labels for every date in `start..=end`.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> Result<Vec<String>, EditError> {
    if end < start {
        return Err(EditError::InvalidDateRange {
            start: start.format(DATE_FORMAT).to_string(),
            end: end.format(DATE_FORMAT).to_string(),
        });
    }

    Ok(start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|d| d.format(DATE_FORMAT).to_string())
        .collect())
}
