use thiserror::Error;

use crate::waypoint::Field;

/// Reasons a single-field edit is refused. A refused edit never touches the stored day.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("invalid time {value:?} for {field}, expected HH:MM such as 08:00 or 13:59")]
    InvalidTimeFormat { field: Field, value: String },

    #[error("invalid value {value:?} for {field}, expected a non-negative whole number of minutes")]
    InvalidNumericField { field: Field, value: String },

    #[error("waypoint {id} not found in day")]
    WaypointNotFound { id: String },

    #[error("route {id} not found")]
    RouteNotFound { id: String },

    #[error("route {route} has no day {date}")]
    DayNotFound { route: String, date: String },

    #[error("date range ends ({end}) before it starts ({start})")]
    InvalidDateRange { start: String, end: String },

    #[error("team size must be at least 1")]
    InvalidTeamSize,

    #[error("the primary route cannot be removed")]
    PrimaryRouteRemoval,

    #[error("a day must keep at least one waypoint")]
    LastWaypoint,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("no primary waypoint is selected")]
    EmptySelection,

    #[error("no mapping entry for primary waypoint {id}")]
    UnknownEntry { id: String },
}

/// Failures when accepting a whole collection from outside, either a backup file or a bulk
/// replace.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("a route collection needs at least the primary route")]
    NoPrimaryRoute,

    #[error("route id {id} appears more than once")]
    DuplicateRouteId { id: String },

    #[error("route {id} has team size 0")]
    InvalidTeamSize { id: String },

    #[error("route {route}, day {date} repeats waypoint id {id}")]
    DuplicateWaypointId {
        route: String,
        date: String,
        id: String,
    },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: usize,
        value: usize,
    },

    #[error("config is not valid JSON: {0}")]
    Parse(String),
}
