//! Multi-day itinerary planning: editable time chains of waypoints, and a side-by-side
//! comparison of a planned route against reference routes.

pub mod backup;
pub mod chain;
pub mod color;
pub mod compare;
pub mod config;
pub mod error;
pub mod export;
pub mod mapping;
pub mod planner;
pub mod repository;
pub mod route;
pub mod similarity;
pub mod time;
pub mod waypoint;

/// Signed span in minutes. Negative spans are legal and mean inconsistent data.
pub type Minutes = i32;
pub type RouteId = String;
pub type WaypointId = String;

pub use backup::Backup;
pub use compare::{AlignedPoint, ComparisonRow, ComparisonTable, DayTable};
pub use config::PlannerConfig;
pub use error::{ConfigError, EditError, ImportError, MappingError};
pub use mapping::{Friend, MappingEntry, RoutesMapping, Selection};
pub use planner::{Change, Planner, SubscriptionId};
pub use repository::{EditOutcome, RouteRepository};
pub use route::Route;
pub use time::TimeOfDay;
pub use waypoint::{Field, Waypoint};
