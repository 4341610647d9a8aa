use serde::{Deserialize, Serialize};

use crate::error::ImportError;
use crate::mapping::RoutesMapping;
use crate::route::Route;

/// Everything needed to restore a planning session: the routes and the mapping between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub routes: Vec<Route>,
    #[serde(default)]
    pub routes_mapping: RoutesMapping,
}

impl Backup {
    pub fn to_json(&self) -> Result<String, ImportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a backup. The routes are not validated here; that happens when the backup
    /// is loaded into a planner.
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        Ok(serde_json::from_str(json)?)
    }
}
