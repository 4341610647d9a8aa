use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::{TimeOfDay, format_optional, optional_hhmm};
use crate::{Minutes, WaypointId};

/// A single timed stop within one day of a route.
///
/// Inside a day, `depart = arrive + rest` holds for every waypoint and
/// `arrive(i + 1) = depart(i) + duration(i)` holds for every leg. The first waypoint's
/// `arrive`/`rest` and the last waypoint's `depart`/`rest`/`duration` carry no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub id: WaypointId,
    #[serde(rename = "point", alias = "name", default)]
    pub name: String,
    #[serde(with = "optional_hhmm", default)]
    pub arrive: Option<TimeOfDay>,
    #[serde(with = "optional_hhmm", default)]
    pub depart: Option<TimeOfDay>,
    /// Travel time of the leg leaving this waypoint.
    #[serde(default)]
    pub duration: Minutes,
    /// Dwell time spent at this waypoint.
    #[serde(default)]
    pub rest: Minutes,
    #[serde(default)]
    pub note: String,
    #[serde(rename = "compareDetail", alias = "compareNote", default)]
    pub compare_note: String,
}

impl Waypoint {
    pub fn new(id: impl Into<WaypointId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arrive: None,
            depart: None,
            duration: 0,
            rest: 0,
            note: String::new(),
            compare_note: String::new(),
        }
    }

    /// A nameless, untimed waypoint with a fresh time-ordered id.
    pub fn blank() -> Self {
        Self::new(Uuid::now_v7().to_string(), "")
    }

    pub fn field_text(&self, field: Field) -> String {
        match field {
            Field::Name => self.name.clone(),
            Field::Arrive => format_optional(self.arrive),
            Field::Depart => format_optional(self.depart),
            Field::Duration => self.duration.to_string(),
            Field::Rest => self.rest.to_string(),
            Field::Note => self.note.clone(),
            Field::CompareNote => self.compare_note.clone(),
        }
    }
}

/// What a freshly created day holds: a start and an end to be filled in.
pub fn empty_day() -> Vec<Waypoint> {
    vec![Waypoint::blank(), Waypoint::blank()]
}

/// The editable fields of a [`Waypoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    #[serde(alias = "point")]
    Name,
    Arrive,
    Depart,
    Duration,
    Rest,
    Note,
    #[serde(alias = "compareDetail")]
    CompareNote,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Arrive,
        Field::Depart,
        Field::Duration,
        Field::Rest,
        Field::Note,
        Field::CompareNote,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Arrive => "arrive",
            Field::Depart => "depart",
            Field::Duration => "duration",
            Field::Rest => "rest",
            Field::Note => "note",
            Field::CompareNote => "compareNote",
        }
    }

    pub fn is_time(self) -> bool {
        matches!(self, Field::Arrive | Field::Depart)
    }

    pub fn is_span(self) -> bool {
        matches!(self, Field::Duration | Field::Rest)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown waypoint field {:?}", self.0)
    }
}

impl std::error::Error for UnknownField {}

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "point" => Ok(Field::Name),
            "compareDetail" => Ok(Field::CompareNote),
            _ => Field::ALL
                .into_iter()
                .find(|field| field.as_str() == s)
                .ok_or_else(|| UnknownField(s.to_string())),
        }
    }
}
