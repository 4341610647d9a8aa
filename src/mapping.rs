//! Pairs primary-route waypoints with waypoints of each reference route.
//!
//! Primary waypoints are activated and deactivated by the user; the most recently activated
//! one that is still active is the target of the next friend assignment.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::color::ColorPicker;
use crate::error::MappingError;
use crate::waypoint::Waypoint;
use crate::{RouteId, WaypointId};

/// A reference-route waypoint together with the date it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    #[serde(flatten)]
    pub waypoint: Waypoint,
    pub date: String,
}

impl Friend {
    pub fn new(waypoint: Waypoint, date: impl Into<String>) -> Self {
        Self {
            waypoint,
            date: date.into(),
        }
    }
}

pub type Friends = IndexMap<RouteId, Option<Friend>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingEntry {
    pub main_record: Waypoint,
    pub color: String,
    #[serde(rename = "isClick", alias = "active")]
    pub active: bool,
    #[serde(rename = "friend", alias = "friends", default)]
    pub friends: Friends,
}

impl MappingEntry {
    pub fn friend(&self, route: &str) -> Option<&Friend> {
        self.friends.get(route).and_then(Option::as_ref)
    }
}

/// Who the next friend assignment goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    Idle,
    Selecting(&'a WaypointId),
}

/// The set of mapping entries plus the activation order of selected primary waypoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutesMapping {
    #[serde(default)]
    stack: Vec<Waypoint>,
    #[serde(rename = "mapping", default)]
    entries: Vec<MappingEntry>,
}

impl RoutesMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn stack(&self) -> &[Waypoint] {
        &self.stack
    }

    pub fn entry(&self, main_id: &str) -> Option<&MappingEntry> {
        self.entries.iter().find(|e| e.main_record.id == main_id)
    }

    fn entry_mut(&mut self, main_id: &str) -> Option<&mut MappingEntry> {
        self.entries.iter_mut().find(|e| e.main_record.id == main_id)
    }

    /// The reference waypoint paired with primary waypoint `main_id` on `route`, if any.
    pub fn friend_of(&self, main_id: &str, route: &str) -> Option<&Friend> {
        self.entry(main_id).and_then(|e| e.friend(route))
    }

    /// The entry currently holding reference waypoint `waypoint_id` of `route` as a friend.
    ///
    /// Nothing stops two entries from holding the same reference waypoint; callers wanting
    /// exclusivity check this before assigning.
    pub fn holder_of(&self, route: &str, waypoint_id: &str) -> Option<&MappingEntry> {
        self.entries
            .iter()
            .find(|e| e.friend(route).is_some_and(|f| f.waypoint.id == waypoint_id))
    }

    pub fn selection(&self) -> Selection<'_> {
        match self.stack.last() {
            Some(top) => Selection::Selecting(&top.id),
            None => Selection::Idle,
        }
    }

    /// Creates an inactive entry for `waypoint` unless one exists, returning its color.
    pub fn create_entry<R: rand::Rng>(
        &mut self,
        waypoint: &Waypoint,
        colors: &mut ColorPicker<R>,
    ) -> &str {
        let index = match self.position(&waypoint.id) {
            Some(index) => index,
            None => {
                let color = colors.pick(|c| self.entries.iter().any(|e| e.color == c));
                self.entries.push(MappingEntry {
                    main_record: waypoint.clone(),
                    color,
                    active: false,
                    friends: Friends::new(),
                });
                self.entries.len() - 1
            }
        };

        &self.entries[index].color
    }

    fn position(&self, main_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.main_record.id == main_id)
    }

    /// Flips the entry for `waypoint` between active and inactive.
    ///
    /// Activating pushes the waypoint onto the selection stack and yields the entry color;
    /// deactivating removes it from wherever it sits in the stack and yields `None`.
    pub fn toggle_selection(&mut self, waypoint: &Waypoint) -> Result<Option<String>, MappingError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.main_record.id == waypoint.id)
            .ok_or_else(|| MappingError::UnknownEntry {
                id: waypoint.id.clone(),
            })?;

        entry.active = !entry.active;
        if entry.active {
            let color = entry.color.clone();
            self.stack.push(waypoint.clone());
            Ok(Some(color))
        } else {
            self.stack.retain(|w| w.id != waypoint.id);
            Ok(None)
        }
    }

    /// Sets (or clears, with `None`) the friend on `route` of the selected entry.
    ///
    /// Fails without touching anything when no primary waypoint is selected.
    pub fn assign_friend(&mut self, route: &str, friend: Option<Friend>) -> Result<&str, MappingError> {
        let Selection::Selecting(top) = self.selection() else {
            return Err(MappingError::EmptySelection);
        };
        let top = top.clone();

        let entry = self
            .entry_mut(&top)
            .ok_or(MappingError::UnknownEntry { id: top })?;
        entry.friends.insert(route.to_string(), friend);

        Ok(&entry.color)
    }

    /// Writes a friend on the entry for `main_id` without going through the selection.
    pub fn set_friend(&mut self, main_id: &str, route: &str, friend: Option<Friend>) -> Result<(), MappingError> {
        let entry = self.entry_mut(main_id).ok_or_else(|| MappingError::UnknownEntry {
            id: main_id.to_string(),
        })?;
        entry.friends.insert(route.to_string(), friend);
        Ok(())
    }

    /// Friends of the selected entry.
    pub fn top_entry_friends(&self) -> Result<&Friends, MappingError> {
        let Selection::Selecting(top) = self.selection() else {
            return Err(MappingError::EmptySelection);
        };

        self.entry(top)
            .map(|e| &e.friends)
            .ok_or_else(|| MappingError::UnknownEntry { id: top.clone() })
    }

    /// Drops stack items that no longer have an active entry, keeping the rest in order.
    pub(crate) fn normalize(&mut self) {
        let entries = &self.entries;
        self.stack.retain(|w| {
            entries
                .iter()
                .any(|e| e.active && e.main_record.id == w.id)
        });
    }
}
