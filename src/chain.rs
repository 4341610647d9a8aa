//! Keeps a day's arrive/depart/duration/rest values consistent after a single-field edit.
//!
//! Two kinds of edit exist. `arrive`/`depart` edits re-anchor the rest of the day: every later
//! time moves by the same amount and no leg or dwell changes length. `duration`/`rest` edits
//! change one span and ripple forward by recomputing each dependent time in order.
//!
//! Fields that carry no meaning (the first waypoint's arrive/rest, the last waypoint's
//! depart/rest/duration) are never written by propagation, only by a direct edit. Empty
//! times are never produced by propagation either: a recomputation whose source is empty
//! leaves its target alone.
//!
//! A time edit fills every empty later time with the new value. When the edited time was
//! empty, its old value is read back from its neighbour (the next arrival for a departure,
//! the own departure for an arrival) and filled times shift from there. With no neighbour to
//! read from, filled times stay where they are.

use smallvec::SmallVec;

use crate::Minutes;
use crate::error::EditError;
use crate::time::TimeOfDay;
use crate::waypoint::{Field, Waypoint};

/// A validated field edit, ready to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Name(String),
    Arrive(TimeOfDay),
    Depart(TimeOfDay),
    Duration(Minutes),
    Rest(Minutes),
    Note(String),
    CompareNote(String),
}

impl Edit {
    /// Validates raw input for `field`. Times must be `HH:MM`, spans a non-negative integer.
    pub fn parse(field: Field, value: &str) -> Result<Self, EditError> {
        let bad_time = || EditError::InvalidTimeFormat {
            field,
            value: value.to_string(),
        };
        let bad_span = || EditError::InvalidNumericField {
            field,
            value: value.to_string(),
        };

        Ok(match field {
            Field::Arrive => Edit::Arrive(TimeOfDay::parse(value).ok_or_else(bad_time)?),
            Field::Depart => Edit::Depart(TimeOfDay::parse(value).ok_or_else(bad_time)?),
            Field::Duration => Edit::Duration(parse_span(value).ok_or_else(bad_span)?),
            Field::Rest => Edit::Rest(parse_span(value).ok_or_else(bad_span)?),
            Field::Name => Edit::Name(value.to_string()),
            Field::Note => Edit::Note(value.to_string()),
            Field::CompareNote => Edit::CompareNote(value.to_string()),
        })
    }

    pub fn field(&self) -> Field {
        match self {
            Edit::Name(_) => Field::Name,
            Edit::Arrive(_) => Field::Arrive,
            Edit::Depart(_) => Field::Depart,
            Edit::Duration(_) => Field::Duration,
            Edit::Rest(_) => Field::Rest,
            Edit::Note(_) => Field::Note,
            Edit::CompareNote(_) => Field::CompareNote,
        }
    }

    fn is_noop_for(&self, waypoint: &Waypoint) -> bool {
        match self {
            Edit::Name(v) => waypoint.name == *v,
            Edit::Arrive(t) => waypoint.arrive == Some(*t),
            Edit::Depart(t) => waypoint.depart == Some(*t),
            Edit::Duration(v) => waypoint.duration == *v,
            Edit::Rest(v) => waypoint.rest == *v,
            Edit::Note(v) => waypoint.note == *v,
            Edit::CompareNote(v) => waypoint.compare_note == *v,
        }
    }
}

fn parse_span(value: &str) -> Option<Minutes> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

/// Validates `value` for `field` and applies it to waypoint `id`, returning the new day.
///
/// The input is never modified. Validation happens before anything is computed, so a
/// rejected edit has no effect at all.
pub fn apply_edit(
    day: &[Waypoint],
    id: &str,
    field: Field,
    value: &str,
) -> Result<Vec<Waypoint>, EditError> {
    let edit = Edit::parse(field, value)?;
    apply(day, id, edit)
}

/// Applies an already validated edit. An edit that writes the value already present returns
/// an identical copy of the day.
pub fn apply(day: &[Waypoint], id: &str, edit: Edit) -> Result<Vec<Waypoint>, EditError> {
    let k = day
        .iter()
        .position(|w| w.id == id)
        .ok_or_else(|| EditError::WaypointNotFound { id: id.to_string() })?;

    let mut rows = day.to_vec();
    if edit.is_noop_for(&rows[k]) {
        return Ok(rows);
    }

    let last = rows.len() - 1;
    match edit {
        Edit::Depart(new) => {
            let old = rows[k].depart.replace(new);
            if 0 < k && k < last {
                if let Some(arrive) = rows[k].arrive {
                    rows[k].rest = arrive.minutes_until(new);
                }
            }

            // an empty departure is read back from the next arrival
            let anchor = old.or_else(|| {
                let next = rows.get(k + 1)?.arrive?;
                Some(next.shifted_back(rows[k].duration))
            });
            shift_after(&mut rows, k, shift_from(anchor, new), new);
        }
        // the first arrival starts no chain
        Edit::Arrive(new) if k == 0 => rows[0].arrive = Some(new),
        Edit::Arrive(new) => {
            let old = rows[k].arrive.replace(new);
            if let Some(depart) = rows[k - 1].depart {
                rows[k - 1].duration = depart.minutes_until(new);
            }

            // an empty arrival is read back from this waypoint's departure
            let anchor = old.or_else(|| {
                let depart = rows[k].depart.filter(|_| k < last)?;
                Some(depart.shifted_back(rows[k].rest))
            });
            let diff = shift_from(anchor, new);
            if k < last {
                shift_or_fill(&mut rows[k].depart, diff, new);
            }
            shift_after(&mut rows, k, diff, new);
        }
        Edit::Duration(minutes) => {
            rows[k].duration = minutes;
            ripple(&mut rows, k);
        }
        Edit::Rest(minutes) => {
            rows[k].rest = minutes;
            if 0 < k && k < last {
                if let Some(arrive) = rows[k].arrive {
                    rows[k].depart = Some(arrive.shifted(minutes));
                }
            }
            ripple(&mut rows, k);
        }
        Edit::Name(name) => rows[k].name = name,
        Edit::Note(note) => rows[k].note = note,
        Edit::CompareNote(note) => rows[k].compare_note = note,
    }

    Ok(rows)
}

/// How far filled times move when an edited time goes from `anchor` to `new`. Without an
/// anchor nothing moves and only empty times are filled.
fn shift_from(anchor: Option<TimeOfDay>, new: TimeOfDay) -> Minutes {
    anchor.map_or(0, |anchor| anchor.minutes_until(new))
}

fn shift_or_fill(slot: &mut Option<TimeOfDay>, diff: Minutes, fill: TimeOfDay) {
    *slot = Some(match *slot {
        Some(time) => time.shifted(diff),
        None => fill,
    });
}

/// Moves every meaningful time after position `k` by `diff`; empty ones take `fill`.
fn shift_after(rows: &mut [Waypoint], k: usize, diff: Minutes, fill: TimeOfDay) {
    let last = rows.len() - 1;
    for i in k + 1..rows.len() {
        shift_or_fill(&mut rows[i].arrive, diff, fill);
        if i < last {
            shift_or_fill(&mut rows[i].depart, diff, fill);
        }
    }
}

/// Recomputes `arrive(i + 1)` and `depart(i + 1)` for each leg from `from` onward.
fn ripple(rows: &mut [Waypoint], from: usize) {
    let last = rows.len() - 1;
    for i in from..last {
        if let Some(depart) = rows[i].depart {
            rows[i + 1].arrive = Some(depart.shifted(rows[i].duration));
        }

        let next = i + 1;
        if next < last {
            if let Some(arrive) = rows[next].arrive {
                rows[next].depart = Some(arrive.shifted(rows[next].rest));
            }
        }
    }
}

const NOON: TimeOfDay = TimeOfDay::from_hm(12, 0);

/// Inserts a blank waypoint after position `after` (or at the end) and re-times everything
/// behind it. The new waypoint starts with zero rest and zero duration.
pub fn insert_after(day: &[Waypoint], after: Option<usize>) -> (Vec<Waypoint>, String) {
    let mut rows = day.to_vec();
    let mut fresh = Waypoint::blank();
    let id = fresh.id.clone();

    if rows.is_empty() {
        fresh.arrive = Some(NOON);
        fresh.depart = Some(NOON);
        rows.push(fresh);
        return (rows, id);
    }

    let j = after.unwrap_or(rows.len() - 1).min(rows.len() - 1);
    if j > 0 {
        if let Some(arrive) = rows[j].arrive {
            rows[j].depart = Some(arrive.shifted(rows[j].rest));
        }
    }

    fresh.arrive = rows[j].depart;
    fresh.depart = rows[j].depart;
    rows.insert(j + 1, fresh);
    ripple(&mut rows, j);

    (rows, id)
}

/// Removes waypoint `id` and closes the gap by re-timing from the waypoint before it.
pub fn remove(day: &[Waypoint], id: &str) -> Result<Vec<Waypoint>, EditError> {
    let j = day
        .iter()
        .position(|w| w.id == id)
        .ok_or_else(|| EditError::WaypointNotFound { id: id.to_string() })?;
    if day.len() == 1 {
        return Err(EditError::LastWaypoint);
    }

    let mut rows = day.to_vec();
    rows.remove(j);
    if j > 0 {
        ripple(&mut rows, j - 1);
    }

    Ok(rows)
}

/// A negative span left behind by propagation. These are kept, not corrected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    pub waypoint: String,
    pub field: Field,
    pub minutes: Minutes,
}

/// Negative rest/duration values in positions where they carry meaning.
pub fn anomalies(day: &[Waypoint]) -> SmallVec<[Anomaly; 2]> {
    let mut found = SmallVec::new();
    let Some(last) = day.len().checked_sub(1) else {
        return found;
    };

    for (i, waypoint) in day.iter().enumerate() {
        if 0 < i && i < last && waypoint.rest < 0 {
            found.push(Anomaly {
                waypoint: waypoint.id.clone(),
                field: Field::Rest,
                minutes: waypoint.rest,
            });
        }
        if i < last && waypoint.duration < 0 {
            found.push(Anomaly {
                waypoint: waypoint.id.clone(),
                field: Field::Duration,
                minutes: waypoint.duration,
            });
        }
    }

    found
}

/// A place where the chain equations do not hold between filled-in times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainBreak {
    /// `depart != arrive + rest` at this position.
    Dwell(usize),
    /// `arrive(i + 1) != depart(i) + duration(i)` for the leg leaving this position.
    Leg(usize),
}

/// Checks both chain equations wherever the fields involved are meaningful and filled.
pub fn breaks(day: &[Waypoint]) -> Vec<ChainBreak> {
    let mut found = Vec::new();
    let Some(last) = day.len().checked_sub(1) else {
        return found;
    };

    for i in 0..last {
        let here = &day[i];
        if i > 0 {
            if let (Some(arrive), Some(depart)) = (here.arrive, here.depart) {
                if arrive.shifted(here.rest) != depart {
                    found.push(ChainBreak::Dwell(i));
                }
            }
        }
        if let (Some(depart), Some(next)) = (here.depart, day[i + 1].arrive) {
            if depart.shifted(here.duration) != next {
                found.push(ChainBreak::Leg(i));
            }
        }
    }

    found
}
