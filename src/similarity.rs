//! Fuzzy waypoint-name matching, used to propose friends before the user maps anything.

use std::collections::HashMap;

use crate::mapping::Friend;
use crate::route::Route;
use crate::waypoint::Waypoint;

/// Strips whitespace, parentheses (ASCII and full-width), hyphens and digits, then lowercases.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && !c.is_numeric())
        .filter(|c| !matches!(c, '(' | ')' | '（' | '）' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Sørensen–Dice coefficient over character bigrams, ignoring whitespace.
pub fn dice_coefficient(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().filter(|c| !c.is_whitespace()).collect();
    let b: Vec<char> = b.chars().filter(|c| !c.is_whitespace()).collect();

    if a == b {
        return 1.0;
    }
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }

    let mut bigrams: HashMap<(char, char), usize> = HashMap::new();
    for pair in a.windows(2) {
        *bigrams.entry((pair[0], pair[1])).or_default() += 1;
    }

    let mut shared = 0;
    for pair in b.windows(2) {
        if let Some(count) = bigrams.get_mut(&(pair[0], pair[1])) {
            if *count > 0 {
                *count -= 1;
                shared += 1;
            }
        }
    }

    (2 * shared) as f64 / (a.len() + b.len() - 2) as f64
}

/// A proposed pairing of a primary waypoint with a reference waypoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub main_id: String,
    pub friend: Friend,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameMatcher {
    /// Minimum Dice score between normalized names.
    pub threshold: f64,
    /// How many reference waypoints past the last match are scanned before giving up.
    pub window: usize,
}

impl NameMatcher {
    pub fn is_same_point(&self, a: &str, b: &str) -> bool {
        dice_coefficient(&normalize_name(a), &normalize_name(b)) >= self.threshold
    }

    /// Walks both routes in order, matching each primary waypoint against the next few
    /// reference waypoints. Matches never go backwards past the previous one, except that
    /// the previous match may be reused for a repeated name.
    pub fn align(&self, primary: &Route, reference: &Route) -> Vec<Suggestion> {
        let candidates: Vec<(&str, &Waypoint)> = reference.flattened().collect();
        let mut cursor = 0;
        let mut resume = 0;
        let mut suggestions = Vec::new();

        for (_, target) in primary.flattened() {
            let mut found = None;
            while cursor < candidates.len() && cursor - resume < self.window {
                let (_, candidate) = candidates[cursor];
                cursor += 1;
                if self.is_same_point(&candidate.name, &target.name) {
                    resume = cursor;
                    found = Some(candidates[cursor - 1]);
                    break;
                }
            }

            if found.is_none() {
                cursor = resume;
                found = resume
                    .checked_sub(1)
                    .map(|prev| candidates[prev])
                    .filter(|(_, candidate)| self.is_same_point(&candidate.name, &target.name));
            }

            if let Some((date, waypoint)) = found {
                suggestions.push(Suggestion {
                    main_id: target.id.clone(),
                    friend: Friend::new(waypoint.clone(), date),
                });
            }
        }

        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_drops_decorations() {
        assert_eq!(normalize_name("Lake Camp (2)"), "lakecamp");
        assert_eq!(normalize_name("北峰-三角點（1號）"), "北峰三角點號");
        assert_eq!(normalize_name("  East  Ridge 3 "), "eastridge");
    }

    #[test]
    fn dice_matches_reference_values() {
        assert_eq!(dice_coefficient("night", "night"), 1.0);
        assert_eq!(dice_coefficient("a", "b"), 0.0);
        // ni ig gh ht vs na ac ch ht: one shared bigram out of eight
        assert!((dice_coefficient("night", "nacht") - 0.25).abs() < 1e-9);
        assert!((dice_coefficient("france", "french") - 0.4).abs() < 1e-9);
    }

    fn route(id: &str, names: &[&str]) -> Route {
        let mut route = Route::new(id);
        let points = names
            .iter()
            .enumerate()
            .map(|(i, name)| Waypoint::new(format!("{id}{i}"), *name))
            .collect();
        route.days.insert("d1".into(), points);
        route
    }

    fn matcher() -> NameMatcher {
        NameMatcher {
            threshold: 0.9,
            window: 3,
        }
    }

    #[test]
    fn aligns_in_order_with_lookahead() {
        let primary = route("m", &["Trailhead", "Lake Camp", "Summit", "Lake Camp 2"]);
        let reference = route("r", &["trailhead", "junction", "Lake Camp (1)", "Summit"]);

        let pairs: Vec<_> = matcher()
            .align(&primary, &reference)
            .into_iter()
            .map(|s| (s.main_id, s.friend.waypoint.id))
            .collect();

        assert_eq!(
            pairs,
            [
                ("m0".to_string(), "r0".to_string()),
                ("m1".to_string(), "r2".to_string()),
                ("m2".to_string(), "r3".to_string()),
            ]
        );
    }

    #[test]
    fn matches_beyond_the_window_are_missed() {
        let primary = route("m", &["Start", "Far Hut"]);
        let reference = route("r", &["Start", "aaaa", "bbbb", "cccc", "Far Hut"]);

        let suggestions = matcher().align(&primary, &reference);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].main_id, "m0");
    }

    #[test]
    fn repeated_names_reuse_the_previous_match() {
        let primary = route("m", &["Hut", "Hut"]);
        let reference = route("r", &["Hut", "Road"]);

        let suggestions = matcher().align(&primary, &reference);
        let friends: Vec<_> = suggestions.iter().map(|s| s.friend.waypoint.id.as_str()).collect();
        assert_eq!(friends, ["r0", "r0"]);
    }
}
