// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure vehicle matching against a completed query.

use farebot_core::time::parse_clock;
use farebot_core::{Query, ServiceDirection, Vehicle};

/// How far (in minutes, inclusive, either direction) a scheduled departure
/// may be from the requested time and still match.
pub const TIME_TOLERANCE_MINUTES: u16 = 30;

/// Filter a roster snapshot down to the vehicles eligible for `query`,
/// preserving roster order. Pure: the roster is never mutated and identical
/// inputs always yield identical results.
///
/// A vehicle matches when all of the following hold:
/// - it has at least `query.pax` seats left;
/// - if the query needs both directions, its service is `both` (a `both`
///   vehicle also satisfies one-directional requests);
/// - both stop names occur in its route (case-insensitive, first occurrence
///   wins for duplicated names);
/// - the start stop precedes the end stop in route order (no wraparound or
///   reverse traversal);
/// - at least one scheduled departure is within the tolerance window of the
///   requested time. Unparseable schedule entries are skipped.
pub fn find_vehicles(query: &Query, roster: &[Vehicle]) -> Vec<Vehicle> {
    let Some(requested) = parse_clock(&query.time) else {
        return Vec::new();
    };

    roster
        .iter()
        .filter(|vehicle| {
            vehicle.capacity >= query.pax
                && (!query.need_both || vehicle.service == ServiceDirection::Both)
                && direction_matches(vehicle, &query.start, &query.end)
                && departs_near(vehicle, requested)
        })
        .cloned()
        .collect()
}

fn direction_matches(vehicle: &Vehicle, start: &str, end: &str) -> bool {
    let position = |stop: &str| {
        vehicle
            .route
            .iter()
            .position(|r| r.eq_ignore_ascii_case(stop))
    };
    match (position(start), position(end)) {
        (Some(idx_start), Some(idx_end)) => idx_start < idx_end,
        _ => false,
    }
}

fn departs_near(vehicle: &Vehicle, requested: u16) -> bool {
    vehicle
        .times
        .iter()
        .filter_map(|t| parse_clock(t))
        .any(|scheduled| scheduled.abs_diff(requested) <= TIME_TOLERANCE_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use farebot_core::Driver;

    fn vehicle(id: &str, route: &[&str], times: &[&str], capacity: u32) -> Vehicle {
        Vehicle {
            id: id.into(),
            name: format!("Bus {id}"),
            route: route.iter().map(|s| s.to_string()).collect(),
            times: times.iter().map(|s| s.to_string()).collect(),
            capacity,
            service: ServiceDirection::Both,
            driver: Driver {
                name: "Dana".into(),
                phone: "555-0100".into(),
            },
        }
    }

    fn query(start: &str, end: &str, time: &str, pax: u32, need_both: bool) -> Query {
        Query {
            start: start.into(),
            end: end.into(),
            time: time.into(),
            pax,
            need_both,
        }
    }

    #[test]
    fn matches_basic_request() {
        let roster = vec![vehicle("1", &["A", "B", "C"], &["07:45"], 5)];
        let found = find_vehicles(&query("A", "C", "07:30", 3, false), &roster);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "1");
    }

    #[test]
    fn direction_must_follow_route_order() {
        let roster = vec![vehicle("1", &["A", "B", "C"], &["07:30"], 5)];
        assert_eq!(find_vehicles(&query("A", "C", "07:30", 1, false), &roster).len(), 1);
        assert!(find_vehicles(&query("C", "A", "07:30", 1, false), &roster).is_empty());
    }

    #[test]
    fn stop_names_match_case_insensitively() {
        let roster = vec![vehicle("1", &["Station A", "Station B"], &["07:30"], 5)];
        let found = find_vehicles(&query("station a", "STATION B", "07:30", 1, false), &roster);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn time_tolerance_is_inclusive_at_30_minutes() {
        let roster = vec![vehicle("1", &["A", "B"], &["08:00"], 5)];
        // 30 minutes away, both directions: matches.
        assert_eq!(find_vehicles(&query("A", "B", "07:30", 1, false), &roster).len(), 1);
        assert_eq!(find_vehicles(&query("A", "B", "08:30", 1, false), &roster).len(), 1);
        // 31 minutes away: does not.
        assert!(find_vehicles(&query("A", "B", "07:29", 1, false), &roster).is_empty());
        assert!(find_vehicles(&query("A", "B", "08:31", 1, false), &roster).is_empty());
    }

    #[test]
    fn capacity_boundary_is_inclusive() {
        let roster = vec![vehicle("1", &["A", "B"], &["07:30"], 3)];
        assert_eq!(find_vehicles(&query("A", "B", "07:30", 3, false), &roster).len(), 1);
        assert!(find_vehicles(&query("A", "B", "07:30", 4, false), &roster).is_empty());
    }

    #[test]
    fn zero_capacity_never_matches() {
        let roster = vec![vehicle("1", &["A", "B"], &["07:30"], 0)];
        assert!(find_vehicles(&query("A", "B", "07:30", 1, false), &roster).is_empty());
    }

    #[test]
    fn need_both_requires_both_service() {
        let mut up_only = vehicle("1", &["A", "B"], &["07:30"], 5);
        up_only.service = ServiceDirection::Up;
        let both = vehicle("2", &["A", "B"], &["07:30"], 5);
        let roster = vec![up_only, both];

        let found = find_vehicles(&query("A", "B", "07:30", 1, true), &roster);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "2");

        // A one-directional request is satisfied by any service value.
        let found = find_vehicles(&query("A", "B", "07:30", 1, false), &roster);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn duplicate_stop_resolves_to_first_occurrence() {
        // Route A -> B -> A: "A" resolves to index 0, so A -> B matches but
        // B -> A does not (first occurrence of A precedes B).
        let roster = vec![vehicle("1", &["A", "B", "A"], &["07:30"], 5)];
        assert_eq!(find_vehicles(&query("A", "B", "07:30", 1, false), &roster).len(), 1);
        assert!(find_vehicles(&query("B", "A", "07:30", 1, false), &roster).is_empty());
    }

    #[test]
    fn preserves_roster_order_and_is_pure() {
        let roster = vec![
            vehicle("z", &["A", "B"], &["07:30"], 5),
            vehicle("a", &["A", "B"], &["07:40"], 5),
        ];
        let q = query("A", "B", "07:30", 1, false);
        let first = find_vehicles(&q, &roster);
        let second = find_vehicles(&q, &roster);
        assert_eq!(first, second);
        let ids: Vec<&str> = first.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["z", "a"]);
    }

    #[test]
    fn unparseable_schedule_entries_are_skipped() {
        let roster = vec![vehicle("1", &["A", "B"], &["garbage", "07:45"], 5)];
        assert_eq!(find_vehicles(&query("A", "B", "07:30", 1, false), &roster).len(), 1);
    }

    #[test]
    fn no_matches_is_empty_not_error() {
        let roster = vec![vehicle("1", &["A", "B"], &["12:00"], 5)];
        assert!(find_vehicles(&query("X", "Y", "07:30", 1, false), &roster).is_empty());
    }
}
