//! Pairwise conflict scan over normalized events.
//!
//! Given the normalized event list, find every group of two-or-more
//! appointment-kind events whose time windows intersect and which are bound
//! to the same doctor, or where at least one side is still unassigned (an
//! unassigned appointment needs a doctor and may end up anywhere, so it is
//! treated as colliding with everything it overlaps).
//!
//! The scan is a plain O(n^2) pass with first-match clustering: each event
//! in input order anchors a candidate cluster of the later events that
//! overlap it. A cluster touching any already-reported event is dropped
//! whole, so an event belongs to at most one group per pass. Event sets here
//! are dozens to low hundreds, small enough for the quadratic pass;
//! bucketing by doctor and sorting by start would take it to O(n log n) if
//! that ever changes.

use tracing::{debug, info};

use crate::models::{ConflictGroup, Event, EventKind, Severity, UNASSIGNED_RESOURCE};

/// Run one detection pass and return the conflict groups in scan order.
///
/// Never fails: events without a parsed window match nothing, and empty or
/// single-event input yields an empty list. Source events are never
/// mutated; groups carry their own copies.
pub fn detect_conflicts(events: &[Event]) -> Vec<ConflictGroup> {
    let appointments: Vec<&Event> = events
        .iter()
        .filter(|e| e.kind == EventKind::Appointment)
        .collect();

    let mut groups: Vec<ConflictGroup> = Vec::new();

    for i in 0..appointments.len() {
        let anchor = appointments[i];
        let anchor_window = match anchor.window {
            Some(window) => window,
            None => continue,
        };

        let mut cluster: Vec<&Event> = vec![anchor];
        for j in (i + 1)..appointments.len() {
            let other = appointments[j];
            let other_window = match other.window {
                Some(window) => window,
                None => continue,
            };

            if anchor_window.overlaps(&other_window) && resources_collide(anchor, other) {
                cluster.push(other);
            }
        }

        if cluster.len() < 2 {
            continue;
        }

        // An event may be reported once per pass; a cluster that reaches
        // into an earlier group is a re-statement of that conflict from a
        // different anchor.
        if cluster.iter().any(|e| already_reported(&groups, &e.id)) {
            debug!(anchor = %anchor.id, "cluster repeats an already reported conflict; skipped");
            continue;
        }

        let severity = Severity::for_cluster(cluster.len());
        debug!(
            anchor = %anchor.id,
            members = cluster.len(),
            severity = severity.name(),
            "conflict cluster found"
        );

        groups.push(ConflictGroup {
            time_slot: anchor_window.label(),
            conflicting_events: cluster.into_iter().cloned().collect(),
            severity,
        });
    }

    if !groups.is_empty() {
        info!(groups = groups.len(), "detection pass reported conflicts");
    }
    groups
}

/// Same named doctor, or either side still unassigned.
fn resources_collide(a: &Event, b: &Event) -> bool {
    a.resource_id == b.resource_id
        || a.resource_id == UNASSIGNED_RESOURCE
        || b.resource_id == UNASSIGNED_RESOURCE
}

fn already_reported(groups: &[ConflictGroup], event_id: &str) -> bool {
    groups.iter().any(|g| g.contains(event_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeWindow;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn appointment(id: &str, doctor: &str, start: (u32, u32), end: (u32, u32)) -> Event {
        Event {
            id: id.to_string(),
            title: format!("visit {id}"),
            window: Some(TimeWindow::new(at(start.0, start.1), Some(at(end.0, end.1)))),
            resource_id: doctor.to_string(),
            kind: EventKind::Appointment,
        }
    }

    fn custom(id: &str, start: (u32, u32), end: (u32, u32)) -> Event {
        Event {
            id: id.to_string(),
            title: format!("marker {id}"),
            window: Some(TimeWindow::new(at(start.0, start.1), Some(at(end.0, end.1)))),
            resource_id: UNASSIGNED_RESOURCE.to_string(),
            kind: EventKind::Custom,
        }
    }

    fn group_ids(group: &ConflictGroup) -> Vec<&str> {
        group.conflicting_events.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(detect_conflicts(&[]).is_empty());
    }

    #[test]
    fn single_event_yields_no_groups() {
        let events = vec![appointment("a", "d1", (9, 0), (9, 30))];
        assert!(detect_conflicts(&events).is_empty());
    }

    #[test]
    fn disjoint_windows_never_conflict() {
        let events = vec![
            appointment("a", "d1", (9, 0), (9, 30)),
            appointment("b", "d1", (10, 0), (10, 30)),
        ];
        assert!(detect_conflicts(&events).is_empty());
    }

    #[test]
    fn overlapping_same_doctor_is_medium() {
        // A 09:00-09:30 and B 09:15-09:45, both with doctor d1.
        let events = vec![
            appointment("a", "d1", (9, 0), (9, 30)),
            appointment("b", "d1", (9, 15), (9, 45)),
        ];
        let groups = detect_conflicts(&events);

        assert_eq!(groups.len(), 1);
        assert_eq!(group_ids(&groups[0]), vec!["a", "b"]);
        assert_eq!(groups[0].severity, Severity::Medium);
        assert_eq!(groups[0].time_slot, "2025-08-15 09:00 - 09:30");
    }

    #[test]
    fn overlapping_different_doctors_do_not_conflict() {
        let events = vec![
            appointment("a", "d1", (9, 0), (9, 30)),
            appointment("c", "d2", (9, 0), (9, 30)),
        ];
        assert!(detect_conflicts(&events).is_empty());
    }

    #[test]
    fn touching_windows_do_not_conflict() {
        let events = vec![
            appointment("a", "d1", (9, 0), (9, 30)),
            appointment("d", "d1", (9, 30), (10, 0)),
        ];
        assert!(detect_conflicts(&events).is_empty());
    }

    #[test]
    fn unassigned_collides_with_any_doctor() {
        let events = vec![
            appointment("a", "d1", (9, 0), (9, 30)),
            appointment("u", UNASSIGNED_RESOURCE, (9, 15), (9, 45)),
        ];
        let groups = detect_conflicts(&events);
        assert_eq!(groups.len(), 1);
        assert_eq!(group_ids(&groups[0]), vec!["a", "u"]);
    }

    #[test]
    fn three_way_cluster_is_high() {
        let events = vec![
            appointment("a", "d1", (9, 0), (9, 45)),
            appointment("b", "d1", (9, 15), (9, 45)),
            appointment("e", "d1", (9, 30), (9, 45)),
        ];
        let groups = detect_conflicts(&events);

        assert_eq!(groups.len(), 1);
        assert_eq!(group_ids(&groups[0]), vec!["a", "b", "e"]);
        assert_eq!(groups[0].severity, Severity::High);
    }

    #[test]
    fn membership_survives_input_reordering() {
        let forward = vec![
            appointment("a", "d1", (9, 0), (9, 30)),
            appointment("b", "d1", (9, 15), (9, 45)),
        ];
        let reversed: Vec<Event> = forward.iter().rev().cloned().collect();

        let forward_groups = detect_conflicts(&forward);
        let reversed_groups = detect_conflicts(&reversed);

        assert_eq!(forward_groups.len(), 1);
        assert_eq!(reversed_groups.len(), 1);
        let mut forward_ids = group_ids(&forward_groups[0]);
        let mut reversed_ids = group_ids(&reversed_groups[0]);
        forward_ids.sort_unstable();
        reversed_ids.sort_unstable();
        assert_eq!(forward_ids, reversed_ids);
        assert_eq!(forward_groups[0].severity, reversed_groups[0].severity);
    }

    #[test]
    fn no_event_appears_in_two_groups() {
        // b overlaps both a and c; c does not overlap a. The cluster
        // anchored at b re-states b's conflict and is dropped whole.
        let events = vec![
            appointment("a", "d1", (9, 0), (9, 30)),
            appointment("b", "d1", (9, 15), (9, 45)),
            appointment("c", "d1", (9, 40), (10, 10)),
        ];
        let groups = detect_conflicts(&events);

        let mut seen: Vec<&str> = Vec::new();
        for group in &groups {
            for id in group_ids(group) {
                assert!(!seen.contains(&id), "event {id} reported twice");
                seen.push(id);
            }
        }
    }

    #[test]
    fn detection_is_idempotent() {
        let events = vec![
            appointment("a", "d1", (9, 0), (9, 45)),
            appointment("b", "d1", (9, 15), (9, 45)),
            appointment("x", "d2", (11, 0), (11, 30)),
            appointment("y", "d2", (11, 15), (11, 45)),
        ];
        let first = detect_conflicts(&events);
        let second = detect_conflicts(&events);
        assert_eq!(first, second);
    }

    #[test]
    fn independent_clusters_get_separate_groups() {
        let events = vec![
            appointment("a", "d1", (9, 0), (9, 30)),
            appointment("b", "d1", (9, 15), (9, 45)),
            appointment("x", "d2", (11, 0), (11, 30)),
            appointment("y", "d2", (11, 15), (11, 45)),
        ];
        let groups = detect_conflicts(&events);

        assert_eq!(groups.len(), 2);
        assert_eq!(group_ids(&groups[0]), vec!["a", "b"]);
        assert_eq!(group_ids(&groups[1]), vec!["x", "y"]);
    }

    #[test]
    fn custom_entries_never_enter_groups() {
        let events = vec![
            appointment("a", "d1", (9, 0), (9, 30)),
            custom("m", (9, 0), (9, 30)),
            custom("n", (9, 0), (9, 30)),
        ];
        assert!(detect_conflicts(&events).is_empty());
    }

    #[test]
    fn windowless_events_match_nothing() {
        let broken = Event {
            id: "broken".to_string(),
            title: "bad record".to_string(),
            window: None,
            resource_id: "d1".to_string(),
            kind: EventKind::Appointment,
        };
        let events = vec![
            broken,
            appointment("a", "d1", (9, 0), (9, 30)),
            appointment("b", "d1", (9, 15), (9, 45)),
        ];
        let groups = detect_conflicts(&events);

        // The bad record neither anchors nor joins; the well-formed pair is
        // still reported.
        assert_eq!(groups.len(), 1);
        assert_eq!(group_ids(&groups[0]), vec!["a", "b"]);
    }

    #[test]
    fn source_events_are_not_mutated() {
        let events = vec![
            appointment("a", "d1", (9, 0), (9, 30)),
            appointment("b", "d1", (9, 15), (9, 45)),
        ];
        let snapshot = events.clone();
        let _ = detect_conflicts(&events);
        assert_eq!(events, snapshot);
    }
}
