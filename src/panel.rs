//! Conflict panel: presentation and navigation over a detection pass.
//!
//! The panel owns one snapshot of the normalized event list plus the groups
//! derived from it. The host calendar re-feeds the snapshot whenever the
//! underlying data changes and reads groups, counts, and severity badges
//! back for rendering. Selection resolves an event id to its start instant
//! and notifies the host through the `CalendarNavigator` seam; the actual
//! view move belongs to the host.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::detector::detect_conflicts;
use crate::models::{ConflictGroup, Event, ScheduleError, Severity};

/// Host-side navigation seam.
///
/// Implemented by the calendar view (or a test double); `show_date` is
/// invoked with the start instant of the selected event.
pub trait CalendarNavigator {
    fn show_date(&mut self, target: NaiveDateTime);
}

/// Presentation state for one detection pass.
pub struct ConflictPanel {
    events: Vec<Event>,
    groups: Vec<ConflictGroup>,
}

impl ConflictPanel {
    /// Run a detection pass over the given snapshot.
    pub fn new(events: Vec<Event>) -> Self {
        let groups = detect_conflicts(&events);
        ConflictPanel { events, groups }
    }

    /// Replace the snapshot and recompute.
    ///
    /// Groups are derived state only; nothing survives from the previous
    /// pass.
    pub fn refresh(&mut self, events: Vec<Event>) {
        self.groups = detect_conflicts(&events);
        self.events = events;
    }

    /// All events of the current snapshot, conflicting or not.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Conflict groups in detection scan order.
    pub fn groups(&self) -> &[ConflictGroup] {
        &self.groups
    }

    /// Conflict groups ordered for display: severity descending, then
    /// earliest start ascending.
    pub fn groups_by_severity(&self) -> Vec<&ConflictGroup> {
        let mut ordered: Vec<&ConflictGroup> = self.groups.iter().collect();
        ordered.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.earliest_start().cmp(&b.earliest_start()))
        });
        ordered
    }

    pub fn has_conflicts(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Badge count for one severity tier.
    pub fn count_with_severity(&self, severity: Severity) -> usize {
        self.groups.iter().filter(|g| g.severity == severity).count()
    }

    /// Total number of events involved in any conflict.
    pub fn conflicting_event_count(&self) -> usize {
        self.groups.iter().map(ConflictGroup::size).sum()
    }

    /// Resolve an event id and steer the host calendar to its date.
    ///
    /// Looks the id up among all known events, not only conflicting ones.
    /// No internal state changes; the only effect is the navigator call.
    pub fn select_event(
        &self,
        event_id: &str,
        navigator: &mut dyn CalendarNavigator,
    ) -> Result<(), ScheduleError> {
        let event = self
            .events
            .iter()
            .find(|e| e.id == event_id)
            .ok_or_else(|| ScheduleError::EventNotFound(event_id.to_string()))?;

        match event.window {
            Some(window) => {
                debug!(id = %event.id, target = %window.start, "navigating to event");
                navigator.show_date(window.start);
                Ok(())
            }
            None => Err(ScheduleError::MissingStart(event.id.clone())),
        }
    }
}
