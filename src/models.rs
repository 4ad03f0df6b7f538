//! Core data types for the conflict detection engine.
//!
//! This module defines the types shared across the engine:
//! - TimeWindow: a half-open `[start, end)` slice of the calendar
//! - Event: the normalized, time-boxed unit of scheduling
//! - ConflictGroup: a cluster of mutually conflicting events
//! - Severity: how bad a conflict cluster is
//! - ScheduleError: the crate error type

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel resource id for an appointment with no doctor bound yet.
///
/// An unassigned event is treated as capable of colliding with any other
/// event it overlaps in time, whatever that event's resource is.
pub const UNASSIGNED_RESOURCE: &str = "unassigned";

/// Minimum appointment granularity in minutes.
///
/// Used as the fallback duration whenever an end instant is missing or not
/// after the start.
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

/// Errors produced by record validation and event lookup.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("record id cannot be empty")]
    EmptyId,
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("duration must be positive, got {0} minutes")]
    InvalidDuration(i64),
    #[error("no event with id '{0}'")]
    EventNotFound(String),
    #[error("event '{0}' has no usable start time")]
    MissingStart(String),
}

/// Distinguishes system-booked appointments from ad-hoc calendar entries.
///
/// Only appointment-kind events participate in conflict detection; custom
/// entries are informational markers on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Appointment,
    Custom,
}

/// Severity tier of a conflict cluster.
///
/// Higher tiers order after lower ones. `Low` is a reserved tier: the
/// detector only ever reports `Medium` (two members) or `High` (three or
/// more), since a cluster needs at least two members to be reported at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Severity tier for a cluster of the given size.
    pub fn for_cluster(size: usize) -> Self {
        match size {
            0 | 1 => Severity::Low,
            2 => Severity::Medium,
            _ => Severity::High,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }
}

/// A half-open `[start, end)` time window on the clinic calendar.
///
/// Instants are wall-clock `NaiveDateTime`s: appointment records carry a
/// clinic-local date and time-of-day with no offset attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Build a window from a start and an optional end.
    ///
    /// A missing end, or an end at or before the start, falls back to
    /// `start + DEFAULT_DURATION_MINUTES`.
    pub fn new(start: NaiveDateTime, end: Option<NaiveDateTime>) -> Self {
        let end = match end {
            Some(end) if end > start => end,
            _ => start + Duration::minutes(DEFAULT_DURATION_MINUTES),
        };
        TimeWindow { start, end }
    }

    /// Build a window from a start and a duration in minutes.
    ///
    /// Non-positive durations fall back to the default granularity.
    pub fn with_duration(start: NaiveDateTime, minutes: i64) -> Self {
        if minutes > 0 {
            TimeWindow {
                start,
                end: start + Duration::minutes(minutes),
            }
        } else {
            TimeWindow::new(start, None)
        }
    }

    /// Symmetric strict-overlap test.
    ///
    /// Windows that merely touch (`self.end == other.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Human-readable label, e.g. `2025-08-15 09:00 - 09:30`.
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// A normalized, time-boxed event: the unit of scheduling.
///
/// `window` is `None` when the source record's date or time failed to parse.
/// Such an event stays listable and selectable but never overlaps anything,
/// so one bad record cannot corrupt a detection pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub window: Option<TimeWindow>,
    pub resource_id: String,
    pub kind: EventKind,
}

impl Event {
    /// Whether this event is bound to no doctor yet.
    pub fn is_unassigned(&self) -> bool {
        self.resource_id == UNASSIGNED_RESOURCE
    }
}

/// A cluster of two or more mutually conflicting events.
///
/// Groups are derived, read-only records recomputed on every detection pass;
/// they are never stored or incrementally updated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictGroup {
    /// Formatted window of the anchor event, for display.
    pub time_slot: String,
    /// Members in scan order; always at least two.
    pub conflicting_events: Vec<Event>,
    pub severity: Severity,
}

impl ConflictGroup {
    pub fn size(&self) -> usize {
        self.conflicting_events.len()
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.conflicting_events.iter().any(|e| e.id == event_id)
    }

    /// Earliest member start, used for presentation ordering.
    pub fn earliest_start(&self) -> Option<NaiveDateTime> {
        self.conflicting_events
            .iter()
            .filter_map(|e| e.window.map(|w| w.start))
            .min()
    }
}
