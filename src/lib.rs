//! Double-booking conflict detection for clinic appointment calendars.
//!
//! The engine is an in-process pipeline with one-way data flow: raw
//! appointment records and ad-hoc calendar entries are normalized into
//! uniform time-boxed events, a pairwise scan clusters overlapping
//! same-doctor (or still-unassigned) appointments into conflict groups, and
//! a panel exposes the groups for rendering plus jump-to-event navigation.
//!
//! Detection is a stateless pure function over the caller's event snapshot,
//! recomputed on every change; groups are derived state and are never
//! persisted.

pub mod detector;
pub mod events;
pub mod models;
pub mod panel;

pub use detector::detect_conflicts;
pub use events::{normalize_events, AppointmentRecord, CustomEventRecord};
pub use models::{
    ConflictGroup, Event, EventKind, ScheduleError, Severity, TimeWindow,
    DEFAULT_DURATION_MINUTES, UNASSIGNED_RESOURCE,
};
pub use panel::{CalendarNavigator, ConflictPanel};
