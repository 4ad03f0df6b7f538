//! Input record shapes and the event normalizer.
//!
//! The surrounding application hands the engine two heterogeneous lists:
//! system appointment records (date + time-of-day + optional duration) and
//! ad-hoc calendar entries (ISO datetime strings). Normalization resolves
//! both into one uniform list of time-boxed, resource-tagged events, once,
//! at the boundary, so no shape ambiguity leaks into the detector.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{
    Event, EventKind, ScheduleError, TimeWindow, DEFAULT_DURATION_MINUTES, UNASSIGNED_RESOURCE,
};

/// A system appointment record as supplied by the appointment store.
///
/// `date` is `YYYY-MM-DD` and `time` is `HH:MM`; neither carries an offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    pub id: String,
    pub patient_id: String,
    #[serde(default)]
    pub doctor_id: Option<String>,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default, rename = "type")]
    pub appointment_type: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl AppointmentRecord {
    /// Create an appointment record with validation.
    pub fn new(
        id: impl Into<String>,
        patient_id: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
    ) -> Result<Self, ScheduleError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ScheduleError::EmptyId);
        }

        Ok(AppointmentRecord {
            id,
            patient_id: patient_id.into(),
            doctor_id: None,
            date: date.into(),
            time: time.into(),
            duration_minutes: None,
            department: None,
            appointment_type: None,
            reason: None,
        })
    }

    pub fn with_doctor(mut self, doctor_id: impl Into<String>) -> Self {
        self.doctor_id = Some(doctor_id.into());
        self
    }

    /// Set an explicit duration; must be positive.
    pub fn with_duration(mut self, minutes: i64) -> Result<Self, ScheduleError> {
        if minutes <= 0 {
            return Err(ScheduleError::InvalidDuration(minutes));
        }
        self.duration_minutes = Some(minutes);
        Ok(self)
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }
}

/// An ad-hoc calendar entry created directly on the calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomEventRecord {
    pub id: String,
    pub title: String,
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl CustomEventRecord {
    /// Create a custom entry with validation.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: impl Into<String>,
    ) -> Result<Self, ScheduleError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ScheduleError::EmptyId);
        }
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ScheduleError::EmptyTitle);
        }

        Ok(CustomEventRecord {
            id,
            title,
            start: start.into(),
            end: None,
            color: None,
        })
    }

    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }
}

/// Resolve both record lists into one uniform event list.
///
/// Ids are namespaced (`appointment-<id>` / `custom-<id>`) so the two
/// sources can never collide. Never fails: a record whose date or time
/// cannot be parsed becomes an event without a window and is excluded from
/// all overlap checks.
pub fn normalize_events(
    appointments: &[AppointmentRecord],
    custom_events: &[CustomEventRecord],
) -> Vec<Event> {
    let mut events = Vec::with_capacity(appointments.len() + custom_events.len());
    events.extend(appointments.iter().map(normalize_appointment));
    events.extend(custom_events.iter().map(normalize_custom));
    events
}

fn normalize_appointment(record: &AppointmentRecord) -> Event {
    let window = match parse_clinic_datetime(&record.date, &record.time) {
        Some(start) => {
            let minutes = record.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
            Some(TimeWindow::with_duration(start, minutes))
        }
        None => {
            warn!(
                id = %record.id,
                date = %record.date,
                time = %record.time,
                "appointment has an unparsable date/time; it will never be reported as conflicting"
            );
            None
        }
    };

    let title = match record.reason.as_deref() {
        Some(reason) if !reason.trim().is_empty() => reason.to_string(),
        _ => format!("Appointment for patient {}", record.patient_id),
    };

    let resource_id = match record.doctor_id.as_deref() {
        Some(doctor) if !doctor.trim().is_empty() => doctor.to_string(),
        _ => UNASSIGNED_RESOURCE.to_string(),
    };

    Event {
        id: format!("appointment-{}", record.id),
        title,
        window,
        resource_id,
        kind: EventKind::Appointment,
    }
}

fn normalize_custom(record: &CustomEventRecord) -> Event {
    let window = match parse_iso_datetime(&record.start) {
        Some(start) => {
            let end = record.end.as_deref().and_then(parse_iso_datetime);
            Some(TimeWindow::new(start, end))
        }
        None => {
            warn!(id = %record.id, start = %record.start, "custom entry has an unparsable start");
            None
        }
    };

    Event {
        id: format!("custom-{}", record.id),
        title: record.title.clone(),
        window,
        resource_id: UNASSIGNED_RESOURCE.to_string(),
        kind: EventKind::Custom,
    }
}

/// Combine a `YYYY-MM-DD` date and a `HH:MM` time-of-day.
fn parse_clinic_datetime(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
    let time = time.trim();
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .ok()?;
    Some(date.and_time(time))
}

/// Parse an ISO datetime string to a wall-clock instant.
///
/// Accepts RFC 3339 (the offset is dropped, keeping the written wall-clock
/// time) and the bare `YYYY-MM-DDTHH:MM[:SS]` shape that `datetime-local`
/// form inputs produce.
fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.naive_local());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .ok()
}
