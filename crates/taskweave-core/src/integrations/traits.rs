//! Seam traits for the external calendar collaborator.
//!
//! The scheduling core only ever sees these two operations; everything else
//! about the calendar service (auth, transport, pagination) stays behind
//! them. Both may fail softly -- callers degrade instead of aborting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::RawEvent;

/// Read side: list raw event records in a time range.
pub trait CalendarSource: Send + Sync {
    fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<RawEvent>, Box<dyn std::error::Error>>;
}

/// Write side: insert one event.
pub trait CalendarWriter: Send + Sync {
    fn insert_event(
        &self,
        calendar_id: &str,
        draft: &EventDraft,
    ) -> Result<CreatedEvent, Box<dyn std::error::Error>>;
}

/// Payload for an event insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDraft {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// IANA timezone name for the event's display times.
    pub time_zone: String,
}

/// Confirmation returned by a successful insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
    pub html_link: Option<String>,
}
