// Core data structures for the sodagrid pipeline

use serde::{Deserialize, Serialize};

/// A program table entry admitted by the talk-session filter
///
/// Constructed by the table scanner; `start_time` is always present for an
/// admitted session, `end_time` only when the time cell carried a full range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Slot start, e.g. "9:00 AM"
    pub start_time: String,

    /// Slot end, e.g. "10:30 AM"; absent when the time cell held a bare time
    pub end_time: Option<String>,

    /// Session title with any leading contest-code token stripped
    pub title: String,

    /// Detail page link, absolute, or the sentinel "#"
    pub link: String,

    /// Room / venue text
    pub location: String,
}

/// A talk listed on a session detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talk {
    pub title: String,
    pub link: String,
}

/// A session enriched with its fetched talk list (possibly empty)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWithTalks {
    pub title: String,
    pub link: String,
    pub talks: Vec<Talk>,
}

impl SessionWithTalks {
    /// Attach a talk list to a scanned session
    pub fn from_session(session: &Session, talks: Vec<Talk>) -> Self {
        Self {
            title: session.title.clone(),
            link: session.link.clone(),
            talks,
        }
    }
}

/// Sessions sharing one start time within a day, in encounter order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGroup {
    pub start_time: String,
    pub sessions: Vec<Session>,
}

/// One day of the parsed program outline
///
/// Days, slots and sessions all keep the order they were encountered in;
/// the renderer imposes the final calendar/clock ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOutline {
    /// Day label as printed in the table, e.g. "Monday, January 20"
    pub day: String,
    pub slots: Vec<SlotGroup>,
}

impl DayOutline {
    /// Total sessions across all slots of this day
    pub fn session_count(&self) -> usize {
        self.slots.iter().map(|s| s.sessions.len()).sum()
    }
}

/// Sessions sharing one display time range, in task completion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    /// Display label, "9:00 AM - 10:30 AM" or a bare start time
    pub time_range: String,
    pub sessions: Vec<SessionWithTalks>,
}

/// One day of the merged schedule, ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: String,
    pub slots: Vec<ScheduleSlot>,
}

impl DaySchedule {
    /// Total sessions across all slots of this day
    pub fn session_count(&self) -> usize {
        self.slots.iter().map(|s| s.sessions.len()).sum()
    }
}
