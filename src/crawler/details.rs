//! Session detail fetching and merge
//!
//! Fans out one fetch task per session over a bounded stream and merges
//! completions into the day -> time-range -> session structure. The
//! accumulator is only ever touched by the drain loop, so completions need
//! no locking; within a slot, sessions land in completion order and the
//! renderer imposes the final ordering.

use chrono::NaiveTime;
use futures::stream::{self, StreamExt};
use url::Url;

use crate::crawler::ProgramFetcher;
use crate::models::{DayOutline, DaySchedule, ScheduleSlot, Session, SessionWithTalks, SlotGroup, Talk};
use crate::parser::session::parse_talks;
use crate::parser::time::{format_clock, parse_clock};

/// Only links under this prefix are real session detail pages
pub const SESSION_URL_PREFIX: &str = "https://meetings.siam.org/sess";

/// Detail fetches in flight at once
const MAX_CONCURRENT_FETCHES: usize = 10;

/// Fetches every session's talk list and merges the results
pub struct DetailFetcher<'a> {
    fetcher: &'a ProgramFetcher,
    session_prefix: String,
    concurrency: usize,
}

impl<'a> DetailFetcher<'a> {
    #[must_use]
    pub fn new(fetcher: &'a ProgramFetcher) -> Self {
        Self {
            fetcher,
            session_prefix: SESSION_URL_PREFIX.to_string(),
            concurrency: MAX_CONCURRENT_FETCHES,
        }
    }

    /// Override the session link prefix, for tests against a mock server
    #[must_use]
    pub fn with_session_prefix(mut self, prefix: &str) -> Self {
        self.session_prefix = prefix.to_string();
        self
    }

    /// Override the number of fetches in flight
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fetch talk lists for every session and merge them per time range.
    ///
    /// One independent task is dispatched per session; tasks complete in
    /// arbitrary order and each result is applied to the accumulator by this
    /// loop alone. A failed fetch yields an empty talk list and never aborts
    /// its siblings or the stage.
    pub async fn fetch_all(&self, outline: &[DayOutline]) -> Vec<DaySchedule> {
        // Lay out the work list up front; the display time range is a
        // property of the slot, shared by all of its sessions
        let mut work: Vec<(&str, String, &Session)> = Vec::new();
        for day in outline {
            for slot in &day.slots {
                let time_range = slot_time_range(slot);
                for session in &slot.sessions {
                    work.push((day.day.as_str(), time_range.clone(), session));
                }
            }
        }

        let total = work.len();
        let mut schedule: Vec<DaySchedule> = Vec::new();
        let mut completions = stream::iter(work)
            .map(|(day, time_range, session)| async move {
                let talks = self.fetch_session_talks(session).await;
                (day, time_range, SessionWithTalks::from_session(session, talks))
            })
            .buffer_unordered(self.concurrency);

        while let Some((day, time_range, session)) = completions.next().await {
            tracing::debug!(
                day,
                time_range = %time_range,
                title = %session.title,
                talks = session.talks.len(),
                "Merged session result"
            );
            merge(&mut schedule, day, time_range, session);
        }

        tracing::info!(sessions = total, "Fetched all session details");
        schedule
    }

    /// Fetch and parse one session's talk list.
    ///
    /// Links outside the session prefix (including the sentinel) return an
    /// empty list without touching the network.
    async fn fetch_session_talks(&self, session: &Session) -> Vec<Talk> {
        if !session.link.starts_with(&self.session_prefix) {
            return Vec::new();
        }

        let page_url = match Url::parse(&session.link) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(link = %session.link, error = %e, "Session link is not a valid URL");
                return Vec::new();
            }
        };

        match self.fetcher.fetch_page(&session.link).await {
            Ok(html) => {
                let talks = parse_talks(&html, &page_url);
                tracing::debug!(title = %session.title, talks = talks.len(), "Fetched session page");
                talks
            }
            Err(e) => {
                tracing::error!(title = %session.title, error = %e, "Failed to fetch session page");
                Vec::new()
            }
        }
    }
}

/// Display label for a slot: "start - max end" over the slot's sessions,
/// or the bare start time when no end time is usable
fn slot_time_range(slot: &SlotGroup) -> String {
    let mut max_end: Option<NaiveTime> = None;
    for session in &slot.sessions {
        let Some(end) = &session.end_time else { continue };
        match parse_clock(end) {
            Ok(parsed) => {
                max_end = Some(max_end.map_or(parsed, |current| current.max(parsed)));
            }
            Err(e) => {
                tracing::error!(error = %e, "Time format error in slot end time");
                return slot.start_time.clone();
            }
        }
    }

    match max_end {
        Some(end) => format!("{} - {}", slot.start_time, format_clock(end)),
        None => slot.start_time.clone(),
    }
}

fn merge(schedule: &mut Vec<DaySchedule>, day: &str, time_range: String, session: SessionWithTalks) {
    let day_entry = match schedule.iter_mut().position(|d| d.day == day) {
        Some(index) => &mut schedule[index],
        None => {
            schedule.push(DaySchedule {
                day: day.to_string(),
                slots: Vec::new(),
            });
            schedule.last_mut().expect("just pushed")
        }
    };

    match day_entry
        .slots
        .iter_mut()
        .find(|slot| slot.time_range == time_range)
    {
        Some(slot) => slot.sessions.push(session),
        None => day_entry.slots.push(ScheduleSlot {
            time_range,
            sessions: vec![session],
        }),
    }
}
