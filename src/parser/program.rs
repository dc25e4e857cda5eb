//! Program table parser
//!
//! Scans the conference program table into a day -> start-time -> session
//! structure with a single-pass state machine over table rows. The only
//! state carried between rows is the current day, established by day-header
//! rows and consumed by the session rows that follow.
//!
//! Row shapes:
//! - a row holding a wide (`colspan`) cell naming a weekday starts a new day
//! - three cells introduce a new time slot: time expression, linked title,
//!   location
//! - two cells add a concurrent session inheriting the current slot's time
//!   and location
//! - anything else is skipped with a diagnostic

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::models::{DayOutline, Session, SlotGroup};
use crate::parser::time::extract_time;
use crate::parser::{collapse_text, parse_selector, SENTINEL_LINK};

/// Heading used when the document carries none
pub const DEFAULT_HEADING: &str = "Conference Program";

/// Keywords marking a title as a talk session (case-insensitive substring)
const TALK_KEYWORDS: &[&str] = &[
    "Session", "IP", "CP", "SODA", "ALENEX", "SOSA", "Workshop", "Lecture",
];

lazy_static! {
    static ref ROW: Selector = parse_selector!("tr");
    static ref CELL: Selector = parse_selector!("td");
    static ref WIDE_CELL: Selector = parse_selector!("td[colspan]");
    static ref ANCHOR: Selector = parse_selector!("a[href]");
    static ref HEADING: Selector = parse_selector!("h1, h2");
    static ref DAY_NAME: Regex = Regex::new(
        r"(?i)\b(Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday)\b"
    )
    .expect("Invalid day name pattern");
    static ref CONTEST_CODE: Regex =
        Regex::new(r"^CP\d+\s+").expect("Invalid contest code pattern");
}

/// Strip a leading contest-code token ("CP12 ") from a session title
pub fn clean_session_title(title: &str) -> String {
    CONTEST_CODE.replace(title, "").trim().to_string()
}

/// Check whether a title names a talk session
pub fn is_talk_session(title: &str) -> bool {
    let lower = title.to_lowercase();
    TALK_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(&keyword.to_lowercase()))
}

/// Conference program table scanner
///
/// Links are resolved against the program page URL so that the detail
/// fetcher only ever sees absolute URLs.
pub struct ProgramParser {
    base_url: Url,
}

impl ProgramParser {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Scan the program document into per-day slot groups plus the page heading.
    ///
    /// The scan never fails: rows that cannot be interpreted are skipped with
    /// a debug diagnostic, and a document without a recognizable table simply
    /// yields an empty outline.
    pub fn parse(&self, html: &str) -> (Vec<DayOutline>, String) {
        let document = Html::parse_document(html);

        let heading = document
            .select(&HEADING)
            .next()
            .map(collapse_text)
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| DEFAULT_HEADING.to_string());
        tracing::debug!(heading = %heading, "Extracted main heading");

        let mut days: Vec<(String, Vec<Session>)> = Vec::new();
        let mut current_day: Option<String> = None;

        for row in document.select(&ROW) {
            // Day headers sit in a single wide cell; any wide-cell row ends
            // here whether or not it names a weekday
            if let Some(wide) = row.select(&WIDE_CELL).next() {
                let text = collapse_text(wide);
                if DAY_NAME.is_match(&text) {
                    tracing::debug!(day = %text, "Detected new day");
                    current_day = Some(text);
                }
                continue;
            }

            let cells: Vec<ElementRef> = row.select(&CELL).collect();
            match cells.len() {
                0 => continue,
                3 => self.scan_slot_start(&cells, current_day.as_deref(), &mut days),
                2 => self.scan_continuation(&cells, current_day.as_deref(), &mut days),
                n => {
                    tracing::debug!(cells = n, "Skipping row with unexpected cell count");
                }
            }
        }

        let outline = group_by_start_time(days);
        tracing::info!(
            days = outline.len(),
            sessions = outline.iter().map(DayOutline::session_count).sum::<usize>(),
            "Parsed program outline"
        );
        (outline, heading)
    }

    /// Three cells: time expression, linked title, location
    fn scan_slot_start(
        &self,
        cells: &[ElementRef],
        current_day: Option<&str>,
        days: &mut Vec<(String, Vec<Session>)>,
    ) {
        let time_text = collapse_text(cells[0]);
        let (start_time, end_time) = extract_time(&time_text);
        let Some(start_time) = start_time else {
            tracing::debug!(text = %time_text, "Could not extract time from slot row");
            return;
        };

        let Some(anchor) = cells[1].select(&ANCHOR).next() else {
            tracing::debug!(start = %start_time, "Slot row has no session link, skipping");
            return;
        };
        let title = clean_session_title(&collapse_text(anchor));
        let link = self.resolve_link(anchor);
        let location = collapse_text(cells[2]);

        if !is_talk_session(&title) {
            tracing::debug!(title = %title, "Omitting non-talk session");
            return;
        }

        let Some(day) = current_day else {
            tracing::debug!(title = %title, "Slot row before any day header, skipping");
            return;
        };

        tracing::debug!(day, start = %start_time, end = ?end_time, title = %title, "Parsed session");
        push_session(
            days,
            day,
            Session {
                start_time,
                end_time,
                title,
                link,
                location,
            },
        );
    }

    /// Two cells: linked title for a concurrent session in the current slot
    fn scan_continuation(
        &self,
        cells: &[ElementRef],
        current_day: Option<&str>,
        days: &mut Vec<(String, Vec<Session>)>,
    ) {
        let Some(day) = current_day else {
            tracing::debug!("Concurrent session row without a current day, skipping");
            return;
        };

        let (title, link) = match cells[0].select(&ANCHOR).next() {
            Some(anchor) => (
                clean_session_title(&collapse_text(anchor)),
                self.resolve_link(anchor),
            ),
            None => {
                let title = collapse_text(cells[0]);
                tracing::debug!(title = %title, "No link found for session, using sentinel");
                (title, SENTINEL_LINK.to_string())
            }
        };

        // The first session of the slot established time and location
        let inherited = days
            .iter()
            .find(|(d, _)| d == day)
            .and_then(|(_, sessions)| sessions.last())
            .map(|last| {
                (
                    last.start_time.clone(),
                    last.end_time.clone(),
                    last.location.clone(),
                )
            });
        let Some((start_time, end_time, location)) = inherited else {
            tracing::debug!(title = %title, "Concurrent session before any slot row for this day, skipping");
            return;
        };

        if !is_talk_session(&title) {
            tracing::debug!(title = %title, "Omitting non-talk session");
            return;
        }

        tracing::debug!(day, start = %start_time, title = %title, "Parsed concurrent session");
        push_session(
            days,
            day,
            Session {
                start_time,
                end_time,
                title,
                link,
                location,
            },
        );
    }

    fn resolve_link(&self, anchor: ElementRef) -> String {
        let href = anchor.value().attr("href").unwrap_or_default();
        match self.base_url.join(href) {
            Ok(resolved) => resolved.to_string(),
            Err(e) => {
                tracing::debug!(href, error = %e, "Could not resolve link against base URL");
                href.to_string()
            }
        }
    }
}

fn push_session(days: &mut Vec<(String, Vec<Session>)>, day: &str, session: Session) {
    match days.iter_mut().find(|(d, _)| d == day) {
        Some((_, sessions)) => sessions.push(session),
        None => days.push((day.to_string(), vec![session])),
    }
}

/// Reindex the flat per-day session lists into day -> start-time groups,
/// preserving encounter order of days, start times and sessions
fn group_by_start_time(days: Vec<(String, Vec<Session>)>) -> Vec<DayOutline> {
    days.into_iter()
        .map(|(day, sessions)| {
            let mut slots: Vec<SlotGroup> = Vec::new();
            for session in sessions {
                match slots
                    .iter_mut()
                    .find(|slot| slot.start_time == session.start_time)
                {
                    Some(slot) => slot.sessions.push(session),
                    None => slots.push(SlotGroup {
                        start_time: session.start_time.clone(),
                        sessions: vec![session],
                    }),
                }
            }
            DayOutline { day, slots }
        })
        .collect()
}
