//! Schedule rendering
//!
//! Lays the merged schedule out as a static HTML grid with one column per
//! concurrent session. All ordering is derived from sort keys, never from
//! task-completion or insertion order, so identical input data always
//! renders to identical bytes.

use chrono::{NaiveDate, NaiveTime};
use handlebars::Handlebars;
use serde::Serialize;

use crate::error::RenderError;
use crate::models::{DaySchedule, ScheduleSlot, SessionWithTalks};
use crate::parser::time::{parse_clock, parse_day_date};

/// Default page shell template
const PAGE_TEMPLATE: &str = include_str!("../../templates/schedule.hbs");

/// Title prefix remapped to sort after every other session in a slot
const SORT_LAST_PREFIX: &str = "ALENEX";

/// Largest number of sessions found in any single time slot.
///
/// This fixes the output grid's column count and must be computed from the
/// same dataset being rendered.
pub fn max_concurrent_sessions(schedule: &[DaySchedule]) -> usize {
    let max = schedule
        .iter()
        .flat_map(|day| day.slots.iter())
        .map(|slot| slot.sessions.len())
        .max()
        .unwrap_or(0);
    tracing::info!(max, "Maximum concurrent sessions across all days");
    max
}

/// Provenance line rendered under the heading
#[derive(Debug, Clone)]
pub struct Provenance {
    /// Source program URL
    pub url: String,

    /// Generation date, supplied by the caller so rendering stays a pure
    /// function of its arguments
    pub generated_on: NaiveDate,
}

/// Template data for the page shell
#[derive(Debug, Serialize)]
struct PageData {
    heading: String,
    source: Option<SourceLine>,
    rows: String,
}

#[derive(Debug, Serialize)]
struct SourceLine {
    url: String,
    date: String,
}

/// Renders the merged schedule into a static HTML document
pub struct ScheduleRenderer<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> ScheduleRenderer<'a> {
    /// Create a renderer with the default page template
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Template` if the built-in template is invalid
    pub fn new() -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();
        handlebars.register_template_string("schedule", PAGE_TEMPLATE)?;
        Ok(Self { handlebars })
    }

    /// Render the schedule document.
    ///
    /// Days are ordered by the calendar date parsed from their labels; a
    /// label with no parseable date is a fatal input error because it breaks
    /// the ordering contract. Time slots are ordered by their start time.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::DayLabel` for an unorderable day label and
    /// `RenderError::Render` if template expansion fails
    pub fn render(
        &self,
        schedule: &[DaySchedule],
        heading: &str,
        max_concurrency: usize,
        provenance: Option<&Provenance>,
    ) -> Result<String, RenderError> {
        let mut keyed_days = Vec::with_capacity(schedule.len());
        for day in schedule {
            let date =
                parse_day_date(&day.day).map_err(|_| RenderError::DayLabel(day.day.clone()))?;
            keyed_days.push((date, day));
        }
        keyed_days.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.day.cmp(&b.1.day)));

        let mut rows = String::new();
        for (_, day) in &keyed_days {
            push_day_header(&mut rows, &day.day, max_concurrency);

            let mut slots: Vec<&ScheduleSlot> = day.slots.iter().collect();
            slots.sort_by_cached_key(|slot| slot_sort_key(&slot.time_range));
            for slot in slots {
                push_slot_row(&mut rows, slot, max_concurrency);
            }
        }

        let data = PageData {
            heading: heading.to_string(),
            source: provenance.map(|p| SourceLine {
                url: p.url.clone(),
                date: p.generated_on.format("%Y-%m-%d").to_string(),
            }),
            rows,
        };
        Ok(self.handlebars.render("schedule", &data)?)
    }
}

/// Slot ordering: parseable starts chronologically, unparseable ones last,
/// label text as the tie breaker
fn slot_sort_key(time_range: &str) -> (u8, NaiveTime, String) {
    let start = time_range.split(" - ").next().unwrap_or(time_range);
    match parse_clock(start) {
        Ok(time) => (0, time, time_range.to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable slot start time, sorting last");
            (1, NaiveTime::MIN, time_range.to_string())
        }
    }
}

/// Sessions sort by title, except the ALENEX track goes after everything else
fn title_sort_key(title: &str) -> String {
    match title.strip_prefix(SORT_LAST_PREFIX) {
        Some(rest) => format!("Z{rest}"),
        None => title.to_string(),
    }
}

fn push_day_header(out: &mut String, day: &str, width: usize) {
    out.push_str("      <tr>\n");
    out.push_str(&format!(
        "        <th class=\"day-header\" colspan=\"{width}\">{}</th>\n",
        html_escape::encode_text(day)
    ));
    out.push_str("      </tr>\n");
}

fn push_slot_row(out: &mut String, slot: &ScheduleSlot, width: usize) {
    // A lone session spans the full grid width; the time range stands in
    // for an empty talk list
    if let [session] = slot.sessions.as_slice() {
        let time_range = session.talks.is_empty().then_some(slot.time_range.as_str());
        out.push_str("      <tr>\n");
        out.push_str(&format!(
            "        <td colspan=\"{width}\">{}</td>\n",
            session_cell(session, time_range)
        ));
        out.push_str("      </tr>\n");
        return;
    }

    let mut sessions: Vec<&SessionWithTalks> = slot.sessions.iter().collect();
    sessions.sort_by_cached_key(|session| {
        (
            title_sort_key(&session.title),
            session.title.clone(),
            session.link.clone(),
        )
    });

    // Overflow policy: the row expands past the configured width rather
    // than dropping sessions
    let columns = width.max(sessions.len());
    out.push_str("      <tr>\n");
    for index in 0..columns {
        match sessions.get(index) {
            Some(session) => out.push_str(&format!(
                "        <td>{}</td>\n",
                session_cell(session, None)
            )),
            None => out.push_str("        <td></td>\n"),
        }
    }
    out.push_str("      </tr>\n");
}

fn session_cell(session: &SessionWithTalks, time_range: Option<&str>) -> String {
    let mut cell = format!(
        "<strong class=\"session-title\"><a href=\"{}\">{}</a></strong><br>",
        html_escape::encode_double_quoted_attribute(&session.link),
        html_escape::encode_text(&session.title),
    );
    if let Some(range) = time_range {
        cell.push_str(&format!("<em>{}</em><br>", html_escape::encode_text(range)));
    }
    for talk in &session.talks {
        cell.push_str(&format!(
            "<a href=\"{}\">{}</a><br>",
            html_escape::encode_double_quoted_attribute(&talk.link),
            html_escape::encode_text(&talk.title),
        ));
    }
    cell
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Talk;

    fn entry(title: &str, talks: Vec<Talk>) -> SessionWithTalks {
        SessionWithTalks {
            title: title.to_string(),
            link: format!("https://meetings.siam.org/sess/{title}.cfm"),
            talks,
        }
    }

    #[test]
    fn test_title_sort_key_remaps_alenex() {
        assert!(title_sort_key("ALENEX Talk") > title_sort_key("Approximation Session"));
        assert!(title_sort_key("ALENEX Talk") > title_sort_key("Workshop on Widgets"));
        assert_eq!(title_sort_key("Graph Session"), "Graph Session");
    }

    #[test]
    fn test_slot_sort_key_orders_by_start() {
        assert!(slot_sort_key("9:00 AM - 10:30 AM") < slot_sort_key("1:00 PM - 2:30 PM"));
        assert!(slot_sort_key("8:00 AM") < slot_sort_key("9:00 AM - 10:30 AM"));
    }

    #[test]
    fn test_slot_sort_key_unparseable_sorts_last() {
        assert!(slot_sort_key("TBD") > slot_sort_key("11:59 PM"));
    }

    #[test]
    fn test_max_concurrent_sessions() {
        let schedule = vec![DaySchedule {
            day: "Monday, January 20".to_string(),
            slots: vec![
                ScheduleSlot {
                    time_range: "9:00 AM".to_string(),
                    sessions: vec![entry("A Session", Vec::new()), entry("B Session", Vec::new())],
                },
                ScheduleSlot {
                    time_range: "1:00 PM".to_string(),
                    sessions: vec![entry("C Session", Vec::new())],
                },
            ],
        }];
        assert_eq!(max_concurrent_sessions(&schedule), 2);
        assert_eq!(max_concurrent_sessions(&[]), 0);
    }

    #[test]
    fn test_session_cell_shows_time_range_only_without_talks() {
        let without_talks = entry("Quiet Session", Vec::new());
        let cell = session_cell(&without_talks, Some("9:00 AM - 10:30 AM"));
        assert!(cell.contains("<em>9:00 AM - 10:30 AM</em>"));

        let with_talks = entry(
            "Busy Session",
            vec![Talk {
                title: "First Talk".to_string(),
                link: "https://meetings.siam.org/abs/1.cfm".to_string(),
            }],
        );
        let cell = session_cell(&with_talks, None);
        assert!(!cell.contains("<em>"));
        assert!(cell.contains(">First Talk</a><br>"));
    }

    #[test]
    fn test_session_cell_escapes_text() {
        let session = SessionWithTalks {
            title: "Bounds & <Cuts> Session".to_string(),
            link: "https://meetings.siam.org/sess/1.cfm?a=b&c=d".to_string(),
            talks: Vec::new(),
        };
        let cell = session_cell(&session, None);
        assert!(cell.contains("Bounds &amp; &lt;Cuts&gt; Session"));
        assert!(!cell.contains("<Cuts>"));
    }
}
