//! Detail-fetch stage integration tests using wiremock
//!
//! Validates talk attachment, the non-session link short circuit, failure
//! isolation and time-range labeling across the concurrent fetch stage.

use sodagrid::crawler::details::DetailFetcher;
use sodagrid::crawler::ProgramFetcher;
use sodagrid::models::{DayOutline, Session, SlotGroup};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session(start: &str, end: Option<&str>, title: &str, link: &str) -> Session {
    Session {
        start_time: start.to_string(),
        end_time: end.map(str::to_string),
        title: title.to_string(),
        link: link.to_string(),
        location: "Ballroom A".to_string(),
    }
}

fn outline_with(sessions: Vec<Session>) -> Vec<DayOutline> {
    let start_time = sessions[0].start_time.clone();
    vec![DayOutline {
        day: "Monday, January 20".to_string(),
        slots: vec![SlotGroup {
            start_time,
            sessions,
        }],
    }]
}

const TALKS_PAGE: &str = r#"
<html><body><dl>
  <dt><strong>Faster Matchings</strong> <a href="abs_one.cfm">abstract</a></dt>
  <dd>9:00-9:20</dd>
  <dt><strong>Sparser Cuts</strong> <a href="abs_two.cfm">abstract</a></dt>
</dl></body></html>
"#;

#[tokio::test]
async fn test_fetch_all_attaches_talks() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sess/sess_graph.cfm"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TALKS_PAGE))
        .mount(&mock_server)
        .await;

    let link = format!("{}/sess/sess_graph.cfm", mock_server.uri());
    let outline = outline_with(vec![session(
        "9:00 AM",
        Some("10:30 AM"),
        "Graph Algorithms Session",
        &link,
    )]);

    let fetcher = ProgramFetcher::new(100).unwrap();
    let schedule = DetailFetcher::new(&fetcher)
        .with_session_prefix(&format!("{}/sess", mock_server.uri()))
        .fetch_all(&outline)
        .await;

    assert_eq!(schedule.len(), 1);
    let slot = &schedule[0].slots[0];
    assert_eq!(slot.sessions.len(), 1);

    let talks = &slot.sessions[0].talks;
    assert_eq!(talks.len(), 2);
    assert_eq!(talks[0].title, "Faster Matchings");
    // Talk links resolve against the detail page URL
    assert_eq!(
        talks[0].link,
        format!("{}/sess/abs_one.cfm", mock_server.uri())
    );
}

#[tokio::test]
async fn test_non_session_link_skips_network() {
    let mock_server = MockServer::start().await;

    // Any hit on this path fails the test through the expect count
    Mock::given(method("GET"))
        .and(path("/other/page.cfm"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TALKS_PAGE))
        .expect(0)
        .mount(&mock_server)
        .await;

    let other_link = format!("{}/other/page.cfm", mock_server.uri());
    let outline = outline_with(vec![
        session("9:00 AM", None, "Offsite Session", &other_link),
        session("9:00 AM", None, "Hallway Session", "#"),
    ]);

    let fetcher = ProgramFetcher::new(100).unwrap();
    let schedule = DetailFetcher::new(&fetcher)
        .with_session_prefix(&format!("{}/sess", mock_server.uri()))
        .fetch_all(&outline)
        .await;

    let slot = &schedule[0].slots[0];
    assert_eq!(slot.sessions.len(), 2);
    assert!(slot.sessions.iter().all(|s| s.talks.is_empty()));
}

#[tokio::test]
async fn test_failed_fetch_yields_empty_talks_without_aborting_siblings() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sess/sess_broken.cfm"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sess/sess_ok.cfm"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TALKS_PAGE))
        .mount(&mock_server)
        .await;

    let broken = format!("{}/sess/sess_broken.cfm", mock_server.uri());
    let ok = format!("{}/sess/sess_ok.cfm", mock_server.uri());
    let outline = outline_with(vec![
        session("9:00 AM", Some("10:30 AM"), "Broken Session", &broken),
        session("9:00 AM", Some("10:30 AM"), "Working Session", &ok),
    ]);

    // No retries so the failing fetch resolves quickly
    let fetcher = ProgramFetcher::with_config(100, 0, Duration::from_secs(5)).unwrap();
    let schedule = DetailFetcher::new(&fetcher)
        .with_session_prefix(&format!("{}/sess", mock_server.uri()))
        .fetch_all(&outline)
        .await;

    let slot = &schedule[0].slots[0];
    assert_eq!(slot.sessions.len(), 2, "Both sessions survive the failure");

    let broken_entry = slot
        .sessions
        .iter()
        .find(|s| s.title == "Broken Session")
        .unwrap();
    let working_entry = slot
        .sessions
        .iter()
        .find(|s| s.title == "Working Session")
        .unwrap();
    assert!(broken_entry.talks.is_empty());
    assert_eq!(working_entry.talks.len(), 2);
}

#[tokio::test]
async fn test_time_range_uses_max_end_time() {
    let outline = outline_with(vec![
        session("9:00 AM", Some("10:30 AM"), "Short Session", "#"),
        session("9:00 AM", Some("11:05 AM"), "Long Session", "#"),
    ]);

    let fetcher = ProgramFetcher::new(100).unwrap();
    let schedule = DetailFetcher::new(&fetcher).fetch_all(&outline).await;

    assert_eq!(schedule[0].slots[0].time_range, "9:00 AM - 11:05 AM");
}

#[tokio::test]
async fn test_time_range_falls_back_to_start() {
    let outline = outline_with(vec![session("5:00 PM", None, "Evening Session", "#")]);

    let fetcher = ProgramFetcher::new(100).unwrap();
    let schedule = DetailFetcher::new(&fetcher).fetch_all(&outline).await;

    assert_eq!(schedule[0].slots[0].time_range, "5:00 PM");
}

#[tokio::test]
async fn test_groups_spanning_days_stay_separate() {
    let link = "#".to_string();
    let outline = vec![
        DayOutline {
            day: "Monday, January 20".to_string(),
            slots: vec![SlotGroup {
                start_time: "9:00 AM".to_string(),
                sessions: vec![session("9:00 AM", None, "Monday Session", &link)],
            }],
        },
        DayOutline {
            day: "Tuesday, January 21".to_string(),
            slots: vec![SlotGroup {
                start_time: "9:00 AM".to_string(),
                sessions: vec![session("9:00 AM", None, "Tuesday Session", &link)],
            }],
        },
    ];

    let fetcher = ProgramFetcher::new(100).unwrap();
    let schedule = DetailFetcher::new(&fetcher).fetch_all(&outline).await;

    assert_eq!(schedule.len(), 2);
    assert_eq!(schedule.iter().map(|d| d.session_count()).sum::<usize>(), 2);
}
