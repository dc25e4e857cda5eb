//! End-to-end pipeline test: scan -> detail fetch -> render
//!
//! Serves the program fixture and a set of session pages from a mock server
//! and checks that two complete runs produce byte-identical documents.

use chrono::NaiveDate;
use sodagrid::crawler::details::DetailFetcher;
use sodagrid::crawler::ProgramFetcher;
use sodagrid::parser::ProgramParser;
use sodagrid::render::{max_concurrent_sessions, Provenance, ScheduleRenderer};
use std::fs;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GRAPH_PAGE: &str = r#"
<html><body><dl>
  <dt><strong>Faster Matchings</strong> <a href="abs_one.cfm">abstract</a></dt>
  <dt><strong>Sparser Cuts</strong> <a href="abs_two.cfm">abstract</a></dt>
</dl></body></html>
"#;

const SINGLE_TALK_PAGE: &str = r#"
<html><body><dl>
  <dt><strong>One Result</strong> <a href="abs.cfm">abstract</a></dt>
</dl></body></html>
"#;

const EMPTY_PAGE: &str = "<html><body><p>Schedule to be announced.</p></body></html>";

async fn mount_session_pages(server: &MockServer) {
    let pages = [
        ("/sess/sess_graph.cfm", GRAPH_PAGE),
        ("/sess/sess_sched.cfm", EMPTY_PAGE),
        ("/sess/sess_apx.cfm", SINGLE_TALK_PAGE),
        ("/sess/sess_alenex.cfm", SINGLE_TALK_PAGE),
        ("/sess/sess_sosa.cfm", GRAPH_PAGE),
    ];
    for (route, body) in pages {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }
}

async fn run_pipeline(server: &MockServer) -> String {
    let program_html = fs::read_to_string("tests/fixtures/html/program.html").unwrap();
    let base_url = Url::parse(&format!(
        "{}/program.cfm?CONFCODE=SODA25",
        server.uri()
    ))
    .unwrap();

    let (outline, heading) = ProgramParser::new(base_url).parse(&program_html);
    assert!(!outline.is_empty(), "Fixture should yield sessions");

    let fetcher = ProgramFetcher::new(100).unwrap();
    let schedule = DetailFetcher::new(&fetcher)
        .with_session_prefix(&format!("{}/sess", server.uri()))
        .fetch_all(&outline)
        .await;

    let width = max_concurrent_sessions(&schedule);
    assert_eq!(width, 3, "Monday's morning slot holds three sessions");

    let provenance = Provenance {
        url: "https://meetings.siam.org/program.cfm?CONFCODE=SODA25".to_string(),
        generated_on: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
    };
    ScheduleRenderer::new()
        .unwrap()
        .render(&schedule, &heading, width, Some(&provenance))
        .unwrap()
}

#[tokio::test]
async fn test_pipeline_produces_stable_document() {
    let mock_server = MockServer::start().await;
    mount_session_pages(&mock_server).await;

    let first = run_pipeline(&mock_server).await;
    let second = run_pipeline(&mock_server).await;

    // Detail fetches complete in arbitrary order; the document must not care
    assert_eq!(first, second);

    assert!(first.contains("2025 ACM-SIAM Symposium on Discrete Algorithms (SODA25)"));
    assert!(first.contains("Monday, January 20"));
    assert!(first.contains("Tuesday, January 21"));
    assert!(first.contains("Graph Algorithms Session"));
    assert!(first.contains("Faster Matchings"));
    assert!(first.contains("Generated 2025-01-15 from the official program"));

    // The sentinel-linked session renders without talks
    assert!(first.contains("Open Problems Session"));

    // Filtered rows never surface
    assert!(!first.contains("Lunch Break"));
    assert!(!first.contains("Poster Session"));
}

#[tokio::test]
async fn test_pipeline_day_ordering_and_slot_ordering() {
    let mock_server = MockServer::start().await;
    mount_session_pages(&mock_server).await;

    let html = run_pipeline(&mock_server).await;

    let monday = html.find("Monday, January 20").unwrap();
    let tuesday = html.find("Tuesday, January 21").unwrap();
    assert!(monday < tuesday);

    // Within Monday, the 9:00 AM slot renders before the 1:00 PM slot
    let morning = html.find("Graph Algorithms Session").unwrap();
    let afternoon = html.find("Approximation Session").unwrap();
    assert!(morning < afternoon);

    // ALENEX still lands after its alphabetical peers in the shared slot
    let alenex = html.find("ALENEX Engineering Session").unwrap();
    assert!(afternoon < alenex);
}
