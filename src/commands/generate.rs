//! Schedule generation pipeline
//!
//! Runs the three stages in order: scan the program table, fetch session
//! details, render and save the grid. The stage boundaries carry the
//! short-circuit conditions: an empty outline or an empty merged schedule
//! ends the run with a report instead of an output document.

use anyhow::{Context, Result};
use url::Url;

use crate::config::Config;
use crate::crawler::details::DetailFetcher;
use crate::crawler::ProgramFetcher;
use crate::models::{DayOutline, DaySchedule};
use crate::parser::{ProgramParser, DEFAULT_HEADING};
use crate::render::{max_concurrent_sessions, Provenance, ScheduleRenderer};
use crate::storage::ScheduleWriter;

pub async fn generate(config: Config, url: String) -> Result<()> {
    let program_url = Url::parse(&url).with_context(|| format!("Invalid program URL: {url}"))?;

    let fetcher = ProgramFetcher::with_config(
        config.fetcher.rate_limit.ceil() as u32,
        config.fetcher.max_retries,
        config.request_timeout(),
    )
    .context("Failed to create fetcher")?;

    println!("Generating conference schedule");
    println!("==============================");

    tracing::info!(url = %program_url, "Fetching main conference page");
    let (outline, heading) = match fetcher.fetch_page(program_url.as_str()).await {
        Ok(html) => {
            tracing::info!(url = %program_url, "Successfully fetched main page");
            ProgramParser::new(program_url.clone()).parse(&html)
        }
        Err(e) => {
            // Terminal condition for the pipeline, not a process failure
            tracing::error!(error = %e, "Failed to fetch the main page");
            (Vec::new(), DEFAULT_HEADING.to_string())
        }
    };

    if outline.is_empty() {
        tracing::error!("No sessions were parsed; check the program URL and table structure");
        println!("No sessions parsed. Nothing to render.");
        return Ok(());
    }

    println!("Heading:  {heading}");
    println!("Days:     {}", outline.len());
    println!(
        "Sessions: {}",
        outline.iter().map(DayOutline::session_count).sum::<usize>()
    );

    tracing::info!("Fetching session details");
    let schedule = DetailFetcher::new(&fetcher)
        .with_concurrency(config.fetcher.max_concurrent_requests)
        .fetch_all(&outline)
        .await;

    let total_sessions: usize = schedule.iter().map(DaySchedule::session_count).sum();
    if total_sessions == 0 {
        tracing::error!("No session details were fetched; check the session URLs");
        println!("No session details fetched. Nothing to render.");
        return Ok(());
    }

    let width = max_concurrent_sessions(&schedule);

    let renderer = ScheduleRenderer::new().context("Failed to initialize renderer")?;
    let provenance = config.output.include_source_link.then(|| Provenance {
        url: program_url.to_string(),
        generated_on: chrono::Local::now().date_naive(),
    });
    let html = renderer
        .render(&schedule, &heading, width, provenance.as_ref())
        .context("Failed to render schedule")?;

    let writer = ScheduleWriter::new(&config.output.output_dir)?;
    let path = writer.save(&heading, &html)?;

    println!("\nSchedule Summary");
    println!("================");
    println!("Days:       {}", schedule.len());
    println!("Sessions:   {total_sessions}");
    println!("Grid width: {width}");
    println!("Output:     {}", path.display());

    Ok(())
}
