//! sodagrid - SIAM conference program schedule generator
//!
//! Scrapes a conference program page (e.g. SODA) and renders a static HTML
//! schedule that aligns concurrent sessions into grid columns per time slot.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - HTTP fetching with rate limiting, plus the detail-fetch stage
//! - [`parser`] - HTML parsing of the program table and session pages
//! - [`models`] - Core data structures and types
//! - [`render`] - Deterministic schedule grid rendering
//! - [`storage`] - Output document persistence
//!
//! The pipeline is strictly staged: table scan, then detail fetch, then
//! render. Concurrency exists only inside the detail-fetch stage.
//!
//! # Example
//!
//! ```no_run
//! use sodagrid::config::Config;
//! use sodagrid::crawler::ProgramFetcher;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let fetcher = ProgramFetcher::new(config.fetcher.rate_limit.ceil() as u32)?;
//!     // sodagrid::commands::generate(config, url).await?;
//!     let _ = fetcher;
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod render;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::details::DetailFetcher;
    pub use crate::crawler::ProgramFetcher;
    pub use crate::error::{FetchError, ParseError, RenderError};
    pub use crate::models::{
        DayOutline, DaySchedule, ScheduleSlot, Session, SessionWithTalks, SlotGroup, Talk,
    };
    pub use crate::parser::ProgramParser;
    pub use crate::render::ScheduleRenderer;
    pub use crate::storage::ScheduleWriter;
}

// Direct re-exports for convenience
pub use models::{DayOutline, DaySchedule, Session, SessionWithTalks, Talk};
