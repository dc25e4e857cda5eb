//! HTML parsing and data extraction
//!
//! This module handles scanning the conference program table and the
//! per-session detail pages into structured data.

pub mod program;
pub mod session;
pub mod time;

// Re-export main parser and public constants
pub use program::{ProgramParser, DEFAULT_HEADING};
pub use session::parse_talks;

use scraper::ElementRef;

/// Sentinel link for entries without a usable anchor
pub const SENTINEL_LINK: &str = "#";

// Helper macro to parse selectors safely at startup
macro_rules! parse_selector {
    ($s:expr) => {
        scraper::Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}
pub(crate) use parse_selector;

/// Join an element's text nodes with single spaces, collapsing whitespace
pub(crate) fn collapse_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
