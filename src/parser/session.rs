//! Session detail page parsing
//!
//! Talks are listed as definition-term entries; each entry carries the talk
//! title in its first emphasized element and the abstract link in its first
//! anchor.

use lazy_static::lazy_static;
use scraper::Selector;
use url::Url;

use crate::models::Talk;
use crate::parser::{collapse_text, parse_selector, SENTINEL_LINK};

/// Placeholder title for talks without an emphasized heading
pub const UNKNOWN_TITLE: &str = "Unknown Title";

lazy_static! {
    static ref TALK_ENTRY: Selector = parse_selector!("dt");
    static ref TALK_TITLE: Selector = parse_selector!("strong");
    static ref TALK_LINK: Selector = parse_selector!("a[href]");
}

/// Extract the talk list from a session detail page, in document order.
///
/// Talk links are resolved against the detail page's own URL. Missing
/// titles and links degrade to sentinels rather than dropping the entry.
pub fn parse_talks(html: &str, page_url: &Url) -> Vec<Talk> {
    let document = scraper::Html::parse_document(html);

    document
        .select(&TALK_ENTRY)
        .map(|entry| {
            let title = entry
                .select(&TALK_TITLE)
                .next()
                .map(collapse_text)
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

            let link = entry
                .select(&TALK_LINK)
                .next()
                .and_then(|anchor| anchor.value().attr("href"))
                .and_then(|href| page_url.join(href).ok())
                .map(|resolved| resolved.to_string())
                .unwrap_or_else(|| SENTINEL_LINK.to_string());

            Talk { title, link }
        })
        .collect()
}
