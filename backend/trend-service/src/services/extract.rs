/// Text Extractor
///
/// Turns a forum listing page into a flat sequence of post titles. Malformed
/// markup yields an empty sequence rather than an error, so one bad page in
/// a paginated walk never aborts the run.
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

/// Anchor-text selector for post titles on the board listing.
const TITLE_SELECTOR: &str = ".title a";

static INDEX_HREF_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href="/bbs/Stock/index(\d+)\.html""#).expect("Invalid index regex"));

/// Extract trimmed, non-empty post titles from listing-page markup.
pub fn extract_titles(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse(TITLE_SELECTOR) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
        .collect()
}

/// Find the highest paginated index number linked from the landing page,
/// used to walk the most recent N pages. `None` when the markup carries no
/// pagination links (the caller falls back to the landing page alone).
pub fn discover_latest_index(html: &str) -> Option<u32> {
    INDEX_HREF_REGEX
        .captures_iter(html)
        .filter_map(|cap| cap.get(1).and_then(|m| m.as_str().parse::<u32>().ok()))
        .max()
}
