//! Site-specific HTML extraction.
//!
//! Everything that knows about a particular site's markup lives here: the
//! catalog search pages behind [`CatalogSite`], and the reading-list reader
//! that produces the book list in the first place.

mod goodreads;
mod libby;

pub use goodreads::GoodreadsShelf;
pub use libby::LibbySite;

#[cfg(test)]
pub(crate) use libby::fixtures as libby_fixtures;

use crate::error::SearchError;
use std::time::Duration;

/// How a search result can be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// Can be borrowed right away.
    BorrowNow,

    /// Must be placed on hold; the wait estimate lives on this page.
    Hold { url: String },
}

/// One result tile from a catalog search page, as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    /// Displayed title.
    pub title: String,

    /// Displayed author.
    pub author: String,

    /// Audiobook duration ("14 hours"); `None` for ebooks.
    pub audio_length: Option<String>,

    /// Whether the result can be borrowed now or needs a hold.
    pub availability: Availability,
}

/// Markup knowledge for one lending catalog.
///
/// Implementations only turn page sources into raw field strings;
/// loading pages and normalizing text is done by the search client.
pub trait CatalogSite: Send + Sync {
    /// Returns the human-readable name of this site.
    fn name(&self) -> &'static str;

    /// Builds the search URL for a query at one library.
    fn search_url(&self, library: &str, title: &str, author: &str) -> Result<String, SearchError>;

    /// CSS selector that is present once search results have rendered.
    fn results_marker(&self) -> &'static str;

    /// Extracts every result tile from a search results page.
    fn extract_entries(&self, source: &str) -> Result<Vec<SearchEntry>, SearchError>;

    /// CSS selector that is present once a hold page has rendered.
    fn hold_marker(&self) -> &'static str;

    /// Extracts the wait estimate from a hold page.
    fn extract_hold_wait(&self, source: &str) -> Result<String, SearchError>;
}

/// Common HTTP client configuration for plain (non-browser) scraping.
pub fn create_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
        .cookie_store(true)
        .timeout(Duration::from_secs(30))
        .build()
}

/// Applies rate limiting delay.
pub async fn rate_limit(delay_sec: f64) {
    if delay_sec > 0.0 {
        tokio::time::sleep(Duration::from_secs_f64(delay_sec)).await;
    }
}

/// Collects an element's text, trimmed.
pub(crate) fn element_text(elem: scraper::ElementRef) -> String {
    elem.text().collect::<String>().trim().to_string()
}
