//! Libby (libbyapp.com) catalog implementation.

use super::{Availability, CatalogSite, SearchEntry, element_text};
use crate::error::SearchError;
use scraper::{Html, Selector};

/// Site root, also the prefix for relative hold links.
const BASE_URL: &str = "https://libbyapp.com";

/// CSS selectors used for parsing.
struct Selectors {
    /// One result tile.
    entry: Selector,
    /// Title inside a tile.
    title: Selector,
    /// Author link inside a tile.
    author: Selector,
    /// Duration label, only present on audiobooks.
    audio_length: Selector,
    /// Row holding the Borrow / Place Hold action.
    action_row: Selector,
    /// Action label.
    action_label: Selector,
    /// Action link.
    link: Selector,
    /// Wait estimate on the hold page.
    estimate: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            entry: Selector::parse(r#"div[class="title-tile-shell"]"#).unwrap(),
            title: Selector::parse(r#"span[class="title-tile-title"]"#).unwrap(),
            author: Selector::parse(r#"div[class="title-tile-author"] a"#).unwrap(),
            // SVG keeps the camel case; accept the lowercased form too
            audio_length: Selector::parse("foreignObject span, foreignobject span").unwrap(),
            action_row: Selector::parse(
                r#"div[class="title-tile-actions"] div[class="title-tile-row"]"#,
            )
            .unwrap(),
            action_label: Selector::parse(r#"span[role="text"]"#).unwrap(),
            link: Selector::parse("a").unwrap(),
            estimate: Selector::parse(
                r#"strong[class="circ-option-estimate"] span[role="text"] span"#,
            )
            .unwrap(),
        }
    }
}

/// Libby search through a library card's catalog.
pub struct LibbySite {
    selectors: Selectors,
}

impl Default for LibbySite {
    fn default() -> Self {
        Self::new()
    }
}

impl LibbySite {
    /// Creates the Libby extractor.
    pub fn new() -> Self {
        Self {
            selectors: Selectors::new(),
        }
    }

    fn extract_entry(&self, tile: scraper::ElementRef) -> Result<SearchEntry, SearchError> {
        let title = tile
            .select(&self.selectors.title)
            .next()
            .map(element_text)
            .ok_or_else(|| SearchError::ElementNotFound("result title".to_string()))?;

        let author = tile
            .select(&self.selectors.author)
            .next()
            .map(element_text)
            .ok_or_else(|| SearchError::ElementNotFound("result author".to_string()))?;

        let audio_length = tile
            .select(&self.selectors.audio_length)
            .next()
            .map(element_text);

        let action = tile
            .select(&self.selectors.action_row)
            .next()
            .ok_or_else(|| SearchError::ElementNotFound("result action".to_string()))?;

        let label = action
            .select(&self.selectors.action_label)
            .next()
            .map(element_text)
            .unwrap_or_default();

        let availability = if label == "Borrow" {
            Availability::BorrowNow
        } else {
            let href = action
                .select(&self.selectors.link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .ok_or_else(|| SearchError::ElementNotFound("hold link".to_string()))?;
            Availability::Hold {
                url: format!("{}{}", BASE_URL, href),
            }
        };

        Ok(SearchEntry {
            title,
            author,
            audio_length,
            availability,
        })
    }
}

impl CatalogSite for LibbySite {
    fn name(&self) -> &'static str {
        "Libby"
    }

    fn search_url(&self, library: &str, title: &str, author: &str) -> Result<String, SearchError> {
        let raw = format!(
            "{}/search/{}/search/query-{} {}/page-1",
            BASE_URL, library, title, author
        );
        url::Url::parse(&raw)
            .map(String::from)
            .map_err(|e| SearchError::InvalidUrl(format!("{raw}: {e}")))
    }

    fn results_marker(&self) -> &'static str {
        "div[class='chaining-block show']"
    }

    fn extract_entries(&self, source: &str) -> Result<Vec<SearchEntry>, SearchError> {
        let doc = Html::parse_document(source);
        doc.select(&self.selectors.entry)
            .map(|tile| self.extract_entry(tile))
            .collect()
    }

    fn hold_marker(&self) -> &'static str {
        "strong[class=circ-option-estimate]"
    }

    fn extract_hold_wait(&self, source: &str) -> Result<String, SearchError> {
        let doc = Html::parse_document(source);
        doc.select(&self.selectors.estimate)
            .next()
            .map(element_text)
            .ok_or_else(|| SearchError::ElementNotFound("hold estimate".to_string()))
    }
}
