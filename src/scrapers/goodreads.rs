//! Goodreads shelf reader.
//!
//! Walks a shelf's table view page by page and turns each row into a
//! [`BookQuery`]. Goodreads answers past the last page with an empty
//! table, which is what ends the walk.

use super::{create_http_client, element_text, rate_limit};
use crate::books::BookQuery;
use crate::config::ShelfConfig;
use crate::console::Console;
use crate::error::ShelfError;
use scraper::{Html, Selector};
use url::Url;

/// CSS selectors used for parsing.
struct Selectors {
    row: Selector,
    title: Selector,
    author: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            row: Selector::parse(r#"tr[class="bookalike review"]"#).unwrap(),
            title: Selector::parse(r#"td[class="field title"] a"#).unwrap(),
            author: Selector::parse(r#"td[class="field author"] a"#).unwrap(),
        }
    }
}

/// Reader for a Goodreads shelf URL.
pub struct GoodreadsShelf {
    client: reqwest::Client,
    config: ShelfConfig,
    selectors: Selectors,
    console: Console,
}

impl GoodreadsShelf {
    /// Creates a new shelf reader with the given configuration.
    pub fn new(config: ShelfConfig) -> Result<Self, ShelfError> {
        Ok(Self {
            client: create_http_client()?,
            config,
            selectors: Selectors::new(),
            console: Console::new(),
        })
    }

    /// Fetches every page of the shelf, in order.
    pub async fn read_all(&self, shelf_url: &str) -> Result<Vec<BookQuery>, ShelfError> {
        let mut books = Vec::new();
        let mut page: u32 = 1;

        loop {
            let rows = self.fetch_page(shelf_url, page).await?;
            if rows.is_empty() {
                break;
            }

            books.extend(rows);
            self.console.info(&format!(
                "finished page {} with {} books so far",
                page,
                books.len()
            ));
            page += 1;
        }

        Ok(books)
    }

    /// Fetches and parses one page of the shelf.
    async fn fetch_page(&self, shelf_url: &str, page: u32) -> Result<Vec<BookQuery>, ShelfError> {
        let mut url = Url::parse(shelf_url)
            .map_err(|e| ShelfError::ParseError(format!("invalid shelf URL {shelf_url}: {e}")))?;
        url.query_pairs_mut().append_pair("page", &page.to_string());

        if page > 1 {
            rate_limit(self.config.delay_between_requests_sec).await;
        }

        let response = self.client.get(url).send().await?.error_for_status()?;
        let text = response.text().await?;
        self.parse_rows(&text)
    }

    /// Extracts the books listed in one shelf page.
    fn parse_rows(&self, source: &str) -> Result<Vec<BookQuery>, ShelfError> {
        let doc = Html::parse_document(source);

        doc.select(&self.selectors.row)
            .map(|row| {
                let title_link = row
                    .select(&self.selectors.title)
                    .next()
                    .ok_or_else(|| ShelfError::ParseError("row without title".to_string()))?;
                let author = row
                    .select(&self.selectors.author)
                    .next()
                    .map(element_text)
                    .ok_or_else(|| ShelfError::ParseError("row without author".to_string()))?;

                let title = title_link.value().attr("title").unwrap_or_default();
                let link = title_link.value().attr("href").unwrap_or_default();

                Ok(BookQuery::new(author, title, link))
            })
            .collect()
    }
}
