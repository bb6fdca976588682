//! Library catalog search.
//!
//! [`LibrarySearchClient`] turns a book and a library into the offers that
//! library has for it. It owns the page loader for the whole batch, so
//! every load, including the hold pages opened per result, runs through
//! the same session one after another.

use crate::error::SearchError;
use crate::loader::{PageSession, ResilientLoader};
use crate::scrapers::{Availability, CatalogSite};
use crate::text::{normalize, query_title, unreverse_author};
use async_trait::async_trait;

/// Wait text for results that can be borrowed immediately.
pub const AVAILABLE_NOW: &str = "Available now";

/// One library's answer for one matching edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOffer {
    pub author: String,
    pub title: String,
    /// Natural-language wait ("About 2 weeks").
    pub wait: String,
    /// Present on audiobooks only.
    pub audio_length: Option<String>,
}

impl RawOffer {
    /// True for audiobook editions.
    pub fn is_audio(&self) -> bool {
        self.audio_length.is_some()
    }
}

/// An offer tagged with the library it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryOffer {
    pub offer: RawOffer,
    pub library: String,
}

/// Anything that can answer "what does this library have for this book".
#[async_trait]
pub trait OfferSource: Send {
    /// Searches one library. `author` may be in "Last, First" form.
    async fn search(
        &mut self,
        author: &str,
        title: &str,
        library: &str,
    ) -> Result<Vec<RawOffer>, SearchError>;
}

/// Searches a catalog site through a browser-backed loader.
pub struct LibrarySearchClient<S> {
    loader: ResilientLoader<S>,
    site: Box<dyn CatalogSite>,
}

impl<S: PageSession> LibrarySearchClient<S> {
    /// Creates a client for `site` that loads pages through `loader`.
    pub fn new(loader: ResilientLoader<S>, site: Box<dyn CatalogSite>) -> Self {
        Self { loader, site }
    }

    /// Returns the name of the catalog site being searched.
    pub fn site_name(&self) -> &'static str {
        self.site.name()
    }

    /// Releases the page session.
    pub async fn close(&mut self) -> Result<(), SearchError> {
        self.loader.close().await.map_err(SearchError::from)
    }

    /// Opens the hold page to find out how long the wait is.
    async fn wait_for(&mut self, availability: &Availability) -> Result<String, SearchError> {
        match availability {
            Availability::BorrowNow => Ok(AVAILABLE_NOW.to_string()),
            Availability::Hold { url } => {
                let source = self.loader.load(url, self.site.hold_marker()).await?;
                self.site.extract_hold_wait(&source)
            }
        }
    }
}

#[async_trait]
impl<S: PageSession> OfferSource for LibrarySearchClient<S> {
    async fn search(
        &mut self,
        author: &str,
        title: &str,
        library: &str,
    ) -> Result<Vec<RawOffer>, SearchError> {
        let author = unreverse_author(author);
        let title = query_title(title);
        let url = self.site.search_url(library, &title, &author)?;

        let source = self.loader.load(&url, self.site.results_marker()).await?;
        let entries = self.site.extract_entries(&source)?;

        let mut offers = Vec::with_capacity(entries.len());
        for entry in entries {
            let wait = self.wait_for(&entry.availability).await?;
            offers.push(RawOffer {
                author: normalize(&entry.author),
                title: normalize(&entry.title),
                wait: normalize(&wait),
                audio_length: entry.audio_length.as_deref().map(normalize),
            });
        }

        Ok(offers)
    }
}
