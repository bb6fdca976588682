//! Shelfscout - find the soonest way to borrow every book on a reading list.
//!
//! This library provides functionality for:
//! - Reading a reading list (Goodreads shelf export, `author,title,link` CSV)
//! - Searching library lending catalogs (Libby) through a browser session,
//!   with retries and linear backoff
//! - Ranking natural-language wait times and keeping the best offer per edition
//! - Writing a resumable text report and summarizing it

pub mod aggregate;
pub mod batch;
pub mod books;
pub mod config;
pub mod console;
pub mod error;
pub mod loader;
pub mod progress;
pub mod report;
pub mod scrapers;
pub mod search;
pub mod stats;
pub mod text;
pub mod wait_time;

// Re-export commonly used types
pub use aggregate::{AggregatedResult, OfferIdentity, aggregate};
pub use batch::{BatchDriver, BatchSummary};
pub use books::BookQuery;
pub use config::Config;
pub use console::Console;
pub use error::{
    BatchError, ConfigError, InputError, LoadError, MalformedWaitTime, SearchError, SessionError,
    ShelfError,
};
pub use loader::{ChromeSession, PageSession, ResilientLoader};
pub use progress::{ProgressCursor, recover_seen_count};
pub use scrapers::{CatalogSite, GoodreadsShelf, LibbySite};
pub use search::{LibraryOffer, LibrarySearchClient, OfferSource, RawOffer};
pub use stats::Summary;
