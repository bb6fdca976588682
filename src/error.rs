//! Error types for the Shelfscout application.
//!
//! Uses `thiserror` for structured error definitions that provide
//! clear context about what went wrong.

use thiserror::Error;

/// Outcome of a single failed page-load attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The awaited element never showed up within the attempt timeout
    #[error("Timed out waiting for page content")]
    Timeout,

    /// Navigation failed before the page rendered (`net::ERR_*`, DNS, reset)
    #[error("Navigation failed: {0}")]
    Network(String),

    /// The browser itself failed (navigation, CDP, crashed process...)
    #[error("Browser error: {0}")]
    Browser(String),
}

/// Error type for resilient page loads.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Every attempt timed out or failed to navigate; the retry ceiling was reached
    #[error("Timed out loading {url} after {attempts} attempts")]
    Timeout { url: String, attempts: u32 },

    /// The page session failed in a way retrying will not fix
    #[error("Page session failed: {0}")]
    Session(String),
}

/// A wait description that doesn't fit any known availability phrase.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("weird wait time: {0}")]
pub struct MalformedWaitTime(pub String);

/// Error type for library catalog searches.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Loading a results or hold page failed
    #[error(transparent)]
    Load(#[from] LoadError),

    /// URL construction failed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The required element isn't found in HTML
    #[error("Element not found: {0}")]
    ElementNotFound(String),
}

/// Error type for reading the book list.
#[derive(Error, Debug)]
pub enum InputError {
    /// The CSV reader failed
    #[error("Failed to read book list: {0}")]
    Csv(#[from] csv::Error),

    /// A row didn't have exactly `author,title,link`
    #[error("Malformed book row {row}: expected 3 fields, found {fields}")]
    MalformedRow { row: u64, fields: usize },
}

/// Error type for the reading-list (shelf) reader.
#[derive(Error, Debug)]
pub enum ShelfError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to parse HTML content
    #[error("Failed to parse shelf page: {0}")]
    ParseError(String),
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Anything that aborts a batch run.
#[derive(Error, Debug)]
pub enum BatchError {
    /// A search failed fatally (retries exhausted, browser died)
    #[error(transparent)]
    Search(#[from] SearchError),

    /// The book list couldn't be read
    #[error(transparent)]
    Input(#[from] InputError),

    /// Writing the report failed
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using anyhow for application-level error handling.
pub type Result<T> = anyhow::Result<T>;
