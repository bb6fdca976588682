//! Resume support: how far did the previous run get?
//!
//! The previous run's report is the only record of progress. Each book
//! block in it is a book that was fully searched, so the next run skips
//! that many books from the input. A book interrupted halfway never got
//! its block written and is searched again.

use crate::report::ReportScan;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Where the previous run stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressCursor {
    /// Books already reported.
    pub seen: usize,

    /// Of those, books with at least one offer.
    pub hits: usize,

    /// Offer lines with no book line above them. Nonzero means the log
    /// was edited or truncated at the front and `seen` may be off.
    pub orphans: usize,
}

impl ProgressCursor {
    /// Builds the cursor from a finished scan.
    pub fn from_scan(scan: &ReportScan) -> Self {
        Self {
            seen: scan.blocks.len(),
            hits: scan.blocks.iter().filter(|b| b.offers > 0).count(),
            orphans: scan.orphans,
        }
    }

    /// Reads the report at `path`. A missing file means a fresh start.
    pub fn recover(path: &Path) -> io::Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e),
        };

        let scan = ReportScan::read(BufReader::new(file))?;
        Ok(Self::from_scan(&scan))
    }
}

/// Number of books the report at `path` already covers.
pub fn recover_seen_count(path: &Path) -> io::Result<usize> {
    Ok(ProgressCursor::recover(path)?.seen)
}
