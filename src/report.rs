//! The text report: writing book blocks and reading them back.
//!
//! A block is one unindented `Author: Title` line followed by one bullet
//! per offer:
//!
//! ```text
//! Pollan, Michael: How to Change Your Mind (P.S.)
//! - text, Available now at lapl (Michael Pollan: How to Change Your Mind)
//! - audio, About 2 weeks at lapl (Michael Pollan: How to Change Your Mind)
//! ```
//!
//! The same scanner backs both resuming and the summary, so they always
//! agree on where a block starts.

use crate::aggregate::AggregatedResult;
use crate::books::BookQuery;
use crate::search::LibraryOffer;
use std::fmt;
use std::io::{self, BufRead, Write};

/// Prefix of every offer line.
pub const OFFER_BULLET: &str = "- ";

/// Ebook or audiobook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferKind {
    Text,
    Audio,
}

impl OfferKind {
    /// Kind of a library offer, decided by the presence of a duration.
    pub fn of(offer: &LibraryOffer) -> Self {
        if offer.offer.is_audio() {
            Self::Audio
        } else {
            Self::Text
        }
    }
}

impl fmt::Display for OfferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Audio => f.write_str("audio"),
        }
    }
}

/// The unindented line that opens a book block.
///
/// Line breaks inside a field become single spaces and leading whitespace
/// is dropped, so the line always reads back as exactly one book.
pub fn book_line(book: &BookQuery) -> String {
    let line = format!("{}: {}", one_line(&book.author), one_line(&book.title));
    line.trim_start().to_string()
}

fn one_line(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut in_break = false;
    for c in field.chars() {
        if c == '\r' || c == '\n' {
            if !in_break {
                out.push(' ');
            }
            in_break = true;
        } else {
            out.push(c);
            in_break = false;
        }
    }
    out
}

/// One offer bullet.
pub fn offer_line(offer: &LibraryOffer) -> String {
    format!(
        "{}{}, {} at {} ({}: {})",
        OFFER_BULLET,
        OfferKind::of(offer),
        offer.offer.wait,
        offer.library,
        offer.offer.author,
        offer.offer.title
    )
}

/// Writes a complete block and flushes it.
pub fn write_block<W: Write>(
    out: &mut W,
    book: &BookQuery,
    result: &AggregatedResult,
) -> io::Result<()> {
    writeln!(out, "{}", book_line(book))?;
    for offer in result.offers() {
        writeln!(out, "{}", offer_line(offer))?;
    }
    out.flush()
}

/// How a single report line reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLine {
    /// Empty or whitespace only.
    Blank,
    /// Opens a new book block.
    Book,
    /// A bullet; `None` if the kind isn't recognisable.
    Offer(Option<OfferKind>),
}

/// Classifies a line. After trimming, a bullet is an offer and any other
/// non-blank line opens a book.
pub fn classify(line: &str) -> ReportLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ReportLine::Blank;
    }

    match trimmed.strip_prefix(OFFER_BULLET) {
        Some(rest) => ReportLine::Offer(offer_kind(rest)),
        None => ReportLine::Book,
    }
}

fn offer_kind(bullet: &str) -> Option<OfferKind> {
    if bullet.starts_with("text") {
        Some(OfferKind::Text)
    } else if bullet.starts_with("audio") {
        Some(OfferKind::Audio)
    } else {
        None
    }
}

/// Offer tally for one book block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookBlock {
    pub offers: usize,
    pub has_text: bool,
    pub has_audio: bool,
}

/// Everything a report scan found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportScan {
    /// One entry per book block, in order.
    pub blocks: Vec<BookBlock>,

    /// Offer lines that appeared before any book line.
    pub orphans: usize,
}

impl ReportScan {
    /// Reads a report line by line.
    pub fn read<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut scan = Self::default();

        for line in reader.lines() {
            match classify(&line?) {
                ReportLine::Blank => {}
                ReportLine::Book => scan.blocks.push(BookBlock::default()),
                ReportLine::Offer(kind) => {
                    let Some(block) = scan.blocks.last_mut() else {
                        scan.orphans += 1;
                        continue;
                    };
                    block.offers += 1;
                    match kind {
                        Some(OfferKind::Text) => block.has_text = true,
                        Some(OfferKind::Audio) => block.has_audio = true,
                        None => {}
                    }
                }
            }
        }

        Ok(scan)
    }
}
