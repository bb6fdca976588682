//! The reading list: `author,title,link` CSV records.

use crate::error::InputError;
use std::io::{Read, Write};

/// Column names, also the header row of every export.
pub const FIELDS: [&str; 3] = ["author", "title", "link"];

/// A single book from the reading list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookQuery {
    /// Author as exported, often "Last, First".
    pub author: String,

    /// Full title, possibly with a series or edition note in parentheses.
    pub title: String,

    /// Link back to the book on the source site.
    pub link: String,
}

impl BookQuery {
    /// Creates a new book record.
    pub fn new(
        author: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Reads book records from CSV, dropping header rows.
///
/// Concatenated exports repeat the header in the middle of the stream, so
/// every row equal to [`FIELDS`] is skipped, not just the first.
pub fn read_books<R: Read>(reader: R) -> impl Iterator<Item = Result<BookQuery, InputError>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
        .into_records()
        .filter_map(|record| {
            let record = match record {
                Ok(record) => record,
                Err(e) => return Some(Err(InputError::Csv(e))),
            };

            if record.iter().eq(FIELDS) {
                return None;
            }

            if record.len() != FIELDS.len() {
                let row = record.position().map(|p| p.line()).unwrap_or_default();
                return Some(Err(InputError::MalformedRow {
                    row,
                    fields: record.len(),
                }));
            }

            Some(Ok(BookQuery::new(&record[0], &record[1], &record[2])))
        })
}

/// Writes a header row followed by one row per book.
pub fn write_books<W: Write, I>(writer: W, books: I) -> Result<(), csv::Error>
where
    I: IntoIterator<Item = BookQuery>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(FIELDS)?;
    for book in books {
        csv_writer.write_record([&book.author, &book.title, &book.link])?;
    }
    csv_writer.flush()?;
    Ok(())
}
