//! The batch job: every book on the list, every library, one report.

use crate::aggregate::aggregate;
use crate::books::BookQuery;
use crate::console::Console;
use crate::error::{BatchError, InputError};
use crate::progress::ProgressCursor;
use crate::report::write_block;
use crate::search::OfferSource;
use std::io::Write;

/// Counters for a finished (or resumed) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Books skipped because the previous run already reported them.
    pub skipped: usize,

    /// Books searched and reported by this run.
    pub processed: usize,

    /// Books with at least one offer, including the previous run's.
    pub hits: usize,

    /// Progress lines logged during this run.
    pub heartbeats: usize,
}

/// Drives searches for a whole book list and writes the report.
///
/// Report blocks go to `out`, one per book, flushed as soon as the book is
/// done. Diagnostics go to the console. A failed search ends the run; the
/// books reported so far are what the next run resumes from.
pub struct BatchDriver<'a, O: ?Sized, W> {
    source: &'a mut O,
    libraries: Vec<String>,
    out: W,
    console: Console,
    heartbeat_every: usize,
}

impl<'a, O, W> BatchDriver<'a, O, W>
where
    O: OfferSource + ?Sized,
    W: Write,
{
    /// Creates a driver searching `libraries` through `source`.
    pub fn new(source: &'a mut O, libraries: Vec<String>, out: W, console: Console) -> Self {
        Self {
            source,
            libraries,
            out,
            console,
            heartbeat_every: 10,
        }
    }

    /// Logs progress every `n` books.
    pub fn heartbeat_every(mut self, n: usize) -> Self {
        self.heartbeat_every = n.max(1);
        self
    }

    /// Consumes the driver, returning the report writer.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs the batch, skipping the first `cursor.seen` books.
    pub async fn run<I>(&mut self, books: I, cursor: ProgressCursor) -> Result<BatchSummary, BatchError>
    where
        I: IntoIterator<Item = Result<BookQuery, InputError>>,
    {
        if cursor.seen > 0 {
            self.console.info(&format!(
                "Skipping {} books we've already searched",
                self.console.count(cursor.seen)
            ));
        }
        if cursor.orphans > 0 {
            self.console.warning(&format!(
                "Previous report has {} offer lines outside any book; resume position may be off",
                cursor.orphans
            ));
        }

        let mut summary = BatchSummary {
            hits: cursor.hits,
            ..BatchSummary::default()
        };
        let mut position = 0;

        for book in books {
            let book = book?;
            position += 1;

            if position <= cursor.seen {
                summary.skipped += 1;
                continue;
            }

            let result =
                aggregate(&mut *self.source, &book, &self.libraries, &self.console).await?;
            if !result.is_empty() {
                summary.hits += 1;
            }
            write_block(&mut self.out, &book, &result)?;
            summary.processed += 1;

            if position % self.heartbeat_every == 0 {
                summary.heartbeats += 1;
                self.console.info(&format!(
                    "completed {} books, {} had hits",
                    position, summary.hits
                ));
            }
        }

        if summary.skipped < cursor.seen {
            self.console.warning(&format!(
                "Previous report covers {} books but the input only has {}",
                cursor.seen, summary.skipped
            ));
        }

        self.console.success(&format!(
            "Searched {} books ({} skipped), {} had hits",
            summary.processed, summary.skipped, summary.hits
        ));

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::books::read_books;
    use crate::error::SearchError;
    use crate::loader::ResilientLoader;
    use crate::loader::testing::{ScriptedSession, quiet_config};
    use crate::report::ReportScan;
    use crate::scrapers::libby_fixtures::*;
    use crate::scrapers::{CatalogSite, LibbySite};
    use crate::search::LibrarySearchClient;
    use crate::text::{query_title, unreverse_author};

    fn search_url(library: &str, book: (&str, &str)) -> String {
        let (author, title) = book;
        LibbySite::new()
            .search_url(library, &query_title(title), &unreverse_author(author))
            .unwrap()
    }

    fn client(session: ScriptedSession) -> LibrarySearchClient<ScriptedSession> {
        LibrarySearchClient::new(
            ResilientLoader::new(session, quiet_config(0)),
            Box::new(LibbySite::new()),
        )
    }

    fn console() -> Console {
        Console::with_colors(false)
    }

    const POLLAN: (&str, &str) = ("Pollan, Michael", "How to Change Your Mind (P.S.)");
    const PLATO: (&str, &str) = ("Plato", "Republic");
    const SCHUR: (&str, &str) = ("Schur, Michael", "How to Be Perfect");

    fn single_tile_page(book: (&str, &str)) -> String {
        let (author, title) = book;
        results_page(&[borrow_tile(&query_title(title), &unreverse_author(author))])
    }

    #[tokio::test]
    async fn test_end_to_end_text_and_audio() {
        let hold_url = "https://libbyapp.com/library/lapl/hold/42";
        let session = ScriptedSession::new()
            .page(
                &search_url("lapl", POLLAN),
                &results_page(&[
                    borrow_tile("How to Change Your Mind", "Michael Pollan"),
                    hold_audio_tile(
                        "How to Change Your Mind",
                        "Michael Pollan",
                        "9 hours",
                        "/library/lapl/hold/42",
                    ),
                ]),
            )
            .page(hold_url, &hold_page("About 2 weeks"));
        let mut client = client(session);

        let input = "author,title,link\n\"Pollan, Michael\",How to Change Your Mind (P.S.),https://example.com/b/1\n";
        let mut driver = BatchDriver::new(&mut client, vec!["lapl".to_string()], Vec::new(), console());
        let summary = driver
            .run(read_books(input.as_bytes()), ProgressCursor::default())
            .await
            .unwrap();

        assert_eq!(
            summary,
            BatchSummary {
                skipped: 0,
                processed: 1,
                hits: 1,
                heartbeats: 0
            }
        );
        assert_eq!(
            String::from_utf8(driver.into_output()).unwrap(),
            "Pollan, Michael: How to Change Your Mind (P.S.)\n\
             - text, Available now at lapl (Michael Pollan: How to Change Your Mind)\n\
             - audio, About 2 weeks at lapl (Michael Pollan: How to Change Your Mind)\n"
        );
    }

    #[tokio::test]
    async fn test_merges_across_libraries() {
        let session = ScriptedSession::new()
            .page(
                &search_url("lapl", PLATO),
                &results_page(&[hold_audio_tile("Republic", "Plato", "12 hours", "/library/lapl/hold/1")]),
            )
            .page(
                "https://libbyapp.com/library/lapl/hold/1",
                &hold_page("About 3 months"),
            )
            .page(
                &search_url("nypl", PLATO),
                &results_page(&[hold_audio_tile("Republic", "Plato", "12 hours", "/library/nypl/hold/1")]),
            )
            .page(
                "https://libbyapp.com/library/nypl/hold/1",
                &hold_page("About 5 weeks"),
            );
        let mut client = client(session);

        let mut driver = BatchDriver::new(
            &mut client,
            vec!["lapl".to_string(), "nypl".to_string()],
            Vec::new(),
            console(),
        );
        driver
            .run(read_books("Plato,Republic,/b/2\n".as_bytes()), ProgressCursor::default())
            .await
            .unwrap();

        assert_eq!(
            String::from_utf8(driver.into_output()).unwrap(),
            "Plato: Republic\n- audio, About 5 weeks at nypl (Plato: Republic)\n"
        );
    }

    #[tokio::test]
    async fn test_resume_skips_reported_books() {
        let previous = "Pollan, Michael: How to Change Your Mind (P.S.)\n\
                        - text, Available now at lapl (Michael Pollan: How to Change Your Mind)\n";
        let cursor = ProgressCursor::from_scan(&ReportScan::read(previous.as_bytes()).unwrap());
        assert_eq!(cursor.seen, 1);

        // Only the unseen books are scripted; searching Pollan again would time out
        let session = ScriptedSession::new()
            .page(&search_url("lapl", PLATO), &results_page(&[]))
            .page(&search_url("lapl", SCHUR), &single_tile_page(SCHUR));
        let calls = session.calls();
        let mut client = client(session);

        let input = "author,title,link\n\
                     \"Pollan, Michael\",How to Change Your Mind (P.S.),/b/1\n\
                     author,title,link\n\
                     Plato,Republic,/b/2\n\
                     author,title,link\n\
                     \"Schur, Michael\",How to Be Perfect,/b/3\n";
        let mut driver = BatchDriver::new(&mut client, vec!["lapl".to_string()], Vec::new(), console());
        let summary = driver.run(read_books(input.as_bytes()), cursor).await.unwrap();

        assert_eq!(
            summary,
            BatchSummary {
                skipped: 1,
                processed: 2,
                hits: 2,
                heartbeats: 0
            }
        );
        assert_eq!(calls.lock().unwrap().len(), 2);
        assert_eq!(
            String::from_utf8(driver.into_output()).unwrap(),
            "Plato: Republic\n\
             Schur, Michael: How to Be Perfect\n\
             - text, Available now at lapl (Michael Schur: How to Be Perfect)\n"
        );
    }

    #[tokio::test]
    async fn test_failure_then_resume() {
        let input = "author,title,link\nPlato,Republic,/b/2\n\"Schur, Michael\",How to Be Perfect,/b/3\n";

        // First run: Schur's search never renders
        let session = ScriptedSession::new().page(&search_url("lapl", PLATO), &single_tile_page(PLATO));
        let mut first = client(session);
        let mut driver = BatchDriver::new(&mut first, vec!["lapl".to_string()], Vec::new(), console());
        let err = driver
            .run(read_books(input.as_bytes()), ProgressCursor::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BatchError::Search(SearchError::Load(_))));
        let log = driver.into_output();
        assert_eq!(
            String::from_utf8(log.clone()).unwrap(),
            "Plato: Republic\n- text, Available now at lapl (Plato: Republic)\n"
        );

        // Second run picks up at Schur
        let cursor = ProgressCursor::from_scan(&ReportScan::read(log.as_slice()).unwrap());
        let session = ScriptedSession::new().page(&search_url("lapl", SCHUR), &single_tile_page(SCHUR));
        let calls = session.calls();
        let mut second = client(session);
        let mut driver = BatchDriver::new(&mut second, vec!["lapl".to_string()], log, console());
        let summary = driver.run(read_books(input.as_bytes()), cursor).await.unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.hits, 2);
        assert_eq!(*calls.lock().unwrap(), vec![search_url("lapl", SCHUR)]);

        let full = driver.into_output();
        let scan = ReportScan::read(full.as_slice()).unwrap();
        assert_eq!(scan.blocks.len(), 2);
    }

    #[tokio::test]
    async fn test_heartbeat_counts_whole_list_position() {
        let titles = ["One", "Two", "Three", "Four", "Five"];
        let mut session = ScriptedSession::new();
        for &title in &titles[1..] {
            session = session.page(&search_url("lapl", ("Anon", title)), &results_page(&[]));
        }
        let mut client = client(session);

        let input: String = titles
            .iter()
            .map(|title| format!("Anon,{title},/b\n"))
            .collect();
        let cursor = ProgressCursor {
            seen: 1,
            ..ProgressCursor::default()
        };
        let mut driver = BatchDriver::new(&mut client, vec!["lapl".to_string()], Vec::new(), console())
            .heartbeat_every(2);
        let summary = driver.run(read_books(input.as_bytes()), cursor).await.unwrap();

        // Positions 2 and 4 of the full list, not of this run's books
        assert_eq!(summary.processed, 4);
        assert_eq!(summary.heartbeats, 2);
    }

    #[tokio::test]
    async fn test_resume_after_awkward_rows() {
        let input = "Plato,\"Republic\nBook I\",/b/1\n\" Homer\",Iliad,/b/2\n\"Schur, Michael\",How to Be Perfect,/b/3\n";
        let plato = ("Plato", "Republic\nBook I");
        let homer = (" Homer", "Iliad");

        // First run reports Plato and Homer, then Schur never renders
        let session = ScriptedSession::new()
            .page(&search_url("lapl", plato), &results_page(&[]))
            .page(&search_url("lapl", homer), &results_page(&[]));
        let mut first = client(session);
        let mut driver = BatchDriver::new(&mut first, vec!["lapl".to_string()], Vec::new(), console());
        driver
            .run(read_books(input.as_bytes()), ProgressCursor::default())
            .await
            .unwrap_err();
        let log = driver.into_output();
        assert_eq!(
            String::from_utf8(log.clone()).unwrap(),
            "Plato: Republic Book I\nHomer: Iliad\n"
        );

        let cursor = ProgressCursor::from_scan(&ReportScan::read(log.as_slice()).unwrap());
        assert_eq!(cursor.seen, 2);
        assert_eq!(cursor.hits, 0);

        let session = ScriptedSession::new().page(&search_url("lapl", SCHUR), &results_page(&[]));
        let calls = session.calls();
        let mut second = client(session);
        let mut driver = BatchDriver::new(&mut second, vec!["lapl".to_string()], log, console());
        let summary = driver.run(read_books(input.as_bytes()), cursor).await.unwrap();

        assert_eq!(*calls.lock().unwrap(), vec![search_url("lapl", SCHUR)]);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.hits, 0);
    }

    #[tokio::test]
    async fn test_bad_input_row_stops_run() {
        let session = ScriptedSession::new();
        let mut client = client(session);
        let mut driver = BatchDriver::new(&mut client, vec!["lapl".to_string()], Vec::new(), console());

        let err = driver
            .run(read_books("only,two\n".as_bytes()), ProgressCursor::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BatchError::Input(InputError::MalformedRow { .. })));
        assert!(driver.into_output().is_empty());
    }
}
