//! Shelfscout CLI - find the soonest way to borrow every book on a reading list.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shelfscout::books::{read_books, write_books};
use shelfscout::report::ReportScan;
use shelfscout::{
    BatchDriver, ChromeSession, Config, Console, GoodreadsShelf, LibbySite, LibrarySearchClient,
    ProgressCursor, ResilientLoader, Summary,
};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Find the soonest way to borrow every book on a reading list.
#[derive(Parser, Debug)]
#[command(name = "shelfscout")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search libraries for every book in an `author,title,link` CSV.
    ///
    /// The report goes to stdout; append it to the progress log so an
    /// interrupted run can pick up where it stopped.
    Search {
        /// Library identifiers, e.g. `lapl nypl`.
        libraries: Vec<String>,

        /// Book list to read instead of stdin.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Previous report to resume from (defaults to batch.progress_log).
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Export a Goodreads shelf as an `author,title,link` CSV.
    Shelf {
        /// Shelf URL, e.g. https://www.goodreads.com/review/list/123?shelf=to-read
        url: String,
    },

    /// Summarize a finished report.
    Stats {
        /// Report to read instead of stdin.
        report: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let console = Console::new();

    match args.command {
        Command::Search {
            libraries,
            input,
            log,
        } => {
            if libraries.is_empty() {
                console.warning("No library specified");
                return Ok(());
            }
            let config = load_config(args.config.as_deref(), &console)?;
            search(config, libraries, input, log, &console).await
        }
        Command::Shelf { url } => {
            let config = load_config(args.config.as_deref(), &console)?;
            shelf(config, &url).await
        }
        Command::Stats { report } => stats(report.as_deref()),
    }
}

/// Loads and validates configuration.
fn load_config(path: Option<&Path>, console: &Console) -> Result<Config> {
    console.step("Loading configuration...");
    let config = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Opens a file, or stdin when no path is given.
fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    Ok(match path {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(io::stdin()),
    })
}

async fn search(
    config: Config,
    libraries: Vec<String>,
    input: Option<PathBuf>,
    log: Option<PathBuf>,
    console: &Console,
) -> Result<()> {
    let log_path = log.unwrap_or_else(|| config.batch.progress_log.clone());
    let cursor = ProgressCursor::recover(&log_path)
        .with_context(|| format!("Failed to read previous report {}", log_path.display()))?;
    let books = read_books(open_input(input.as_deref())?);

    console.step("Launching browser...");
    let session = ChromeSession::launch(&config.browser)
        .await
        .context("Failed to start browser")?;
    let loader = ResilientLoader::new(session, config.loader.clone());
    let mut client = LibrarySearchClient::new(loader, Box::new(LibbySite::new()));
    console.success(&format!(
        "Searching {} at {}",
        client.site_name(),
        libraries.join(", ")
    ));

    let outcome = {
        let mut driver = BatchDriver::new(&mut client, libraries, io::stdout().lock(), console.clone())
            .heartbeat_every(config.batch.heartbeat_every);
        driver.run(books, cursor).await
    };

    // Release the browser whether or not the batch finished
    if let Err(e) = client.close().await {
        console.warning(&format!("Failed to close browser: {}", e));
    }

    outcome.context("Batch stopped; rerun to resume after the last reported book")?;
    Ok(())
}

async fn shelf(config: Config, url: &str) -> Result<()> {
    let reader = GoodreadsShelf::new(config.shelf).context("Failed to create HTTP client")?;
    let books = reader
        .read_all(url)
        .await
        .context("Failed to read shelf")?;

    write_books(io::stdout().lock(), books).context("Failed to write book list")?;
    Ok(())
}

fn stats(report: Option<&Path>) -> Result<()> {
    let reader = BufReader::new(open_input(report)?);
    let scan = ReportScan::read(reader).context("Failed to read report")?;
    println!("{}", Summary::from_scan(&scan));
    Ok(())
}
