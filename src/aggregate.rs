//! Merging offers for one book across libraries.
//!
//! Offers for the same edition (same normalized title and author, and the
//! same text/audio kind) collapse into one entry holding the soonest wait.
//! Offers whose wait text can't be ranked are kept under their own key so
//! they still show up in the report without winning or losing anything.

use crate::books::BookQuery;
use crate::console::Console;
use crate::error::{MalformedWaitTime, SearchError};
use crate::search::{LibraryOffer, OfferSource, RawOffer};
use crate::wait_time::to_ordinal;
use std::collections::HashMap;
use std::fmt;

/// Deduplication key for offers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OfferIdentity {
    /// A specific edition of a specific book.
    Edition {
        title: String,
        author: String,
        audio: bool,
    },

    /// An offer with an unreadable wait, numbered in arrival order.
    Unranked(usize),
}

impl OfferIdentity {
    /// Identity of a rankable offer.
    pub fn of(offer: &RawOffer) -> Self {
        Self::Edition {
            title: offer.title.clone(),
            author: offer.author.clone(),
            audio: offer.is_audio(),
        }
    }
}

impl fmt::Display for OfferIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edition {
                title,
                author,
                audio,
            } => {
                let kind = if *audio { "audio" } else { "text" };
                write!(f, "{} + {} + {}", title, author, kind)
            }
            Self::Unranked(n) => write!(f, "unranked #{}", n),
        }
    }
}

/// What [`AggregatedResult::merge`] did with an offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// First offer for its edition.
    Inserted,
    /// Sooner than the stored offer, which it replaced.
    Replaced,
    /// Not sooner than the stored offer; dropped.
    Discarded,
    /// Wait text couldn't be ranked; stored under its own key.
    Unranked(MalformedWaitTime),
}

#[derive(Debug, Clone)]
struct Entry {
    identity: OfferIdentity,
    ordinal: Option<i64>,
    offer: LibraryOffer,
}

/// Best offer per edition for a single book, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct AggregatedResult {
    entries: Vec<Entry>,
    index: HashMap<OfferIdentity, usize>,
    unranked: usize,
}

impl AggregatedResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of surviving offers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no library had anything.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Surviving offers in first-seen order.
    pub fn offers(&self) -> impl Iterator<Item = &LibraryOffer> {
        self.entries.iter().map(|e| &e.offer)
    }

    /// Looks up the offer stored under `identity`.
    pub fn get(&self, identity: &OfferIdentity) -> Option<&LibraryOffer> {
        self.index.get(identity).map(|&i| &self.entries[i].offer)
    }

    /// Merges one offer, keeping only the soonest per edition.
    ///
    /// A replacement happens only when the new wait is strictly sooner, so
    /// on ties the earlier library wins.
    pub fn merge(&mut self, offer: LibraryOffer) -> MergeOutcome {
        let ordinal = match to_ordinal(&offer.offer.wait) {
            Ok(ordinal) => ordinal,
            Err(malformed) => {
                let identity = OfferIdentity::Unranked(self.unranked);
                self.unranked += 1;
                self.push(identity, None, offer);
                return MergeOutcome::Unranked(malformed);
            }
        };

        let identity = OfferIdentity::of(&offer.offer);
        let Some(i) = self.index.get(&identity).copied() else {
            self.push(identity, Some(ordinal), offer);
            return MergeOutcome::Inserted;
        };

        let stored = &mut self.entries[i];
        if stored.ordinal.is_some_and(|current| ordinal < current) {
            stored.ordinal = Some(ordinal);
            stored.offer = offer;
            MergeOutcome::Replaced
        } else {
            MergeOutcome::Discarded
        }
    }

    fn push(&mut self, identity: OfferIdentity, ordinal: Option<i64>, offer: LibraryOffer) {
        self.index.insert(identity.clone(), self.entries.len());
        self.entries.push(Entry {
            identity,
            ordinal,
            offer,
        });
    }

    /// Identities in first-seen order.
    pub fn identities(&self) -> impl Iterator<Item = &OfferIdentity> {
        self.entries.iter().map(|e| &e.identity)
    }
}

/// Collects the best offers for `book` from every library, in order.
///
/// Search failures are not caught: a book is either fully aggregated or
/// the error is returned and nothing is reported for it.
pub async fn aggregate<O>(
    source: &mut O,
    book: &BookQuery,
    libraries: &[String],
    console: &Console,
) -> Result<AggregatedResult, SearchError>
where
    O: OfferSource + ?Sized,
{
    let mut result = AggregatedResult::new();

    for library in libraries {
        let offers = source.search(&book.author, &book.title, library).await?;
        for offer in offers {
            let merged = result.merge(LibraryOffer {
                offer,
                library: library.clone(),
            });
            if let MergeOutcome::Unranked(malformed) = merged {
                console.warning(&format!(
                    "{} ({}: {} at {}); keeping it unranked",
                    malformed, book.author, book.title, library
                ));
            }
        }
    }

    Ok(result)
}
