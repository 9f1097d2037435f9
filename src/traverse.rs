//! Walks an event chain oldest-link by oldest-link, turning each page into
//! output rows.
//!
//! Strictly sequential: the next URL is only known once the current page has
//! been parsed. A failed fetch or parse ends the chain but keeps every row
//! gathered up to that point.

use std::collections::HashSet;
use std::time::Instant;

use tokio::sync::watch;
use tracing::{error, info, warn};
use url::Url;

use crate::error::Error;
use crate::fetch::PageSource;
use crate::parse::EventParser;
use crate::record::OutputRow;

/// Terminal state of a traversal.
#[derive(Debug)]
pub enum ChainStatus {
    /// The chain ended normally: no older-event link, a detected cycle, or
    /// an external cancellation.
    Done,
    /// A fetch or parse failed; `rows` holds the partial result.
    Failed { url: String, error: Error },
}

#[derive(Debug)]
pub struct TraverseOutcome {
    pub rows: Vec<OutputRow>,
    pub events_visited: usize,
    pub status: ChainStatus,
}

impl TraverseOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, ChainStatus::Failed { .. })
    }
}

/// Drives repeated fetch -> parse -> follow-link steps from a seed URL.
pub struct Traverser<S> {
    source: S,
    parser: EventParser,
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl<S: PageSource> Traverser<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            parser: EventParser::new(),
            cancel: None,
            deadline: None,
        }
    }

    /// Stop between steps once the watched flag flips to `true`.
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Stop between steps once the deadline has passed.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Give the page source back so the caller can release it.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Traverse the chain starting at `seed`, following older-event links
    /// until none remains, a visited URL comes back around, or a step fails.
    pub async fn run(&mut self, seed: &Url) -> TraverseOutcome {
        let mut rows: Vec<OutputRow> = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut events_visited = 0usize;
        let mut current = seed.clone();

        let status = loop {
            if self.stop_requested() {
                warn!(url = %current, "traversal cancelled before end of chain");
                break ChainStatus::Done;
            }

            visited.insert(current.to_string());

            let page = match self.source.fetch(&current).await {
                Ok(page) => page,
                Err(error) => {
                    error!(url = %current, %error, "fetch failed, ending chain");
                    break ChainStatus::Failed {
                        url: current.to_string(),
                        error,
                    };
                }
            };
            // The browser may have landed on a redirected URL; count it as
            // visited too so a link back to either form stops the chain.
            visited.insert(page.url.to_string());

            let parsed = match self.parser.parse(&page) {
                Ok(parsed) => parsed,
                Err(error) => {
                    error!(url = %page.url, %error, "parse failed, ending chain");
                    break ChainStatus::Failed {
                        url: page.url.to_string(),
                        error,
                    };
                }
            };

            events_visited += 1;
            info!(
                url = %page.url,
                title = %parsed.event.title,
                contributions = parsed.contributions.len(),
                "extracted event"
            );
            rows.extend(
                parsed
                    .contributions
                    .iter()
                    .map(|c| OutputRow::flatten(&parsed.event, c)),
            );

            match parsed.next_url {
                Some(next) if visited.contains(next.as_str()) => {
                    info!(url = %next, "older-event link cycles back, stopping");
                    break ChainStatus::Done;
                }
                Some(next) => current = next,
                None => {
                    info!("no older-event link, chain complete");
                    break ChainStatus::Done;
                }
            }
        };

        TraverseOutcome {
            rows,
            events_visited,
            status,
        }
    }

    fn stop_requested(&self) -> bool {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return true;
            }
        }
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }
}
