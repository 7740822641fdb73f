//! Traversal engine
//!
//! The engine drives a breadth-first crawl from the seeds:
//! - Seeds are queued unconditionally
//! - Up to `Fetcher::concurrency()` fetches run at once
//! - Failed fetches become broken-link records with their provenance
//! - Successful in-scope pages feed their anchors back through the scope
//!   filter into the frontier
//!
//! The engine task is the only consumer of fetch results and the only
//! producer of frontier entries, so the crawl ends exactly when the frontier
//! is empty and nothing is in flight.

use crate::config::SeedSpec;
use crate::crawler::fetcher::{FetchResult, Fetcher, RequestHeaders};
use crate::crawler::frontier::{Admission, Frontier, FrontierEntry};
use crate::crawler::parser::ParsedPage;
use crate::crawler::scope::{is_in_scope, page_in_scope};
use crate::output::{BrokenLinkRecord, CrawlReport, LinkStatus, ResultSink, TransportErrorKind};
use crate::url::normalize_parsed;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{Id, JoinSet};
use url::Url;

/// Language used when neither an override nor the page declares one
pub const DEFAULT_LANGUAGE: &str = "en";

/// Completed fetches between progress log lines
const PROGRESS_INTERVAL: u64 = 25;

/// Broken-link crawl over one seed specification
pub struct Engine {
    spec: Arc<SeedSpec>,
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn ResultSink>,
    frontier: Frontier,
    report: CrawlReport,
}

impl Engine {
    pub fn new(spec: SeedSpec, fetcher: Arc<dyn Fetcher>, sink: Arc<dyn ResultSink>) -> Self {
        Self {
            spec: Arc::new(spec),
            fetcher,
            sink,
            frontier: Frontier::new(),
            report: CrawlReport::default(),
        }
    }

    /// Runs the crawl to completion and returns its statistics
    ///
    /// Broken links are streamed to the sink as they are found; the sink is
    /// finished before this returns.
    pub async fn run(mut self) -> CrawlReport {
        let started = Instant::now();

        let seed_language = self
            .spec
            .accept_language()
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string();
        for seed in self.spec.seeds() {
            self.frontier
                .try_enqueue(FrontierEntry::seed(seed.clone(), seed_language.clone()));
        }

        let limit = self.fetcher.concurrency().max(1);
        tracing::info!(
            "Starting crawl from {} seed(s) with concurrency {}",
            self.spec.seeds().len(),
            limit
        );

        let mut in_flight: JoinSet<FetchResult> = JoinSet::new();
        let mut pending: HashMap<Id, FrontierEntry> = HashMap::new();

        loop {
            while in_flight.len() < limit {
                let Some(entry) = self.frontier.pop() else {
                    break;
                };
                let fetcher = self.fetcher.clone();
                let url = entry.target.clone();
                let headers = RequestHeaders::with_language(entry.accept_language.clone());
                tracing::debug!("Fetching {} (depth {})", url, entry.depth);

                let handle = in_flight.spawn(async move { fetcher.fetch(&url, &headers).await });
                pending.insert(handle.id(), entry);
            }

            let Some(joined) = in_flight.join_next_with_id().await else {
                break;
            };

            let (id, result) = match joined {
                Ok((id, result)) => (id, result),
                Err(e) => {
                    tracing::error!("Fetch task failed: {}", e);
                    let failure = FetchResult::Failure {
                        status: LinkStatus::Transport(TransportErrorKind::Internal),
                    };
                    (e.id(), failure)
                }
            };

            let Some(entry) = pending.remove(&id) else {
                continue;
            };
            self.handle_result(entry, result);

            if self.report.pages_fetched > 0
                && self.report.pages_fetched % PROGRESS_INTERVAL == 0
            {
                let elapsed = started.elapsed();
                let rate = self.report.pages_fetched as f64 / elapsed.as_secs_f64().max(1e-9);
                tracing::info!(
                    "Progress: {} fetched, {} broken, {} queued, {} in flight, {:.2} pages/sec",
                    self.report.pages_fetched,
                    self.report.broken_links,
                    self.frontier.len(),
                    in_flight.len(),
                    rate
                );
            }
        }

        if let Err(e) = self.sink.finish() {
            tracing::error!("Failed to finish result output: {}", e);
        }

        self.report.elapsed = started.elapsed();
        tracing::info!(
            "Crawl complete: {} distinct URLs, {} fetched, {} broken, {} skipped by robots.txt in {:.1}s",
            self.frontier.seen_count(),
            self.report.pages_fetched,
            self.report.broken_links,
            self.report.robots_skipped,
            self.report.elapsed.as_secs_f64()
        );

        self.report
    }

    fn handle_result(&mut self, entry: FrontierEntry, result: FetchResult) {
        match result {
            FetchResult::Disallowed => {
                self.report.robots_skipped += 1;
                tracing::debug!("Skipped {} (disallowed by robots.txt)", entry.target);
            }
            FetchResult::Failure { status } => {
                self.report.pages_fetched += 1;
                self.emit_broken(entry, status);
            }
            FetchResult::Success {
                final_url, page, ..
            } => {
                self.report.pages_fetched += 1;
                self.report.pages_ok += 1;

                if !entry.is_seed() && !page_in_scope(&final_url, &self.spec) {
                    tracing::debug!(
                        "Not scanning {}: redirected off the allowed domains to {}",
                        entry.target,
                        final_url
                    );
                    return;
                }
                self.discover(&entry, &final_url, page);
            }
        }
    }

    fn emit_broken(&mut self, entry: FrontierEntry, status: LinkStatus) {
        let record = BrokenLinkRecord {
            url: entry.target.to_string(),
            previous_page: entry
                .referrer
                .as_ref()
                .map(Url::to_string)
                .unwrap_or_default(),
            previous_link_href: entry.anchor_href,
            previous_link_text: entry.anchor_text,
            status,
        };

        tracing::warn!(
            "Broken link {} ({}) found on {}",
            record.url,
            record.status,
            if record.previous_page.is_empty() {
                "<seed>"
            } else {
                record.previous_page.as_str()
            }
        );

        self.report.broken_links += 1;
        if let Err(e) = self.sink.record(&record) {
            tracing::error!("Failed to record broken link {}: {}", record.url, e);
        }
    }

    /// Feeds a page's anchors through the scope filter into the frontier
    fn discover(&mut self, entry: &FrontierEntry, final_url: &Url, page: ParsedPage) {
        let language = self
            .spec
            .accept_language()
            .map(str::to_string)
            .or(page.lang)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let depth = entry.depth + 1;

        for anchor in page.anchors {
            if !is_in_scope(&anchor.href, depth, &self.spec) {
                self.report.out_of_scope += 1;
                continue;
            }

            let target = match resolve_link(final_url, &anchor.href) {
                Ok(target) => target,
                Err(e) => {
                    self.report.out_of_scope += 1;
                    tracing::trace!("Skipping {:?} on {}: {}", anchor.href, final_url, e);
                    continue;
                }
            };

            let child = FrontierEntry {
                target,
                referrer: Some(final_url.clone()),
                anchor_href: anchor.href,
                anchor_text: anchor.text,
                depth,
                accept_language: language.clone(),
            };

            if self.frontier.try_enqueue(child) == Admission::AlreadySeen {
                self.report.duplicates += 1;
            }
        }
    }
}

/// Joins an href onto the page URL, dropping any fragment
///
/// The result is the URL as linked; it must also survive normalization so
/// the frontier can key it.
fn resolve_link(page_url: &Url, href: &str) -> Result<Url, String> {
    let mut target = page_url.join(href.trim()).map_err(|e| e.to_string())?;
    target.set_fragment(None);
    normalize_parsed(target.clone()).map_err(|e| e.to_string())?;
    Ok(target)
}
