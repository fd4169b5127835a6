//! Crawl engine - main traversal orchestration logic
//!
//! This module contains the concurrent breadth-first walk, including:
//! - Seeding the visited set and the work pool with the root URL
//! - Fetching, parsing and emitting one record per page
//! - Filtering and claiming discovered links
//! - Halt-on-error, external stop, and clean shutdown of the output stream

use crate::config::{Config, MalformedLinkPolicy};
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::parser::{extract_assets, extract_links};
use crate::crawler::scheduler::{WorkItem, WorkPool};
use crate::output::{log_summary, CrawlRecord, CrawlSummary, OutputError, ResultSink, SinkHandle, SinkSession};
use crate::state::{TraversalControl, TraversalState, VisitedSet};
use crate::url::{canonical_url, is_same_host, normalize_url};
use crate::{CrawlError, UrlError};
use std::fmt::Display;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Cloneable handle for stopping a crawl from outside
///
/// Stopping moves the run to `StopRequested`: queued work is skipped,
/// in-flight fetches are abandoned without emitting, and the output stream
/// is closed normally.
#[derive(Debug, Clone)]
pub struct StopHandle {
    control: Arc<TraversalControl>,
}

impl StopHandle {
    /// Requests that the crawl stop
    ///
    /// # Returns
    ///
    /// * `true` - The run was running and is now stopping
    /// * `false` - The run had already finished or been halted
    pub fn stop(&self) -> bool {
        let stopped = self.control.transition(TraversalState::StopRequested);
        if stopped {
            tracing::info!("Stop requested, draining in-flight work");
        }
        stopped
    }

    /// Returns the current state of the run
    pub fn state(&self) -> TraversalState {
        self.control.state()
    }
}

/// Per-run counters shared by all workers
#[derive(Debug, Default)]
struct RunCounters {
    emitted: AtomicUsize,
    errors: AtomicUsize,
}

/// Everything a work item needs, shared by all tasks of one run
struct Worker<F> {
    config: Arc<Config>,
    fetcher: Arc<F>,
    control: Arc<TraversalControl>,
    visited: Arc<VisitedSet>,
    sink: SinkHandle,
    counters: RunCounters,
}

impl<F: Fetcher> Worker<F> {
    /// Processes one work item
    ///
    /// This method:
    /// 1. Returns immediately if the run is no longer running
    /// 2. Normalizes and fetches the URL, racing the fetch against a stop/halt
    /// 3. Parses the page and emits its record
    /// 4. Filters and claims the page's links
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<WorkItem>)` - Links this item won, to be dispatched
    /// * `Err(OutputError)` - The sink failed; the run cannot continue
    async fn execute(&self, item: WorkItem) -> Result<Vec<WorkItem>, OutputError> {
        if !self.control.is_running() {
            tracing::trace!("Skipping {}: crawl is {}", item.url, self.control.state());
            return Ok(Vec::new());
        }

        let url = normalize_url(&item.url, self.config.normalize_urls);
        tracing::debug!("Fetching {}", url);

        let timeout = self.config.timeout;
        let fetched = tokio::select! {
            biased;

            _ = self.control.terminated() => {
                tracing::debug!("Abandoning {}: crawl is {}", url, self.control.state());
                return Ok(Vec::new());
            }

            result = tokio::time::timeout(timeout, self.fetcher.get_page(&url, timeout)) => {
                result.unwrap_or_else(|_| Err(FetchError::Timeout { url: url.clone() }))
            }
        };

        let document = match fetched {
            Ok(document) => document,
            Err(e) => {
                self.fail(&url, &e, true);
                return Ok(Vec::new());
            }
        };

        let assets = extract_assets(&document);
        let links = extract_links(&document);

        // A halt that landed during the fetch suppresses this record
        if !self.control.is_running() {
            return Ok(Vec::new());
        }

        self.sink.emit(&CrawlRecord::new(url.clone(), assets))?;
        self.counters.emitted.fetch_add(1, Ordering::SeqCst);

        match self.expand_links(&url, links) {
            Ok(children) => Ok(children),
            Err(e) => {
                // Already counted and reported per link
                tracing::debug!("Not following links of {}: {}", url, e);
                Ok(Vec::new())
            }
        }
    }

    /// Turns a page's links into new work
    ///
    /// Each link is normalized and checked against the configured host;
    /// cross-host links are dropped silently. Links that survive are claimed
    /// in the visited set, and every claim this call wins becomes a
    /// [`WorkItem`].
    ///
    /// A link that is malformed or not http(s) (`tel:`, `javascript:`) is
    /// counted and reported, then dropped. With halt-on-error and
    /// [`MalformedLinkPolicy::Escalate`] it also halts the run and the error
    /// is returned before any link of the page is claimed.
    fn expand_links(&self, from: &str, links: Vec<String>) -> Result<Vec<WorkItem>, UrlError> {
        let escalate = self.config.malformed_links == MalformedLinkPolicy::Escalate;
        let mut same_host = Vec::with_capacity(links.len());

        for link in links {
            let link = normalize_url(&link, self.config.normalize_urls);
            match is_same_host(&link, &self.config.host) {
                Ok(true) => same_host.push(link),
                Ok(false) => {
                    tracing::trace!("Dropping cross-host link {} on {}", link, from);
                }
                Err(e) => {
                    self.fail(&link, &e, escalate);
                    if escalate && self.config.halt_on_error {
                        return Err(e);
                    }
                }
            }
        }

        let mut children = Vec::new();
        for link in same_host {
            if self.visited.try_visit(&link) {
                tracing::trace!("Claimed {}", link);
                children.push(WorkItem::new(link));
            }
        }

        Ok(children)
    }

    /// Records a per-URL or per-link error
    ///
    /// The error is counted, reported on the diagnostic channel, and, when
    /// `halts` is set and halt-on-error is enabled, halts the run.
    fn fail(&self, url: &str, error: &dyn Display, halts: bool) {
        self.counters.errors.fetch_add(1, Ordering::SeqCst);

        if self.config.print_errors {
            tracing::error!("Error with url {}: {}", url, error);
        } else {
            tracing::debug!("Error with url {}: {}", url, error);
        }

        if halts && self.config.halt_on_error && self.control.transition(TraversalState::HaltedOnError) {
            tracing::info!("Halting crawl after error on {}", url);
        }
    }
}

/// Main crawl engine structure
///
/// One engine drives one run. Obtain a [`StopHandle`] before calling
/// [`CrawlEngine::run`] to be able to stop it.
pub struct CrawlEngine<F> {
    config: Arc<Config>,
    fetcher: Arc<F>,
    control: Arc<TraversalControl>,
}

impl<F: Fetcher + 'static> CrawlEngine<F> {
    /// Creates a new engine
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `fetcher` - Source of documents
    pub fn new(config: Config, fetcher: F) -> Self {
        Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
            control: Arc::new(TraversalControl::new()),
        }
    }

    /// Returns the configuration this engine runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a handle that can stop the run from any task or thread
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            control: self.control.clone(),
        }
    }

    /// Runs the crawl to completion
    ///
    /// This is the core crawling logic that:
    /// 1. Opens the sink (setup)
    /// 2. Claims the root URL (under its canonical form, which is how links
    ///    to it appear) and dispatches it as given
    /// 3. Reaps finished work and dispatches the links it won, while the run
    ///    is still running
    /// 4. Marks the run exhausted once no work is outstanding
    /// 5. Closes the sink (teardown), on every exit path
    ///
    /// Per-URL failures never fail the run; they are counted in the summary.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The run finished (exhausted, stopped, or halted)
    /// * `Err(CrawlError::Output)` - The sink failed to open, write or close
    pub async fn run<S: ResultSink + 'static>(self, sink: S) -> Result<CrawlSummary, CrawlError> {
        let session = SinkSession::open(Box::new(sink))?;

        tracing::info!(
            "Starting crawl of {} (host {}, concurrency {})",
            self.config.root_url,
            self.config.host,
            self.config.concurrency
        );

        let visited = Arc::new(VisitedSet::new());
        let root = normalize_url(&self.config.root_url, self.config.normalize_urls);
        visited.try_visit(&canonical_url(&root));

        let worker = Arc::new(Worker {
            config: self.config.clone(),
            fetcher: self.fetcher.clone(),
            control: self.control.clone(),
            visited: visited.clone(),
            sink: session.handle(),
            counters: RunCounters::default(),
        });

        let mut pool = WorkPool::new(self.config.concurrency);
        dispatch(&mut pool, &worker, WorkItem::new(root));

        let mut sink_error = None;

        while let Some(joined) = pool.next_completed().await {
            match joined {
                Ok(Ok(children)) => {
                    if !self.control.is_running() {
                        continue;
                    }
                    for child in children {
                        dispatch(&mut pool, &worker, child);
                    }
                    tracing::trace!("{} work items outstanding", pool.outstanding());
                }
                Ok(Err(e)) => {
                    tracing::error!("Output failed, halting crawl: {}", e);
                    self.control.transition(TraversalState::HaltedOnError);
                    sink_error.get_or_insert(e);
                }
                Err(e) => {
                    worker.fail("<worker task>", &e, true);
                }
            }
        }

        // No-op unless the run is still running, i.e. the work ran out
        self.control.transition(TraversalState::Exhausted);

        let summary = CrawlSummary {
            state: self.control.state(),
            pages_emitted: worker.counters.emitted.load(Ordering::SeqCst),
            errors: worker.counters.errors.load(Ordering::SeqCst),
            visited: visited.len(),
        };
        log_summary(&summary);

        if let Some(e) = sink_error {
            // Dropping the session still attempts teardown
            drop(session);
            return Err(e.into());
        }

        session.close()?;
        Ok(summary)
    }
}

/// Spawns one work item onto the pool
fn dispatch<F: Fetcher + 'static>(
    pool: &mut WorkPool<Result<Vec<WorkItem>, OutputError>>,
    worker: &Arc<Worker<F>>,
    item: WorkItem,
) {
    let worker = worker.clone();
    pool.dispatch(async move { worker.execute(item).await });
}
