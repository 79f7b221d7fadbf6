//! Crawler coordinator - worker pool and task dispatch
//!
//! This module owns the crawl's shared state and runs the worker pool:
//! - Seeding the frontier
//! - Spawning a fixed number of workers
//! - Dispatching each task by kind (home → category → product → variation)
//! - Containing per-task failures so one bad page never stops the pool
//! - Detecting termination and handing the collected records back

use crate::config::{validate, Config, TerminationPolicy};
use crate::crawler::collector::ResultCollector;
use crate::crawler::fetcher::{build_http_client, fetch_url};
use crate::crawler::frontier::{Frontier, Pop};
use crate::crawler::task::{Task, TaskKind};
use crate::extract::Extractor;
use crate::output::{CrawlStatistics, CrawlStats};
use crate::record::Record;
use crate::url::normalize_url;
use crate::{CrawlError, ExtractError};
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Emit a progress line every this many finished tasks
const PROGRESS_INTERVAL: u64 = 25;

/// Everything a crawl produced
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Collected records, in append order
    pub records: Vec<Record>,

    /// Final counters
    pub statistics: CrawlStatistics,

    /// Wall-clock time from the first worker start to the last worker exit
    pub elapsed: Duration,
}

/// State shared by every worker
struct CrawlContext {
    frontier: Frontier,
    collector: ResultCollector,
    stats: CrawlStats,
    client: Client,
    extractor: Extractor,
    idle_timeout: Duration,
    termination: TerminationPolicy,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    context: Arc<CrawlContext>,
    workers: usize,
}

impl Coordinator {
    /// Creates a coordinator with an empty frontier
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlError)` - Invalid settings, or the HTTP client or the extractor could not be built
    pub fn new(config: &Config) -> Result<Self, CrawlError> {
        validate(config)?;

        let client = build_http_client(&config.fetcher)?;
        let extractor = Extractor::new()?;

        Ok(Self {
            context: Arc::new(CrawlContext {
                frontier: Frontier::new(),
                collector: ResultCollector::new(),
                stats: CrawlStats::new(),
                client,
                extractor,
                idle_timeout: Duration::from_millis(config.crawler.idle_timeout_ms),
                termination: config.crawler.termination,
            }),
            workers: config.crawler.workers,
        })
    }

    /// Places a starting task on the frontier
    ///
    /// Returns false if the URL was already seeded.
    pub fn seed(&self, url: &str, kind: TaskKind) -> Result<bool, CrawlError> {
        let url = normalize_url(url)?;
        Ok(self.context.offer(&url, kind))
    }

    /// Runs the worker pool until the crawl terminates
    ///
    /// Per-task failures are logged and counted, never returned. A worker
    /// that panics is logged and the remaining workers carry on.
    pub async fn run(self) -> Result<CrawlOutcome, CrawlError> {
        tracing::info!(
            "Starting crawl with {} workers ({} seed tasks, idle timeout {:?}, {:?} termination)",
            self.workers,
            self.context.frontier.pending(),
            self.context.idle_timeout,
            self.context.termination
        );
        let started = Instant::now();

        let handles: Vec<_> = (0..self.workers)
            .map(|id| tokio::spawn(worker_loop(id, self.context.clone())))
            .collect();

        for (id, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!("Worker {} terminated abnormally: {}", id, e);
            }
        }

        let elapsed = started.elapsed();
        let records = self.context.collector.take();
        tracing::info!(
            "Crawl completed: {} tasks, {} records in {:?}",
            self.context.stats.tasks_completed(),
            records.len(),
            elapsed
        );

        Ok(CrawlOutcome {
            records,
            statistics: self.context.stats.snapshot(),
            elapsed,
        })
    }
}

/// One worker: pop, dispatch, repeat until the frontier says stop
async fn worker_loop(id: usize, context: Arc<CrawlContext>) {
    tracing::debug!("Worker {} started", id);

    loop {
        let lease = match context.frontier.pop(context.idle_timeout).await {
            Pop::Task(lease) => lease,
            Pop::Drained => {
                tracing::debug!("Worker {}: frontier drained, exiting", id);
                break;
            }
            Pop::Idle => match context.termination {
                TerminationPolicy::Idle => {
                    tracing::debug!("Worker {}: idle timeout reached, exiting", id);
                    break;
                }
                TerminationPolicy::Drain => {
                    tracing::trace!(
                        "Worker {}: idle, {} task(s) still in flight",
                        id,
                        context.frontier.in_flight()
                    );
                    continue;
                }
            },
        };

        context.process(&lease).await;

        let finished = context.stats.record_completed(lease.kind);
        if finished % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                "Progress: {} tasks processed, {} queued, {} records",
                finished,
                context.frontier.pending(),
                context.collector.len()
            );
        }
    }
}

impl CrawlContext {
    /// Processes one task, logging and counting any failure
    async fn process(&self, task: &Task) {
        let result = match task.kind {
            TaskKind::Home => self.process_home(task).await,
            TaskKind::Category => self.process_category(task).await,
            TaskKind::Product => self.process_product(task).await,
            TaskKind::ProductVariation => self.process_variation(task).await,
        };

        match result {
            Ok(()) => {}
            Err(CrawlError::Extract(e)) => {
                self.stats.record_extract_failure(task.kind);
                tracing::warn!("Failed to extract {} {}: {}", task.kind, task.url, e);
            }
            Err(e) => {
                self.stats.record_fetch_failure(task.kind);
                tracing::warn!("Error processing {} {}: {}", task.kind, task.url, e);
            }
        }
    }

    async fn process_home(&self, task: &Task) -> Result<(), CrawlError> {
        let (base, body) = self.fetch(task).await?;

        let categories = self.extractor.extract_home(&body, &base);
        let added = self.offer_all(categories, TaskKind::Category);

        tracing::info!("Processed home {} ({} new categories)", task.url, added);
        Ok(())
    }

    async fn process_category(&self, task: &Task) -> Result<(), CrawlError> {
        let (base, body) = self.fetch(task).await?;

        let links = self.extractor.extract_category(&body, &base);
        let mut added = self.offer_all(links.subcategories, TaskKind::Category);
        // Pagination chains end only when a page stops offering "load more"
        added += self.offer_all(links.next_page, TaskKind::Category);
        added += self.offer_all(links.products, TaskKind::Product);

        tracing::info!("Processed category {} ({} new tasks)", task.url, added);
        Ok(())
    }

    async fn process_product(&self, task: &Task) -> Result<(), CrawlError> {
        let (base, body) = self.fetch(task).await?;

        let page = self.extractor.extract_product(&body, &base);
        let variations = self.offer_all(page.variations, TaskKind::ProductVariation);

        let record = page.record.ok_or(ExtractError::MissingProduct)?;
        self.collect(record);

        tracing::info!("Processed product {} ({} new variations)", task.url, variations);
        Ok(())
    }

    async fn process_variation(&self, task: &Task) -> Result<(), CrawlError> {
        let (_, body) = self.fetch(task).await?;

        let record = self.extractor.extract_variation(&body)?;
        self.collect(record);

        tracing::info!("Processed product variation {}", task.url);
        Ok(())
    }

    /// Fetches the task's page; the returned URL is the redirect target, if any
    async fn fetch(&self, task: &Task) -> Result<(Url, String), CrawlError> {
        let page = fetch_url(&self.client, &task.url).await?;
        Ok((page.final_url, page.body))
    }

    fn offer(&self, url: &Url, kind: TaskKind) -> bool {
        let enqueued = self.frontier.offer(url.as_str(), kind);
        self.stats.record_offer(enqueued);
        enqueued
    }

    /// Offers every URL as `kind` and returns how many became new tasks
    fn offer_all(&self, urls: impl IntoIterator<Item = Url>, kind: TaskKind) -> usize {
        urls.into_iter()
            .filter(|url| self.offer(url, kind))
            .count()
    }

    fn collect(&self, record: Record) {
        self.collector.append(record);
        self.stats.record_collected();
    }
}
