//! Crawler module for page fetching and crawl coordination
//!
//! This module contains the core crawling logic, including:
//! - Task kinds and the deduplicating frontier
//! - HTTP fetching
//! - The worker pool and its dispatch loop
//! - The shared result collector

mod collector;
mod coordinator;
mod fetcher;
mod frontier;
mod task;

pub use collector::ResultCollector;
pub use coordinator::{Coordinator, CrawlOutcome};
pub use fetcher::{build_http_client, fetch_url, FetchedPage};
pub use frontier::{Frontier, Lease, Pop};
pub use task::{Task, TaskKind};

use crate::config::Config;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the settings, then build the HTTP client and extractor
/// 2. Seed the frontier with the configured URL
/// 3. Run the worker pool until the frontier drains
/// 4. Return the collected records and statistics
///
/// # Example
///
/// ```no_run
/// use catalog_crawler::config::Config;
/// use catalog_crawler::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let outcome = crawl(&Config::default()).await?;
/// println!("{} records", outcome.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config) -> Result<CrawlOutcome, CrawlError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.seed(&config.crawler.seed_url, config.crawler.seed_kind)?;
    coordinator.run().await
}
