//! Output module for exporting crawl results
//!
//! This module handles:
//! - Writing collected records to a delimited tabular file
//! - Recording and printing crawl statistics

mod export;
pub mod stats;

pub use export::{columns, export_records, timestamped_path, LIST_SEPARATOR};
pub use stats::{print_statistics, CrawlStatistics, CrawlStats, KindStatistics};
