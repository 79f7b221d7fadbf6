//! Crawl statistics
//!
//! Workers bump lock-free counters while the crawl runs; the final
//! [`CrawlStatistics`] snapshot is printed once the pool has joined.

use crate::crawler::TaskKind;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
struct KindCounters {
    completed: AtomicU64,
    fetch_failures: AtomicU64,
    extract_failures: AtomicU64,
}

/// Live counters shared by all workers
#[derive(Debug, Default)]
pub struct CrawlStats {
    kinds: [KindCounters; 4],
    records: AtomicU64,
    offered: AtomicU64,
    enqueued: AtomicU64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a finished task and returns the total finished so far
    pub fn record_completed(&self, kind: TaskKind) -> u64 {
        self.kinds[kind.index()]
            .completed
            .fetch_add(1, Ordering::Relaxed);
        self.tasks_completed()
    }

    pub fn record_fetch_failure(&self, kind: TaskKind) {
        self.kinds[kind.index()]
            .fetch_failures
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_extract_failure(&self, kind: TaskKind) {
        self.kinds[kind.index()]
            .extract_failures
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_collected(&self) {
        self.records.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a discovered link and whether it produced a new task
    pub fn record_offer(&self, enqueued: bool) {
        self.offered.fetch_add(1, Ordering::Relaxed);
        if enqueued {
            self.enqueued.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn tasks_completed(&self) -> u64 {
        self.kinds
            .iter()
            .map(|k| k.completed.load(Ordering::Relaxed))
            .sum()
    }

    pub fn snapshot(&self) -> CrawlStatistics {
        let by_kind = TaskKind::ALL
            .iter()
            .map(|&kind| {
                let counters = &self.kinds[kind.index()];
                (
                    kind,
                    KindStatistics {
                        completed: counters.completed.load(Ordering::Relaxed),
                        fetch_failures: counters.fetch_failures.load(Ordering::Relaxed),
                        extract_failures: counters.extract_failures.load(Ordering::Relaxed),
                    },
                )
            })
            .collect();

        CrawlStatistics {
            by_kind,
            records: self.records.load(Ordering::Relaxed),
            links_offered: self.offered.load(Ordering::Relaxed),
            tasks_enqueued: self.enqueued.load(Ordering::Relaxed),
        }
    }
}

/// Per task kind totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindStatistics {
    pub completed: u64,
    pub fetch_failures: u64,
    pub extract_failures: u64,
}

impl KindStatistics {
    pub fn failures(&self) -> u64 {
        self.fetch_failures + self.extract_failures
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Totals for every task kind, in dispatch order
    pub by_kind: Vec<(TaskKind, KindStatistics)>,

    /// Records appended to the collector
    pub records: u64,

    /// Links handed to the dedup gate, including repeats
    pub links_offered: u64,

    /// Links that became tasks
    pub tasks_enqueued: u64,
}

impl CrawlStatistics {
    pub fn kind(&self, kind: TaskKind) -> KindStatistics {
        self.by_kind
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, s)| *s)
            .unwrap_or_default()
    }

    pub fn tasks_completed(&self) -> u64 {
        self.by_kind.iter().map(|(_, s)| s.completed).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.by_kind.iter().map(|(_, s)| s.failures()).sum()
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics, elapsed: Duration) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Tasks processed: {}", stats.tasks_completed());
    println!("  Records collected: {}", stats.records);
    println!(
        "  Links discovered: {} ({} new)",
        stats.links_offered, stats.tasks_enqueued
    );
    println!();

    println!("Tasks by Kind:");
    for (kind, kind_stats) in &stats.by_kind {
        println!(
            "  {}: {} processed, {} fetch failures, {} extraction failures",
            kind, kind_stats.completed, kind_stats.fetch_failures, kind_stats.extract_failures
        );
    }
    println!();

    let completed = stats.tasks_completed();
    let success_rate = if completed > 0 {
        (completed.saturating_sub(stats.total_failures()) as f64 / completed as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Success Rate: {:.1}% ({} failures)",
        success_rate,
        stats.total_failures()
    );
    println!("Execution time: {:.5} seconds", elapsed.as_secs_f64());
}
