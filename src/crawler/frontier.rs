//! Crawl frontier: deduplication gate, shared task queue, and in-flight tracking
//!
//! The visited set and the queue live behind one lock so that "already seen?",
//! "mark seen" and "enqueue" form a single critical section. The same state
//! counts leased tasks, which lets `pop` tell an idle queue (someone is still
//! working and may enqueue more) from a drained crawl (nobody is).

use super::task::{Task, TaskKind};
use std::collections::{HashSet, VecDeque};
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct FrontierState {
    /// Every URL ever enqueued; never shrinks
    seen: HashSet<String>,

    /// Tasks waiting for a worker
    queue: VecDeque<Task>,

    /// Tasks popped but not yet finished
    in_flight: usize,
}

/// Outcome of [`Frontier::pop`]
#[derive(Debug)]
pub enum Pop<'a> {
    /// A task leased to the caller; finishing it is signalled by dropping the lease
    Task(Lease<'a>),

    /// The timeout elapsed while other tasks were still in flight
    Idle,

    /// The queue is empty and no task is in flight; nothing more can arrive
    Drained,
}

/// A task checked out of the frontier
///
/// The task counts as in flight until the lease is dropped.
#[derive(Debug)]
pub struct Lease<'a> {
    frontier: &'a Frontier,
    task: Task,
}

impl Deref for Lease<'_> {
    type Target = Task;

    fn deref(&self) -> &Task {
        &self.task
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.frontier.finish();
    }
}

/// Shared, deduplicating multi-producer/multi-consumer task queue
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    changed: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues `url` as a `kind` task unless it was enqueued before
    ///
    /// Returns true if a task was pushed.
    pub fn offer(&self, url: &str, kind: TaskKind) -> bool {
        {
            let mut state = self.lock();
            if !state.seen.insert(url.to_string()) {
                return false;
            }
            state.queue.push_back(Task::new(kind, url));
        }

        tracing::debug!("Added to queue {}: {}", kind, url);
        self.changed.notify_one();
        true
    }

    /// Waits up to `timeout` for a task
    pub async fn pop(&self, timeout: Duration) -> Pop<'_> {
        let deadline = Instant::now() + timeout;

        loop {
            // Register interest before inspecting the state so a push or a
            // final lease release between the check and the wait is not lost.
            let changed = self.changed.notified();
            tokio::pin!(changed);
            changed.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(task) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Pop::Task(Lease {
                        frontier: self,
                        task,
                    });
                }
                if state.in_flight == 0 {
                    return Pop::Drained;
                }
            }

            if tokio::time::timeout_at(deadline, changed).await.is_err() {
                return Pop::Idle;
            }
        }
    }

    fn finish(&self) {
        let drained = {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.in_flight == 0 && state.queue.is_empty()
        };

        if drained {
            self.changed.notify_waiters();
        }
    }

    /// Number of distinct URLs ever enqueued
    pub fn offered_count(&self) -> usize {
        self.lock().seen.len()
    }

    /// Number of tasks waiting for a worker
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// Number of leased, unfinished tasks
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().seen.contains(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_offer_deduplicates() {
        let frontier = Frontier::new();

        assert!(frontier.offer("https://example.com/a", TaskKind::Category));
        assert!(!frontier.offer("https://example.com/a", TaskKind::Product));
        assert!(frontier.offer("https://example.com/b", TaskKind::Product));

        assert_eq!(frontier.offered_count(), 2);
        assert_eq!(frontier.pending(), 2);
        assert!(frontier.contains("https://example.com/a"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_offers_enqueue_each_url_once() {
        let frontier = Arc::new(Frontier::new());
        let accepted = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let frontier = frontier.clone();
            let accepted = accepted.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..200 {
                    if frontier.offer(&format!("https://example.com/p/{}", i), TaskKind::Product) {
                        accepted.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(accepted.load(Ordering::SeqCst), 200);
        assert_eq!(frontier.pending(), 200);
    }

    #[tokio::test]
    async fn test_pop_returns_tasks_in_fifo_order() {
        let frontier = Frontier::new();
        frontier.offer("https://example.com/1", TaskKind::Home);
        frontier.offer("https://example.com/2", TaskKind::Category);

        match frontier.pop(Duration::from_millis(10)).await {
            Pop::Task(lease) => {
                assert_eq!(lease.url, "https://example.com/1");
                assert_eq!(lease.kind, TaskKind::Home);
                assert_eq!(frontier.in_flight(), 1);
            }
            other => panic!("expected a task, got {:?}", other),
        }
        assert_eq!(frontier.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_pop_on_empty_frontier_is_drained() {
        let frontier = Frontier::new();
        let started = std::time::Instant::now();

        assert!(matches!(
            frontier.pop(Duration::from_secs(5)).await,
            Pop::Drained
        ));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_pop_times_out_while_work_in_flight() {
        let frontier = Frontier::new();
        frontier.offer("https://example.com/slow", TaskKind::Product);

        let lease = match frontier.pop(Duration::from_millis(10)).await {
            Pop::Task(lease) => lease,
            other => panic!("expected a task, got {:?}", other),
        };

        let started = std::time::Instant::now();
        assert!(matches!(
            frontier.pop(Duration::from_millis(50)).await,
            Pop::Idle
        ));
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(50));
        assert!(waited < Duration::from_secs(2));

        drop(lease);
        assert!(matches!(
            frontier.pop(Duration::from_millis(50)).await,
            Pop::Drained
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_releasing_last_lease_wakes_waiters() {
        let frontier = Arc::new(Frontier::new());
        frontier.offer("https://example.com/only", TaskKind::Home);

        let lease = match frontier.pop(Duration::from_millis(10)).await {
            Pop::Task(lease) => lease,
            other => panic!("expected a task, got {:?}", other),
        };

        let waiter = {
            let frontier = frontier.clone();
            tokio::spawn(async move {
                let started = std::time::Instant::now();
                let drained = matches!(frontier.pop(Duration::from_secs(10)).await, Pop::Drained);
                (drained, started.elapsed())
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(lease);

        let (drained, waited) = waiter.await.unwrap();
        assert!(drained);
        assert!(waited < Duration::from_secs(5));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_offer_wakes_waiting_worker() {
        let frontier = Arc::new(Frontier::new());
        frontier.offer("https://example.com/category", TaskKind::Category);

        let lease = match frontier.pop(Duration::from_millis(10)).await {
            Pop::Task(lease) => lease,
            other => panic!("expected a task, got {:?}", other),
        };

        let waiter = {
            let frontier = frontier.clone();
            tokio::spawn(async move {
                match frontier.pop(Duration::from_secs(10)).await {
                    Pop::Task(lease) => Some(lease.url.clone()),
                    _ => None,
                }
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        frontier.offer("https://example.com/product", TaskKind::Product);

        assert_eq!(
            waiter.await.unwrap().as_deref(),
            Some("https://example.com/product")
        );
        drop(lease);
    }
}
