//! Append-only store for extracted records

use crate::record::Record;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Records gathered by all workers, in append order
#[derive(Debug, Default)]
pub struct ResultCollector {
    records: Mutex<Vec<Record>>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a record and returns the number collected so far
    pub fn append(&self, record: Record) -> usize {
        let mut records = self.lock();
        records.push(record);
        records.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Moves every collected record out, leaving the collector empty
    pub fn take(&self) -> Vec<Record> {
        std::mem::take(&mut *self.lock())
    }
}
