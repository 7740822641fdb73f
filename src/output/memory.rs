//! In-memory result sink

use crate::output::traits::{BrokenLinkRecord, OutputResult, ResultSink};
use std::sync::{Mutex, PoisonError};

/// Collects records in arrival order
///
/// Useful for embedding the crawler in another program and for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<BrokenLinkRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything recorded so far
    pub fn records(&self) -> Vec<BrokenLinkRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultSink for MemorySink {
    fn record(&self, record: &BrokenLinkRecord) -> OutputResult<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}
