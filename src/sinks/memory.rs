//! In-memory sink
//!
//! Collects records in a shared buffer. Clones share the same buffer, so a
//! test can hand one clone to the router and read through the other.

use crate::sinks::traits::{LogSink, SinkError, SinkResult};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct MemorySink {
    name: String,
    records: Arc<Mutex<Vec<String>>>,
    closed: Arc<Mutex<bool>>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(Mutex::new(false)),
        }
    }

    /// Snapshot of every record written so far, in write order
    pub fn records(&self) -> Vec<String> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }

    /// Make subsequent writes fail with [`SinkError::Closed`]
    pub fn close(&self) {
        if let Ok(mut closed) = self.closed.lock() {
            *closed = true;
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.lock().map(|c| *c).unwrap_or(true)
    }
}

impl LogSink for MemorySink {
    fn write_record(&self, record: &str) -> SinkResult<()> {
        if self.is_closed() {
            return Err(SinkError::Closed(self.name.clone()));
        }
        self.records
            .lock()
            .map_err(|_| SinkError::Poisoned(self.name.clone()))?
            .push(record.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
