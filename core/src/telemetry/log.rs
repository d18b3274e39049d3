use log::{info, warn};

use crate::event::DegenerateSegment;

/// Tags run-level log lines with the worker that produced them.
pub struct LogManager {
    worker: Option<usize>,
}

impl LogManager {
    pub fn new() -> Self {
        Self { worker: None }
    }

    pub fn for_worker(worker: usize) -> Self {
        Self {
            worker: Some(worker),
        }
    }

    fn prefix(&self) -> String {
        match self.worker {
            Some(n) => format!("[worker {}] ", n),
            None => "[master] ".to_string(),
        }
    }

    pub fn record(&self, message: &str) {
        info!("{}{}", self.prefix(), message);
    }

    pub fn degenerate(&self, event_id: u64, segment: DegenerateSegment) {
        warn!(
            "{}event {}: zero-length {:?} track segment, event skipped",
            self.prefix(),
            event_id,
            segment
        );
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
