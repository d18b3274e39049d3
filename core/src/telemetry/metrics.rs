use std::sync::Mutex;

use crate::event::EventOutcome;

/// Event counters; shareable between workers behind an `Arc`.
#[derive(Debug)]
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub processed: u64,
    pub accepted: u64,
    pub incomplete: u64,
    pub degenerate: u64,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_outcome(&self, outcome: &EventOutcome) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.processed += 1;
            match outcome {
                EventOutcome::Accepted(_) => metrics.accepted += 1,
                EventOutcome::Incomplete => metrics.incomplete += 1,
                EventOutcome::Degenerate(_) => metrics.degenerate += 1,
            }
        }
    }

    pub fn snapshot(&self) -> Metrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            Metrics::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DegenerateSegment;

    #[test]
    fn counts_each_outcome() {
        let recorder = MetricsRecorder::new();
        recorder.record_outcome(&EventOutcome::Incomplete);
        recorder.record_outcome(&EventOutcome::Incomplete);
        recorder.record_outcome(&EventOutcome::Degenerate(DegenerateSegment::Outgoing));
        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.processed, 3);
        assert_eq!(snapshot.incomplete, 2);
        assert_eq!(snapshot.degenerate, 1);
        assert_eq!(snapshot.accepted, 0);
    }
}
