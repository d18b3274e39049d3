use std::sync::Arc;

use crate::event::{EventAccumulator, EventOutcome, StepClassifier};
use crate::geometry::detector::{DetectorLayout, SensitiveVolumes};
use crate::output::sink::OutputSink;
use crate::prelude::{RunResult, Step, UserActions};
use crate::run::summary::RunSummary;
use crate::source::{ParticleGun, PrimaryVertex};
use crate::telemetry::{LogManager, MetricsRecorder};

/// Builds the action sets the host installs: one full set per worker, and a
/// merge-only run action on the master.
#[derive(Debug, Clone)]
pub struct ActionInitialization {
    sensitive: SensitiveVolumes,
    gun: ParticleGun,
    metrics: Option<Arc<MetricsRecorder>>,
}

impl ActionInitialization {
    pub fn new(layout: &DetectorLayout, gun: ParticleGun) -> Self {
        Self {
            sensitive: layout.sensitive(),
            gun,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRecorder>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build<S: OutputSink>(&self, worker: usize, sink: S) -> WorkerActions<S> {
        WorkerActions {
            worker,
            gun: self.gun.clone(),
            accumulator: EventAccumulator::new(),
            classifier: StepClassifier::new(self.sensitive),
            sink,
            summary: RunSummary::default(),
            logger: LogManager::for_worker(worker),
            metrics: self.metrics.clone(),
            current_event: None,
        }
    }

    pub fn build_for_master(&self) -> MasterRun {
        MasterRun::default()
    }
}

/// Exclusive per-worker state: never shared, reset at every event.
pub struct WorkerActions<S: OutputSink> {
    worker: usize,
    gun: ParticleGun,
    accumulator: EventAccumulator,
    classifier: StepClassifier,
    sink: S,
    summary: RunSummary,
    logger: LogManager,
    metrics: Option<Arc<MetricsRecorder>>,
    current_event: Option<u64>,
}

impl<S: OutputSink> WorkerActions<S> {
    pub fn worker(&self) -> usize {
        self.worker
    }

    pub fn accumulator(&self) -> &EventAccumulator {
        &self.accumulator
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: OutputSink> UserActions for WorkerActions<S> {
    fn begin_run(&mut self) -> RunResult<()> {
        self.summary = RunSummary::default();
        self.sink.open()
    }

    fn begin_event(&mut self, event_id: u64) -> PrimaryVertex {
        self.accumulator.begin_event();
        self.current_event = Some(event_id);
        self.gun.generate_primary(event_id)
    }

    fn step(&mut self, step: &Step) {
        self.classifier.on_step(step, &mut self.accumulator);
    }

    fn end_event(&mut self) -> RunResult<EventOutcome> {
        let outcome = self.accumulator.end_event();
        match &outcome {
            EventOutcome::Accepted(row) => self.sink.append(row)?,
            EventOutcome::Incomplete => {}
            EventOutcome::Degenerate(segment) => self
                .logger
                .degenerate(self.current_event.unwrap_or_default(), *segment),
        }
        self.summary.record(&outcome);
        if let Some(metrics) = &self.metrics {
            metrics.record_outcome(&outcome);
        }
        self.current_event = None;
        Ok(outcome)
    }

    fn end_run(&mut self) -> RunResult<RunSummary> {
        self.sink.close()?;
        self.logger.record(&self.summary.describe());
        Ok(self.summary)
    }
}

/// Master-side run action: collects worker summaries.
#[derive(Default)]
pub struct MasterRun {
    total: RunSummary,
    workers: usize,
    logger: LogManager,
}

impl MasterRun {
    pub fn merge(&mut self, summary: &RunSummary) {
        self.total.merge(summary);
        self.workers += 1;
    }

    pub fn finish(self) -> RunSummary {
        self.logger.record(&format!(
            "merged {} worker(s): {}",
            self.workers,
            self.total.describe()
        ));
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DegenerateSegment;
    use crate::geometry::{DetectorConfig, DetectorConstruction, MaterialCatalog};
    use crate::output::MemorySink;
    use crate::prelude::Vec3;

    fn setup() -> (DetectorLayout, ActionInitialization) {
        let layout =
            DetectorConstruction::construct(&DetectorConfig::default(), &MaterialCatalog::standard());
        let init = ActionInitialization::new(&layout, ParticleGun::default());
        (layout, init)
    }

    fn straight_track(layout: &DetectorLayout, actions: &mut impl UserActions) {
        for id in layout.sensitive().trackers {
            let z = layout.volume(id).unwrap().center.z;
            actions.step(&Step::new(id, Vec3::new(0.0, 0.0, z), Vec3::new(0.0, 0.0, 3000.0), 0.1));
        }
        actions.step(&Step::new(
            layout.sensitive().calorimeter,
            Vec3::new(0.0, 0.0, 900.0),
            Vec3::new(0.0, 0.0, 2900.0),
            2900.0,
        ));
    }

    #[test]
    fn worker_writes_only_complete_events() {
        let (layout, init) = setup();
        let metrics = Arc::new(MetricsRecorder::new());
        let init = init.with_metrics(metrics.clone());
        let mut worker = init.build(0, MemorySink::new());
        worker.begin_run().unwrap();

        let vertex = worker.begin_event(0);
        assert_eq!(vertex.event_id, 0);
        straight_track(&layout, &mut worker);
        assert!(matches!(worker.end_event().unwrap(), EventOutcome::Accepted(_)));

        worker.begin_event(1);
        let tracker = layout.sensitive().trackers[0];
        worker.step(&Step::new(tracker, Vec3::new(0.0, 0.0, -500.0), Vec3::z(), 0.0));
        assert_eq!(worker.end_event().unwrap(), EventOutcome::Incomplete);

        let summary = worker.end_run().unwrap();
        assert_eq!(summary.events, 2);
        assert_eq!(summary.accepted(), 1);
        assert_eq!(worker.sink().records().len(), 1);
        assert!(!worker.sink().is_open());
        assert_eq!(worker.sink().records()[0].calo_edep_mev, 2900.0);
        assert_eq!(metrics.snapshot().incomplete, 1);
    }

    #[test]
    fn master_merges_worker_summaries() {
        let (layout, init) = setup();
        let mut master = init.build_for_master();
        for w in 0..3 {
            let mut worker = init.build(w, MemorySink::new());
            worker.begin_run().unwrap();
            worker.begin_event(w as u64);
            straight_track(&layout, &mut worker);
            worker.end_event().unwrap();
            master.merge(&worker.end_run().unwrap());
        }
        let total = master.finish();
        assert_eq!(total.events, 3);
        assert_eq!(total.accepted(), 3);
    }

    #[test]
    fn degenerate_event_is_counted_but_not_written() {
        let (layout, init) = setup();
        let metrics = Arc::new(MetricsRecorder::new());
        let init = init.with_metrics(metrics.clone());
        let mut worker = init.build(0, MemorySink::new());
        worker.begin_run().unwrap();

        worker.begin_event(7);
        let trackers = layout.sensitive().trackers;
        let momentum = Vec3::new(0.0, 0.0, 3000.0);
        // Planes 0 and 1 report the same point.
        worker.step(&Step::new(trackers[0], Vec3::new(0.0, 0.0, -250.0), momentum, 0.0));
        worker.step(&Step::new(trackers[1], Vec3::new(0.0, 0.0, -250.0), momentum, 0.0));
        worker.step(&Step::new(trackers[2], Vec3::new(0.0, 0.0, 250.0), momentum, 0.0));
        worker.step(&Step::new(trackers[3], Vec3::new(0.0, 0.0, 500.0), momentum, 0.0));
        assert_eq!(
            worker.end_event().unwrap(),
            EventOutcome::Degenerate(DegenerateSegment::Incoming)
        );

        let summary = worker.end_run().unwrap();
        assert_eq!(summary.events, 1);
        assert_eq!(summary.degenerate, 1);
        assert_eq!(summary.accepted(), 0);
        assert!(worker.sink().records().is_empty());
        assert_eq!(metrics.snapshot().degenerate, 1);
    }
}
