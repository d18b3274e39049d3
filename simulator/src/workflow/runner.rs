use anyhow::{anyhow, Context};
use beamcore::geometry::DetectorLayout;
use beamcore::output::OutputSink;
use beamcore::run::{ActionInitialization, RunSummary};
use beamcore::telemetry::{Metrics, MetricsRecorder};
use beamcore::UserActions;
use std::sync::Arc;
use std::thread;

use crate::workflow::trace::TraceEvent;

pub struct WorkflowResult<S> {
    pub summary: RunSummary,
    pub metrics: Metrics,
    /// Sinks in worker order, closed.
    pub sinks: Vec<S>,
}

/// Replays a step trace through one action set per worker thread.
///
/// Events are dealt round-robin; each worker owns its accumulator, classifier
/// and sink, and the master only merges run summaries.
pub struct Runner {
    workers: usize,
}

impl Runner {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn execute<S, F>(
        &self,
        layout: &DetectorLayout,
        init: &ActionInitialization,
        events: &[TraceEvent],
        make_sink: F,
    ) -> anyhow::Result<WorkflowResult<S>>
    where
        S: OutputSink + Send,
        F: Fn(usize) -> S,
    {
        let metrics = Arc::new(MetricsRecorder::new());
        let init = init.clone().with_metrics(metrics.clone());
        let mut master = init.build_for_master();

        let outcomes: Vec<anyhow::Result<(RunSummary, S)>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..self.workers)
                .map(|worker| {
                    let mut actions = init.build(worker, make_sink(worker));
                    let workers = self.workers;
                    scope.spawn(move || -> anyhow::Result<(RunSummary, S)> {
                        actions
                            .begin_run()
                            .with_context(|| format!("worker {} begin of run", worker))?;
                        for event in events.iter().skip(worker).step_by(workers) {
                            let steps = event.resolve(layout)?;
                            actions.begin_event(event.event);
                            for step in &steps {
                                actions.step(step);
                            }
                            actions
                                .end_event()
                                .with_context(|| format!("worker {} event {}", worker, event.event))?;
                        }
                        let summary = actions
                            .end_run()
                            .with_context(|| format!("worker {} end of run", worker))?;
                        Ok((summary, actions.into_sink()))
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .map_err(|_| anyhow!("worker thread panicked"))
                        .and_then(|result| result)
                })
                .collect()
        });

        let mut sinks = Vec::with_capacity(self.workers);
        for outcome in outcomes {
            let (summary, sink) = outcome?;
            master.merge(&summary);
            sinks.push(sink);
        }

        Ok(WorkflowResult {
            summary: master.finish(),
            metrics: metrics.snapshot(),
            sinks,
        })
    }
}
