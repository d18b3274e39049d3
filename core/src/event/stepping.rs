use log::debug;

use crate::event::accumulator::EventAccumulator;
use crate::geometry::detector::SensitiveVolumes;
use crate::prelude::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepRoute {
    Tracker(usize),
    Calorimeter,
    Ignored,
}

/// Routes steps taken in sensitive volumes into the event accumulator.
///
/// The volume identities are fixed at construction.
#[derive(Debug, Clone)]
pub struct StepClassifier {
    sensitive: SensitiveVolumes,
}

impl StepClassifier {
    pub fn new(sensitive: SensitiveVolumes) -> Self {
        Self { sensitive }
    }

    pub fn classify(&self, step: &Step) -> StepRoute {
        if let Some(plane) = self.sensitive.trackers.iter().position(|&id| id == step.volume) {
            StepRoute::Tracker(plane)
        } else if step.volume == self.sensitive.calorimeter {
            StepRoute::Calorimeter
        } else {
            StepRoute::Ignored
        }
    }

    pub fn on_step(&self, step: &Step, accumulator: &mut EventAccumulator) {
        match self.classify(step) {
            StepRoute::Tracker(plane) => {
                debug!("tracker {} step at {:?}", plane, step.position);
                accumulator.record_tracker_hit(plane, step.position, step.momentum);
            }
            StepRoute::Calorimeter => accumulator.add_calor_energy(step.energy_deposit),
            StepRoute::Ignored => {}
        }
    }
}
