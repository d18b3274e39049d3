use crate::event::reconstruct::{reconstruct, EventOutcome};
use crate::prelude::Vec3;

pub const TRACKER_PLANES: usize = 4;

/// Position and momentum at one tracker plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerHit {
    pub position: Vec3,
    pub momentum: Vec3,
    pub recorded: bool,
}

impl Default for TrackerHit {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            momentum: Vec3::zeros(),
            recorded: false,
        }
    }
}

/// Per-event state of one worker: the first hit in each tracker plane and
/// the summed calorimeter deposit. Reset at every event start.
#[derive(Debug, Clone, Default)]
pub struct EventAccumulator {
    hits: [TrackerHit; TRACKER_PLANES],
    calo_edep: f64,
}

impl EventAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_event(&mut self) {
        self.hits = [TrackerHit::default(); TRACKER_PLANES];
        self.calo_edep = 0.0;
    }

    /// Stores the hit for `plane` unless the plane already has one this
    /// event. Planes outside 0..4 are ignored.
    pub fn record_tracker_hit(&mut self, plane: usize, position: Vec3, momentum: Vec3) {
        let Some(hit) = self.hits.get_mut(plane) else {
            return;
        };
        if hit.recorded {
            return;
        }
        *hit = TrackerHit {
            position,
            momentum,
            recorded: true,
        };
    }

    pub fn add_calor_energy(&mut self, edep: f64) {
        self.calo_edep += edep;
    }

    pub fn hits(&self) -> &[TrackerHit; TRACKER_PLANES] {
        &self.hits
    }

    pub fn hit(&self, plane: usize) -> Option<&TrackerHit> {
        self.hits.get(plane)
    }

    pub fn calo_edep(&self) -> f64 {
        self.calo_edep
    }

    pub fn end_event(&self) -> EventOutcome {
        reconstruct(&self.hits, self.calo_edep)
    }
}
