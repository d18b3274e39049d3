use serde::{Deserialize, Serialize};

use crate::event::EventOutcome;
use crate::output::OutputError;
use crate::run::RunSummary;
use crate::source::PrimaryVertex;

/// Three-vector in internal units (mm for positions, MeV for momenta).
pub type Vec3 = nalgebra::Vector3<f64>;

/// Identity of a placed detector volume, assigned at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VolumeId(pub u32);

/// Pre-step point data of one transport step, as handed over by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub volume: VolumeId,
    pub position: Vec3,
    pub momentum: Vec3,
    pub energy_deposit: f64,
}

impl Step {
    pub fn new(volume: VolumeId, position: Vec3, momentum: Vec3, energy_deposit: f64) -> Self {
        Self {
            volume,
            position,
            momentum,
            energy_deposit,
        }
    }
}

pub type RunResult<T> = Result<T, OutputError>;

/// Lifecycle callbacks the host runtime invokes on one worker's action set.
///
/// Calls arrive in the order `begin_run`, then for every event
/// `begin_event`, any number of `step`, `end_event`, and finally `end_run`.
pub trait UserActions {
    fn begin_run(&mut self) -> RunResult<()>;
    fn begin_event(&mut self, event_id: u64) -> PrimaryVertex;
    fn step(&mut self, step: &Step);
    fn end_event(&mut self) -> RunResult<EventOutcome>;
    fn end_run(&mut self) -> RunResult<RunSummary>;
}
