pub mod accumulator;
pub mod reconstruct;
pub mod stepping;

pub use accumulator::{EventAccumulator, TrackerHit, TRACKER_PLANES};
pub use reconstruct::{reconstruct, DegenerateSegment, EventOutcome, OutputRow};
pub use stepping::{StepClassifier, StepRoute};
