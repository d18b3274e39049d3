//! Detector description and event reconstruction for the BeamScan telescope.
//!
//! Transport itself belongs to the host simulation runtime. This crate
//! supplies what the host calls into: geometry and materials, the primary
//! source, per-step routing into a per-event accumulator, multiple-scattering
//! and momentum-loss reconstruction at end of event, and the output table.

pub mod event;
pub mod geometry;
pub mod math;
pub mod output;
pub mod prelude;
pub mod run;
pub mod source;
pub mod telemetry;

pub use prelude::{Step, UserActions, Vec3, VolumeId};
