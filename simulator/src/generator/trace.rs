//! Synthetic straight-line traces for exercising the pipeline without a
//! transport engine. Tracks are straight up to the target plane, take one
//! random kink there, and lose a fixed momentum. No physics is sampled.

use beamcore::geometry::{DetectorLayout, PlacedVolume};
use beamcore::source::ParticleGun;
use beamcore::Vec3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::workflow::trace::{TraceEvent, TraceStep};

/// Steps deposited in the calorimeter per event.
const CALO_STEPS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub events: u64,
    pub seed: u64,
    /// Half-width of the flat kink distribution per plane, mrad.
    pub kink_mrad: f64,
    pub momentum_loss_mev: f64,
    /// Probability that a tracker plane records the crossing.
    pub plane_efficiency: f64,
    /// Fraction of the outgoing momentum deposited in the calorimeter.
    pub calo_fraction: f64,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            events: 100,
            seed: 0,
            kink_mrad: 2.0,
            momentum_loss_mev: 10.0,
            plane_efficiency: 1.0,
            calo_fraction: 0.9,
        }
    }
}

fn crossing(origin: &Vec3, direction: &Vec3, z: f64) -> Vec3 {
    origin + direction * ((z - origin.z) / direction.z)
}

fn trace_step(volume: &PlacedVolume, position: Vec3, momentum: Vec3, edep: f64) -> TraceStep {
    TraceStep {
        volume: Some(volume.name.clone()),
        position: position.into(),
        momentum: momentum.into(),
        edep,
    }
}

/// Builds `config.events` events for the gun's primary.
///
/// Steps are only emitted where the track actually crosses a tracker plane
/// or the calorimeter, so tracks that miss the telescope come out
/// incomplete. Returns an empty list when the gun does not point downstream.
pub fn build_trace(config: &TraceConfig, layout: &DetectorLayout, gun: &ParticleGun) -> Vec<TraceEvent> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let sensitive = layout.sensitive();
    let planes: Vec<&PlacedVolume> = sensitive
        .trackers
        .iter()
        .filter_map(|id| layout.volume(*id))
        .collect();
    let Some(calo) = layout.volume(sensitive.calorimeter) else {
        return Vec::new();
    };
    let target_z = layout
        .volume(sensitive.target)
        .map(|v| v.center.z)
        .unwrap_or_default();

    let primary = gun.generate_primary(0);
    if primary.momentum.z <= 0.0 {
        return Vec::new();
    }
    let p_in = primary.momentum.norm();
    let p_out = (p_in - config.momentum_loss_mev).max(0.0);
    let incoming = primary.momentum / p_in;
    let half_width = config.kink_mrad * 1.0e-3;

    (0..config.events)
        .map(|event| {
            let kink_x = if half_width > 0.0 { rng.gen_range(-half_width..half_width) } else { 0.0 };
            let kink_y = if half_width > 0.0 { rng.gen_range(-half_width..half_width) } else { 0.0 };
            let outgoing = Vec3::new(
                incoming.x / incoming.z + kink_x.tan(),
                incoming.y / incoming.z + kink_y.tan(),
                1.0,
            )
            .normalize();
            let vertex = crossing(&primary.position, &incoming, target_z);

            let mut steps = Vec::new();
            for plane in &planes {
                if !rng.gen_bool(config.plane_efficiency.clamp(0.0, 1.0)) {
                    continue;
                }
                let z = plane.center.z;
                let (position, momentum) = if z < target_z {
                    (crossing(&primary.position, &incoming, z), incoming * p_in)
                } else {
                    (crossing(&vertex, &outgoing, z), outgoing * p_out)
                };
                if plane.contains(&position) {
                    steps.push(trace_step(plane, position, momentum, 0.0));
                }
            }

            let front = calo.center.z - calo.half_extent.z;
            let deposit = p_out * config.calo_fraction / CALO_STEPS as f64;
            for k in 0..CALO_STEPS {
                // Midpoint of the k-th slice along the calorimeter depth.
                let depth = calo.half_extent.z * 2.0 * (k as f64 + 0.5) / CALO_STEPS as f64;
                let position = crossing(&vertex, &outgoing, front + depth);
                if calo.contains(&position) {
                    steps.push(trace_step(calo, position, outgoing * p_out, deposit));
                }
            }

            TraceEvent { event, steps }
        })
        .collect()
}
