use crate::math::kinematics::safe_direction;
use crate::math::units::{CM, GEV};
use crate::prelude::Vec3;
use crate::source::particle::Particle;

/// Single-particle source with fixed kinematics.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleGun {
    pub particle: Particle,
    /// Kinetic energy in MeV.
    pub kinetic_energy: f64,
    pub position: Vec3,
    /// Need not be normalised.
    pub direction: Vec3,
}

impl Default for ParticleGun {
    fn default() -> Self {
        Self {
            particle: Particle::Electron,
            kinetic_energy: 3.0 * GEV,
            position: Vec3::new(0.0, 0.0, -80.0 * CM),
            direction: Vec3::new(0.0, 0.0, 1.0),
        }
    }
}

/// The primary handed to the host at the start of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryVertex {
    pub event_id: u64,
    pub particle: Particle,
    pub position: Vec3,
    pub momentum: Vec3,
}

impl ParticleGun {
    /// Momentum magnitude from kinetic energy: `p = sqrt(T^2 + 2 T m)`.
    pub fn momentum_magnitude(&self) -> f64 {
        let t = self.kinetic_energy;
        (t * t + 2.0 * t * self.particle.mass()).sqrt()
    }

    pub fn generate_primary(&self, event_id: u64) -> PrimaryVertex {
        let direction = safe_direction(&self.direction).unwrap_or_else(Vec3::z);
        PrimaryVertex {
            event_id,
            particle: self.particle,
            position: self.position,
            momentum: direction * self.momentum_magnitude(),
        }
    }
}
