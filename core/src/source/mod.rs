pub mod gun;
pub mod particle;

pub use gun::{ParticleGun, PrimaryVertex};
pub use particle::{Particle, UnknownParticle};
