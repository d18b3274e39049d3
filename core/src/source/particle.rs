use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::math::units::MEV;

/// Beam particle species the gun can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Particle {
    #[serde(rename = "e-")]
    Electron,
    #[serde(rename = "e+")]
    Positron,
    #[serde(rename = "mu-")]
    MuonMinus,
    #[serde(rename = "mu+")]
    MuonPlus,
    #[serde(rename = "pi-")]
    PionMinus,
    #[serde(rename = "pi+")]
    PionPlus,
    #[serde(rename = "proton")]
    Proton,
}

impl Particle {
    pub const ALL: [Particle; 7] = [
        Particle::Electron,
        Particle::Positron,
        Particle::MuonMinus,
        Particle::MuonPlus,
        Particle::PionMinus,
        Particle::PionPlus,
        Particle::Proton,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Particle::Electron => "e-",
            Particle::Positron => "e+",
            Particle::MuonMinus => "mu-",
            Particle::MuonPlus => "mu+",
            Particle::PionMinus => "pi-",
            Particle::PionPlus => "pi+",
            Particle::Proton => "proton",
        }
    }

    /// Rest mass in MeV.
    pub fn mass(&self) -> f64 {
        let mev = match self {
            Particle::Electron | Particle::Positron => 0.510_998_95,
            Particle::MuonMinus | Particle::MuonPlus => 105.658_375_5,
            Particle::PionMinus | Particle::PionPlus => 139.570_39,
            Particle::Proton => 938.272_088_16,
        };
        mev * MEV
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown particle {0:?}")]
pub struct UnknownParticle(pub String);

impl FromStr for Particle {
    type Err = UnknownParticle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Particle::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| UnknownParticle(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for particle in Particle::ALL {
            assert_eq!(particle.name().parse::<Particle>().unwrap(), particle);
        }
        assert!("photon".parse::<Particle>().is_err());
    }

    #[test]
    fn antiparticles_share_mass() {
        assert_eq!(Particle::MuonMinus.mass(), Particle::MuonPlus.mass());
        assert_eq!(Particle::Electron.mass(), Particle::Positron.mass());
    }
}
