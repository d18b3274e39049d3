use serde::{Deserialize, Serialize};

use crate::event::OutputRow;
use crate::math::units::{GEV, MEV, MM, MRAD};

pub const NTUPLE_NAME: &str = "beamscan";
pub const NTUPLE_TITLE: &str = "BeamScan MCS and energy loss data";

/// Column order of the output table.
pub const COLUMNS: [&str; 9] = [
    "theta3D_mrad",
    "thetaX_mrad",
    "thetaY_mrad",
    "pIn_GeV",
    "pOut_GeV",
    "deltaP_MeV",
    "xTarget_mm",
    "yTarget_mm",
    "caloEdep_MeV",
];

/// One output row in presentation units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NtupleRecord {
    #[serde(rename = "theta3D_mrad")]
    pub theta_3d_mrad: f64,
    #[serde(rename = "thetaX_mrad")]
    pub theta_x_mrad: f64,
    #[serde(rename = "thetaY_mrad")]
    pub theta_y_mrad: f64,
    #[serde(rename = "pIn_GeV")]
    pub p_in_gev: f64,
    #[serde(rename = "pOut_GeV")]
    pub p_out_gev: f64,
    #[serde(rename = "deltaP_MeV")]
    pub delta_p_mev: f64,
    #[serde(rename = "xTarget_mm")]
    pub x_target_mm: f64,
    #[serde(rename = "yTarget_mm")]
    pub y_target_mm: f64,
    #[serde(rename = "caloEdep_MeV")]
    pub calo_edep_mev: f64,
}

impl From<&OutputRow> for NtupleRecord {
    fn from(row: &OutputRow) -> Self {
        Self {
            theta_3d_mrad: row.theta_3d / MRAD,
            theta_x_mrad: row.theta_x / MRAD,
            theta_y_mrad: row.theta_y / MRAD,
            p_in_gev: row.p_in / GEV,
            p_out_gev: row.p_out / GEV,
            delta_p_mev: row.delta_p / MEV,
            x_target_mm: row.x_target / MM,
            y_target_mm: row.y_target / MM,
            calo_edep_mev: row.calo_edep / MEV,
        }
    }
}

impl NtupleRecord {
    pub fn values(&self) -> [f64; 9] {
        [
            self.theta_3d_mrad,
            self.theta_x_mrad,
            self.theta_y_mrad,
            self.p_in_gev,
            self.p_out_gev,
            self.delta_p_mev,
            self.x_target_mm,
            self.y_target_mm,
            self.calo_edep_mev,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_presentation_units() {
        let row = OutputRow {
            theta_3d: 0.002,
            theta_x: -0.001,
            theta_y: 0.0015,
            p_in: 3000.0,
            p_out: 2950.0,
            delta_p: 50.0,
            x_target: 0.05,
            y_target: -0.2,
            calo_edep: 1200.0,
        };
        let record = NtupleRecord::from(&row);
        assert!((record.theta_3d_mrad - 2.0).abs() < 1e-12);
        assert!((record.theta_x_mrad + 1.0).abs() < 1e-12);
        assert_eq!(record.p_in_gev, 3.0);
        assert_eq!(record.p_out_gev, 2.95);
        assert_eq!(record.delta_p_mev, 50.0);
        assert_eq!(record.calo_edep_mev, 1200.0);
    }
}
