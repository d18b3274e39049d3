//! Internal unit system: millimetre, MeV, radian, tesla.
//!
//! Values are stored internally in these base units and divided by the
//! matching constant when presented, e.g. `theta / MRAD` or `p / GEV`.

pub const MM: f64 = 1.0;
pub const UM: f64 = 1.0e-3 * MM;
pub const CM: f64 = 10.0 * MM;
pub const M: f64 = 1000.0 * MM;

pub const MEV: f64 = 1.0;
pub const KEV: f64 = 1.0e-3 * MEV;
pub const GEV: f64 = 1000.0 * MEV;

pub const RAD: f64 = 1.0;
pub const MRAD: f64 = 1.0e-3 * RAD;

pub const TESLA: f64 = 1.0;

/// Resolves a length unit symbol to its factor in millimetres.
pub fn parse_length_unit(symbol: &str) -> Option<f64> {
    match symbol {
        "um" => Some(UM),
        "mm" => Some(MM),
        "cm" => Some(CM),
        "m" => Some(M),
        _ => None,
    }
}

/// Resolves an energy unit symbol to its factor in MeV.
pub fn parse_energy_unit(symbol: &str) -> Option<f64> {
    match symbol {
        "keV" => Some(KEV),
        "MeV" => Some(MEV),
        "GeV" => Some(GEV),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_units_resolve_to_millimetres() {
        assert_eq!(parse_length_unit("cm"), Some(10.0));
        assert_eq!(parse_length_unit("um"), Some(1.0e-3));
        assert_eq!(parse_length_unit("furlong"), None);
    }

    #[test]
    fn energy_units_are_case_sensitive() {
        assert_eq!(parse_energy_unit("GeV"), Some(1000.0));
        assert_eq!(parse_energy_unit("gev"), None);
    }
}
