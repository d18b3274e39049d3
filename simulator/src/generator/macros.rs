use anyhow::Context;
use beamcore::math::units::GEV;
use beamcore::source::Particle;
use std::fs;
use std::path::{Path, PathBuf};

use crate::workflow::config::Request;

/// Settings for one material x momentum point of a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroSpec {
    pub material_name: String,
    pub catalog_name: String,
    pub thickness_mm: f64,
    pub momentum_gev: f64,
    pub particle: Particle,
    pub num_events: u64,
    pub output_csv: PathBuf,
}

impl MacroSpec {
    /// `<name>_<p>GeV_<t>mm`, shared by the macro and its result directory.
    pub fn stem(&self) -> String {
        format!(
            "{}_{}GeV_{}mm",
            self.material_name, self.momentum_gev, self.thickness_mm
        )
    }

    /// Kinetic energy in MeV for the requested momentum.
    pub fn kinetic_energy_mev(&self) -> f64 {
        let p = self.momentum_gev * GEV;
        let m = self.particle.mass();
        (p * p + m * m).sqrt() - m
    }

    pub fn render(&self) -> String {
        format!(
            "\
# Auto-generated BeamScan macro
# Material: {name} ({catalog})
# Momentum: {p} GeV/c
# Thickness: {t} mm
# Events: {n}

/control/verbose 0
/run/verbose 0
/event/verbose 0
/tracking/verbose 0

/beamscan/target/material {catalog}
/beamscan/target/thickness {t} mm

/run/initialize

/gun/particle {particle}
/gun/energy {energy:.6} MeV
/gun/direction 0 0 1
/gun/position 0 0 -80 cm

/beamscan/output/filename {output}

/run/beamOn {n}
",
            name = self.material_name,
            catalog = self.catalog_name,
            p = self.momentum_gev,
            t = self.thickness_mm,
            n = self.num_events,
            particle = self.particle,
            energy = self.kinetic_energy_mev(),
            output = self.output_csv.display(),
        )
    }
}

/// Expands a request into one spec per material x momentum, in request order.
pub fn expand_request(request: &Request, results_dir: &Path) -> anyhow::Result<Vec<MacroSpec>> {
    let particle = request
        .particle()
        .with_context(|| format!("unknown particle {:?}", request.beam.particle))?;
    let mut specs = Vec::new();
    for material in &request.materials {
        for &momentum_gev in &request.beam.momenta_gev {
            let mut spec = MacroSpec {
                material_name: material.name.clone(),
                catalog_name: material.geant4_name.clone(),
                thickness_mm: material.thickness_mm,
                momentum_gev,
                particle,
                num_events: request.beam.num_events,
                output_csv: PathBuf::new(),
            };
            spec.output_csv = results_dir.join(spec.stem()).join("events.csv");
            specs.push(spec);
        }
    }
    Ok(specs)
}

/// Writes all macros plus a `run_all.sh` driver; returns the macro paths.
pub fn write_macros(
    request: &Request,
    request_path: &Path,
    output_dir: &Path,
    results_dir: &Path,
) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating macro directory {}", output_dir.display()))?;

    let mut written = Vec::new();
    for spec in expand_request(request, results_dir)? {
        if let Some(parent) = spec.output_csv.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating result directory {}", parent.display()))?;
        }
        let path = output_dir.join(format!("{}.mac", spec.stem()));
        fs::write(&path, spec.render())
            .with_context(|| format!("writing macro {}", path.display()))?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }

    let mut script = String::from("#!/bin/bash\n# Auto-generated: run all BeamScan simulations\n");
    script.push_str(&format!("# From request: {}\n\n", request_path.display()));
    script.push_str("BEAMSCAN=\"${BEAMSCAN_BIN:-./target/release/beamscan}\"\n\n");
    for mac in &written {
        let file_name = mac.file_name().unwrap_or_default().to_string_lossy();
        script.push_str(&format!("echo \"Running {}...\"\n", file_name));
        script.push_str(&format!("\"$BEAMSCAN\" run -m {}\n\n", mac.display()));
    }
    script.push_str("echo \"All simulations complete.\"\n");

    let run_all = output_dir.join("run_all.sh");
    fs::write(&run_all, script).with_context(|| format!("writing {}", run_all.display()))?;
    make_executable(&run_all)?;
    Ok(written)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("marking {} executable", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}
