use anyhow::Context;
use beamcore::geometry::MaterialCatalog;
use beamcore::source::Particle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One target in a scan request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaterialRequest {
    /// Human-facing name, used in file names.
    pub name: String,
    /// Catalog name handed to `/beamscan/target/material`.
    pub geant4_name: String,
    pub thickness_mm: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BeamRequest {
    #[serde(default = "default_particle")]
    pub particle: String,
    #[serde(rename = "momenta_GeV")]
    pub momenta_gev: Vec<f64>,
    #[serde(default = "default_num_events")]
    pub num_events: u64,
}

fn default_particle() -> String {
    "e-".to_string()
}

fn default_num_events() -> u64 {
    10_000
}

/// A material x momentum scan, as written by a user in YAML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Request {
    pub materials: Vec<MaterialRequest>,
    pub beam: BeamRequest,
}

impl Request {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading request {}", path_ref.display()))?;
        Self::parse(&contents).with_context(|| format!("parsing request {}", path_ref.display()))
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let request: Request = serde_yaml::from_str(contents)?;
        Ok(request)
    }

    pub fn particle(&self) -> Option<Particle> {
        self.beam.particle.parse().ok()
    }

    /// Lists every problem found, as `location: message`.
    pub fn validate(&self, catalog: &MaterialCatalog) -> Vec<String> {
        let mut problems = Vec::new();
        if self.materials.is_empty() {
            problems.push("materials: at least one material is required".to_string());
        }
        for (i, material) in self.materials.iter().enumerate() {
            if material.name.trim().is_empty() {
                problems.push(format!("materials.{}.name: must not be empty", i));
            }
            if !catalog.contains(&material.geant4_name) {
                problems.push(format!(
                    "materials.{}.geant4_name: unknown material {:?}",
                    i, material.geant4_name
                ));
            }
            if !(material.thickness_mm > 0.0) {
                problems.push(format!(
                    "materials.{}.thickness_mm: {} is not > 0",
                    i, material.thickness_mm
                ));
            }
        }
        if self.particle().is_none() {
            problems.push(format!("beam.particle: unknown particle {:?}", self.beam.particle));
        }
        if self.beam.momenta_gev.is_empty() {
            problems.push("beam.momenta_GeV: at least one momentum is required".to_string());
        }
        for (i, p) in self.beam.momenta_gev.iter().enumerate() {
            if !(*p > 0.0) {
                problems.push(format!("beam.momenta_GeV.{}: {} is not > 0", i, p));
            }
        }
        if self.beam.num_events == 0 {
            problems.push("beam.num_events: must be at least 1".to_string());
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const REQUEST: &str = "\
materials:
  - name: obsidian
    geant4_name: Obsidian
    thickness_mm: 10
  - name: pmma
    geant4_name: G4_PLEXIGLASS
    thickness_mm: 5
beam:
  particle: e-
  momenta_GeV: [1.0, 3.0]
  num_events: 500
";

    #[test]
    fn request_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(REQUEST.as_bytes()).unwrap();
        let path = temp.into_temp_path();
        let request = Request::load(&path).unwrap();
        assert_eq!(request.materials.len(), 2);
        assert_eq!(request.beam.momenta_gev, vec![1.0, 3.0]);
        assert!(request.validate(&MaterialCatalog::standard()).is_empty());
    }

    #[test]
    fn beam_defaults_apply() {
        let request = Request::parse(
            "materials: [{name: a, geant4_name: G4_Si, thickness_mm: 1}]\nbeam: {momenta_GeV: [2]}\n",
        )
        .unwrap();
        assert_eq!(request.beam.particle, "e-");
        assert_eq!(request.beam.num_events, 10_000);
    }

    #[test]
    fn validate_reports_every_problem() {
        let request = Request::parse(
            "\
materials:
  - name: x
    geant4_name: Kryptonite
    thickness_mm: 0
beam:
  particle: photon
  momenta_GeV: [-1]
  num_events: 0
",
        )
        .unwrap();
        let problems = request.validate(&MaterialCatalog::standard());
        assert_eq!(problems.len(), 5, "{problems:?}");
        assert!(problems[0].starts_with("materials.0.geant4_name"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Request::parse("materials: []\nbeam: {momenta_GeV: [1]}\ncolour: red\n").is_err());
    }
}
