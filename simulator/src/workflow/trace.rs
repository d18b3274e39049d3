//! Step traces: the per-event step stream a transport engine would feed the
//! lifecycle hooks, stored as JSON lines (one event per line).

use anyhow::{anyhow, Context};
use beamcore::geometry::DetectorLayout;
use beamcore::{Step, Vec3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    /// Placed volume name, e.g. `Tracker2` or `Calo`. When absent the volume
    /// is located from the position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    /// Pre-step position in mm.
    pub position: [f64; 3],
    /// Pre-step momentum in MeV.
    pub momentum: [f64; 3],
    /// Energy deposited in the step, MeV.
    #[serde(default)]
    pub edep: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub event: u64,
    pub steps: Vec<TraceStep>,
}

impl TraceStep {
    pub fn resolve(&self, layout: &DetectorLayout) -> anyhow::Result<Step> {
        let position = Vec3::from(self.position);
        let volume = match &self.volume {
            Some(name) => layout
                .volume_by_name(name)
                .map(|v| v.id)
                .ok_or_else(|| anyhow!("unknown volume {:?}", name))?,
            None => layout
                .locate(&position)
                .ok_or_else(|| anyhow!("step at {:?} lies outside the world", self.position))?,
        };
        Ok(Step::new(volume, position, Vec3::from(self.momentum), self.edep))
    }
}

impl TraceEvent {
    pub fn resolve(&self, layout: &DetectorLayout) -> anyhow::Result<Vec<Step>> {
        self.steps
            .iter()
            .map(|step| step.resolve(layout))
            .collect::<anyhow::Result<Vec<_>>>()
            .with_context(|| format!("resolving steps of event {}", self.event))
    }
}

pub fn read_trace<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<TraceEvent>> {
    let path_ref = path.as_ref();
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("reading trace {}", path_ref.display()))?;
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<TraceEvent>(line)
                .with_context(|| format!("{}:{}: malformed event", path_ref.display(), index + 1))
        })
        .collect()
}

pub fn write_trace<P: AsRef<Path>>(path: P, events: &[TraceEvent]) -> anyhow::Result<()> {
    let path_ref = path.as_ref();
    let file = fs::File::create(path_ref)
        .with_context(|| format!("creating trace {}", path_ref.display()))?;
    let mut writer = BufWriter::new(file);
    for event in events {
        serde_json::to_writer(&mut writer, event)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use beamcore::geometry::{DetectorConfig, DetectorConstruction, MaterialCatalog};
    use tempfile::tempdir;

    fn layout() -> DetectorLayout {
        DetectorConstruction::construct(&DetectorConfig::default(), &MaterialCatalog::standard())
    }

    #[test]
    fn trace_round_trips_through_json_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.jsonl");
        let events = vec![TraceEvent {
            event: 3,
            steps: vec![TraceStep {
                volume: Some("Tracker1".into()),
                position: [0.0, 0.0, -500.0],
                momentum: [0.0, 0.0, 3000.0],
                edep: 0.08,
            }],
        }];
        write_trace(&path, &events).unwrap();
        assert_eq!(read_trace(&path).unwrap(), events);
    }

    #[test]
    fn steps_resolve_against_layout() {
        let layout = layout();
        let line = r#"{"event": 0, "steps": [{"volume": "Calo", "position": [0, 0, 1000], "momentum": [0, 0, 10]}]}"#;
        let event: TraceEvent = serde_json::from_str(line).unwrap();
        let steps = event.resolve(&layout).unwrap();
        assert_eq!(steps[0].volume, layout.sensitive().calorimeter);
        assert_eq!(steps[0].energy_deposit, 0.0);
    }

    #[test]
    fn unknown_volume_is_an_error() {
        let layout = layout();
        let step = TraceStep {
            volume: Some("Magnet".into()),
            position: [0.0; 3],
            momentum: [0.0; 3],
            edep: 0.0,
        };
        assert!(step.resolve(&layout).is_err());
    }

    #[test]
    fn unnamed_steps_are_located_by_position() {
        let layout = layout();
        let line = r#"{"event": 1, "steps": [
            {"position": [0, 0, -500], "momentum": [0, 0, 3000]},
            {"position": [300, 0, -500], "momentum": [0, 0, 3000]},
            {"position": [0, 0, 1000], "momentum": [0, 0, 2900], "edep": 5.0}
        ]}"#;
        let event: TraceEvent = serde_json::from_str(line).unwrap();
        let steps = event.resolve(&layout).unwrap();
        let sensitive = layout.sensitive();
        assert_eq!(steps[0].volume, sensitive.trackers[0]);
        // Beside the tracker plane: only the world contains it.
        assert_eq!(steps[1].volume, layout.world().id);
        assert_eq!(steps[2].volume, sensitive.calorimeter);

        let outside = TraceStep {
            volume: None,
            position: [0.0, 0.0, 5000.0],
            momentum: [0.0; 3],
            edep: 0.0,
        };
        assert!(outside.resolve(&layout).is_err());
    }
}
