//! Detector layout along the beam (z) axis:
//!
//! ```text
//! Tracker1 -> Tracker2 -> [gap] -> Target -> [gap] -> Tracker3 -> Tracker4 -> Calorimeter
//! ```

use log::info;
use serde::{Deserialize, Serialize};

use crate::geometry::materials::{Material, MaterialCatalog, DEFAULT_MATERIAL};
use crate::math::units::{CM, M, MM, UM};
use crate::prelude::{Vec3, VolumeId};

const WORLD_SIZE: f64 = 3.0 * M;
const TRACKER_THICKNESS: f64 = 300.0 * UM;
const TRACKER_XY: f64 = 4.0 * CM;
const TRACKER_Z: [f64; 4] = [-50.0 * CM, -25.0 * CM, 25.0 * CM, 50.0 * CM];
const TARGET_XY: f64 = 10.0 * CM;
const CALO_XY: f64 = 15.0 * CM;
const CALO_Z: f64 = 30.0 * CM;
const CALO_POSITION_Z: f64 = 100.0 * CM;

const TRACKER_MATERIAL: &str = "G4_Si";
const WORLD_MATERIAL: &str = "G4_AIR";
const CALO_MATERIAL: &str = "G4_LEAD_OXIDE";

/// User-tunable detector parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub target_material: String,
    /// Target slab thickness in mm.
    pub target_thickness: f64,
    pub use_magnet: bool,
    pub magnet_field_t: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            target_material: DEFAULT_MATERIAL.to_string(),
            target_thickness: 10.0 * MM,
            use_magnet: false,
            magnet_field_t: 0.5,
        }
    }
}

/// Axis-aligned box placed in the world frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedVolume {
    pub id: VolumeId,
    pub name: String,
    pub material: String,
    pub center: Vec3,
    pub half_extent: Vec3,
}

impl PlacedVolume {
    pub fn contains(&self, point: &Vec3) -> bool {
        let d = point - self.center;
        d.x.abs() <= self.half_extent.x
            && d.y.abs() <= self.half_extent.y
            && d.z.abs() <= self.half_extent.z
    }
}

/// Volume identities the step classifier routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensitiveVolumes {
    /// Tracker planes ordered 0..4 along the beam.
    pub trackers: [VolumeId; 4],
    pub target: VolumeId,
    pub calorimeter: VolumeId,
}

/// Uniform field along +y, in tesla.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformField {
    pub by_tesla: f64,
}

#[derive(Debug, Clone)]
pub struct DetectorLayout {
    volumes: Vec<PlacedVolume>,
    sensitive: SensitiveVolumes,
    target_material: Material,
    field: Option<UniformField>,
}

impl DetectorLayout {
    pub fn sensitive(&self) -> SensitiveVolumes {
        self.sensitive
    }

    pub fn volumes(&self) -> &[PlacedVolume] {
        &self.volumes
    }

    pub fn volume(&self, id: VolumeId) -> Option<&PlacedVolume> {
        self.volumes.iter().find(|v| v.id == id)
    }

    pub fn volume_by_name(&self, name: &str) -> Option<&PlacedVolume> {
        self.volumes.iter().find(|v| v.name == name)
    }

    pub fn world(&self) -> &PlacedVolume {
        &self.volumes[0]
    }

    pub fn target_material(&self) -> &Material {
        &self.target_material
    }

    pub fn field(&self) -> Option<UniformField> {
        self.field
    }

    /// Innermost volume containing `point`: a daughter if any, else the world.
    /// Returns `None` outside the world.
    pub fn locate(&self, point: &Vec3) -> Option<VolumeId> {
        self.volumes[1..]
            .iter()
            .find(|v| v.contains(point))
            .or_else(|| Some(self.world()).filter(|w| w.contains(point)))
            .map(|v| v.id)
    }
}

pub struct DetectorConstruction;

impl DetectorConstruction {
    pub fn construct(config: &DetectorConfig, catalog: &MaterialCatalog) -> DetectorLayout {
        let mut volumes = Vec::with_capacity(7);
        let mut place = |name: &str, material: &str, center: Vec3, full: Vec3| {
            let id = VolumeId(volumes.len() as u32);
            volumes.push(PlacedVolume {
                id,
                name: name.to_string(),
                material: material.to_string(),
                center,
                half_extent: full / 2.0,
            });
            id
        };

        place(
            "World",
            WORLD_MATERIAL,
            Vec3::zeros(),
            Vec3::new(WORLD_SIZE, WORLD_SIZE, WORLD_SIZE),
        );

        let tracker_box = Vec3::new(TRACKER_XY, TRACKER_XY, TRACKER_THICKNESS);
        let mut trackers = [VolumeId(0); 4];
        for (k, z) in TRACKER_Z.iter().enumerate() {
            trackers[k] = place(
                &format!("Tracker{}", k + 1),
                TRACKER_MATERIAL,
                Vec3::new(0.0, 0.0, *z),
                tracker_box,
            );
        }

        let target_material = catalog.resolve_or_default(&config.target_material).clone();
        let target = place(
            "Target",
            &target_material.name,
            Vec3::zeros(),
            Vec3::new(TARGET_XY, TARGET_XY, config.target_thickness),
        );

        let calorimeter = place(
            "Calo",
            CALO_MATERIAL,
            Vec3::new(0.0, 0.0, CALO_POSITION_Z),
            Vec3::new(CALO_XY, CALO_XY, CALO_Z),
        );

        info!("BeamScan target configuration:");
        info!("  material:   {}", target_material.name);
        info!("  thickness:  {} mm", config.target_thickness / MM);
        info!("  density:    {} g/cm3", target_material.density);
        info!("  rad.length: {:.3} cm", target_material.radiation_length());

        let field = config.use_magnet.then(|| {
            info!(
                "magnetic field enabled: B = {} T (y-direction)",
                config.magnet_field_t
            );
            UniformField {
                by_tesla: config.magnet_field_t,
            }
        });

        DetectorLayout {
            volumes,
            sensitive: SensitiveVolumes {
                trackers,
                target,
                calorimeter,
            },
            target_material,
            field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(config: &DetectorConfig) -> DetectorLayout {
        DetectorConstruction::construct(config, &MaterialCatalog::standard())
    }

    #[test]
    fn sensitive_volumes_are_distinct_and_ordered_along_beam() {
        let layout = build(&DetectorConfig::default());
        let sensitive = layout.sensitive();
        let z: Vec<f64> = sensitive
            .trackers
            .iter()
            .map(|id| layout.volume(*id).unwrap().center.z)
            .collect();
        assert!(z.windows(2).all(|w| w[0] < w[1]));
        assert_ne!(sensitive.target, sensitive.calorimeter);
        assert!(!sensitive.trackers.contains(&sensitive.target));
    }

    #[test]
    fn locate_finds_innermost_volume() {
        let layout = build(&DetectorConfig::default());
        let sensitive = layout.sensitive();
        assert_eq!(
            layout.locate(&Vec3::new(0.0, 0.0, -500.0)),
            Some(sensitive.trackers[0])
        );
        assert_eq!(layout.locate(&Vec3::new(1.0, 1.0, 0.0)), Some(sensitive.target));
        assert_eq!(
            layout.locate(&Vec3::new(0.0, 0.0, 1000.0)),
            Some(sensitive.calorimeter)
        );
        assert_eq!(layout.locate(&Vec3::new(0.0, 0.0, -100.0)), Some(layout.world().id));
        assert_eq!(layout.locate(&Vec3::new(0.0, 0.0, 5000.0)), None);
    }

    #[test]
    fn unknown_target_material_uses_default() {
        let config = DetectorConfig {
            target_material: "NotAMaterial".into(),
            ..Default::default()
        };
        let layout = build(&config);
        assert_eq!(layout.target_material().name, DEFAULT_MATERIAL);
    }

    #[test]
    fn custom_target_and_magnet() {
        let config = DetectorConfig {
            target_material: "Obsidian".into(),
            target_thickness: 25.0,
            use_magnet: true,
            magnet_field_t: 1.5,
        };
        let layout = build(&config);
        let target = layout.volume(layout.sensitive().target).unwrap();
        assert_eq!(target.material, "Obsidian");
        assert!((target.half_extent.z - 12.5).abs() < 1e-12);
        assert_eq!(layout.field(), Some(UniformField { by_tesla: 1.5 }));
    }
}
