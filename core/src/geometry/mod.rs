pub mod commands;
pub mod detector;
pub mod materials;

pub use commands::{Command, CommandError, MacroScript, RunPlan};
pub use detector::{
    DetectorConfig, DetectorConstruction, DetectorLayout, PlacedVolume, SensitiveVolumes,
    UniformField,
};
pub use materials::{Material, MaterialCatalog, DEFAULT_MATERIAL};
