//! Text command surface for detector, gun, output and run settings.
//!
//! A macro is a list of lines like `/beamscan/target/thickness 5 mm`.
//! Parsing is strict: unknown commands, bad values and out-of-range values
//! are errors carrying the offending line.

use crate::geometry::detector::DetectorConfig;
use crate::math::units::{parse_energy_unit, parse_length_unit, CM, GEV, MM};
use crate::prelude::Vec3;
use crate::source::{Particle, ParticleGun};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("{command}: missing parameter {parameter}")]
    MissingParameter {
        command: String,
        parameter: &'static str,
    },
    #[error("{command}: invalid value {value:?}")]
    InvalidValue { command: String, value: String },
    #[error("{command}: {value} violates {constraint}")]
    OutOfRange {
        command: String,
        value: f64,
        constraint: &'static str,
    },
    #[error("{command}: unknown unit {unit:?}")]
    UnknownUnit { command: String, unit: String },
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<CommandError>,
    },
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    TargetMaterial(String),
    /// Thickness in mm.
    TargetThickness(f64),
    UseMagnet(bool),
    MagnetFieldT(f64),
    GunParticle(Particle),
    /// Kinetic energy in MeV.
    GunEnergy(f64),
    GunDirection(Vec3),
    /// Position in mm.
    GunPosition(Vec3),
    OutputFilename(String),
    RunInitialize,
    BeamOn(u64),
    /// Verbosity controls; accepted and ignored.
    Verbose,
}

struct Args<'a> {
    command: &'a str,
    tokens: std::slice::Iter<'a, &'a str>,
}

impl<'a> Args<'a> {
    fn next(&mut self, parameter: &'static str) -> CommandResult<&'a str> {
        self.tokens
            .next()
            .copied()
            .ok_or_else(|| CommandError::MissingParameter {
                command: self.command.to_string(),
                parameter,
            })
    }

    fn optional(&mut self) -> Option<&'a str> {
        self.tokens.next().copied()
    }

    fn invalid(&self, value: &str) -> CommandError {
        CommandError::InvalidValue {
            command: self.command.to_string(),
            value: value.to_string(),
        }
    }

    fn number(&mut self, parameter: &'static str) -> CommandResult<f64> {
        let raw = self.next(parameter)?;
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.invalid(raw))
    }

    fn vector(&mut self) -> CommandResult<Vec3> {
        Ok(Vec3::new(
            self.number("x")?,
            self.number("y")?,
            self.number("z")?,
        ))
    }

    fn unit(
        &mut self,
        default: f64,
        resolve: fn(&str) -> Option<f64>,
    ) -> CommandResult<f64> {
        match self.optional() {
            None => Ok(default),
            Some(symbol) => resolve(symbol).ok_or_else(|| CommandError::UnknownUnit {
                command: self.command.to_string(),
                unit: symbol.to_string(),
            }),
        }
    }

    fn boolean(&mut self, parameter: &'static str) -> CommandResult<bool> {
        let raw = self.next(parameter)?;
        match raw {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(self.invalid(raw)),
        }
    }

    fn out_of_range(&self, value: f64, constraint: &'static str) -> CommandError {
        CommandError::OutOfRange {
            command: self.command.to_string(),
            value,
            constraint,
        }
    }
}

impl Command {
    /// Parses one non-empty, non-comment line.
    pub fn parse(line: &str) -> CommandResult<Command> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = tokens.split_first() else {
            return Err(CommandError::UnknownCommand(String::new()));
        };
        let mut args = Args {
            command,
            tokens: rest.iter(),
        };

        match command {
            "/beamscan/target/material" => {
                Ok(Command::TargetMaterial(args.next("mat")?.to_string()))
            }
            "/beamscan/target/thickness" => {
                let value = args.number("t")?;
                let thickness = value * args.unit(MM, parse_length_unit)?;
                if thickness <= 0.0 {
                    return Err(args.out_of_range(value, "t>0."));
                }
                Ok(Command::TargetThickness(thickness))
            }
            "/beamscan/target/useMagnet" => Ok(Command::UseMagnet(args.boolean("flag")?)),
            "/beamscan/target/magnetFieldT" => {
                let field = args.number("B")?;
                if field < 0.0 {
                    return Err(args.out_of_range(field, "B>=0."));
                }
                Ok(Command::MagnetFieldT(field))
            }
            "/gun/particle" => {
                let name = args.next("particle")?;
                name.parse::<Particle>()
                    .map(Command::GunParticle)
                    .map_err(|_| args.invalid(name))
            }
            "/gun/energy" => {
                let value = args.number("energy")?;
                let energy = value * args.unit(GEV, parse_energy_unit)?;
                if energy <= 0.0 {
                    return Err(args.out_of_range(value, "energy>0."));
                }
                Ok(Command::GunEnergy(energy))
            }
            "/gun/direction" => {
                let direction = args.vector()?;
                if direction.norm() == 0.0 {
                    return Err(args.invalid("0 0 0"));
                }
                Ok(Command::GunDirection(direction))
            }
            "/gun/position" => {
                let position = args.vector()?;
                Ok(Command::GunPosition(position * args.unit(CM, parse_length_unit)?))
            }
            "/beamscan/output/filename" => {
                Ok(Command::OutputFilename(args.next("filename")?.to_string()))
            }
            "/run/initialize" => Ok(Command::RunInitialize),
            "/run/beamOn" => {
                let raw = args.next("events")?;
                raw.parse::<u64>()
                    .map(Command::BeamOn)
                    .map_err(|_| args.invalid(raw))
            }
            "/control/verbose" | "/run/verbose" | "/event/verbose" | "/tracking/verbose" => {
                Ok(Command::Verbose)
            }
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }
}

/// Parsed macro file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacroScript {
    pub commands: Vec<Command>,
}

impl MacroScript {
    pub fn parse(text: &str) -> CommandResult<Self> {
        let mut commands = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let command = Command::parse(line).map_err(|err| CommandError::AtLine {
                line: index + 1,
                source: Box::new(err),
            })?;
            commands.push(command);
        }
        Ok(Self { commands })
    }
}

/// Everything a macro configures for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub detector: DetectorConfig,
    pub gun: ParticleGun,
    pub output_file: Option<String>,
    /// Sum over all `/run/beamOn` commands, saturating at `u64::MAX`.
    pub events: u64,
    pub initialized: bool,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            gun: ParticleGun::default(),
            output_file: None,
            events: 0,
            initialized: false,
        }
    }
}

impl RunPlan {
    pub fn from_script(script: &MacroScript) -> Self {
        let mut plan = Self::default();
        for command in &script.commands {
            plan.apply(command);
        }
        plan
    }

    pub fn apply(&mut self, command: &Command) {
        match command {
            Command::TargetMaterial(name) => self.detector.target_material = name.clone(),
            Command::TargetThickness(t) => self.detector.target_thickness = *t,
            Command::UseMagnet(flag) => self.detector.use_magnet = *flag,
            Command::MagnetFieldT(b) => self.detector.magnet_field_t = *b,
            Command::GunParticle(p) => self.gun.particle = *p,
            Command::GunEnergy(e) => self.gun.kinetic_energy = *e,
            Command::GunDirection(d) => self.gun.direction = *d,
            Command::GunPosition(p) => self.gun.position = *p,
            Command::OutputFilename(f) => self.output_file = Some(f.clone()),
            Command::RunInitialize => self.initialized = true,
            Command::BeamOn(n) => self.events = self.events.saturating_add(*n),
            Command::Verbose => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::units::MEV;

    #[test]
    fn thickness_defaults_to_millimetres_and_accepts_units() {
        assert_eq!(
            Command::parse("/beamscan/target/thickness 5").unwrap(),
            Command::TargetThickness(5.0)
        );
        assert_eq!(
            Command::parse("/beamscan/target/thickness 2 cm").unwrap(),
            Command::TargetThickness(20.0)
        );
    }

    #[test]
    fn thickness_must_be_positive() {
        let err = Command::parse("/beamscan/target/thickness 0 mm").unwrap_err();
        assert!(matches!(err, CommandError::OutOfRange { .. }));
    }

    #[test]
    fn field_must_not_be_negative() {
        assert_eq!(
            Command::parse("/beamscan/target/magnetFieldT 0").unwrap(),
            Command::MagnetFieldT(0.0)
        );
        assert!(matches!(
            Command::parse("/beamscan/target/magnetFieldT -0.1"),
            Err(CommandError::OutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            Command::parse("/beamscan/target/useMagnet maybe"),
            Err(CommandError::InvalidValue { .. })
        ));
        assert!(matches!(
            Command::parse("/beamscan/target/thickness 3 parsec"),
            Err(CommandError::UnknownUnit { .. })
        ));
        assert!(matches!(
            Command::parse("/beamscan/target/material"),
            Err(CommandError::MissingParameter { .. })
        ));
        assert!(matches!(
            Command::parse("/beamscan/nothing 1"),
            Err(CommandError::UnknownCommand(_))
        ));
    }

    #[test]
    fn macro_builds_run_plan() {
        let text = "\
# target
/control/verbose 0
/beamscan/target/material Granite
/beamscan/target/thickness 20 mm
/run/initialize

/gun/particle mu-
/gun/energy 5000 MeV
/gun/direction 0 0 1
/gun/position 0 0 -50 cm
/beamscan/output/filename results/granite.csv
/run/beamOn 250
";
        let plan = RunPlan::from_script(&MacroScript::parse(text).unwrap());
        assert_eq!(plan.detector.target_material, "Granite");
        assert_eq!(plan.detector.target_thickness, 20.0);
        assert_eq!(plan.gun.particle, Particle::MuonMinus);
        assert_eq!(plan.gun.kinetic_energy, 5000.0 * MEV);
        assert_eq!(plan.gun.position, Vec3::new(0.0, 0.0, -500.0));
        assert_eq!(plan.output_file.as_deref(), Some("results/granite.csv"));
        assert_eq!(plan.events, 250);
        assert!(plan.initialized);
    }

    #[test]
    fn macro_errors_report_line_number() {
        let err = MacroScript::parse("/run/initialize\n\n/run/beamOn many\n").unwrap_err();
        match err {
            CommandError::AtLine { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn repeated_beam_on_saturates_event_count() {
        let script =
            MacroScript::parse("/run/beamOn 18446744073709551615\n/run/beamOn 1\n").unwrap();
        assert_eq!(RunPlan::from_script(&script).events, u64::MAX);
    }
}
