use anyhow::{bail, Context};
use beamcore::geometry::{DetectorConstruction, MacroScript, MaterialCatalog, RunPlan};
use beamcore::output::{CsvSink, OutputSink};
use beamcore::run::ActionInitialization;
use clap::{Parser, Subcommand};
use generator::trace::{build_trace, TraceConfig};
use std::fs;
use std::path::PathBuf;
use workflow::config::Request;
use workflow::runner::Runner;
use workflow::trace::{read_trace, write_trace};

mod generator;
mod workflow;

const DEFAULT_OUTPUT: &str = "beamscan_output";

#[derive(Parser)]
#[command(author, version, about = "BeamScan telescope driver: macros, scan requests and trace replay")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a macro, build the detector and replay a step trace
    Run {
        /// Macro file with /beamscan, /gun and /run commands
        #[arg(short = 'm', long = "macro")]
        macro_file: Option<PathBuf>,
        /// JSON-lines step trace; a synthetic trace is generated when absent
        #[arg(long)]
        trace: Option<PathBuf>,
        /// Number of worker action sets
        #[arg(long, default_value_t = 1)]
        workers: usize,
        /// Event count when the macro has no /run/beamOn
        #[arg(long, default_value_t = 100)]
        events: u64,
        /// Seed for the synthetic trace
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Keep the synthetic trace as JSON lines
        #[arg(long)]
        save_trace: Option<PathBuf>,
    },
    /// Check scan request files
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Write one macro per material x momentum of a scan request
    Generate {
        request: PathBuf,
        #[arg(long, default_value = "macros/auto")]
        output_dir: PathBuf,
        #[arg(long, default_value = "results/beamscan")]
        results_dir: PathBuf,
    },
    /// List the material catalog
    Materials,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let catalog = MaterialCatalog::standard();

    match args.command {
        Commands::Run {
            macro_file,
            trace,
            workers,
            events,
            seed,
            save_trace,
        } => {
            let plan = match macro_file {
                Some(path) => {
                    let text = fs::read_to_string(&path)
                        .with_context(|| format!("reading macro {}", path.display()))?;
                    let script = MacroScript::parse(&text)
                        .with_context(|| format!("parsing macro {}", path.display()))?;
                    RunPlan::from_script(&script)
                }
                None => RunPlan::default(),
            };
            let layout = DetectorConstruction::construct(&plan.detector, &catalog);

            let trace_events = match trace {
                Some(path) => read_trace(&path)?,
                None => {
                    let config = TraceConfig {
                        events: if plan.events > 0 { plan.events } else { events },
                        seed,
                        ..Default::default()
                    };
                    build_trace(&config, &layout, &plan.gun)
                }
            };
            if let Some(path) = save_trace {
                write_trace(&path, &trace_events)?;
            }

            let base = plan
                .output_file
                .clone()
                .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
            let init = ActionInitialization::new(&layout, plan.gun.clone());
            let runner = Runner::new(workers);
            let result = runner.execute(&layout, &init, &trace_events, |worker| {
                CsvSink::for_run(&base, (workers > 1).then_some(worker))
            })?;

            println!(
                "Run complete -> events {}, rows {}, incomplete {}, degenerate {}",
                result.summary.events,
                result.summary.accepted(),
                result.summary.incomplete,
                result.metrics.degenerate
            );
            for sink in &result.sinks {
                println!("  {} ({} rows)", sink.path().display(), sink.rows_written());
            }
        }
        Commands::Validate { files } => {
            let mut failed = 0;
            for path in &files {
                let problems = match Request::load(path) {
                    Ok(request) => request.validate(&catalog),
                    Err(err) => vec![format!("{:#}", err)],
                };
                if problems.is_empty() {
                    println!("ok      {}", path.display());
                } else {
                    failed += 1;
                    println!("FAILED  {}", path.display());
                    for problem in problems {
                        println!("   - {}", problem);
                    }
                }
            }
            if failed > 0 {
                bail!("{} of {} request file(s) failed validation", failed, files.len());
            }
        }
        Commands::Generate {
            request,
            output_dir,
            results_dir,
        } => {
            let parsed = Request::load(&request)?;
            let problems = parsed.validate(&catalog);
            if !problems.is_empty() {
                bail!("invalid request {}: {}", request.display(), problems.join("; "));
            }
            let written =
                generator::macros::write_macros(&parsed, &request, &output_dir, &results_dir)?;
            println!(
                "Generated {} macro(s); run script {}",
                written.len(),
                output_dir.join("run_all.sh").display()
            );
        }
        Commands::Materials => {
            for name in catalog.names() {
                if let Some(material) = catalog.find(name) {
                    println!(
                        "{:<24} {:>10.5} g/cm3  X0 {:>10.3} cm",
                        material.name,
                        material.density,
                        material.radiation_length()
                    );
                }
            }
        }
    }

    Ok(())
}
