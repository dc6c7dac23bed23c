#![deny(unsafe_code)]
//! Headless driver for the ripple water surface.
//!
//! Subcommands:
//! - `run`: drive a scripted scenario for N ticks, write a PNG snapshot
//! - `replay <seed.json>`: rerun a recorded seed
//! - `params`: print the parameter schema

mod error;
mod scenario;
mod snapshot;

use clap::{Parser, Subcommand};
use error::CliError;
use ripple_core::Seed;
use ripple_water::{SimConfig, SurfaceStats};
use scenario::{run_seed, Scenario};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ripple", about = "Touch-driven water surface simulator")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drive a scripted input scenario and write a PNG snapshot.
    Run {
        /// Input script.
        #[arg(long, value_enum, default_value_t = Scenario::Tap)]
        scenario: Scenario,

        /// Grid width in texels.
        #[arg(short = 'W', long, default_value_t = 128)]
        width: usize,

        /// Grid height in texels.
        #[arg(short = 'H', long, default_value_t = 128)]
        height: usize,

        /// View width in pixels (defaults to 4 px per texel).
        #[arg(long)]
        view_width: Option<f32>,

        /// View height in pixels (defaults to 4 px per texel).
        #[arg(long)]
        view_height: Option<f32>,

        /// Number of ticks.
        #[arg(short, long, default_value_t = 600)]
        steps: usize,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Simulation parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Snapshot path.
        #[arg(short, long, default_value = "ripple.png")]
        output: PathBuf,

        /// Also write the run's seed file here.
        #[arg(long)]
        seed_out: Option<PathBuf>,
    },
    /// Replay a seed file written by `run --seed-out`.
    Replay {
        /// Seed JSON file.
        seed_file: PathBuf,

        /// Snapshot path; no image is written when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print every simulation parameter with its default and range.
    Params,
}

/// Default view pixels per grid texel.
const VIEW_SCALE: f32 = 4.0;

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Params => {
            let schema = SimConfig::schema();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&schema)?);
            } else if let Some(entries) = schema.as_object() {
                for (name, entry) in entries {
                    println!(
                        "{name:<28} default {:<8} {}",
                        entry["default"].to_string(),
                        entry["description"].as_str().unwrap_or_default()
                    );
                }
            }
        }
        Command::Run {
            scenario,
            width,
            height,
            view_width,
            view_height,
            steps,
            seed,
            params,
            output,
            seed_out,
        } => {
            let params: serde_json::Value = serde_json::from_str(&params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;

            let mut record = Seed::new(scenario.name(), width, height, seed);
            record.view_width = view_width.unwrap_or(width as f32 * VIEW_SCALE);
            record.view_height = view_height.unwrap_or(height as f32 * VIEW_SCALE);
            record.params = params;
            record.steps = steps;

            let surface = run_seed(&record)?;
            snapshot::write_png(&surface, &output)?;
            if let Some(path) = &seed_out {
                write_seed(&record, path)?;
            }
            report(cli.json, &record, &surface.stats(), Some(&output))?;
        }
        Command::Replay { seed_file, output } => {
            let text = std::fs::read_to_string(&seed_file)
                .map_err(|e| CliError::Io(format!("{}: {e}", seed_file.display())))?;
            let record: Seed = serde_json::from_str(&text)
                .map_err(|e| CliError::Input(format!("invalid seed file: {e}")))?;

            let surface = run_seed(&record)?;
            if let Some(path) = &output {
                snapshot::write_png(&surface, path)?;
            }
            report(cli.json, &record, &surface.stats(), output.as_deref())?;
        }
    }

    Ok(())
}

fn write_seed(record: &Seed, path: &Path) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(record)?;
    std::fs::write(path, text).map_err(|e| CliError::Io(format!("{}: {e}", path.display())))
}

fn report(
    json: bool,
    record: &Seed,
    stats: &SurfaceStats,
    output: Option<&Path>,
) -> Result<(), CliError> {
    if json {
        let info = serde_json::json!({
            "seed": record,
            "stats": stats,
            "output": output.map(|p| p.display().to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        eprintln!(
            "{} ({}x{}, {} steps, seed {}): max height {:.4}, max speed {:.3}, {} impulses, {} particles",
            record.scenario,
            record.width,
            record.height,
            record.steps,
            record.seed,
            stats.max_height,
            stats.max_speed,
            stats.impulses_total,
            stats.particles,
        );
        if let Some(path) = output {
            eprintln!("snapshot -> {}", path.display());
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
