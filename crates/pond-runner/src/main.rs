//! Command-line runner: load an ecosystem description and simulate it.

mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use pond_core::{SimulationConfig, StreamSelection, WeekReport};
use pond_world::Simulation;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pond-runner")]
#[command(about = "Simulate guppy populations across pools and streams")]
#[command(version)]
struct Cli {
    /// Ecosystem description file
    input: PathBuf,

    /// Number of weeks to simulate
    #[arg(short, long, default_value_t = 10)]
    weeks: usize,

    /// Random seed (overrides the config file)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON simulation config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stream choice for crowded pools: legacy or uniform
    #[arg(long)]
    selection: Option<StreamSelection>,

    /// Print reports as JSON lines instead of text
    #[arg(long)]
    json: bool,

    /// Step back this many weeks after simulating and show that week again
    #[arg(long, default_value_t = 0)]
    back: usize,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = telemetry::init_telemetry(cli.log_json) {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }

    if let Err(e) = run(cli) {
        error!(error = %e, "Run failed");
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(selection) = cli.selection {
        config.stream_selection = selection;
    }

    info!(
        input = %cli.input.display(),
        weeks = cli.weeks,
        seed = config.seed,
        selection = ?config.stream_selection,
        "Starting pond simulation"
    );

    let mut sim = Simulation::new(config);
    sim.load_file(&cli.input)
        .with_context(|| format!("loading ecosystem {}", cli.input.display()))?;

    if !cli.json {
        println!("{}", sim.title());
    }
    if let Some(initial) = sim.current_report() {
        print_report(initial, cli.json)?;
    }

    for _ in 0..cli.weeks {
        let report = sim.next_week()?;
        print_report(report, cli.json)?;
    }

    if cli.back > 0 {
        for _ in 0..cli.back {
            sim.previous_week()?;
        }
        if let Some(report) = sim.current_report() {
            if !cli.json {
                println!("-- stepped back {} weeks --", cli.back);
            }
            print_report(report, cli.json)?;
        }
    }

    info!(
        weeks = sim.history_len() - 1,
        shown = ?sim.week(),
        "Simulation finished"
    );
    Ok(())
}

fn print_report(report: &WeekReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else {
        println!("{}", report);
        println!();
    }
    Ok(())
}
