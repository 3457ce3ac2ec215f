//! `ai-sim`: run an encounter headlessly and print a summary.
//!
//! Logs go to stderr; `--trace` streams every agent's trace events to stdout
//! as JSON lines.

use std::path::PathBuf;

use ai_sim::{EncounterConfig, JsonLinesSink, Simulation};
use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "ai-sim")]
#[command(about = "Deterministic NPC encounter simulator", version)]
struct Cli {
    /// Encounter file (YAML); the built-in demo when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 1200)]
    ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.05)]
    dt: f32,

    /// Seed for every random choice in the run
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Emit trace events as JSON lines on stdout
    #[arg(long)]
    trace: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if !(cli.dt.is_finite() && cli.dt > 0.0) {
        bail!("--dt must be a positive number of seconds, got {}", cli.dt);
    }

    let config = match &cli.config {
        Some(path) => EncounterConfig::load(path)?,
        None => EncounterConfig::demo()?,
    };

    let mut sim = Simulation::new(&config, cli.seed, cli.dt)?;
    if cli.trace {
        sim.trace_with(|agent| Box::new(JsonLinesSink::new(agent, std::io::stdout())));
    }

    let report = sim.run(cli.ticks);
    let tally = report.tally;
    info!(
        ticks = report.ticks,
        shots = tally.shots,
        hits = tally.hits,
        attacks = tally.attacks_received,
        dodges = tally.dodges,
        parries = tally.parries,
        player_deaths = tally.player_deaths,
        agents_downed = tally.agents_downed,
        "simulation finished"
    );
    info!(
        level = %report.level,
        skill = report.skill,
        changes = report.level_changes,
        "difficulty"
    );
    for (agent, state) in &report.states {
        info!(agent, state = %state, "final state");
    }
    Ok(())
}
