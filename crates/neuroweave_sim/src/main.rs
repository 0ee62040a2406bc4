use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use neuroweave_core::{NeuralConfig, NeuralEngine, Viewport};
use neuroweave_sim::{run, PointerScript};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "neuroweave-sim")]
#[command(about = "Neuroweave headless runner: drives the engine and exports frame statistics")]
struct Cli {
    #[command(flatten)]
    config: NeuralConfig,

    /// Load engine settings from a .toml or .json file instead of flags
    #[arg(long = "config")]
    config_file: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Viewport width in CSS pixels
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Viewport height in CSS pixels
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Device pixel ratio (capped at 2)
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,

    /// Synthetic pointer input
    #[arg(long, value_enum, default_value_t = PointerScript::Orbit)]
    pointer: PointerScript,

    /// Write one CSV row per frame to this path
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn resolve_config(cli: &Cli) -> Result<NeuralConfig> {
    let Some(path) = &cli.config_file else {
        return Ok(cli.config.clone());
    };
    let mut config = NeuralConfig::load(path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    // an explicit --seed still wins over the file
    if cli.config.seed.is_some() {
        config.seed = cli.config.seed;
    }
    Ok(config)
}

fn simulate(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    let viewport = Viewport::new(cli.width, cli.height, cli.dpr);
    info!(config = ?config, viewport = ?viewport, "Starting simulation");

    let mut engine = NeuralEngine::new(config, viewport);
    let mut writer = match &cli.csv {
        Some(path) => Some(
            csv::Writer::from_path(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => None,
    };

    let summary = run(&mut engine, cli.frames, cli.pointer, |row| {
        if let Some(writer) = writer.as_mut() {
            writer.serialize(row)?;
        }
        Ok(())
    })?;

    if let Some(mut writer) = writer {
        writer.flush()?;
    }

    info!(
        frames = summary.frames,
        rebuilds = summary.rebuilds,
        nodes = summary.last.nodes,
        edges = summary.last.edges,
        peak_pulses = summary.peak_pulses,
        peak_idea_pulses = summary.peak_idea_pulses,
        mean_activation = summary.mean_activation,
        "Simulation complete"
    );
    if let Some(path) = &cli.csv {
        info!(path = %path.display(), "Frame statistics written");
    }
    Ok(())
}

fn main() {
    // Structured logging; `log` records from the core are bridged in.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = tracing_subscriber::fmt().json().with_env_filter(filter).try_init() {
        eprintln!("logging unavailable: {e}");
    }

    let cli = Cli::parse();
    if let Err(e) = simulate(cli) {
        error!(error = %e, "Fatal Error");
        std::process::exit(1);
    }
}
