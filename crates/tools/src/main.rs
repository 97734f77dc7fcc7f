use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use spore_core::{AgentConfig, MatchRecording, ReplayResult, replay::replay_with};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the recording JSON file to replay
    #[arg(short, long)]
    recording: PathBuf,
    /// Optional agent configuration in TOML
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print every action batch
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AgentConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => AgentConfig::default(),
    };
    let recording = MatchRecording::load(&args.recording)
        .with_context(|| format!("Failed to read recording: {}", args.recording.display()))?;
    info!(ticks = recording.ticks.len(), seed = recording.seed, "Recording loaded");

    let result: ReplayResult = replay_with(&config, &recording, |tick, actions| {
        if args.verbose {
            println!("tick {tick}: {actions:?}");
        }
    })
    .context("Replay failed")?;

    println!("Replay complete.");
    println!("Final Tick: {}", result.final_tick);
    println!("Total Orders: {}", result.total_orders);
    println!("Store Hash: {}", result.final_store_hash);

    Ok(())
}
