//! printshop: play the print shop storyboard live, or render it to a WAV file.
//!
//! - `printshop play`    : realtime frame loop, terminal renderer, live audio
//! - `printshop render`  : offline render of whole cycles to a mono WAV
//! - `printshop devices` : list audio output devices
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`).

mod offline;
mod play;
mod term;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use printshop_scene::TimelineConfig;

#[derive(Parser)]
#[command(name = "printshop")]
#[command(about = "Looping print shop scene with procedural sound effects")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scene in real time with live audio
    Play(PlayArgs),

    /// Render storyboard cycles to a WAV file
    Render(RenderArgs),

    /// List audio output devices
    Devices,
}

/// Options shared by `play` and `render`.
#[derive(Args, Clone, Debug)]
struct SceneArgs {
    /// Timing/catalog JSON file
    #[arg(long)]
    timing: Option<PathBuf>,

    /// Frames per second of the timeline
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Start muted
    #[arg(long)]
    muted: bool,

    /// Start the ambient drone
    #[arg(long)]
    ambient: bool,
}

#[derive(Args, Clone, Debug)]
struct PlayArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Stop after this many seconds (default: run until `q` on stdin)
    #[arg(long)]
    seconds: Option<f64>,

    /// Output device name (see `printshop devices`)
    #[arg(long)]
    device: Option<String>,

    /// Run without opening an audio device
    #[arg(long)]
    no_audio: bool,

    /// Print one JSON scene state per frame instead of the status line
    #[arg(long)]
    json: bool,
}

#[derive(Args, Clone, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output WAV path
    #[arg(long)]
    out: PathBuf,

    /// Number of full storyboard cycles
    #[arg(long, default_value_t = 1)]
    cycles: u32,

    #[arg(long, default_value_t = 48_000)]
    sample_rate: u32,

    /// Seed for the noise in footsteps
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn load_config(path: Option<&Path>) -> Result<TimelineConfig> {
    match path {
        Some(p) => TimelineConfig::from_path(p).with_context(|| format!("loading timing file {}", p.display())),
        None => Ok(TimelineConfig::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Play(args) => play::run(&args),
        Commands::Render(args) => offline::run(&args),
        Commands::Devices => {
            let devices = printshop_engine::list_output_devices().context("listing output devices")?;
            println!("Available output devices:");
            for name in devices {
                println!("- {name}");
            }
            Ok(())
        }
    }
}
