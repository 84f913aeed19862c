//! StillReel - turn stills and a timeline into a video
//!
//! Entry point: argument parsing, logging, and command dispatch.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use stillreel_core::FrameRate;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "stillreel", version, about)]
struct Cli {
    /// JSON config file (defaults to the user config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render images and a timeline into an MP4.
    Render(RenderArgs),
    /// Sample evenly spaced frames from a video into a directory.
    Sample(SampleArgs),
    /// Capture a single frame from a video.
    Capture(CaptureArgs),
    /// Copy the audio track of a video into an M4A file.
    ExtractAudio(ExtractAudioArgs),
    /// Estimate memory for a batch of uncompressed frames.
    Estimate(EstimateArgs),
    /// Count the frames a timeline file describes.
    Frames(FramesArgs),
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Timeline text file: one `<image id> <frame count>` per line.
    #[arg(long)]
    pub timeline: PathBuf,

    /// Images for slots 1, 2, ... in natural name order.
    #[arg(long, num_args = 1..)]
    pub images: Vec<PathBuf>,

    /// Fill every slot with frames sampled from this video first.
    #[arg(long)]
    pub from_video: Option<PathBuf>,

    /// Sampling window start in seconds (with --from-video).
    #[arg(long)]
    pub start: Option<f64>,

    /// Sampling window end in seconds (with --from-video).
    #[arg(long)]
    pub end: Option<f64>,

    /// Audio track; a video file has its audio extracted.
    #[arg(long)]
    pub audio: Option<PathBuf>,

    /// Output frame rate, e.g. `30` or `30000/1001`.
    #[arg(long)]
    pub fps: Option<FrameRate>,

    /// Output MP4 path.
    #[arg(short, long)]
    pub out: PathBuf,
}

#[derive(Parser, Debug)]
pub struct SampleArgs {
    pub video: PathBuf,

    /// Number of frames (defaults to the slot count).
    #[arg(long)]
    pub count: Option<usize>,

    #[arg(long)]
    pub start: Option<f64>,

    #[arg(long)]
    pub end: Option<f64>,

    #[arg(long)]
    pub out_dir: PathBuf,
}

#[derive(Parser, Debug)]
pub struct CaptureArgs {
    pub video: PathBuf,

    /// Timestamp in seconds.
    #[arg(long)]
    pub at: f64,

    #[arg(long)]
    pub fps: Option<FrameRate>,

    #[arg(short, long)]
    pub out: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ExtractAudioArgs {
    pub video: PathBuf,

    #[arg(short, long)]
    pub out: PathBuf,
}

#[derive(Parser, Debug)]
pub struct EstimateArgs {
    pub width: u32,
    pub height: u32,
    pub frames: u64,
}

#[derive(Parser, Debug)]
pub struct FramesArgs {
    #[arg(long)]
    pub timeline: PathBuf,

    #[arg(long)]
    pub fps: Option<FrameRate>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.cmd {
        Command::Render(args) => commands::render(&config, args),
        Command::Sample(args) => commands::sample(&config, args),
        Command::Capture(args) => commands::capture(&config, args),
        Command::ExtractAudio(args) => commands::extract_audio(&config, args),
        Command::Estimate(args) => commands::estimate(args),
        Command::Frames(args) => commands::frames(&config, args),
    }
}
