//! Command handlers.

use std::path::Path;

use anyhow::{bail, Context as _, Result};
use stillreel_core::{
    estimate_memory_mb, AudioAsset, ImageAsset, MediaKind, ReelConfig, VideoSource,
};
use stillreel_media::{
    render_percent, EngineConfig, FfmpegEngine, FrameSampler, JobObserver, Orchestrator,
    RenderRequest,
};
use stillreel_timeline::{parse_timeline, total_frames, SlotRegistry};
use tracing::{debug, info, warn};

use crate::{CaptureArgs, EstimateArgs, ExtractAudioArgs, FramesArgs, RenderArgs, SampleArgs};

pub fn load_config(path: Option<&Path>) -> Result<ReelConfig> {
    let config = match path {
        Some(path) => ReelConfig::load_from_file(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => ReelConfig::load_or_default().context("load user config")?,
    };
    debug!(?config, "Configuration");
    Ok(config)
}

fn orchestrator(config: &ReelConfig) -> Result<Orchestrator<FfmpegEngine>> {
    let engine = FfmpegEngine::new(EngineConfig::from(config)).context("create engine session")?;
    Ok(Orchestrator::new(engine, config.fps))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

pub fn render(config: &ReelConfig, args: RenderArgs) -> Result<()> {
    let fps = args.fps.unwrap_or(config.fps);
    let text = std::fs::read_to_string(&args.timeline)
        .with_context(|| format!("read timeline '{}'", args.timeline.display()))?;
    let timeline = parse_timeline(&text);
    info!(entries = timeline.len(), frames = total_frames(&timeline), "Parsed timeline");

    let mut registry = SlotRegistry::new(config.slot_count);

    if let Some(video_path) = &args.from_video {
        let video = VideoSource::open(video_path)?;
        let sampler = FrameSampler::open(video, config.jpeg_quality)?;
        let window = sampler.window(args.start, args.end)?;
        sampler.autofill(&mut registry, window)?;
    }

    let mut images = Vec::with_capacity(args.images.len());
    for path in &args.images {
        if MediaKind::from_path(path) != MediaKind::Image {
            warn!(path = %path.display(), "Skipping non-image file");
            continue;
        }
        images.push(ImageAsset::from_path(path)?);
    }
    if !images.is_empty() {
        let requested = images.len();
        let assigned = registry.batch_assign(images, 0);
        if assigned < requested {
            warn!(assigned, requested, "More images than slots; extra images dropped");
        }
    }

    let mut orchestrator = orchestrator(&ReelConfig {
        fps,
        ..config.clone()
    })?;

    let audio = match &args.audio {
        Some(path) if MediaKind::from_path(path) == MediaKind::Video => {
            info!(path = %path.display(), "Extracting audio from video");
            let data = VideoSource::open(path)?.read_bytes()?;
            Some(orchestrator.extract_audio(&data)?)
        }
        Some(path) => Some(AudioAsset::from_path(path)?),
        None => None,
    };

    let frames_to_render = total_frames(&timeline);

    let mut observer = JobObserver::new()
        .with_stage(|update| eprintln!("[{:>3}%] {}", update.percent, update.message))
        .with_log(move |line| {
            if let Some(frames) = stillreel_media::parse_encoded_frames(line) {
                debug!(
                    "rendered {frames}/{frames_to_render} frames ({:.0}%)",
                    render_percent(frames, frames_to_render)
                );
            }
        });

    let job = orchestrator.run_job(
        &RenderRequest {
            registry: &registry,
            timeline: &timeline,
            audio: audio.as_ref(),
        },
        &mut observer,
    );
    for warning in &job.warnings {
        eprintln!("warning: {warning}");
    }

    let output = match job.into_result() {
        Ok(output) => output,
        Err(e) => bail!(e.user_message()),
    };

    ensure_parent(&args.out)?;
    output.write_to(&args.out)?;
    eprintln!("wrote {} ({} bytes)", args.out.display(), output.len());
    Ok(())
}

pub fn sample(config: &ReelConfig, args: SampleArgs) -> Result<()> {
    let count = args.count.unwrap_or(config.slot_count);
    let video = VideoSource::open(&args.video)?;
    let sampler = FrameSampler::open(video, config.jpeg_quality)?;
    let window = sampler.window(args.start, args.end)?;

    let frames = sampler.sample(count, window)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    for frame in &frames {
        let path = args.out_dir.join(&frame.asset.name);
        std::fs::write(&path, &frame.asset.data)
            .with_context(|| format!("write '{}'", path.display()))?;
        println!("{:.3}\t{}", frame.timestamp, path.display());
    }
    Ok(())
}

pub fn capture(config: &ReelConfig, args: CaptureArgs) -> Result<()> {
    let fps = args.fps.unwrap_or(config.fps);
    let video = VideoSource::open(&args.video)?;
    let sampler = FrameSampler::open(video, config.jpeg_quality)?;
    let at = sampler.metadata().clamp_timestamp(args.at);
    let frame = sampler.capture_at(at, fps)?;

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, &frame.asset.data)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    eprintln!("captured {:.3}s -> {}", frame.timestamp, args.out.display());
    Ok(())
}

pub fn extract_audio(config: &ReelConfig, args: ExtractAudioArgs) -> Result<()> {
    let data = VideoSource::open(&args.video)?.read_bytes()?;
    let mut orchestrator = orchestrator(config)?;
    let audio = match orchestrator.extract_audio(&data) {
        Ok(audio) => audio,
        Err(e) => bail!(e.user_message()),
    };

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, &audio.data)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

pub fn estimate(args: EstimateArgs) -> Result<()> {
    let mb = estimate_memory_mb(args.width, args.height, args.frames);
    println!(
        "{} frames at {}x{} ~ {} MB uncompressed",
        args.frames, args.width, args.height, mb
    );
    Ok(())
}

pub fn frames(config: &ReelConfig, args: FramesArgs) -> Result<()> {
    let fps = args.fps.unwrap_or(config.fps);
    let text = std::fs::read_to_string(&args.timeline)
        .with_context(|| format!("read timeline '{}'", args.timeline.display()))?;
    let frames = total_frames(&parse_timeline(&text));
    println!(
        "{frames} frames ({:.2}s at {} fps)",
        frames as f64 / fps.to_fps_f64(),
        fps
    );
    Ok(())
}
