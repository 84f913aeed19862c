//! StillReel Media - FFmpeg integration for rendering and sampling
//!
//! This crate handles:
//! - The engine session and its flat virtual filesystem
//! - Video probing and frame-accurate still capture
//! - Render jobs from slots and timeline to MP4
//! - Audio track extraction

pub mod audio;
pub mod engine;
pub mod orchestrator;
pub mod probe;
pub mod progress;
pub mod sampler;
pub mod surface;
pub mod vfs;

pub use audio::{extract_audio_args, EXTRACTED_AUDIO_NAME};
pub use engine::{Engine, EngineConfig, FfmpegEngine};
pub use orchestrator::{
    audio_ref_for, build_render_args, OutputHandle, Orchestrator, RenderRequest, TranscodeJob,
    OUTPUT_NAME,
};
pub use probe::{probe_video, VideoMetadata};
pub use progress::{parse_encoded_frames, render_percent, JobObserver, JobStage, StageUpdate};
pub use sampler::{capture_timestamp, sample_timestamps, FrameSampler, SampledFrame};
pub use surface::{DecodeSurface, FfmpegSurface};
pub use vfs::{DirVfs, MemoryVfs, Vfs};
