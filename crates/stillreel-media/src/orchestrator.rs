//! Render orchestration: slots + timeline + optional audio in, MP4 out.
//!
//! A job walks `Idle → EngineLoading → WritingAssets → BuildingScript →
//! Rendering → ReadingOutput → CleaningUp → Done`, or drops to `Failed` from
//! any stage before `Done`. Every VFS entry the job wrote is removed again
//! whatever the outcome.

use std::path::Path;

use serde::{Deserialize, Serialize};
use stillreel_core::{AudioAsset, CleanupWarning, FrameRate, ReelError, Result};
use stillreel_timeline::{
    asset_ref_for, total_frames, ConcatScript, SlotRegistry, TimelineEntry, SCRIPT_NAME,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::engine::Engine;
use crate::progress::{
    parse_encoded_frames, render_percent, JobObserver, JobStage, StageUpdate, AUDIO_MESSAGE,
    AUDIO_PERCENT,
};

// ── Engine arguments ────────────────────────────────────────────

/// VFS name of the rendered video.
pub const OUTPUT_NAME: &str = "output.mp4";

/// MIME type of the rendered video.
pub const OUTPUT_MIME: &str = "video/mp4";

/// VFS name of the audio track for a file extension.
pub fn audio_ref_for(extension: &str) -> String {
    format!("audio.{extension}")
}

/// Argument vector for the render invocation.
///
/// With audio, the video comes from the concat script, the audio from the
/// second input, and the output stops at the shorter of the two.
pub fn build_render_args(fps: FrameRate, audio_ref: Option<&str>) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        SCRIPT_NAME.into(),
    ];

    if let Some(audio) = audio_ref {
        args.extend_from_slice(&["-i".into(), audio.into()]);
    }

    args.extend_from_slice(&[
        "-c:v".into(),
        "libx264".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-r".into(),
        fps.to_ffmpeg_arg(),
    ]);

    if audio_ref.is_some() {
        args.extend_from_slice(&[
            "-map".into(),
            "0:v".into(),
            "-map".into(),
            "1:a".into(),
            "-c:a".into(),
            "aac".into(),
            "-shortest".into(),
        ]);
    }

    args.extend_from_slice(&["-preset".into(), "ultrafast".into(), OUTPUT_NAME.into()]);
    args
}

// ── Output ──────────────────────────────────────────────────────

/// A finished render, held in memory.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputHandle {
    pub id: Uuid,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl OutputHandle {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            mime_type: OUTPUT_MIME.to_string(),
            data,
        }
    }

    /// Locally addressable reference to this output.
    pub fn uri(&self) -> String {
        format!("stillreel://output/{}.mp4", self.id)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Save the video to disk.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.data)
            .map_err(|e| ReelError::asset_io(path.display().to_string(), e))
    }
}

impl std::fmt::Debug for OutputHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputHandle")
            .field("id", &self.id)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.data.len())
            .finish()
    }
}

// ── Job ─────────────────────────────────────────────────────────

/// What to render.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub registry: &'a SlotRegistry,
    pub timeline: &'a [TimelineEntry],
    pub audio: Option<&'a AudioAsset>,
}

/// Record of one render job.
#[derive(Debug)]
pub struct TranscodeJob {
    pub id: Uuid,
    pub stage: JobStage,
    /// VFS names of the images written, in slot order.
    pub video_assets: Vec<String>,
    /// VFS name of the audio track, if one was written.
    pub audio_asset: Option<String>,
    pub script: Option<ConcatScript>,
    pub args: Vec<String>,
    /// Sum of every timeline entry's frame count; the render progress denominator.
    pub total_frames: u64,
    pub output: Option<OutputHandle>,
    /// Engine log lines, verbatim.
    pub log: Vec<String>,
    pub warnings: Vec<CleanupWarning>,
    pub error: Option<ReelError>,
}

impl TranscodeJob {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            stage: JobStage::Idle,
            video_assets: Vec::new(),
            audio_asset: None,
            script: None,
            args: Vec::new(),
            total_frames: 0,
            output: None,
            log: Vec::new(),
            warnings: Vec::new(),
            error: None,
        }
    }

    fn enter(&mut self, stage: JobStage, observer: &mut JobObserver) {
        self.stage = stage;
        info!(job = %self.id, %stage, "Job stage");
        observer.stage(&StageUpdate::entering(stage));
    }

    fn fail(&mut self, err: ReelError, observer: &mut JobObserver) {
        error!(job = %self.id, stage = ?self.stage, error = %err, "Job failed");
        let percent = self.stage.percent();
        self.stage = JobStage::Failed;
        observer.stage(&StageUpdate {
            stage: JobStage::Failed,
            percent,
            message: err.user_message(),
        });
        self.output = None;
        self.error = Some(err);
    }

    pub fn is_done(&self) -> bool {
        self.stage == JobStage::Done
    }

    /// The output on success, the job's error otherwise.
    pub fn into_result(self) -> Result<OutputHandle> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.output.ok_or_else(|| {
            ReelError::InvalidParameter(format!("Job {} produced no output", self.id))
        })
    }
}

// ── Orchestrator ────────────────────────────────────────────────

/// Drives render jobs through one engine session.
pub struct Orchestrator<E> {
    pub(crate) engine: E,
    fps: FrameRate,
}

impl<E: Engine> Orchestrator<E> {
    pub fn new(engine: E, fps: FrameRate) -> Self {
        Self { engine, fps }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn fps(&self) -> FrameRate {
        self.fps
    }

    /// Load the engine if it is not loaded yet.
    pub fn ensure_loaded(&mut self) -> Result<()> {
        if !self.engine.is_loaded() {
            info!("Loading engine");
            self.engine.load()?;
        }
        Ok(())
    }

    /// Render and return the output handle.
    pub fn render(
        &mut self,
        request: &RenderRequest<'_>,
        observer: &mut JobObserver,
    ) -> Result<OutputHandle> {
        self.run_job(request, observer).into_result()
    }

    /// Render and return the full job record, successful or not.
    pub fn run_job(
        &mut self,
        request: &RenderRequest<'_>,
        observer: &mut JobObserver,
    ) -> TranscodeJob {
        let mut job = TranscodeJob::new();
        let mut written = Vec::new();

        let outcome = self.execute(&mut job, request, observer, &mut written);
        if outcome.is_ok() {
            job.enter(JobStage::CleaningUp, observer);
        }
        job.warnings = self.remove_entries(&written);

        match outcome {
            Ok(output) => {
                job.output = Some(output);
                job.enter(JobStage::Done, observer);
            }
            Err(err) => job.fail(err, observer),
        }
        job
    }

    fn execute(
        &mut self,
        job: &mut TranscodeJob,
        request: &RenderRequest<'_>,
        observer: &mut JobObserver,
        written: &mut Vec<String>,
    ) -> Result<OutputHandle> {
        if request.registry.is_empty() {
            return Err(ReelError::InvalidParameter(
                "Please upload at least one image or a video.".into(),
            ));
        }

        job.enter(JobStage::EngineLoading, observer);
        self.ensure_loaded()?;

        job.enter(JobStage::WritingAssets, observer);
        for slot in request.registry.populated() {
            let Some(asset) = slot.asset() else { continue };
            let name = asset_ref_for(slot.id());
            self.write_entry(&name, &asset.data, written)?;
            job.video_assets.push(name);
        }

        if let Some(audio) = request.audio {
            observer.stage(&StageUpdate {
                stage: JobStage::WritingAssets,
                percent: AUDIO_PERCENT,
                message: AUDIO_MESSAGE.to_string(),
            });
            let name = audio_ref_for(&audio.extension());
            self.write_entry(&name, &audio.data, written)?;
            job.audio_asset = Some(name);
        }

        job.enter(JobStage::BuildingScript, observer);
        let script = ConcatScript::build(request.timeline, request.registry, self.fps);
        if script.is_empty() {
            return Err(ReelError::InvalidParameter(
                "The timeline does not reference any uploaded image.".into(),
            ));
        }
        self.write_entry(SCRIPT_NAME, script.to_text().as_bytes(), written)?;
        let expected_frames = total_frames(request.timeline);
        job.total_frames = expected_frames;
        debug!(
            job = %job.id,
            entries = script.entry_count(),
            total_frames = expected_frames,
            "Concat script written"
        );
        job.script = Some(script);

        job.args = build_render_args(self.fps, job.audio_asset.as_deref());
        job.enter(JobStage::Rendering, observer);
        debug!(job = %job.id, args = ?job.args, "Render arguments");

        let log = &mut job.log;
        let mut on_log = |line: &str| {
            log.push(line.to_string());
            observer.log(line);
            if let Some(frames) = parse_encoded_frames(line) {
                debug!(
                    frames,
                    percent = render_percent(frames, expected_frames),
                    "Render progress"
                );
            }
        };
        let rendered = self.engine.run(&job.args, &mut on_log);
        if self.engine.exists(OUTPUT_NAME) {
            written.push(OUTPUT_NAME.to_string());
        }
        rendered?;

        job.enter(JobStage::ReadingOutput, observer);
        let data = self
            .engine
            .read_file(OUTPUT_NAME)
            .map_err(|e| ReelError::asset_io(OUTPUT_NAME, e))?;
        info!(job = %job.id, bytes = data.len(), "Render finished");
        Ok(OutputHandle::new(data))
    }

    pub(crate) fn write_entry(
        &mut self,
        name: &str,
        data: &[u8],
        written: &mut Vec<String>,
    ) -> Result<()> {
        self.engine
            .write_file(name, data)
            .map_err(|e| ReelError::asset_io(name, e))?;
        written.push(name.to_string());
        Ok(())
    }

    /// Best-effort removal. Failures become warnings and never an error.
    pub(crate) fn remove_entries(&mut self, names: &[String]) -> Vec<CleanupWarning> {
        let mut warnings = Vec::new();
        for name in names {
            if let Err(e) = self.engine.remove_file(name) {
                warn!(name = %name, error = %e, "Failed to remove VFS entry");
                warnings.push(CleanupWarning {
                    name: name.clone(),
                    reason: e.to_string(),
                });
            }
        }
        warnings
    }
}
