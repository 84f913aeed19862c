//! Job stages and the two progress streams a job reports on.
//!
//! Stage updates are coarse markers with a percentage; log lines are the
//! engine's raw output. The two are independent: an observer may listen to
//! either, both, or neither.

use std::fmt;

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

/// Where a transcode job is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStage {
    Idle,
    EngineLoading,
    WritingAssets,
    BuildingScript,
    Rendering,
    ReadingOutput,
    CleaningUp,
    Done,
    Failed,
}

impl JobStage {
    /// Percentage reported on entering this stage.
    pub fn percent(self) -> u8 {
        match self {
            Self::Idle | Self::EngineLoading | Self::Failed => 0,
            Self::WritingAssets => 10,
            Self::BuildingScript => 30,
            Self::Rendering => 50,
            Self::ReadingOutput => 90,
            Self::CleaningUp => 95,
            Self::Done => 100,
        }
    }

    /// Message shown on entering this stage.
    pub fn message(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::EngineLoading => "Loading video engine...",
            Self::WritingAssets => "Processing images...",
            Self::BuildingScript => "Building timeline...",
            Self::Rendering => "Rendering video...",
            Self::ReadingOutput => "Finalizing...",
            Self::CleaningUp => "Cleaning up...",
            Self::Done => "Done",
            Self::Failed => "Failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Percentage reported while writing the audio track.
pub const AUDIO_PERCENT: u8 = 20;

/// Message reported while writing the audio track.
pub const AUDIO_MESSAGE: &str = "Processing audio...";

/// A coarse progress marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageUpdate {
    pub stage: JobStage,
    pub percent: u8,
    pub message: String,
}

impl StageUpdate {
    /// The default marker for entering `stage`.
    pub fn entering(stage: JobStage) -> Self {
        Self {
            stage,
            percent: stage.percent(),
            message: stage.message().to_string(),
        }
    }
}

type StageCallback = Box<dyn FnMut(&StageUpdate) + Send>;
type LogCallback = Box<dyn FnMut(&str) + Send>;

/// Receives a job's stage updates and engine log lines.
#[derive(Default)]
pub struct JobObserver {
    on_stage: Option<StageCallback>,
    on_log: Option<LogCallback>,
}

impl JobObserver {
    /// An observer that ignores everything.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, f: impl FnMut(&StageUpdate) + Send + 'static) -> Self {
        self.on_stage = Some(Box::new(f));
        self
    }

    pub fn with_log(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_log = Some(Box::new(f));
        self
    }

    /// An observer that forwards both streams into channels.
    pub fn channels() -> (Self, Receiver<StageUpdate>, Receiver<String>) {
        let (stage_tx, stage_rx) = unbounded();
        let (log_tx, log_rx) = unbounded();
        (Self::from_senders(stage_tx, log_tx), stage_rx, log_rx)
    }

    /// Forward into existing senders. A disconnected receiver is ignored.
    pub fn from_senders(stages: Sender<StageUpdate>, logs: Sender<String>) -> Self {
        Self::new()
            .with_stage(move |update| {
                let _ = stages.send(update.clone());
            })
            .with_log(move |line| {
                let _ = logs.send(line.to_string());
            })
    }

    pub fn stage(&mut self, update: &StageUpdate) {
        if let Some(f) = self.on_stage.as_mut() {
            f(update);
        }
    }

    pub fn log(&mut self, line: &str) {
        if let Some(f) = self.on_log.as_mut() {
            f(line);
        }
    }
}

impl fmt::Debug for JobObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobObserver")
            .field("on_stage", &self.on_stage.is_some())
            .field("on_log", &self.on_log.is_some())
            .finish()
    }
}

/// Frames encoded so far, from an engine status line such as
/// `frame=  120 fps= 60 q=28.0 size=...`.
pub fn parse_encoded_frames(line: &str) -> Option<u64> {
    let rest = &line[line.find("frame=")? + "frame=".len()..];
    let digits: String = rest
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Render completion in percent, capped at 100. Zero total frames is 0%.
pub fn render_percent(frames: u64, total_frames: u64) -> f64 {
    if total_frames == 0 {
        return 0.0;
    }
    (frames as f64 / total_frames as f64 * 100.0).min(100.0)
}
