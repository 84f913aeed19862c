//! Pulling the audio track out of a video so it can accompany a render.

use stillreel_core::{AudioAsset, ReelError, Result};
use tracing::{debug, info};

use crate::engine::Engine;
use crate::orchestrator::Orchestrator;

/// VFS name the source video is written under.
pub const EXTRACT_INPUT_NAME: &str = "input_video";

/// VFS name the engine writes the demuxed track to.
pub const EXTRACT_OUTPUT_NAME: &str = "output_audio.m4a";

/// Name of the returned audio asset.
pub const EXTRACTED_AUDIO_NAME: &str = "extracted_audio.m4a";

/// Arguments that copy the audio stream out without re-encoding.
pub fn extract_audio_args() -> Vec<String> {
    ["-i", EXTRACT_INPUT_NAME, "-vn", "-acodec", "copy", EXTRACT_OUTPUT_NAME]
        .into_iter()
        .map(String::from)
        .collect()
}

impl<E: Engine> Orchestrator<E> {
    /// Demux the audio track of `video_data` into an M4A asset.
    ///
    /// Write, engine and read-back failures are reported as
    /// `AudioExtraction`; an unavailable engine stays `EngineUnavailable`.
    pub fn extract_audio(&mut self, video_data: &[u8]) -> Result<AudioAsset> {
        self.ensure_loaded()?;

        let mut written = Vec::new();
        let outcome = self.demux(video_data, &mut written);
        self.remove_entries(&written);
        outcome
    }

    fn demux(&mut self, video_data: &[u8], written: &mut Vec<String>) -> Result<AudioAsset> {
        self.write_entry(EXTRACT_INPUT_NAME, video_data, written)
            .map_err(|e| ReelError::AudioExtraction(e.to_string()))?;

        let mut last_line = String::new();
        let ran = self.engine.run(&extract_audio_args(), &mut |line: &str| {
            debug!(line, "extract");
            last_line = line.to_string();
        });
        if self.engine.exists(EXTRACT_OUTPUT_NAME) {
            written.push(EXTRACT_OUTPUT_NAME.to_string());
        }
        ran.map_err(|e| ReelError::AudioExtraction(e.to_string()))?;

        let data = self
            .engine
            .read_file(EXTRACT_OUTPUT_NAME)
            .map_err(|e| ReelError::AudioExtraction(format!("{e} ({last_line})")))?;
        info!(bytes = data.len(), "Extracted audio track");
        Ok(AudioAsset::new(EXTRACTED_AUDIO_NAME, data))
    }
}
