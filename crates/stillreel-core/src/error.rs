//! Error types for StillReel.

use thiserror::Error;

/// Main error type for StillReel operations.
#[derive(Error, Debug)]
pub enum ReelError {
    /// The transcoding engine could not be initialized. Fatal; the job never starts.
    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Reading or writing an asset's bytes failed.
    #[error("Asset I/O error on '{name}': {source}")]
    AssetIo {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A video failed to load or to seek to a requested timestamp.
    #[error("Seek failure: {0}")]
    SeekFailure(String),

    /// The render invocation failed. `diagnostics` holds raw engine output when available.
    #[error("Encode failure: {message}")]
    EncodeFailure {
        message: String,
        diagnostics: Vec<String>,
    },

    /// Demuxing the audio track out of a video failed.
    #[error("Audio extraction failed: {0}")]
    AudioExtraction(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReelError {
    /// Wrap an I/O error with the name of the asset being read or written.
    pub fn asset_io(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::AssetIo {
            name: name.into(),
            source,
        }
    }

    /// Build an encode failure from a message and the engine log collected so far.
    pub fn encode_failure(message: impl Into<String>, diagnostics: Vec<String>) -> Self {
        Self::EncodeFailure {
            message: message.into(),
            diagnostics,
        }
    }

    /// The single message shown to a user when a flow ends in failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::EngineUnavailable(reason) => format!(
                "The video engine could not be started ({reason}). Check that FFmpeg is installed."
            ),
            Self::AssetIo { name, .. } => format!("Could not read or write '{name}'."),
            Self::SeekFailure(_) => "Failed to process video. Please try another file.".into(),
            Self::EncodeFailure {
                message,
                diagnostics,
            } => match diagnostics.last() {
                Some(last) => format!("Video generation failed: {message} ({last})"),
                None => format!("Video generation failed: {message}"),
            },
            Self::AudioExtraction(_) => "Failed to extract audio from video.".into(),
            Self::InvalidParameter(msg) | Self::NotFound(msg) => msg.clone(),
            Self::Serialization(msg) => format!("Invalid configuration: {msg}"),
            Self::Io(e) => format!("I/O error: {e}"),
        }
    }
}

/// Non-fatal problem raised while removing a job's temporary files.
///
/// Never converted into a [`ReelError`]; it is logged and kept on the job record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupWarning {
    /// VFS entry that could not be removed.
    pub name: String,
    /// Reason reported by the filesystem.
    pub reason: String,
}

impl std::fmt::Display for CleanupWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cleanup of '{}' failed: {}", self.name, self.reason)
    }
}

/// Result type alias for StillReel operations.
pub type Result<T> = std::result::Result<T, ReelError>;
