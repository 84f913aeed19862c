//! The transcoding engine: a VFS plus a blocking `run(args)` entry point.

use std::io;
use std::path::PathBuf;

use ffmpeg_sidecar::command::{ffmpeg_is_installed, FfmpegCommand};
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use stillreel_core::{ReelConfig, ReelError, Result};
use tracing::{debug, info, warn};

use crate::vfs::{DirVfs, Vfs};

/// A transcoding engine that reads and writes through its own VFS.
///
/// `run` blocks until the engine finishes. Every line the engine logs is
/// passed to `on_log` verbatim and in order.
pub trait Engine: Vfs {
    /// Make the engine ready. Calling this again once loaded is a no-op.
    fn load(&mut self) -> Result<()>;

    fn is_loaded(&self) -> bool;

    /// Run one invocation. A non-zero exit is an `EncodeFailure` carrying
    /// the engine's error output.
    fn run(&mut self, args: &[String], on_log: &mut dyn FnMut(&str)) -> Result<()>;
}

/// Settings for [`FfmpegEngine`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Fetch an FFmpeg build when none is installed.
    pub auto_download: bool,
    /// Parent directory for the session; the system temp dir when unset.
    pub work_dir: Option<PathBuf>,
}

impl From<&ReelConfig> for EngineConfig {
    fn from(config: &ReelConfig) -> Self {
        Self {
            auto_download: config.auto_download_engine,
            work_dir: config.work_dir.clone(),
        }
    }
}

/// FFmpeg child process run inside a private session directory.
#[derive(Debug)]
pub struct FfmpegEngine {
    config: EngineConfig,
    session: DirVfs,
    loaded: bool,
}

impl FfmpegEngine {
    /// Create the engine and its session directory. The binary is not
    /// looked up until [`Engine::load`].
    pub fn new(config: EngineConfig) -> Result<Self> {
        let session = match &config.work_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                DirVfs::create_in(dir)?
            }
            None => DirVfs::create_temp()?,
        };
        Ok(Self {
            config,
            session,
            loaded: false,
        })
    }

    pub fn session(&self) -> &DirVfs {
        &self.session
    }
}

impl Vfs for FfmpegEngine {
    fn write_file(&mut self, name: &str, data: &[u8]) -> io::Result<()> {
        self.session.write_file(name, data)
    }

    fn read_file(&self, name: &str) -> io::Result<Vec<u8>> {
        self.session.read_file(name)
    }

    fn remove_file(&mut self, name: &str) -> io::Result<()> {
        self.session.remove_file(name)
    }

    fn exists(&self, name: &str) -> bool {
        self.session.exists(name)
    }

    fn list(&self) -> Vec<String> {
        self.session.list()
    }
}

impl Engine for FfmpegEngine {
    fn load(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }

        if !ffmpeg_is_installed() {
            if !self.config.auto_download {
                return Err(ReelError::EngineUnavailable(
                    "ffmpeg was not found on PATH".into(),
                ));
            }
            info!("FFmpeg not found, downloading");
            ffmpeg_sidecar::download::auto_download()
                .map_err(|e| ReelError::EngineUnavailable(format!("download failed: {e}")))?;
        }

        self.loaded = true;
        info!(session = %self.session.root().display(), "FFmpeg engine loaded");
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn run(&mut self, args: &[String], on_log: &mut dyn FnMut(&str)) -> Result<()> {
        if !self.loaded {
            return Err(ReelError::EngineUnavailable("engine not loaded".into()));
        }
        debug!(?args, "Running ffmpeg");

        let mut command = FfmpegCommand::new();
        command.args(args);
        command.as_inner_mut().current_dir(self.session.root());

        let mut child = command
            .spawn()
            .map_err(|e| ReelError::EngineUnavailable(format!("failed to spawn ffmpeg: {e}")))?;

        let events = child
            .iter()
            .map_err(|e| ReelError::encode_failure(format!("no ffmpeg output: {e}"), vec![]))?;

        let mut diagnostics = Vec::new();
        for event in events {
            match event {
                FfmpegEvent::Log(level, line) => {
                    on_log(&line);
                    if matches!(level, LogLevel::Error | LogLevel::Fatal) {
                        diagnostics.push(line);
                    }
                }
                FfmpegEvent::Progress(progress) => on_log(&progress.raw_log_message),
                FfmpegEvent::Error(message) => {
                    warn!(%message, "ffmpeg reported an error");
                    diagnostics.push(message);
                }
                _ => {}
            }
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(ReelError::encode_failure(
                format!("ffmpeg exited with {status}"),
                diagnostics,
            ));
        }
        Ok(())
    }
}
