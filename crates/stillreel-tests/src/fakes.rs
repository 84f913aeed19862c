//! Stand-ins for the FFmpeg engine and decode surface.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use stillreel_core::{RasterFrame, ReelError, Result};
use stillreel_media::{
    DecodeSurface, Engine, MemoryVfs, Vfs, VideoMetadata, OUTPUT_NAME,
};
use stillreel_timeline::SCRIPT_NAME;

// ── Engine ─────────────────────────────────────────────────────

/// What the fake engine does when asked to run.
#[derive(Debug, Clone)]
pub enum RunBehavior {
    /// Write these bytes to the output named by the last argument.
    Produce(Vec<u8>),
    /// Write a partial output, then exit with an error.
    FailAfterPartialOutput,
}

/// Engine over any VFS that records what it was asked to do.
pub struct FakeEngine<V = MemoryVfs> {
    pub vfs: V,
    pub loadable: bool,
    pub loaded: bool,
    pub load_calls: usize,
    pub behavior: RunBehavior,
    pub runs: Vec<Vec<String>>,
    /// VFS contents when the last run started.
    pub files_at_run: Vec<String>,
    /// Concat script text when the last run started.
    pub script_at_run: Option<String>,
    /// Entry whose removal always fails.
    pub sticky: Option<String>,
    /// Entry whose write always fails.
    pub fail_write: Option<String>,
}

impl FakeEngine<MemoryVfs> {
    pub fn new(behavior: RunBehavior) -> Self {
        Self::with_vfs(MemoryVfs::new(), behavior)
    }
}

impl<V: Vfs> FakeEngine<V> {
    pub fn with_vfs(vfs: V, behavior: RunBehavior) -> Self {
        Self {
            vfs,
            loadable: true,
            loaded: false,
            load_calls: 0,
            behavior,
            runs: Vec::new(),
            files_at_run: Vec::new(),
            script_at_run: None,
            sticky: None,
            fail_write: None,
        }
    }
}

impl<V: Vfs> Vfs for FakeEngine<V> {
    fn write_file(&mut self, name: &str, data: &[u8]) -> io::Result<()> {
        if self.fail_write.as_deref() == Some(name) {
            return Err(io::Error::other("no space left"));
        }
        self.vfs.write_file(name, data)
    }

    fn read_file(&self, name: &str) -> io::Result<Vec<u8>> {
        self.vfs.read_file(name)
    }

    fn remove_file(&mut self, name: &str) -> io::Result<()> {
        if self.sticky.as_deref() == Some(name) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "busy"));
        }
        self.vfs.remove_file(name)
    }

    fn exists(&self, name: &str) -> bool {
        self.vfs.exists(name)
    }

    fn list(&self) -> Vec<String> {
        self.vfs.list()
    }
}

impl<V: Vfs> Engine for FakeEngine<V> {
    fn load(&mut self) -> Result<()> {
        self.load_calls += 1;
        if !self.loadable {
            return Err(ReelError::EngineUnavailable("no ffmpeg here".into()));
        }
        self.loaded = true;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn run(&mut self, args: &[String], on_log: &mut dyn FnMut(&str)) -> Result<()> {
        self.runs.push(args.to_vec());
        self.files_at_run = self.vfs.list();
        self.script_at_run = self
            .vfs
            .read_file(SCRIPT_NAME)
            .ok()
            .map(|b| String::from_utf8_lossy(&b).into_owned());

        let output = args.last().map(String::as_str).unwrap_or(OUTPUT_NAME);
        on_log("Input #0, concat, from 'list.txt':");
        on_log("frame=    5 fps=0.0 q=0.0 size=       0kB time=00:00:00.16");
        match &self.behavior {
            RunBehavior::Produce(bytes) => {
                on_log("frame=   10 fps=0.0 q=-1.0 Lsize=      1kB time=00:00:00.33");
                self.vfs.write_file(output, bytes)?;
                Ok(())
            }
            RunBehavior::FailAfterPartialOutput => {
                self.vfs.write_file(output, b"\x00\x00")?;
                on_log("Error while opening encoder for output stream #0:0");
                Err(ReelError::encode_failure(
                    "ffmpeg exited with exit status: 1",
                    vec!["Error while opening encoder for output stream #0:0".into()],
                ))
            }
        }
    }
}

// ── Decode surface ─────────────────────────────────────────────

/// Surface that paints each frame with a shade derived from the playhead,
/// and counts any overlap between seek/draw cycles.
///
/// Like a real decoder it has no frame past the start of the final frame.
pub struct FakeSurface {
    metadata: VideoMetadata,
    position: f64,
    in_cycle: Arc<AtomicBool>,
    pub overlaps: Arc<AtomicUsize>,
    pub cycles: Arc<AtomicUsize>,
    pub fail_on_seek: Option<usize>,
    /// Decode at the final frame when the playhead is inside it.
    pub hold_final_frame: bool,
    seeks: usize,
}

impl FakeSurface {
    pub fn new(duration_seconds: f64) -> Self {
        Self {
            metadata: VideoMetadata {
                fps: 30.0,
                width: 16,
                height: 9,
                duration_seconds,
            },
            position: 0.0,
            in_cycle: Arc::new(AtomicBool::new(false)),
            overlaps: Arc::new(AtomicUsize::new(0)),
            cycles: Arc::new(AtomicUsize::new(0)),
            fail_on_seek: None,
            hold_final_frame: true,
            seeks: 0,
        }
    }
}

impl DecodeSurface for FakeSurface {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn seek(&mut self, timestamp: f64) -> Result<f64> {
        if self.in_cycle.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.seeks += 1;
        if self.fail_on_seek == Some(self.seeks) {
            self.in_cycle.store(false, Ordering::SeqCst);
            return Err(ReelError::SeekFailure(format!("cannot seek to {timestamp}")));
        }
        self.position = self.metadata.clamp_timestamp(timestamp);
        Ok(self.position)
    }

    fn draw(&mut self) -> Result<RasterFrame> {
        std::thread::sleep(Duration::from_millis(1));
        let frame_at = if self.hold_final_frame {
            self.metadata.decode_timestamp(self.position)
        } else {
            self.position
        };
        self.in_cycle.store(false, Ordering::SeqCst);
        if frame_at > self.metadata.last_frame_start() + 1e-9 {
            return Err(ReelError::SeekFailure(format!(
                "no frame decoded at {frame_at:.3}s"
            )));
        }
        let shade = (frame_at / self.metadata.duration_seconds.max(1e-9) * 255.0) as u8;
        self.cycles.fetch_add(1, Ordering::SeqCst);
        Ok(RasterFrame::solid(
            self.metadata.width,
            self.metadata.height,
            [shade, shade, shade],
        ))
    }
}
