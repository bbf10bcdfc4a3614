//! Recording and screenshot capture.
//!
//! While a recording is live the manager feeds frames through a
//! [`MediaEncoder`], collecting the encoded chunks in memory; stopping
//! finalizes them into one downloadable artifact. Screenshots rasterize
//! the current frame to PNG synchronously. Artifacts leave the core
//! through an [`ArtifactSink`], the delivery boundary.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use vigilanteye_common::{SessionClock, VigilError, VigilResult};
use vigilanteye_detection_core::FrameBuffer;
use vigilanteye_session_model::{Recording, Screenshot};

use crate::source::StreamFormat;

/// Encodes the live stream into a chunk sequence.
///
/// The contract mirrors the platform recorder it abstracts: after
/// `begin`, `encode` may emit zero or more chunks, and exactly one
/// `finish` flushes the remainder. Real deployments plug a VP9/WebM
/// encoder in here.
pub trait MediaEncoder: Send {
    fn begin(&mut self, format: &StreamFormat) -> VigilResult<()>;

    /// Feed one frame; may emit an encoded chunk.
    fn encode(&mut self, frame: &FrameBuffer) -> VigilResult<Option<Vec<u8>>>;

    /// Finalize the stream, flushing any trailing chunk.
    fn finish(&mut self) -> VigilResult<Option<Vec<u8>>>;
}

/// Length-prefixed raw-frame chunking. Not a real video codec; it keeps
/// the chunk cadence honest for tests and headless runs.
#[derive(Debug, Default)]
pub struct ChunkEncoder {
    pending: Vec<u8>,
    started: bool,
}

/// Bytes buffered before the encoder emits a chunk.
const CHUNK_FLUSH_BYTES: usize = 1 << 20;

impl ChunkEncoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MediaEncoder for ChunkEncoder {
    fn begin(&mut self, format: &StreamFormat) -> VigilResult<()> {
        if self.started {
            return Err(VigilError::recording("Encoder already started"));
        }
        self.started = true;
        self.pending.clear();
        self.pending
            .extend_from_slice(&format.width.to_le_bytes());
        self.pending
            .extend_from_slice(&format.height.to_le_bytes());
        Ok(())
    }

    fn encode(&mut self, frame: &FrameBuffer) -> VigilResult<Option<Vec<u8>>> {
        if !self.started {
            return Err(VigilError::recording("Encoder not started"));
        }
        self.pending
            .extend_from_slice(&(frame.data().len() as u32).to_le_bytes());
        self.pending.extend_from_slice(frame.data());

        if self.pending.len() >= CHUNK_FLUSH_BYTES {
            return Ok(Some(std::mem::take(&mut self.pending)));
        }
        Ok(None)
    }

    fn finish(&mut self) -> VigilResult<Option<Vec<u8>>> {
        self.started = false;
        if self.pending.is_empty() {
            return Ok(None);
        }
        Ok(Some(std::mem::take(&mut self.pending)))
    }
}

/// A finished downloadable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Where finished artifacts go (the "download" boundary).
pub trait ArtifactSink: Send {
    fn deliver(&mut self, artifact: Artifact) -> VigilResult<()>;
}

/// Writes artifacts into a directory.
#[derive(Debug, Clone)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactSink for DirSink {
    fn deliver(&mut self, artifact: Artifact) -> VigilResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&artifact.filename);
        std::fs::write(&path, &artifact.bytes)?;
        tracing::info!(path = %path.display(), bytes = artifact.bytes.len(), "Artifact saved");
        Ok(())
    }
}

/// Collects artifacts in memory for tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    delivered: Arc<Mutex<Vec<Artifact>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<Artifact> {
        self.delivered.lock().expect("sink lock").clone()
    }
}

impl ArtifactSink for MemorySink {
    fn deliver(&mut self, artifact: Artifact) -> VigilResult<()> {
        self.delivered.lock().expect("sink lock").push(artifact);
        Ok(())
    }
}

/// UTC timestamp with colons replaced (they are invalid in filenames),
/// e.g. `2024-05-01T09-30-00`.
pub fn timestamp_slug(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H-%M-%S").to_string()
}

pub fn recording_filename(at: DateTime<Utc>) -> String {
    format!("vigilanteye_recording_{}.webm", timestamp_slug(at))
}

pub fn screenshot_filename(at: DateTime<Utc>) -> String {
    format!("vigilanteye_screenshot_{}.png", timestamp_slug(at))
}

/// A recording that just finished, ready to reconcile with the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedRecording {
    pub recording_id: String,
    pub duration_secs: u64,
    pub filename: String,
}

struct LiveRecording {
    recording_id: String,
    clock: SessionClock,
}

/// Captures the raw stream into an encoded artifact while active.
pub struct RecordingManager {
    encoder: Box<dyn MediaEncoder>,
    sink: Box<dyn ArtifactSink>,
    chunks: Vec<Vec<u8>>,
    live: Option<LiveRecording>,
}

impl RecordingManager {
    pub fn new(encoder: Box<dyn MediaEncoder>, sink: Box<dyn ArtifactSink>) -> Self {
        Self {
            encoder,
            sink,
            chunks: Vec::new(),
            live: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.live.is_some()
    }

    /// Elapsed recording time as `MM:SS`, updated at one-second
    /// granularity by the caller's reporter.
    pub fn elapsed_label(&self) -> Option<String> {
        self.live.as_ref().map(|r| r.clock.elapsed_label())
    }

    /// Begin encoding the live stream. Returns the Recording record to
    /// append to the active session.
    pub fn start(&mut self, format: &StreamFormat, now: DateTime<Utc>) -> VigilResult<Recording> {
        if self.live.is_some() {
            return Err(VigilError::recording("Already recording"));
        }

        self.encoder.begin(format)?;
        self.chunks.clear();

        let recording = Recording::started(now);
        self.live = Some(LiveRecording {
            recording_id: recording.id.clone(),
            clock: SessionClock::start(),
        });
        tracing::info!(recording = %recording.id, "Recording started");
        Ok(recording)
    }

    /// Feed one frame to the encoder while recording; a no-op otherwise.
    pub fn push_frame(&mut self, frame: &FrameBuffer) -> VigilResult<()> {
        if self.live.is_none() {
            return Ok(());
        }
        if let Some(chunk) = self.encoder.encode(frame)? {
            self.chunks.push(chunk);
        }
        Ok(())
    }

    /// Finalize the chunk sequence into one WebM artifact and deliver it.
    /// Returns `None` (no-op) when not recording.
    pub async fn stop(&mut self, now: DateTime<Utc>) -> VigilResult<Option<FinishedRecording>> {
        let Some(live) = self.live.take() else {
            return Ok(None);
        };

        if let Some(chunk) = self.encoder.finish()? {
            self.chunks.push(chunk);
        }

        let filename = recording_filename(now);
        let bytes: Vec<u8> = self.chunks.drain(..).flatten().collect();
        let size = bytes.len();
        self.sink.deliver(Artifact {
            filename: filename.clone(),
            mime: "video/webm",
            bytes,
        })?;

        let duration_secs = live.clock.elapsed_whole_secs();
        tracing::info!(
            recording = %live.recording_id,
            duration_secs,
            bytes = size,
            "Recording finalized"
        );

        Ok(Some(FinishedRecording {
            recording_id: live.recording_id,
            duration_secs,
            filename,
        }))
    }

    /// Rasterize the current frame to PNG and deliver it. Returns the
    /// Screenshot record to append to the active session.
    pub fn take_screenshot(
        &mut self,
        frame: &FrameBuffer,
        now: DateTime<Utc>,
    ) -> VigilResult<Screenshot> {
        let image = image::RgbaImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or_else(|| VigilError::recording("Frame buffer does not match its dimensions"))?;

        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| VigilError::recording(format!("PNG encoding failed: {e}")))?;

        let filename = screenshot_filename(now);
        self.sink.deliver(Artifact {
            filename: filename.clone(),
            mime: "image/png",
            bytes,
        })?;

        Ok(Screenshot::captured(now, filename))
    }
}
