//! Camera lifecycle orchestration.
//!
//! The controller owns the frame source, the detectors, the recording
//! manager, and the session store, and drives the cooperative per-frame
//! loop while the camera is active. Everything runs on one task; the
//! loop yields between ticks and re-checks the active state on every
//! wake, so it terminates within one tick of `stop()`.

use std::time::{Duration, Instant};

use chrono::Utc;

use vigilanteye_common::{
    CameraSettings, FpsCounter, FrameTicker, KeyValueStore, SessionClock, VigilError, VigilResult,
};
use vigilanteye_detection_core::{FrameBuffer, MotionDetector, ObjectHeuristic};
use vigilanteye_session_model::{MotionEvent, Screenshot, SessionStore, SettingsSnapshot};

use crate::recorder::RecordingManager;
use crate::source::{FrameSource, StreamFormat, StreamRequest};
use crate::status::{ConnectionStatus, MonitorStatus, MotionStatus};

/// Camera lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Starting,
    Active,
    Stopping,
}

/// Result of a start attempt that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The camera connected with the given negotiated format.
    Started(StreamFormat),
    /// A stop was requested while the device was being acquired; the
    /// device was released and no session was opened.
    Aborted,
}

/// Orchestrates the capture lifecycle around the session store.
pub struct CaptureController {
    state: ControllerState,
    pending_stop: bool,

    source: Box<dyn FrameSource>,
    recorder: RecordingManager,
    store: SessionStore,
    settings_store: Box<dyn KeyValueStore>,

    motion: MotionDetector,
    motion_enabled: bool,
    motion_status: MotionStatus,
    objects: ObjectHeuristic,
    objects_enabled: bool,
    object_count: usize,

    current_session: Option<String>,
    format: Option<StreamFormat>,
    frame: Option<FrameBuffer>,
    clock: Option<SessionClock>,
    fps: FpsCounter,
    live_fps: u32,
    connection: ConnectionStatus,
}

impl CaptureController {
    pub fn new(
        source: Box<dyn FrameSource>,
        recorder: RecordingManager,
        store: SessionStore,
        settings_store: Box<dyn KeyValueStore>,
    ) -> Self {
        Self {
            state: ControllerState::Idle,
            pending_stop: false,
            source,
            recorder,
            store,
            settings_store,
            motion: MotionDetector::new(),
            motion_enabled: false,
            motion_status: MotionStatus::Disabled,
            objects: ObjectHeuristic::new(),
            objects_enabled: false,
            object_count: 0,
            current_session: None,
            format: None,
            frame: None,
            clock: None,
            fps: FpsCounter::new(),
            live_fps: 0,
            connection: ConnectionStatus::Disconnected,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Id of the session currently being recorded into, if any. The
    /// session itself lives in the store.
    pub fn current_session_id(&self) -> Option<&str> {
        self.current_session.as_deref()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }

    /// Start the camera with the persisted settings.
    ///
    /// Requests the device with the settings as *ideal* constraints and
    /// reads back what was actually negotiated. On success a new session
    /// opens with the negotiated resolution in its settings snapshot. On
    /// failure the controller stays `Idle` and the classified device
    /// error is returned; nothing retries.
    pub async fn start(&mut self) -> VigilResult<StartOutcome> {
        if self.state != ControllerState::Idle {
            return Err(VigilError::capture("Camera is already starting or active"));
        }

        let settings = CameraSettings::load(self.settings_store.as_ref());
        let request = StreamRequest::from(settings);

        tracing::info!(
            requested = %settings.resolution_label(),
            fps = settings.fps,
            facing = settings.facing_mode.as_str(),
            "Starting camera"
        );

        self.state = ControllerState::Starting;
        self.connection = ConnectionStatus::Connecting;

        let format = match self.source.open(&request).await {
            Ok(format) => format,
            Err(e) => {
                self.state = ControllerState::Idle;
                self.pending_stop = false;
                self.connection = ConnectionStatus::Error(e.to_string());
                tracing::warn!(error = %e, "Camera acquisition failed");
                return Err(e.into());
            }
        };

        if self.pending_stop {
            // A stop arrived while the device request was in flight:
            // release the device immediately and never open a session.
            self.pending_stop = false;
            self.source.close();
            self.state = ControllerState::Idle;
            self.connection = ConnectionStatus::Disconnected;
            tracing::info!("Start aborted by queued stop");
            return Ok(StartOutcome::Aborted);
        }

        tracing::info!(negotiated = %format.resolution_label(), fps = format.fps, "Camera connected");

        let snapshot =
            SettingsSnapshot::new(format.resolution_label(), settings.fps, settings.facing_mode);
        self.current_session = Some(self.store.create_session(snapshot, Utc::now()));

        self.format = Some(format);
        self.frame = None;
        self.clock = Some(SessionClock::start());
        self.fps.reset();
        self.live_fps = 0;
        self.object_count = 0;
        self.motion.reset();
        self.connection = ConnectionStatus::Connected;
        self.state = ControllerState::Active;

        Ok(StartOutcome::Started(format))
    }

    /// Stop the camera: release the device, finalize any live recording,
    /// close the session, and flush persistence.
    ///
    /// While `Starting`, the stop is queued and executes the moment
    /// device acquisition resolves. In `Idle`/`Stopping` this is a no-op.
    pub async fn stop(&mut self) -> VigilResult<()> {
        match self.state {
            ControllerState::Starting => {
                self.pending_stop = true;
                return Ok(());
            }
            ControllerState::Active => {}
            ControllerState::Idle | ControllerState::Stopping => return Ok(()),
        }

        self.state = ControllerState::Stopping;
        let now = Utc::now();

        // Teardown is best-effort: a failed step is logged, never left
        // blocking the release of the device.
        match self.recorder.stop(now).await {
            Ok(Some(finished)) => {
                if let Some(id) = self.current_session.as_ref() {
                    if let Err(e) =
                        self.store
                            .finish_recording(id, &finished.recording_id, finished.duration_secs)
                    {
                        tracing::warn!(error = %e, "Failed to reconcile recording on stop");
                    }
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to finalize recording on stop"),
        }

        self.source.close();

        if let Some(id) = self.current_session.take() {
            if let Err(e) = self.store.close_session(&id, now) {
                tracing::warn!(error = %e, session = %id, "Failed to close session");
            }
        }

        self.format = None;
        self.frame = None;
        self.clock = None;
        self.fps.reset();
        self.live_fps = 0;
        self.object_count = 0;
        self.motion.reset();
        if self.motion_enabled {
            self.motion_status = MotionStatus::Monitoring;
        }
        self.connection = ConnectionStatus::Disconnected;
        self.state = ControllerState::Idle;

        tracing::info!("Camera stopped");
        Ok(())
    }

    /// One tick of the frame loop. Pulls a frame, feeds the recorder and
    /// the enabled detectors, and bumps the FPS counter. Returns whether
    /// a frame was drawn.
    pub fn process_frame(&mut self) -> bool {
        if self.state != ControllerState::Active {
            return false;
        }

        let Some(frame) = self.source.next_frame() else {
            return false;
        };
        if !frame.has_pixels() {
            return false;
        }

        if let Err(e) = self.recorder.push_frame(&frame) {
            tracing::warn!(error = %e, "Encoder rejected frame");
        }

        if self.motion_enabled {
            let verdict = self.motion.process(&frame);
            if verdict.motion_detected {
                self.motion_status = MotionStatus::Detected;
                if let Some(id) = self.current_session.as_ref() {
                    let event = MotionEvent::new(Utc::now(), verdict.motion_pixels);
                    if let Err(e) = self.store.append_motion_event(id, event) {
                        tracing::warn!(error = %e, "Failed to record motion event");
                    }
                }
            } else {
                self.motion_status = MotionStatus::Monitoring;
            }
        }

        if self.objects_enabled {
            self.object_count = self.objects.analyze(&frame).object_count();
        }

        self.frame = Some(frame);
        self.fps.tick();
        true
    }

    /// Run the cooperative frame loop until `deadline` passes or the
    /// controller leaves `Active`. Re-arms itself each tick and samples
    /// the FPS counter once per wall-clock second.
    pub async fn run_for(&mut self, duration: Duration) {
        let ticker = FrameTicker::new(self.format.map(|f| f.fps).unwrap_or(60));
        let deadline = Instant::now() + duration;
        let mut last_sample = Instant::now();

        while self.state == ControllerState::Active && Instant::now() < deadline {
            self.process_frame();

            if last_sample.elapsed() >= Duration::from_secs(1) {
                self.sample_fps();
                last_sample = Instant::now();
            }

            tokio::time::sleep(ticker.interval()).await;
        }
    }

    /// One-second FPS reporter: read and reset the frame counter.
    pub fn sample_fps(&mut self) -> u32 {
        self.live_fps = self.fps.sample();
        self.live_fps
    }

    /// Begin recording the live stream. Valid only while the camera is
    /// active; otherwise a recoverable user-facing error.
    pub fn start_recording(&mut self) -> VigilResult<String> {
        if self.state != ControllerState::Active {
            return Err(VigilError::recording("Please start the camera first"));
        }
        let format = self
            .format
            .ok_or_else(|| VigilError::capture("No negotiated stream format"))?;

        let recording = self.recorder.start(&format, Utc::now())?;
        let recording_id = recording.id.clone();
        if let Some(id) = self.current_session.as_ref() {
            self.store.append_recording(id, recording)?;
        }
        Ok(recording_id)
    }

    /// Stop recording and finalize the artifact. No-op when not
    /// recording.
    pub async fn stop_recording(&mut self) -> VigilResult<()> {
        let Some(finished) = self.recorder.stop(Utc::now()).await? else {
            return Ok(());
        };
        if let Some(id) = self.current_session.as_ref() {
            self.store
                .finish_recording(id, &finished.recording_id, finished.duration_secs)?;
        }
        Ok(())
    }

    /// Rasterize the current frame into a PNG artifact and append a
    /// Screenshot to the active session. Valid only while active.
    pub fn take_screenshot(&mut self) -> VigilResult<Screenshot> {
        if self.state != ControllerState::Active {
            return Err(VigilError::recording("Please start the camera first"));
        }
        let frame = self
            .frame
            .as_ref()
            .ok_or_else(|| VigilError::capture("No frame has been drawn yet"))?;

        let screenshot = self.recorder.take_screenshot(frame, Utc::now())?;
        if let Some(id) = self.current_session.as_ref() {
            self.store.append_screenshot(id, screenshot.clone())?;
        }
        Ok(screenshot)
    }

    /// Toggle motion detection. Enabling clears the detector's history
    /// so the first frame only seeds the comparison; disabling discards
    /// it so a later re-enable never sees stale geometry.
    pub fn set_motion_detection(&mut self, enabled: bool) {
        self.motion_enabled = enabled;
        self.motion.reset();
        self.motion_status = if enabled {
            MotionStatus::Monitoring
        } else {
            MotionStatus::Disabled
        };
    }

    /// Adjust motion sensitivity on the `[0, 1]` scale.
    pub fn set_motion_sensitivity(&mut self, sensitivity: f64) {
        self.motion.set_sensitivity(sensitivity);
    }

    /// Toggle the object heuristic. Disabling clears the detected count.
    pub fn set_object_detection(&mut self, enabled: bool) {
        self.objects_enabled = enabled;
        if !enabled {
            self.object_count = 0;
        }
    }

    /// Authoritative status snapshot for the boundary.
    pub fn status(&self) -> MonitorStatus {
        MonitorStatus {
            connection: self.connection.clone(),
            resolution: self.format.map(|f| f.resolution_label()),
            fps: self.live_fps,
            recording: self.recorder.is_recording(),
            recording_elapsed: self.recorder.elapsed_label(),
            motion: self.motion_status,
            object_count: self.object_count,
        }
    }

    /// Elapsed seconds in the current capture, or 0 when idle.
    pub fn elapsed_secs(&self) -> f64 {
        self.clock.as_ref().map(|c| c.elapsed_secs()).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use vigilanteye_common::{DeviceError, MemoryStore};
    use vigilanteye_session_model::{RecordingStatus, SessionStatus};

    use crate::recorder::{ChunkEncoder, MemorySink};
    use crate::source::SyntheticSource;

    use super::*;

    fn controller_with(source: SyntheticSource) -> (CaptureController, MemorySink) {
        let sink = MemorySink::new();
        let recorder = RecordingManager::new(Box::new(ChunkEncoder::new()), Box::new(sink.clone()));
        let store = SessionStore::load(Box::new(MemoryStore::new()));
        let controller = CaptureController::new(
            Box::new(source),
            recorder,
            store,
            Box::new(MemoryStore::new()),
        );
        (controller, sink)
    }

    fn controller() -> (CaptureController, MemorySink) {
        controller_with(SyntheticSource::new().with_max_resolution(64, 48))
    }

    #[tokio::test]
    async fn start_opens_a_session_with_negotiated_resolution() {
        let (mut ctl, _) = controller();
        let outcome = ctl.start().await.unwrap();

        let StartOutcome::Started(format) = outcome else {
            panic!("expected a started outcome");
        };
        assert_eq!((format.width, format.height), (64, 48));
        assert_eq!(ctl.state(), ControllerState::Active);

        let session = ctl.store().active_session().unwrap();
        // Defaults requested 1280x720; the sensor negotiated down.
        assert_eq!(session.settings.resolution, "64x48");
        assert_eq!(session.settings.fps, 30);
        assert_eq!(ctl.current_session_id(), Some(session.id.as_str()));
    }

    #[tokio::test]
    async fn start_with_persisted_settings_snapshot() {
        let mut settings_store = MemoryStore::new();
        CameraSettings {
            width: 640,
            height: 480,
            fps: 60,
            facing_mode: vigilanteye_common::FacingMode::Environment,
        }
        .save(&mut settings_store)
        .unwrap();

        let sink = MemorySink::new();
        let recorder = RecordingManager::new(Box::new(ChunkEncoder::new()), Box::new(sink));
        let store = SessionStore::load(Box::new(MemoryStore::new()));
        let mut ctl = CaptureController::new(
            Box::new(SyntheticSource::new()),
            recorder,
            store,
            Box::new(settings_store),
        );

        ctl.start().await.unwrap();
        let session = ctl.store().active_session().unwrap();
        assert_eq!(session.settings.resolution, "640x480");
        assert_eq!(session.settings.fps, 60);
    }

    #[tokio::test]
    async fn start_failure_leaves_controller_idle() {
        let (mut ctl, _) =
            controller_with(SyntheticSource::new().failing_with(DeviceError::AccessDenied));

        let err = ctl.start().await.unwrap_err();
        assert!(matches!(
            err,
            VigilError::Device(DeviceError::AccessDenied)
        ));
        assert_eq!(ctl.state(), ControllerState::Idle);
        assert!(ctl.store().is_empty());
        assert!(matches!(
            ctl.status().connection,
            ConnectionStatus::Error(_)
        ));
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let (mut ctl, _) = controller();
        ctl.start().await.unwrap();
        assert!(ctl.start().await.is_err());
    }

    #[tokio::test]
    async fn stop_closes_the_session() {
        let (mut ctl, _) = controller();
        ctl.start().await.unwrap();
        ctl.process_frame();
        ctl.stop().await.unwrap();

        assert_eq!(ctl.state(), ControllerState::Idle);
        assert!(ctl.current_session_id().is_none());
        let session = &ctl.store().sessions()[0];
        assert_eq!(session.status, SessionStatus::Completed);
        assert!(session.end_time.is_some());
        assert!(session.duration_secs.is_some());

        // Idempotent in Idle.
        ctl.stop().await.unwrap();
        assert_eq!(ctl.state(), ControllerState::Idle);
    }

    #[tokio::test]
    async fn start_stop_cycles_keep_one_active_session_at_most() {
        let (mut ctl, _) = controller();
        for _ in 0..3 {
            ctl.start().await.unwrap();
            assert_eq!(
                ctl.store()
                    .sessions()
                    .iter()
                    .filter(|s| s.is_active())
                    .count(),
                1
            );
            ctl.stop().await.unwrap();
            assert!(ctl.store().active_session().is_none());
        }
        assert_eq!(ctl.store().len(), 3);
    }

    #[tokio::test]
    async fn frame_loop_feeds_detectors_and_fps() {
        let (mut ctl, _) = controller();
        ctl.set_motion_detection(true);
        ctl.set_object_detection(true);
        ctl.start().await.unwrap();

        // First frame seeds the motion buffer; the moving block then
        // changes well over ten pixels per frame.
        assert!(ctl.process_frame());
        assert_eq!(ctl.status().motion, MotionStatus::Monitoring);
        assert!(ctl.process_frame());
        assert_eq!(ctl.status().motion, MotionStatus::Detected);

        let session = ctl.store().active_session().unwrap();
        assert!(!session.motion_events.is_empty());
        let event = &session.motion_events[0];
        assert!(event.motion_pixels > 10);
        assert!(event.confidence > 0.0 && event.confidence <= 1.0);

        assert_eq!(ctl.sample_fps(), 2);
        // Counter was reset by the sample.
        assert_eq!(ctl.sample_fps(), 0);
    }

    #[tokio::test]
    async fn object_count_tracks_dark_band() {
        // 64 wide, 48 tall, 32 dark rows -> 2048 dark pixels -> 2 objects.
        let (mut ctl, _) = controller_with(
            SyntheticSource::new()
                .with_max_resolution(64, 48)
                .with_dark_band(32),
        );
        ctl.set_object_detection(true);
        ctl.start().await.unwrap();
        ctl.process_frame();
        assert_eq!(ctl.status().object_count, 2);

        ctl.set_object_detection(false);
        assert_eq!(ctl.status().object_count, 0);
    }

    #[tokio::test]
    async fn queued_stop_aborts_the_start() {
        let (mut ctl, _) = controller();
        // A stop that lands while acquisition is in flight leaves the
        // flag set for start() to observe after the device resolves.
        ctl.pending_stop = true;

        let outcome = ctl.start().await.unwrap();
        assert_eq!(outcome, StartOutcome::Aborted);
        assert_eq!(ctl.state(), ControllerState::Idle);
        assert!(!ctl.source.is_open());
        assert!(ctl.store().is_empty());
        assert!(ctl.current_session_id().is_none());
    }

    #[tokio::test]
    async fn frame_loop_halts_once_inactive() {
        let (mut ctl, _) = controller();
        ctl.start().await.unwrap();
        ctl.stop().await.unwrap();
        assert!(!ctl.process_frame());
    }

    #[tokio::test]
    async fn screenshot_requires_active_camera() {
        let (mut ctl, _) = controller();
        let err = ctl.take_screenshot().unwrap_err();
        assert!(err.to_string().contains("Please start the camera first"));
    }

    #[tokio::test]
    async fn screenshot_appends_to_the_active_session() {
        let (mut ctl, sink) = controller();
        ctl.start().await.unwrap();
        ctl.process_frame();

        let screenshot = ctl.take_screenshot().unwrap();
        assert!(screenshot.filename.starts_with("vigilanteye_screenshot_"));

        let session = ctl.store().active_session().unwrap();
        assert_eq!(session.screenshots.len(), 1);
        assert_eq!(sink.delivered().len(), 1);
        assert_eq!(sink.delivered()[0].mime, "image/png");
    }

    #[tokio::test]
    async fn recording_lifecycle_reconciles_with_the_store() {
        let (mut ctl, sink) = controller();
        ctl.start().await.unwrap();

        assert!(ctl
            .start_recording()
            .is_ok_and(|id| id.starts_with("rec_")));
        assert!(ctl.status().recording);
        ctl.process_frame();
        ctl.stop_recording().await.unwrap();
        assert!(!ctl.status().recording);

        let session = ctl.store().active_session().unwrap();
        assert_eq!(session.recordings.len(), 1);
        assert_eq!(session.recordings[0].status, RecordingStatus::Stopped);
        assert_eq!(sink.delivered().len(), 1);
        assert_eq!(sink.delivered()[0].mime, "video/webm");
    }

    #[tokio::test]
    async fn recording_requires_active_camera() {
        let (mut ctl, _) = controller();
        let err = ctl.start_recording().unwrap_err();
        assert!(err.to_string().contains("Please start the camera first"));
        // Stopping a recording that never started is a no-op.
        ctl.stop_recording().await.unwrap();
    }

    #[tokio::test]
    async fn live_recording_finalizes_on_camera_stop() {
        let (mut ctl, sink) = controller();
        ctl.start().await.unwrap();
        ctl.start_recording().unwrap();
        ctl.process_frame();
        ctl.stop().await.unwrap();

        let session = &ctl.store().sessions()[0];
        assert_eq!(session.recordings[0].status, RecordingStatus::Stopped);
        assert_eq!(sink.delivered().len(), 1);
    }

    #[tokio::test]
    async fn enabling_motion_resets_history() {
        let (mut ctl, _) = controller();
        ctl.set_motion_detection(true);
        ctl.start().await.unwrap();
        ctl.process_frame();
        ctl.process_frame();
        assert_eq!(ctl.status().motion, MotionStatus::Detected);

        // Toggling off and on forgets the last frame: the next frame
        // only seeds the buffer again.
        ctl.set_motion_detection(false);
        assert_eq!(ctl.status().motion, MotionStatus::Disabled);
        ctl.set_motion_detection(true);
        ctl.process_frame();
        assert_eq!(ctl.status().motion, MotionStatus::Monitoring);
    }

    #[tokio::test]
    async fn run_for_terminates_at_the_deadline() {
        let (mut ctl, _) = controller();
        ctl.start().await.unwrap();
        ctl.run_for(Duration::from_millis(80)).await;
        assert!(ctl.elapsed_secs() > 0.0);
        assert_eq!(ctl.state(), ControllerState::Active);
        ctl.stop().await.unwrap();
    }
}
