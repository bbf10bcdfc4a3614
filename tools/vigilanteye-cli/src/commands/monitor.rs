//! Run a monitoring session.

use std::path::PathBuf;
use std::time::Duration;

use vigilanteye_capture_engine::{
    CaptureController, ChunkEncoder, DirSink, RecordingManager, StartOutcome, SyntheticSource,
};
use vigilanteye_common::FileStore;
use vigilanteye_session_model::SessionStore;

pub async fn run(
    duration: u64,
    motion: bool,
    sensitivity: f64,
    objects: bool,
    record: bool,
    screenshot: bool,
    output: PathBuf,
) -> anyhow::Result<()> {
    let store = SessionStore::load(Box::new(FileStore::new()));
    let recorder = RecordingManager::new(
        Box::new(ChunkEncoder::new()),
        Box::new(DirSink::new(output)),
    );
    let mut controller = CaptureController::new(
        Box::new(SyntheticSource::new()),
        recorder,
        store,
        Box::new(FileStore::new()),
    );

    controller.set_motion_detection(motion);
    controller.set_motion_sensitivity(sensitivity);
    controller.set_object_detection(objects);

    let outcome = controller
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let StartOutcome::Started(format) = outcome else {
        anyhow::bail!("Camera start was aborted");
    };

    println!("Monitoring at {} @ {}fps", format.resolution_label(), format.fps);
    println!("  Motion detection: {}", if motion { "on" } else { "off" });
    println!("  Object detection: {}", if objects { "on" } else { "off" });
    println!("  Duration: {duration}s");
    println!();

    if record {
        controller.start_recording().map_err(|e| anyhow::anyhow!("{e}"))?;
    }

    let half = Duration::from_secs(duration.div_ceil(2));
    controller.run_for(half).await;

    if screenshot {
        let shot = controller
            .take_screenshot()
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        println!("Screenshot saved: {}", shot.filename);
    }

    controller
        .run_for(Duration::from_secs(duration).saturating_sub(half))
        .await;

    let status = controller.status();
    println!();
    println!("Status at shutdown:");
    println!("  Connection: {}", status.connection.label());
    println!("  FPS: {}", status.fps);
    println!("  Motion: {}", status.motion.label());
    if objects {
        println!("  Objects detected: {}", status.object_count);
    }
    if let Some(elapsed) = status.recording_elapsed {
        println!("  Recording: {elapsed}");
    }

    controller.stop().await.map_err(|e| anyhow::anyhow!("{e}"))?;

    if let Some(session) = controller.store().sessions().first() {
        let summary = session.summary();
        println!();
        println!("Session {} saved:", summary.id);
        println!("  Duration: {}", summary.duration_label);
        println!("  Recordings: {}", summary.recording_count);
        println!("  Screenshots: {}", summary.screenshot_count);
        println!("  Motion events: {}", summary.motion_event_count);
    }

    Ok(())
}
