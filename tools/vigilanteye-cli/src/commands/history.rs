//! List and clear the persisted session history.

use vigilanteye_common::FileStore;
use vigilanteye_session_model::{SessionStatus, SessionStore};

pub fn run(limit: usize, json: bool) -> anyhow::Result<()> {
    let store = SessionStore::load(Box::new(FileStore::new()));

    if store.is_empty() {
        println!("No sessions recorded yet.");
        return Ok(());
    }

    if json {
        let recent: Vec<_> = store.sessions().iter().take(limit).collect();
        println!("{}", serde_json::to_string_pretty(&recent)?);
        return Ok(());
    }

    println!(
        "Session history ({} of {} sessions, newest first):",
        limit.min(store.len()),
        store.len()
    );
    println!();

    for summary in store.recent_summaries(limit) {
        let status = match summary.status {
            SessionStatus::Active => " [active]",
            SessionStatus::Completed => "",
        };
        println!("{}{status}", summary.id);
        println!("  Started: {}", summary.start_time.format("%Y-%m-%d %H:%M:%S UTC"));
        println!("  Duration: {}", summary.duration_label);
        println!("  Settings: {}", summary.settings_label);
        println!(
            "  Recordings: {}  Screenshots: {}  Motion events: {}",
            summary.recording_count, summary.screenshot_count, summary.motion_event_count
        );
        println!();
    }

    Ok(())
}

pub fn clear(yes: bool) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!("Refusing to delete session history without --yes");
    }

    let mut store = SessionStore::load(Box::new(FileStore::new()));
    let count = store.len();
    store.clear();
    println!("Deleted {count} session(s).");
    Ok(())
}
