//! Persisted session history.
//!
//! The store owns every session after creation. History is ordered
//! newest-first, capped at [`MAX_SESSIONS`] entries, and written through
//! to the storage boundary as a single JSON blob on every mutation.

use chrono::{DateTime, Utc};

use vigilanteye_common::{KeyValueStore, VigilError, VigilResult};

use crate::session::{
    MotionEvent, Recording, RecordingStatus, Screenshot, Session, SessionStatus, SessionSummary,
    SettingsSnapshot,
};

/// Storage key for the serialized history blob.
pub const HISTORY_KEY: &str = "vigilanteye_session_history";

/// Maximum number of sessions retained; older entries are evicted.
pub const MAX_SESSIONS: usize = 50;

/// Ordered, size-bounded session history with write-through persistence.
pub struct SessionStore {
    sessions: Vec<Session>,
    storage: Box<dyn KeyValueStore>,
}

impl SessionStore {
    /// Load history from the storage boundary. An absent or unparseable
    /// blob starts the store empty; it is never fatal.
    pub fn load(storage: Box<dyn KeyValueStore>) -> Self {
        let sessions = match storage.get(HISTORY_KEY) {
            Some(blob) => match serde_json::from_str::<Vec<Session>>(&blob) {
                Ok(sessions) => sessions,
                Err(e) => {
                    tracing::warn!(error = %e, "Corrupt session history, starting empty");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        if !sessions.is_empty() {
            tracing::info!(count = sessions.len(), "Loaded session history");
        }

        Self { sessions, storage }
    }

    /// Open a new active session at the head of the history.
    pub fn create_session(&mut self, settings: SettingsSnapshot, now: DateTime<Utc>) -> String {
        let session = Session::open(settings, now);
        let id = session.id.clone();
        tracing::info!(session = %id, "Session opened");

        self.sessions.insert(0, session);
        self.evict();
        self.persist();
        id
    }

    /// Close an active session: set its end time, derive the duration,
    /// and flip it to completed.
    pub fn close_session(&mut self, id: &str, now: DateTime<Utc>) -> VigilResult<()> {
        let session = self.session_mut(id)?;
        if session.status != SessionStatus::Active {
            return Err(VigilError::session(format!(
                "Session {id} is not active"
            )));
        }
        session.close(now);
        tracing::info!(
            session = %id,
            duration_secs = session.duration_secs,
            "Session closed"
        );
        self.persist();
        Ok(())
    }

    /// Append a recording to a session.
    pub fn append_recording(&mut self, id: &str, recording: Recording) -> VigilResult<()> {
        self.session_mut(id)?.recordings.push(recording);
        self.persist();
        Ok(())
    }

    /// Mark a recording as stopped and record its final duration.
    pub fn finish_recording(
        &mut self,
        id: &str,
        recording_id: &str,
        duration_secs: u64,
    ) -> VigilResult<()> {
        let session = self.session_mut(id)?;
        let recording = session
            .recordings
            .iter_mut()
            .find(|r| r.id == recording_id)
            .ok_or_else(|| {
                VigilError::session(format!("No recording {recording_id} in session {id}"))
            })?;
        recording.status = RecordingStatus::Stopped;
        recording.duration_secs = duration_secs;
        self.persist();
        Ok(())
    }

    /// Append a screenshot to a session.
    pub fn append_screenshot(&mut self, id: &str, screenshot: Screenshot) -> VigilResult<()> {
        self.session_mut(id)?.screenshots.push(screenshot);
        self.persist();
        Ok(())
    }

    /// Append a motion event to a session.
    pub fn append_motion_event(&mut self, id: &str, event: MotionEvent) -> VigilResult<()> {
        self.session_mut(id)?.motion_events.push(event);
        self.persist();
        Ok(())
    }

    /// Erase the entire history. Irreversible; callers gate this behind
    /// an explicit user confirmation.
    pub fn clear(&mut self) {
        tracing::info!(discarded = self.sessions.len(), "Session history cleared");
        self.sessions.clear();
        self.persist();
    }

    /// All sessions, newest first.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Look up a session by id.
    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// The currently active session, if one exists.
    pub fn active_session(&self) -> Option<&Session> {
        self.sessions.iter().find(|s| s.is_active())
    }

    /// Summaries of the most recent sessions, newest first.
    pub fn recent_summaries(&self, limit: usize) -> Vec<SessionSummary> {
        self.sessions
            .iter()
            .take(limit)
            .map(Session::summary)
            .collect()
    }

    fn session_mut(&mut self, id: &str) -> VigilResult<&mut Session> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| VigilError::session(format!("No session with id {id}")))
    }

    /// Truncate to the most recent [`MAX_SESSIONS`] entries. Insertion is
    /// at the head, so only the oldest sessions can be dropped.
    fn evict(&mut self) {
        if self.sessions.len() > MAX_SESSIONS {
            self.sessions.truncate(MAX_SESSIONS);
        }
    }

    /// Write the full history through to storage. Best-effort: a failed
    /// write is logged, not propagated.
    fn persist(&mut self) {
        let blob = match serde_json::to_string(&self.sessions) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize session history");
                return;
            }
        };
        if let Err(e) = self.storage.set(HISTORY_KEY, &blob) {
            tracing::warn!(error = %e, "Failed to persist session history");
        }
    }
}
