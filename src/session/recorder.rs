use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::aggregate::{self, SummaryResult};
use super::config::SessionConfig;
use super::error::SessionError;
use super::stats::{SessionStats, TimestampedReading};
use crate::telemetry::ChannelReading;

/// Lifecycle state of the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Recording,
    Finalizing,
    Completed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Recording => "recording",
            SessionState::Finalizing => "finalizing",
            SessionState::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// How a recording run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// At least one reading was collected
    Summary(SummaryResult),
    /// The window closed without a single reading
    NoData,
}

/// A timed measurement window over decoded readings.
///
/// The recorder owns no clock: the caller drives the countdown through
/// [`tick`](Self::tick), once per second, and feeds readings through
/// [`append`](Self::append) as the transport delivers them.
#[derive(Debug)]
pub struct SessionRecorder {
    /// Identifier of the current (or last) run
    session_id: Option<String>,

    state: SessionState,

    /// Upstream connection signal
    connected: bool,

    /// Window length used when `start` is called without an override
    default_duration: Duration,

    duration_secs: u64,
    remaining_secs: u64,
    started_at: Option<DateTime<Utc>>,

    /// Readings in arrival order
    readings: Vec<TimestampedReading>,

    /// Cached once the run is finalized with data
    summary: Option<SummaryResult>,

    dropped_frames: u64,
}

impl SessionRecorder {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            session_id: None,
            state: SessionState::Idle,
            connected: false,
            default_duration: config.duration,
            duration_secs: config.duration.as_secs(),
            remaining_secs: 0,
            started_at: None,
            readings: Vec::new(),
            summary: None,
            dropped_frames: 0,
        }
    }

    /// Record the upstream connection signal
    pub fn set_connected(&mut self, connected: bool) {
        if self.connected != connected {
            debug!("Connection signal changed: {}", connected);
        }
        self.connected = connected;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Start a run with the configured default duration
    pub fn start_default(&mut self) -> Result<(), SessionError> {
        self.start(self.default_duration)
    }

    /// Start a new run.
    ///
    /// Legal from `Idle` or `Completed`. Discards the previous run's readings
    /// and cached summary.
    pub fn start(&mut self, duration: Duration) -> Result<(), SessionError> {
        if matches!(self.state, SessionState::Recording | SessionState::Finalizing) {
            warn!("Session already recording");
            return Err(SessionError::AlreadyRecording);
        }

        if !self.connected {
            warn!("Refusing to start session: peripheral not connected");
            return Err(SessionError::NotConnected);
        }

        let duration_secs = duration.as_secs();
        if duration_secs == 0 {
            return Err(SessionError::InvalidDuration);
        }

        let session_id = format!("session-{}", uuid::Uuid::new_v4());
        info!("Starting session {} ({}s)", session_id, duration_secs);

        self.session_id = Some(session_id);
        self.readings.clear();
        self.summary = None;
        self.duration_secs = duration_secs;
        self.remaining_secs = duration_secs;
        self.started_at = Some(Utc::now());
        self.state = SessionState::Recording;

        Ok(())
    }

    /// Buffer a reading captured now
    pub fn append(&mut self, reading: ChannelReading) -> Result<(), SessionError> {
        self.append_at(reading, Utc::now())
    }

    /// Buffer a reading with an explicit capture time.
    ///
    /// Outside `Recording` the frame is counted as dropped and the state is
    /// left untouched.
    pub fn append_at(
        &mut self,
        reading: ChannelReading,
        captured_at: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::Recording {
            self.dropped_frames += 1;
            debug!(
                "Dropped frame while {} ({} dropped so far)",
                self.state, self.dropped_frames
            );
            return Err(SessionError::NotRecording { state: self.state });
        }

        self.readings.push(TimestampedReading {
            reading,
            captured_at,
        });

        Ok(())
    }

    /// Advance the countdown by one second.
    ///
    /// Returns the outcome when this tick closes the window, `None` otherwise
    /// (including every tick outside `Recording`).
    pub fn tick(&mut self) -> Option<SessionOutcome> {
        if self.state != SessionState::Recording {
            return None;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }

        info!("Session window elapsed");
        self.stop().ok()
    }

    /// Close the window and reduce the buffered readings.
    ///
    /// Early stops are fine and produce the same outcome shape as a timeout.
    pub fn stop(&mut self) -> Result<SessionOutcome, SessionError> {
        if self.state != SessionState::Recording {
            warn!("Stop requested while {}", self.state);
            return Err(SessionError::NotRecording { state: self.state });
        }

        self.state = SessionState::Finalizing;

        let summary = aggregate::reduce(self.readings.iter().map(|r| &r.reading));
        self.summary = summary.clone();
        self.state = SessionState::Completed;

        match summary {
            Some(summary) => {
                info!(
                    "Session {} completed: {} samples, peak P{} = {}, overall {}",
                    self.session_id.as_deref().unwrap_or("-"),
                    summary.sample_count,
                    summary.peak_channel_index + 1,
                    summary.peak_value,
                    summary.overall_average
                );
                Ok(SessionOutcome::Summary(summary))
            }
            None => {
                warn!(
                    "Session {} completed with no data collected",
                    self.session_id.as_deref().unwrap_or("-")
                );
                Ok(SessionOutcome::NoData)
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Readings of the current run, in arrival order
    pub fn readings(&self) -> &[TimestampedReading] {
        &self.readings
    }

    /// Reduction of the readings buffered so far, for streaming displays
    pub fn live_summary(&self) -> Option<SummaryResult> {
        aggregate::reduce(self.readings.iter().map(|r| &r.reading))
    }

    /// Finalized summary of the last completed run
    pub fn summary(&self) -> Option<&SummaryResult> {
        self.summary.as_ref()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            session_id: self.session_id.clone(),
            state: self.state,
            started_at: self.started_at,
            duration_secs: self.duration_secs,
            remaining_secs: self.remaining_secs,
            sample_count: self.readings.len(),
            dropped_frames: self.dropped_frames,
            has_summary: self.summary.is_some(),
        }
    }
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::Encoding;

    fn reading(value: u32) -> ChannelReading {
        ChannelReading::new([value; 8], Encoding::Binary8)
    }

    fn connected_recorder() -> SessionRecorder {
        let mut recorder = SessionRecorder::default();
        recorder.set_connected(true);
        recorder
    }

    #[test]
    fn test_recorder_creation() {
        let recorder = SessionRecorder::default();

        assert_eq!(recorder.state(), SessionState::Idle);
        assert!(!recorder.is_connected());
        assert!(recorder.session_id().is_none());
        assert!(recorder.summary().is_none());
    }

    #[test]
    fn test_start_default_uses_config_duration() {
        let mut recorder = connected_recorder();

        recorder.start_default().unwrap();

        assert_eq!(recorder.state(), SessionState::Recording);
        assert_eq!(recorder.remaining_secs(), 20);
        assert!(recorder.session_id().unwrap().starts_with("session-"));
    }

    #[test]
    fn test_start_while_recording_fails_without_reset() {
        let mut recorder = connected_recorder();
        recorder.start(Duration::from_secs(5)).unwrap();
        recorder.append(reading(1)).unwrap();

        let result = recorder.start(Duration::from_secs(5));

        assert_eq!(result, Err(SessionError::AlreadyRecording));
        assert_eq!(recorder.readings().len(), 1);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut recorder = connected_recorder();

        let result = recorder.start(Duration::from_millis(500));

        assert_eq!(result, Err(SessionError::InvalidDuration));
        assert_eq!(recorder.state(), SessionState::Idle);
    }

    #[test]
    fn test_append_outside_recording_counts_drop() {
        let mut recorder = connected_recorder();

        let result = recorder.append(reading(1));

        assert_eq!(
            result,
            Err(SessionError::NotRecording {
                state: SessionState::Idle
            })
        );
        assert_eq!(recorder.dropped_frames(), 1);
        assert_eq!(recorder.state(), SessionState::Idle);
    }

    #[test]
    fn test_tick_timeout_finalizes() {
        let mut recorder = connected_recorder();
        recorder.start(Duration::from_secs(3)).unwrap();
        recorder.append(reading(4)).unwrap();

        assert_eq!(recorder.tick(), None);
        assert_eq!(recorder.tick(), None);
        let outcome = recorder.tick();

        assert!(matches!(outcome, Some(SessionOutcome::Summary(_))));
        assert_eq!(recorder.state(), SessionState::Completed);
        assert_eq!(recorder.remaining_secs(), 0);
    }

    #[test]
    fn test_tick_outside_recording_is_noop() {
        let mut recorder = connected_recorder();

        assert_eq!(recorder.tick(), None);
        assert_eq!(recorder.state(), SessionState::Idle);
    }

    #[test]
    fn test_restart_discards_previous_run() {
        let mut recorder = connected_recorder();
        recorder.start(Duration::from_secs(5)).unwrap();
        recorder.append(reading(9)).unwrap();
        recorder.stop().unwrap();
        let first_id = recorder.session_id().map(str::to_string);

        recorder.start(Duration::from_secs(5)).unwrap();

        assert!(recorder.readings().is_empty());
        assert!(recorder.summary().is_none());
        assert_ne!(recorder.session_id().map(str::to_string), first_id);
    }

    #[test]
    fn test_live_summary_tracks_buffer() {
        let mut recorder = connected_recorder();
        recorder.start(Duration::from_secs(5)).unwrap();
        assert!(recorder.live_summary().is_none());

        recorder.append(reading(2)).unwrap();
        recorder.append(reading(4)).unwrap();

        let live = recorder.live_summary().unwrap();
        assert_eq!(live.sample_count, 2);
        assert_eq!(live.overall_average, 3);
        assert!(recorder.summary().is_none(), "Live view must not be cached");
    }

    #[test]
    fn test_stats_snapshot() {
        let mut recorder = connected_recorder();
        recorder.start(Duration::from_secs(10)).unwrap();
        recorder.append(reading(1)).unwrap();
        recorder.tick();

        let stats = recorder.stats();

        assert_eq!(stats.state, SessionState::Recording);
        assert_eq!(stats.duration_secs, 10);
        assert_eq!(stats.remaining_secs, 9);
        assert_eq!(stats.sample_count, 1);
        assert!(stats.started_at.is_some());
        assert!(!stats.has_summary);
    }
}
