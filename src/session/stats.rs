use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::recorder::SessionState;
use crate::telemetry::ChannelReading;

/// Statistics about a measurement session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Identifier of the current (or last) run, if one was started
    pub session_id: Option<String>,

    /// Current lifecycle state
    pub state: SessionState,

    /// When the current run started
    pub started_at: Option<DateTime<Utc>>,

    /// Configured window length in seconds
    pub duration_secs: u64,

    /// Seconds left before the window closes on its own
    pub remaining_secs: u64,

    /// Number of readings buffered in the current run
    pub sample_count: usize,

    /// Frames offered while not recording, over the recorder's lifetime
    pub dropped_frames: u64,

    /// Whether a finalized summary is cached
    pub has_summary: bool,
}

/// A decoded reading with its capture time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampedReading {
    /// The decoded frame
    pub reading: ChannelReading,

    /// When the frame was appended
    pub captured_at: DateTime<Utc>,
}
