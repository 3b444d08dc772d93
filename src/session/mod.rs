//! Measurement session management
//!
//! This module provides the `SessionRecorder` state machine that manages:
//! - The timed measurement window (caller-driven countdown)
//! - Buffering of decoded readings in arrival order
//! - Finalization into a `SummaryResult` via the aggregator
//! - Session statistics and state management

mod aggregate;
mod config;
mod error;
mod recorder;
mod stats;

pub use aggregate::{reduce, SummaryResult};
pub use config::SessionConfig;
pub use error::SessionError;
pub use recorder::{SessionOutcome, SessionRecorder, SessionState};
pub use stats::{SessionStats, TimestampedReading};
