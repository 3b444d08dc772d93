use thiserror::Error;

use super::recorder::SessionState;

/// Precondition failures surfaced by the session recorder.
///
/// None of these mutate session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `start()` while the peripheral connection signal is false
    #[error("cannot start session: peripheral is not connected")]
    NotConnected,

    /// `start()` while a session is already recording
    #[error("cannot start session: already recording")]
    AlreadyRecording,

    /// An operation that needs an active recording was called in another state
    #[error("session is not recording (state: {state})")]
    NotRecording { state: SessionState },

    /// Session durations are whole seconds and at least one second long
    #[error("invalid session duration: must be at least one second")]
    InvalidDuration,
}
