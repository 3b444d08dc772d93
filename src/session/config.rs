use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a measurement session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Length of the measurement window
    /// Default: 20 seconds
    pub duration: Duration,

    /// How often the caller's timer should call `tick()`.
    /// Each tick removes one second from the remaining time, so anything
    /// other than one second speeds up or slows down the countdown.
    pub tick_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(20),
            tick_interval: Duration::from_secs(1),
        }
    }
}
