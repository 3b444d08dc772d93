use anyhow::Result;
use tokio::sync::mpsc;

/// Event delivered by the inbound half of the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Raw notification payload, with no declared type
    Data(Vec<u8>),
    /// The connection signal changed
    Connection(bool),
}

/// Telemetry source trait
///
/// Implementations:
/// - Replay: read a capture file (for testing/offline analysis)
/// - Radio transports live outside this crate
#[async_trait::async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Start delivering notifications
    ///
    /// Returns a channel receiver that will receive notifications in arrival
    /// order. The channel closes when the source is exhausted or stopped.
    async fn start(&mut self) -> Result<mpsc::Receiver<Notification>>;

    /// Stop delivering notifications
    async fn stop(&mut self) -> Result<()>;

    /// Check if source is currently delivering
    fn is_streaming(&self) -> bool;

    /// Get source name for logging
    fn name(&self) -> &str;
}
