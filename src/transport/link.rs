use anyhow::{anyhow, Result};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Outbound command understood by the peripheral firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    Stop,
}

impl Command {
    /// Wire form of the command
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Start => "START",
            Command::Stop => "STOP",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outbound half of the peripheral connection
///
/// Implementations must not block: commands are fire-and-forget and no
/// acknowledgement is awaited. Whether the peripheral is connected is decided
/// by the owner of the link, not by the link itself.
pub trait PeripheralLink: Send {
    /// Send a command to the peripheral
    fn send_command(&mut self, command: Command) -> Result<()>;

    /// Get link name for logging
    fn name(&self) -> &str;
}

/// In-memory link that records every command it is asked to send.
///
/// Clones share state, so a test (or the replay binary) can keep a handle
/// while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingLink {
    sent: Arc<Mutex<Vec<Command>>>,
}

impl RecordingLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands sent so far, oldest first
    pub fn sent(&self) -> Vec<Command> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl PeripheralLink for RecordingLink {
    fn send_command(&mut self, command: Command) -> Result<()> {
        self.sent
            .lock()
            .map_err(|_| anyhow!("command log poisoned"))?
            .push(command);

        info!("Sent {} to peripheral", command);
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_form() {
        assert_eq!(Command::Start.as_str(), "START");
        assert_eq!(Command::Stop.to_string(), "STOP");
    }

    #[test]
    fn test_recording_link_shares_state() {
        let handle = RecordingLink::new();
        let mut link = handle.clone();

        link.send_command(Command::Start).unwrap();
        link.send_command(Command::Stop).unwrap();

        assert_eq!(handle.sent(), vec![Command::Start, Command::Stop]);
        assert_eq!(link.name(), "recording");
    }
}
