//! The telemetry engine: one recorder, one peripheral link, one display.
//!
//! The engine is a plain value owned by whoever runs the event loop. It does
//! not spawn tasks or own a clock; the owner feeds it notifications and calls
//! [`TelemetryEngine::tick`] once per second.

use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, warn};

use crate::display::DisplaySink;
use crate::session::{
    SessionConfig, SessionError, SessionOutcome, SessionRecorder, SessionState, SummaryResult,
};
use crate::telemetry::{self, ChannelReading, DecodeFailure, Payload};
use crate::transport::{Command, PeripheralLink};

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Session window settings
    pub session: SessionConfig,
    /// How many completed summaries to keep (default: 10, 0 = keep none)
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            history_limit: 10,
        }
    }
}

pub struct TelemetryEngine {
    recorder: SessionRecorder,
    link: Box<dyn PeripheralLink>,
    display: DisplaySink,
    history: VecDeque<SummaryResult>,
    history_limit: usize,
}

impl TelemetryEngine {
    pub fn new(config: EngineConfig, link: Box<dyn PeripheralLink>, display: DisplaySink) -> Self {
        debug!("Telemetry engine using link: {}", link.name());

        Self {
            recorder: SessionRecorder::new(&config.session),
            link,
            display,
            history: VecDeque::new(),
            history_limit: config.history_limit,
        }
    }

    /// Forward a change of the upstream connection signal.
    ///
    /// This is the only connection signal the engine knows: it gates
    /// `start_session` and whether START/STOP are sent over the link.
    pub fn set_connected(&mut self, connected: bool) {
        if connected == self.recorder.is_connected() {
            return;
        }

        self.recorder.set_connected(connected);
        if connected {
            self.display.info("Peripheral connected");
        } else if self.recorder.state() == SessionState::Recording {
            self.display
                .warning("Peripheral disconnected while recording; session continues");
        } else {
            self.display.warning("Peripheral disconnected");
        }
    }

    /// Decode an untyped notification buffer and feed it to the session
    pub fn handle_raw(&mut self, bytes: &[u8]) -> Result<ChannelReading, DecodeFailure> {
        let decoded = telemetry::decode_raw(bytes);
        self.accept(decoded)
    }

    /// Decode a payload and feed it to the session.
    ///
    /// Returns the decoded reading even when no session is recording, so a
    /// live display can still show it. Decode failures are reported to the
    /// display and never touch session state.
    pub fn handle_payload(&mut self, payload: &Payload) -> Result<ChannelReading, DecodeFailure> {
        let decoded = telemetry::decode(payload);
        self.accept(decoded)
    }

    fn accept(
        &mut self,
        decoded: Result<ChannelReading, DecodeFailure>,
    ) -> Result<ChannelReading, DecodeFailure> {
        let reading = match decoded {
            Ok(reading) => reading,
            Err(failure) => {
                warn!("{}", failure);
                self.display.warning("Unrecognized telemetry payload dropped");
                self.display.raw(
                    failure.payload(),
                    telemetry::is_well_formed(failure.payload()),
                );
                return Err(failure);
            }
        };

        if reading.encoding().is_degraded() {
            self.display
                .warning("Single-value frame broadcast to all channels");
        }

        if let Err(e) = self.recorder.append(reading) {
            debug!("Frame not buffered: {}", e);
        }

        Ok(reading)
    }

    /// Start a session, using the configured duration unless overridden
    pub fn start_session(&mut self, duration: Option<Duration>) -> Result<(), SessionError> {
        let result = match duration {
            Some(duration) => self.recorder.start(duration),
            None => self.recorder.start_default(),
        };

        match &result {
            Ok(()) => {
                self.send_command(Command::Start);
                self.display.info(format!(
                    "Session started ({}s)",
                    self.recorder.remaining_secs()
                ));
            }
            Err(e) => self.display.error(e.to_string()),
        }

        result
    }

    /// Stop the current session early
    pub fn stop_session(&mut self) -> Result<SessionOutcome, SessionError> {
        match self.recorder.stop() {
            Ok(outcome) => {
                self.finish(&outcome);
                Ok(outcome)
            }
            Err(e) => {
                self.display.error(e.to_string());
                Err(e)
            }
        }
    }

    /// Advance the session countdown by one second
    pub fn tick(&mut self) -> Option<SessionOutcome> {
        let outcome = self.recorder.tick()?;
        self.finish(&outcome);
        Some(outcome)
    }

    fn finish(&mut self, outcome: &SessionOutcome) {
        self.send_command(Command::Stop);

        match outcome {
            SessionOutcome::Summary(summary) => {
                self.display.info(format!(
                    "Session complete: {} samples, peak P{} = {}, overall average {}",
                    summary.sample_count,
                    summary.peak_channel_index + 1,
                    summary.peak_value,
                    summary.overall_average
                ));

                if self.history_limit > 0 {
                    if self.history.len() == self.history_limit {
                        self.history.pop_front();
                    }
                    self.history.push_back(summary.clone());
                }
            }
            SessionOutcome::NoData => {
                self.display.warning("No data collected");
            }
        }
    }

    fn send_command(&mut self, command: Command) {
        if !self.recorder.is_connected() {
            debug!("Not sending {}: peripheral disconnected", command);
            return;
        }

        if let Err(e) = self.link.send_command(command) {
            warn!("Failed to send {} over {}: {}", command, self.link.name(), e);
            self.display
                .warning(format!("Failed to send {} to peripheral", command));
        }
    }

    pub fn state(&self) -> SessionState {
        self.recorder.state()
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    /// Completed summaries, oldest first
    pub fn history(&self) -> impl Iterator<Item = &SummaryResult> {
        self.history.iter()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::LogLevel;
    use crate::transport::RecordingLink;

    fn engine_with(link: &RecordingLink, history_limit: usize) -> TelemetryEngine {
        let config = EngineConfig {
            history_limit,
            ..EngineConfig::default()
        };
        TelemetryEngine::new(config, Box::new(link.clone()), DisplaySink::disabled())
    }

    fn connect(engine: &mut TelemetryEngine) {
        engine.set_connected(true);
    }

    #[test]
    fn test_start_and_stop_send_commands() {
        let link = RecordingLink::new();
        let mut engine = engine_with(&link, 10);
        connect(&mut engine);

        engine.start_session(Some(Duration::from_secs(5))).unwrap();
        engine.handle_payload(&"PRESSURE_LEFT: 1,2,3,4,5,6,7,8".into()).unwrap();
        engine.stop_session().unwrap();

        assert_eq!(link.sent(), vec![Command::Start, Command::Stop]);
        assert_eq!(engine.history().count(), 1);
    }

    #[test]
    fn test_no_stop_command_after_disconnect() {
        let link = RecordingLink::new();
        let (sink, mut receivers) = DisplaySink::channel();
        let mut engine = TelemetryEngine::new(EngineConfig::default(), Box::new(link.clone()), sink);
        connect(&mut engine);
        engine.start_session(None).unwrap();

        engine.set_connected(false);
        let outcome = engine.stop_session().unwrap();

        assert_eq!(outcome, SessionOutcome::NoData);
        assert_eq!(link.sent(), vec![Command::Start]);

        let mut messages = Vec::new();
        while let Ok(entry) = receivers.logs.try_recv() {
            messages.push(entry.message);
        }
        assert!(messages
            .iter()
            .any(|m| m == "Peripheral disconnected while recording; session continues"));
    }

    #[test]
    fn test_reconnect_sends_commands_again() {
        let link = RecordingLink::new();
        let mut engine = engine_with(&link, 10);
        connect(&mut engine);
        engine.set_connected(false);

        assert_eq!(engine.start_session(None), Err(SessionError::NotConnected));

        connect(&mut engine);
        engine.start_session(Some(Duration::from_secs(1))).unwrap();
        engine.tick();

        assert_eq!(link.sent(), vec![Command::Start, Command::Stop]);
    }

    #[test]
    fn test_handle_raw_accepts_printable_binary8() {
        let link = RecordingLink::new();
        let mut engine = engine_with(&link, 10);
        connect(&mut engine);
        engine.start_session(None).unwrap();

        let reading = engine.handle_raw(&[50, 60, 70, 80, 90, 100, 110, 120]).unwrap();

        assert_eq!(reading.values(), &[50, 60, 70, 80, 90, 100, 110, 120]);
        assert_eq!(engine.recorder().readings().len(), 1);
    }

    #[test]
    fn test_decode_failure_keeps_session_intact() {
        let link = RecordingLink::new();
        let mut engine = engine_with(&link, 10);
        connect(&mut engine);
        engine.start_session(None).unwrap();
        engine.handle_raw(b"1,2,3,4").unwrap();

        assert!(engine.handle_raw(b"noise").is_err());

        assert_eq!(engine.state(), SessionState::Recording);
        assert_eq!(engine.recorder().readings().len(), 1);
    }

    #[test]
    fn test_history_is_bounded() {
        let link = RecordingLink::new();
        let mut engine = engine_with(&link, 2);
        connect(&mut engine);

        for value in [10u32, 20, 30] {
            engine.start_session(Some(Duration::from_secs(1))).unwrap();
            engine.handle_payload(&value.to_string().into()).unwrap();
            assert!(engine.tick().is_some());
        }

        let peaks: Vec<u32> = engine.history().map(|s| s.peak_value).collect();
        assert_eq!(peaks, vec![20, 30]);

        engine.clear_history();
        assert_eq!(engine.history().count(), 0);
    }

    #[test]
    fn test_display_receives_failures() {
        let link = RecordingLink::new();
        let (sink, mut receivers) = DisplaySink::channel();
        let mut engine = TelemetryEngine::new(EngineConfig::default(), Box::new(link), sink);

        let _ = engine.handle_raw(b"PRESSURE_LEFT: none");

        let entry = receivers.logs.try_recv().unwrap();
        assert_eq!(entry.level, LogLevel::Warning);
        let raw = receivers.raw.try_recv().unwrap();
        assert_eq!(raw.text, "PRESSURE_LEFT: none");
        assert!(!raw.well_formed);
    }

    #[test]
    fn test_start_without_connection_reports_error() {
        let link = RecordingLink::new();
        let (sink, mut receivers) = DisplaySink::channel();
        let mut engine = TelemetryEngine::new(EngineConfig::default(), Box::new(link), sink);

        let result = engine.start_session(None);

        assert_eq!(result, Err(SessionError::NotConnected));
        assert_eq!(receivers.logs.try_recv().unwrap().level, LogLevel::Error);
        assert_eq!(engine.state(), SessionState::Idle);
    }
}
