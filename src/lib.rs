pub mod config;
pub mod display;
pub mod engine;
pub mod session;
pub mod telemetry;
pub mod transport;

pub use config::Config;
pub use display::{DisplayReceivers, DisplaySink, LogEntry, LogLevel, RawLine};
pub use engine::{EngineConfig, TelemetryEngine};
pub use session::{
    SessionConfig, SessionError, SessionOutcome, SessionRecorder, SessionState, SessionStats,
    SummaryResult, TimestampedReading,
};
pub use telemetry::{decode, decode_raw, is_well_formed, ChannelReading, DecodeFailure, Encoding, Payload};
pub use transport::{
    Command, Notification, PeripheralLink, RecordingLink, ReplayConfig, ReplaySource,
    TelemetrySource,
};
