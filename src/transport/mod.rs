pub mod link;
pub mod replay;
pub mod source;

pub use link::{Command, PeripheralLink, RecordingLink};
pub use replay::{parse_capture, ReplayConfig, ReplaySource};
pub use source::{Notification, TelemetrySource};
