//! Structured feed for whatever renders the session to a human
//!
//! Two streams leave the engine:
//! - log entries tagged `INFO` / `WARNING` / `ERROR`
//! - raw text of payloads the decoder could not make sense of
//!
//! Both are unbounded tokio channels so sending never blocks the event loop.
//! A dropped receiver silently disables its stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

/// Display tag of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// One `(tag, payload)` line for the display log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Text of an unrecognized payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLine {
    pub text: String,

    /// Result of the telemetry line check; `false` lines get visual emphasis
    pub well_formed: bool,

    pub timestamp: DateTime<Utc>,
}

/// Receiving ends of the display streams
pub struct DisplayReceivers {
    pub logs: mpsc::UnboundedReceiver<LogEntry>,
    pub raw: mpsc::UnboundedReceiver<RawLine>,
}

/// Sending half used by the engine
#[derive(Debug, Clone, Default)]
pub struct DisplaySink {
    logs: Option<mpsc::UnboundedSender<LogEntry>>,
    raw: Option<mpsc::UnboundedSender<RawLine>>,
}

impl DisplaySink {
    /// Create a connected sink and its receivers
    pub fn channel() -> (Self, DisplayReceivers) {
        let (logs_tx, logs_rx) = mpsc::unbounded_channel();
        let (raw_tx, raw_rx) = mpsc::unbounded_channel();

        (
            Self {
                logs: Some(logs_tx),
                raw: Some(raw_tx),
            },
            DisplayReceivers {
                logs: logs_rx,
                raw: raw_rx,
            },
        )
    }

    /// A sink with no display attached
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if let Some(tx) = &self.logs {
            let _ = tx.send(LogEntry {
                level,
                message: message.into(),
                timestamp: Utc::now(),
            });
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    pub fn raw(&self, text: impl Into<String>, well_formed: bool) {
        if let Some(tx) = &self.raw {
            let _ = tx.send(RawLine {
                text: text.into(),
                well_formed,
                timestamp: Utc::now(),
            });
        }
    }
}
