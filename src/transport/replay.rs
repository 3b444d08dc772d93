use anyhow::{bail, Context, Result};
use base64::Engine;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::source::{Notification, TelemetrySource};

/// Replay configuration
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Capture file to read
    pub path: PathBuf,
    /// Delay between consecutive notifications (default: 50ms)
    pub frame_interval: Duration,
}

impl ReplayConfig {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            frame_interval: Duration::from_millis(50),
        }
    }
}

/// Parse a capture file into notifications.
///
/// Format, one entry per line:
/// - blank lines and lines starting with `#` are skipped
/// - `!connect` / `!disconnect` toggle the connection signal
/// - `b64:<data>` is a base64-encoded binary payload
/// - anything else is delivered verbatim as a text payload
pub fn parse_capture(contents: &str) -> Result<Vec<Notification>> {
    let mut notifications = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let notification = match line {
            "!connect" => Notification::Connection(true),
            "!disconnect" => Notification::Connection(false),
            _ => match line.strip_prefix("b64:") {
                Some(encoded) => {
                    let bytes = base64::engine::general_purpose::STANDARD
                        .decode(encoded.trim())
                        .with_context(|| format!("Invalid base64 payload on line {}", index + 1))?;
                    Notification::Data(bytes)
                }
                None => Notification::Data(line.as_bytes().to_vec()),
            },
        };

        notifications.push(notification);
    }

    Ok(notifications)
}

/// Telemetry source that replays a capture file
pub struct ReplaySource {
    config: ReplayConfig,
    streaming: Arc<AtomicBool>,
    task_handle: Option<JoinHandle<()>>,
}

impl ReplaySource {
    pub fn new(config: ReplayConfig) -> Self {
        Self {
            config,
            streaming: Arc::new(AtomicBool::new(false)),
            task_handle: None,
        }
    }
}

#[async_trait::async_trait]
impl TelemetrySource for ReplaySource {
    async fn start(&mut self) -> Result<mpsc::Receiver<Notification>> {
        if self.streaming.load(Ordering::SeqCst) {
            bail!("Replay already streaming");
        }

        let contents = tokio::fs::read_to_string(&self.config.path)
            .await
            .with_context(|| format!("Failed to read capture file: {:?}", self.config.path))?;
        let notifications = parse_capture(&contents)?;

        info!(
            "Replaying {} notifications from {:?}",
            notifications.len(),
            self.config.path
        );

        let (tx, rx) = mpsc::channel(100);
        let streaming = Arc::clone(&self.streaming);
        let frame_interval = self.config.frame_interval;
        streaming.store(true, Ordering::SeqCst);

        let task = tokio::spawn(async move {
            for notification in notifications {
                if !streaming.load(Ordering::SeqCst) {
                    break;
                }

                if tx.send(notification).await.is_err() {
                    debug!("Replay receiver dropped");
                    break;
                }

                if !frame_interval.is_zero() {
                    tokio::time::sleep(frame_interval).await;
                }
            }

            streaming.store(false, Ordering::SeqCst);
            info!("Replay finished");
        });

        self.task_handle = Some(task);

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.streaming.store(false, Ordering::SeqCst);

        if let Some(task) = self.task_handle.take() {
            task.abort();
            let _ = task.await;
        }

        Ok(())
    }

    fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "replay"
    }
}
