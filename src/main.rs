use anyhow::{Context, Result};
use clap::Parser;
use insole_telemetry::{
    Config, DisplaySink, Notification, RecordingLink, ReplayConfig, ReplaySource, SessionOutcome,
    SessionState, TelemetryEngine, TelemetrySource,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "insole-telemetry")]
#[command(about = "Replay an insole pressure capture through a measurement session")]
struct Args {
    /// Capture file to replay
    #[arg(short = 'i', long)]
    capture: PathBuf,

    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/insole-telemetry")]
    config: String,

    /// Session duration in seconds (overrides config)
    #[arg(short, long)]
    duration: Option<u64>,

    /// Delay between replayed notifications in milliseconds (overrides config)
    #[arg(short, long)]
    frame_interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    let level: tracing::Level = cfg
        .logging
        .level
        .parse()
        .with_context(|| format!("Invalid log level: {}", cfg.logging.level))?;
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let mut engine_config = cfg.engine_config();
    if let Some(secs) = args.duration {
        engine_config.session.duration = Duration::from_secs(secs);
    }
    let tick_interval = engine_config.session.tick_interval;

    // Display collaborator: print both streams to the console
    let (display, mut receivers) = DisplaySink::channel();
    let display_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(entry) = receivers.logs.recv() => {
                    println!("[{}] {}", entry.level, entry.message);
                }
                Some(line) = receivers.raw.recv() => {
                    let mark = if line.well_formed { ' ' } else { '!' };
                    println!("  raw{} {}", mark, line.text);
                }
                else => break,
            }
        }
    });

    let mut engine = TelemetryEngine::new(engine_config, Box::new(RecordingLink::new()), display);

    let mut replay_config = ReplayConfig::new(args.capture);
    replay_config.frame_interval =
        Duration::from_millis(args.frame_interval_ms.unwrap_or(cfg.replay.frame_interval_ms));
    let mut source = ReplaySource::new(replay_config);
    let mut notifications = source.start().await?;

    info!("Replaying through {} source", source.name());

    let mut ticker = tokio::time::interval(tick_interval);
    ticker.tick().await;

    let outcome = loop {
        tokio::select! {
            notification = notifications.recv() => match notification {
                Some(Notification::Connection(connected)) => {
                    engine.set_connected(connected);

                    if connected && engine.state() != SessionState::Recording {
                        if let Err(e) = engine.start_session(None) {
                            warn!("Could not start session: {}", e);
                        }
                    }
                }
                Some(Notification::Data(bytes)) => {
                    let _ = engine.handle_raw(&bytes);
                }
                None => {
                    info!("Capture exhausted");
                    let outcome = if engine.state() == SessionState::Recording {
                        engine.stop_session().ok()
                    } else {
                        None
                    };
                    break outcome;
                }
            },
            _ = ticker.tick() => {
                if let Some(outcome) = engine.tick() {
                    break Some(outcome);
                }
            }
        }
    };

    source.stop().await?;

    match outcome {
        Some(SessionOutcome::Summary(summary)) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Some(SessionOutcome::NoData) => {
            warn!("Session finished without data");
        }
        None => {
            warn!("No session was recorded (was the peripheral ever connected?)");
        }
    }

    drop(engine);
    let _ = display_task.await;

    Ok(())
}
