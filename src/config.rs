use anyhow::{bail, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::engine::EngineConfig;
use crate::session::SessionConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub session: SessionSettings,
    pub replay: ReplaySettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionSettings {
    pub duration_secs: u64,
    pub tick_interval_ms: u64,
    pub history_limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct ReplaySettings {
    pub frame_interval_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    /// Load configuration from `path` (extension optional), falling back to
    /// built-in defaults. `INSOLE__SECTION__KEY` environment variables win.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "insole-telemetry")?
            .set_default("session.duration_secs", 20_i64)?
            .set_default("session.tick_interval_ms", 1000_i64)?
            .set_default("session.history_limit", 10_i64)?
            .set_default("replay.frame_interval_ms", 50_i64)?
            .set_default("logging.level", "info")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("INSOLE").separator("__"))
            .build()?;

        let cfg: Config = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.session.tick_interval_ms == 0 {
            bail!("session.tick_interval_ms must be greater than zero");
        }
        if self.session.duration_secs == 0 {
            bail!("session.duration_secs must be at least one second");
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            session: SessionConfig {
                duration: Duration::from_secs(self.session.duration_secs),
                tick_interval: Duration::from_millis(self.session.tick_interval_ms),
            },
            history_limit: self.session.history_limit,
        }
    }
}
