use std::{num::NonZeroU64, time::Duration};

use anyhow::{Context, Result};

/// Roster used by the simulator when `SIMULATOR_DEVICE_IDS` is not set.
pub const DEFAULT_SIMULATOR_DEVICES: &str = "HELTEC-01,HELTEC-02,HELTEC-03";

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When absent the service keeps its data
    /// in memory for the lifetime of the process.
    pub database_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub simulator_enabled: bool,
    /// Period between two simulator cycles.
    pub simulator_interval: Duration,
    /// Comma-separated list of device IDs the simulator produces readings for.
    pub simulator_device_ids: Vec<String>,
    /// Soil moisture percentage below which a drought alert is logged.
    pub drought_threshold: f64,
    /// HG Brasil weather API key. The `/api/clima` proxy answers 500 without it.
    pub hg_api_key: Option<String>,
    pub hg_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            simulator_enabled: parse_bool(&optional("SIMULATOR_ENABLED", "true"))
                .context("SIMULATOR_ENABLED must be true or false")?,
            simulator_interval: parse_interval_ms(&optional("SIMULATOR_INTERVAL_MS", "10000"))
                .context("SIMULATOR_INTERVAL_MS must be a positive integer")?,
            simulator_device_ids: parse_device_ids(&optional(
                "SIMULATOR_DEVICE_IDS",
                DEFAULT_SIMULATOR_DEVICES,
            )),
            drought_threshold: optional("DROUGHT_THRESHOLD", "30.0")
                .parse()
                .context("DROUGHT_THRESHOLD must be a number")?,
            hg_api_key: non_empty("HG_API_KEY"),
            hg_base_url: optional("HG_BASE_URL", "https://api.hgbrasil.com"),
        })
    }
}

/// Parse `"id1,id2,id3"` into a list of trimmed, non-empty device IDs.
fn parse_device_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Milliseconds to a non-zero period. A zero period cannot drive a timer.
fn parse_interval_ms(raw: &str) -> Result<Duration> {
    let ms: NonZeroU64 = raw.trim().parse()?;
    Ok(Duration::from_millis(ms.get()))
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("not a boolean: {other:?}")),
    }
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Like `optional` without a default: unset and blank both map to `None`.
fn non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
