//! Colorfall binary.
//!
//! Resolves config from the environment, puts the terminal in raw mode
//! and runs the app loop until quit.

use anyhow::Context;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::info;
use tracing_subscriber::EnvFilter;

use colorfall::{App, AppConfig, GameMode, VERSION};

/// Restores the terminal even when the loop errors out.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> anyhow::Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Read config from `COLORFALL_*` environment variables.
fn config_from_env() -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Ok(port) = std::env::var("COLORFALL_SERIAL_PORT") {
        if !port.is_empty() {
            config.serial_port = Some(port);
        }
    }
    if let Ok(url) = std::env::var("COLORFALL_SERVICE_URL") {
        if !url.is_empty() {
            config.service_base_url = url.trim_end_matches('/').to_string();
        }
    }
    if let Ok(mode) = std::env::var("COLORFALL_MODE") {
        config.mode = match mode.to_ascii_lowercase().as_str() {
            "manual" => GameMode::Manual,
            "adaptive" => GameMode::Adaptive,
            other => anyhow::bail!("unknown COLORFALL_MODE: {other}"),
        };
    }
    if let Ok(seed) = std::env::var("COLORFALL_SEED") {
        config.rng_seed = Some(seed.parse().context("COLORFALL_SEED must be a u64")?);
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config_from_env()?;

    info!("Colorfall v{}", VERSION);
    info!(
        mode = ?config.mode,
        service = %config.service_base_url,
        serial = config.serial_port.as_deref().unwrap_or("none"),
        "starting"
    );

    let mut app = App::new(config)?;

    let _guard = RawModeGuard::enter()?;
    app.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_resolves() {
        // Only exercises the parsing path that ignores unset vars
        let config = AppConfig::default();
        assert_eq!(config.mode, GameMode::Manual);
        assert!(config.serial_port.is_none());
    }
}
