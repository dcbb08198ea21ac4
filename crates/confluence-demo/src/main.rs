//! Demo driver for the Confluence event multiplexer.
//!
//! Builds a handful of sensors, observes them through one
//! [`Multiplexer`](confluence_mux::Multiplexer), emits a few rounds of
//! readings and tears everything down again, logging each step.
//!
//! # Flow
//!
//! ```text
//! sensors (early) --add--> Multiplexer <--subscribe-- tally handler
//! sensors (late)  --add--> Multiplexer --relay--> tally handler
//! ```
//!
//! Set `RUST_LOG=debug` to see every relayed reading.

mod config;
mod error;
mod scenario;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::DemoConfig;

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables and
/// runs the scenario once.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("confluence-demo starting");

    let config = DemoConfig::from_env()?;
    info!(
        sources = config.sources,
        event = %config.event,
        rounds = config.rounds,
        "configuration loaded"
    );

    let report = scenario::run(&config);
    for (sensor, count) in &report.per_sensor {
        info!(sensor = %sensor, relayed = count, "sensor summary");
    }
    info!(
        relayed = report.relayed(),
        after_removal = report.after_removal,
        added = report.lifecycle.0,
        removed = report.lifecycle.1,
        leftover_relays = report.leftover_relays,
        "demo finished"
    );

    Ok(())
}
