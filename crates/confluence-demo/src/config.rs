//! Configuration for the demo driver.
//!
//! All configuration is loaded from environment variables. Every variable is
//! optional; unset variables fall back to the defaults below.

use std::str::FromStr;

use crate::error::DemoError;

/// Default number of sensors.
const DEFAULT_SOURCES: usize = 3;

/// Default event name relayed through the multiplexer.
const DEFAULT_EVENT: &str = "tick";

/// Default number of emission rounds.
const DEFAULT_ROUNDS: u64 = 2;

/// Complete demo configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// Number of sensors observed by the multiplexer (at least 1).
    pub sources: usize,
    /// Event name every sensor emits.
    pub event: String,
    /// How many times each sensor emits before teardown.
    pub rounds: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES,
            event: DEFAULT_EVENT.to_owned(),
            rounds: DEFAULT_ROUNDS,
        }
    }
}

impl DemoConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `CONFLUENCE_SOURCES` -- number of sensors (default 3, at least 1)
    /// - `CONFLUENCE_EVENT` -- event name to relay (default `tick`)
    /// - `CONFLUENCE_ROUNDS` -- emission rounds (default 2)
    pub fn from_env() -> Result<Self, DemoError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DemoError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sources: usize = parse_var(&lookup, "CONFLUENCE_SOURCES", DEFAULT_SOURCES)?;
        if sources == 0 {
            return Err(DemoError::Config(
                "CONFLUENCE_SOURCES must be at least 1".to_owned(),
            ));
        }

        let event = lookup("CONFLUENCE_EVENT").unwrap_or_else(|| DEFAULT_EVENT.to_owned());
        if event.trim().is_empty() {
            return Err(DemoError::Config(
                "CONFLUENCE_EVENT must not be empty".to_owned(),
            ));
        }

        let rounds: u64 = parse_var(&lookup, "CONFLUENCE_ROUNDS", DEFAULT_ROUNDS)?;

        Ok(Self {
            sources,
            event,
            rounds,
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, DemoError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: core::fmt::Display,
{
    lookup(name).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e| DemoError::Config(format!("invalid {name}: {e}")))
    })
}
