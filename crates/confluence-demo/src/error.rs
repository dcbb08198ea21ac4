//! Error types for the demo driver.
//!
//! The multiplexer itself never fails; the only failures here come from
//! reading the demo configuration.

/// Errors that can occur while setting up the demo.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),
}
