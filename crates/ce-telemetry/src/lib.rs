//! # CE Telemetry
//!
//! Structured logging for services built on the envelope crates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ce_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config).expect("Failed to init logging");
//!     // Codec and bus events are now being logged
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `envelope` | Service name in log records |
//! | `CE_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `CE_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `CE_JSON_LOGS` | `false` | JSON instead of pretty output |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logger: {0}")]
    LoggerInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
