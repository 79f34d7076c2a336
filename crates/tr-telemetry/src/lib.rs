//! # Tx-Relay Telemetry
//!
//! Structured logging for the relay subsystems. Every subsystem logs through
//! `tracing` with a `[tr-NN]` prefix; this crate installs the subscriber that
//! turns those events into console or JSON output.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tr_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     init_logging(&TelemetryConfig::from_env()).expect("logging");
//!     // Relay runs here
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TR_SERVICE_NAME` | `tx-relay` | Service name attached to startup logs |
//! | `TR_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `TR_CONSOLE_OUTPUT` | `true` | Emit logs to stdout |
//! | `TR_JSON_LOGS` | `false` | JSON instead of human-readable lines |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("Failed to install subscriber: {0}")]
    SubscriberInit(String),
}
