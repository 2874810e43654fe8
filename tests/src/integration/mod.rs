//! Cross-crate integration tests.

use ce_telemetry::{init_logging, TelemetryConfig};
use std::sync::Once;

pub mod flows;
pub mod round_trip;
pub mod scenarios;

static LOGGING: Once = Once::new();

/// Install logging once per test binary; `RUST_LOG` controls verbosity.
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let config = TelemetryConfig::from_env().with_service_name("ce-tests");
        if let Err(e) = init_logging(&config) {
            eprintln!("test logging disabled: {e}");
        }
    });
}
