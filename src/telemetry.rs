use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};

/// Installs the global subscriber. `RUST_LOG` takes precedence over
/// `log_level`. Logs go to stderr so report output on stdout stays clean.
pub fn init(log_level: &str) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level).map_err(|err| {
            Error::Telemetry(format!("invalid log level/filter '{}': {}", log_level, err))
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(|err| Error::Telemetry(format!("telemetry error: {}", err)))
}
