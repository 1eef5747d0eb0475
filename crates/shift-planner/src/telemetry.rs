//! Subscriber wiring for the planner binaries.
//!
//! The base filter comes from `RUST_LOG` or the configured level. An optional planner level
//! is layered on top as a directive for [`PLANNER_TARGET`], so engine decisions can be traced
//! at `debug` while dependencies stay at `warn`.

use crate::config::TelemetryConfig;
use std::env;
use std::fmt;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::EnvFilter;

/// Target prefix of every event the planner crates emit, the CLI included.
pub const PLANNER_TARGET: &str = "shift_planner";

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    PlannerLevel { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(f, "invalid log filter '{value}'")
            }
            TelemetryError::PlannerLevel { value, .. } => {
                write!(f, "invalid planner log level '{value}'")
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. }
            | TelemetryError::PlannerLevel { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Base filter plus the planner directive, if any.
pub fn planner_filter(
    base: &str,
    planner_level: Option<&str>,
) -> Result<EnvFilter, TelemetryError> {
    let filter = EnvFilter::try_new(base).map_err(|source| TelemetryError::EnvFilter {
        value: base.to_string(),
        source,
    })?;
    let Some(level) = planner_level else {
        return Ok(filter);
    };

    let directive: Directive = format!("{PLANNER_TARGET}={}", level.trim())
        .parse()
        .map_err(|source| TelemetryError::PlannerLevel {
            value: level.to_string(),
            source,
        })?;
    Ok(filter.add_directive(directive))
}

/// Install the process-wide subscriber. The engine itself only emits events; whether they go
/// anywhere is decided here, by the binary.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let base = env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| config.log_level.clone());
    let filter = planner_filter(&base, config.planner_level.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
