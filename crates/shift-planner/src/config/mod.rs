use crate::planning::time::NightWindow;
use rust_decimal::Decimal;
use std::env;
use std::fmt;
use std::str::FromStr;

const DEFAULT_STANDARD_MONTHLY_HOURS: u32 = 173;
const DEFAULT_MINOR_AGE: u32 = 18;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the planner binaries.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let planner_level = env::var("PLANNER_LOG_LEVEL")
            .ok()
            .filter(|level| !level.trim().is_empty());

        let standard_monthly_hours = parse_var(
            "PLANNER_STANDARD_MONTHLY_HOURS",
            Decimal::from(DEFAULT_STANDARD_MONTHLY_HOURS),
        )?;
        if standard_monthly_hours <= Decimal::ZERO {
            return Err(ConfigError::NonPositive {
                var: "PLANNER_STANDARD_MONTHLY_HOURS",
            });
        }

        let minor_age = parse_var("PLANNER_MINOR_AGE", DEFAULT_MINOR_AGE)?;
        let night_start = parse_var("PLANNER_NIGHT_START_HOUR", NightWindow::default().start_hour)?;
        let night_end = parse_var("PLANNER_NIGHT_END_HOUR", NightWindow::default().end_hour)?;
        if night_start > 23 || night_end > 23 {
            return Err(ConfigError::HourOutOfRange {
                start: night_start,
                end: night_end,
            });
        }

        Ok(Self {
            environment,
            telemetry: TelemetryConfig {
                log_level,
                planner_level,
            },
            engine: EngineConfig {
                standard_monthly_hours,
                minor_age,
                night: NightWindow {
                    start_hour: night_start,
                    end_hour: night_end,
                },
            },
        })
    }
}

fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidNumber {
            var,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

/// Knobs shared by every engine component. Passed explicitly; nothing reads it globally.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Divisor turning a monthly salary into an hourly rate, and the base above which monthly
    /// hours count as overtime.
    pub standard_monthly_hours: Decimal,
    pub minor_age: u32,
    pub night: NightWindow,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            standard_monthly_hours: Decimal::from(DEFAULT_STANDARD_MONTHLY_HOURS),
            minor_age: DEFAULT_MINOR_AGE,
            night: NightWindow::default(),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Level for the planner's own targets, layered over `log_level`.
    pub planner_level: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { var: &'static str, value: String },
    NonPositive { var: &'static str },
    HourOutOfRange { start: u32, end: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{var} must be numeric, got '{value}'")
            }
            ConfigError::NonPositive { var } => write!(f, "{var} must be greater than zero"),
            ConfigError::HourOutOfRange { start, end } => write!(
                f,
                "night window hours must be between 0 and 23 (start {start}, end {end})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
