//! Persisted compliance rules and their compiled, typed form.
//!
//! Rules arrive as rows from four tables (labor-law constants, labor-management thresholds,
//! store constraints and validation rules). Each row is compiled once into a [`CompiledRule`]
//! whose [`RuleCheck`] carries the typed parameters its predicate needs. Rows that cannot be
//! compiled become [`ConfigurationError`] entries instead of aborting evaluation.

use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::planning::domain::{EmploymentType, RuleId, StoreId, TenantId};
use crate::planning::time::{ClockTime, MINUTES_PER_DAY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Blocking,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Blocking => "blocking",
        }
    }

    pub const fn blocks_approval(self) -> bool {
        matches!(self, Self::Blocking)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl PenaltyLevel {
    pub const fn severity(self) -> Severity {
        match self {
            Self::Critical | Self::High => Severity::Blocking,
            Self::Medium => Severity::Warning,
            Self::Low => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreachAction {
    Block,
    Warn,
    Notify,
}

impl BreachAction {
    pub const fn severity(self) -> Severity {
        match self {
            Self::Block => Severity::Blocking,
            Self::Warn => Severity::Warning,
            Self::Notify => Severity::Info,
        }
    }
}

/// Report grouping, in the order violations are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    LaborLaw,
    LaborManagement,
    StoreConstraint,
    Validation,
}

impl RuleCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::LaborLaw => "labor law",
            Self::LaborManagement => "labor management",
            Self::StoreConstraint => "store constraint",
            Self::Validation => "validation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleFamily {
    WeeklyHours,
    MonthlyHours,
    MonthlyOvertime,
    MinorLabor,
    RestInterval,
    ConsecutiveDays,
    BreakTime,
    MinStaff,
    MaxStaff,
    Availability,
    Qualification,
}

impl RuleFamily {
    pub const fn label(self) -> &'static str {
        match self {
            Self::WeeklyHours => "weekly_hours",
            Self::MonthlyHours => "monthly_hours",
            Self::MonthlyOvertime => "monthly_overtime",
            Self::MinorLabor => "minor_labor",
            Self::RestInterval => "rest_interval",
            Self::ConsecutiveDays => "consecutive_days",
            Self::BreakTime => "break_time",
            Self::MinStaff => "min_staff",
            Self::MaxStaff => "max_staff",
            Self::Availability => "availability",
            Self::Qualification => "qualification",
        }
    }

    pub fn ordered() -> [Self; 11] {
        [
            Self::WeeklyHours,
            Self::MonthlyHours,
            Self::MonthlyOvertime,
            Self::MinorLabor,
            Self::RestInterval,
            Self::ConsecutiveDays,
            Self::BreakTime,
            Self::MinStaff,
            Self::MaxStaff,
            Self::Availability,
            Self::Qualification,
        ]
    }

    /// Family named by a rule category or code, accepting the aliases the rule tables use.
    pub fn from_name(raw: &str) -> Option<Self> {
        let name = raw.trim().to_ascii_lowercase();
        let family = match name.as_str() {
            "weekly_hours" | "max_weekly_hours" | "weekly_limit" => Self::WeeklyHours,
            "monthly_hours" | "max_monthly_hours" | "monthly_limit" => Self::MonthlyHours,
            "monthly_overtime" | "overtime" => Self::MonthlyOvertime,
            "minor_labor" | "minor" | "minor_protection" => Self::MinorLabor,
            "rest_interval" | "interval" | "work_interval" => Self::RestInterval,
            "consecutive_days" | "max_consecutive_days" => Self::ConsecutiveDays,
            "break_time" | "break" => Self::BreakTime,
            "min_staff" | "minimum_staff" => Self::MinStaff,
            "max_staff" | "maximum_staff" => Self::MaxStaff,
            "availability" => Self::Availability,
            "qualification" | "certification" => Self::Qualification,
            _ => return None,
        };
        Some(family)
    }

    /// Family of a validation rule, by its persisted code.
    pub fn from_code(code: &str) -> Option<Self> {
        let family = match code.trim().to_ascii_uppercase().as_str() {
            "VAL001" | "LAW_007" => Self::MinorLabor,
            "VAL002" | "LAW_001" | "LAW_002" => Self::WeeklyHours,
            "VAL003" | "LAW_003" | "LAW_004" => Self::BreakTime,
            "VAL004" | "LAW_006" => Self::RestInterval,
            "VAL005" | "LAW_011" | "LAW_012" => Self::MonthlyOvertime,
            "VAL006" => Self::Qualification,
            "LAW_010" | "LM004" | "LM005" => Self::ConsecutiveDays,
            _ => return Self::from_name(code),
        };
        Some(family)
    }
}

impl fmt::Display for RuleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuleUnit {
    Hours,
    Minutes,
    Days,
    Staff,
}

impl RuleUnit {
    pub fn parse(raw: &str) -> Option<Self> {
        let unit = match raw.trim().to_ascii_lowercase().as_str() {
            "hours" | "hour" | "h" => Self::Hours,
            "minutes" | "minute" | "min" => Self::Minutes,
            "days" | "day" => Self::Days,
            "staff" | "people" | "persons" | "count" => Self::Staff,
            _ => return None,
        };
        Some(unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EvaluationPeriod {
    Shift,
    Day,
    Week,
    Month,
}

impl EvaluationPeriod {
    pub fn parse(raw: &str) -> Option<Self> {
        let period = match raw.trim().to_ascii_lowercase().as_str() {
            "shift" | "per_shift" => Self::Shift,
            "day" | "daily" => Self::Day,
            "week" | "weekly" => Self::Week,
            "month" | "monthly" => Self::Month,
            _ => return None,
        };
        Some(period)
    }
}

/// Clock band a staffing rule watches. An `end` at or before `start` wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBand {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeBand {
    /// Sampling segments of the shift date as minute-of-day pairs `[from, to)`, in order.
    /// The first segment of each stretch opens at the band start, the rest on whole hours.
    pub fn segments(&self) -> Vec<(u32, u32)> {
        let start = self.start.minutes_from_midnight() % MINUTES_PER_DAY;
        let end = self.end.minutes_from_midnight() % MINUTES_PER_DAY;
        let stretches = if start < end {
            vec![(start, end)]
        } else {
            vec![(0, end), (start, MINUTES_PER_DAY)]
        };

        let mut segments = Vec::new();
        for (from, to) in stretches {
            let mut cursor = from;
            while cursor < to {
                let next = ((cursor / 60 + 1) * 60).min(to);
                segments.push((cursor, next));
                cursor = next;
            }
        }
        segments
    }
}

/// The row-specific part of a persisted rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleDefinition {
    LaborLaw {
        category: String,
        #[serde(default)]
        value: Option<Decimal>,
        unit: String,
        penalty_level: PenaltyLevel,
    },
    LaborManagement {
        category: String,
        #[serde(default)]
        threshold: Option<Decimal>,
        unit: String,
        period: String,
        action: BreachAction,
    },
    StoreConstraint {
        constraint_type: String,
        #[serde(default)]
        value: Option<Decimal>,
        #[serde(default)]
        unit: Option<String>,
        severity: Severity,
    },
    Validation {
        severity: Severity,
        #[serde(default)]
        threshold: Option<Decimal>,
        #[serde(default)]
        unit: Option<String>,
    },
}

fn default_active() -> bool {
    true
}

/// A tenant-scoped rule as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceRule {
    pub rule_id: RuleId,
    pub tenant_id: TenantId,
    #[serde(default)]
    pub store_id: Option<StoreId>,
    pub code: String,
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Employment types the rule is limited to; empty means everyone.
    #[serde(default)]
    pub applies_to: BTreeSet<EmploymentType>,
    #[serde(default)]
    pub band: Option<TimeBand>,
    /// Worked-hours trigger for break rules.
    #[serde(default)]
    pub applies_above_hours: Option<Decimal>,
    /// Near-limit margin in the rule's unit. Crossing it without crossing the limit reports a
    /// warning. Compared the same way as the limit: above it for caps, below it for minimums.
    #[serde(default)]
    pub warn_at: Option<Decimal>,
    pub definition: RuleDefinition,
}

impl ComplianceRule {
    pub fn category(&self) -> RuleCategory {
        match self.definition {
            RuleDefinition::LaborLaw { .. } => RuleCategory::LaborLaw,
            RuleDefinition::LaborManagement { .. } => RuleCategory::LaborManagement,
            RuleDefinition::StoreConstraint { .. } => RuleCategory::StoreConstraint,
            RuleDefinition::Validation { .. } => RuleCategory::Validation,
        }
    }

    pub fn severity(&self) -> Severity {
        match &self.definition {
            RuleDefinition::LaborLaw { penalty_level, .. } => penalty_level.severity(),
            RuleDefinition::LaborManagement { action, .. } => action.severity(),
            RuleDefinition::StoreConstraint { severity, .. }
            | RuleDefinition::Validation { severity, .. } => *severity,
        }
    }

    /// Compile the row into its typed check.
    pub fn compile(&self, config: &EngineConfig) -> Result<CompiledRule, ConfigurationError> {
        let (check, warn_at) = self
            .resolve_check(config)
            .map_err(|issue| ConfigurationError::new(self, issue))?;

        Ok(CompiledRule {
            rule_id: self.rule_id,
            code: self.code.clone(),
            name: self.name.clone(),
            category: self.category(),
            severity: self.severity(),
            store_id: self.store_id,
            applies_to: self.applies_to.clone(),
            check,
            warn_at,
        })
    }

    fn resolve_check(
        &self,
        config: &EngineConfig,
    ) -> Result<(RuleCheck, Option<Decimal>), ConfigurationIssue> {
        match &self.definition {
            RuleDefinition::LaborLaw {
                category,
                value,
                unit,
                ..
            } => {
                let family = RuleFamily::from_name(category).ok_or_else(|| {
                    ConfigurationIssue::UnknownCategory {
                        category: category.clone(),
                    }
                })?;
                let threshold = value.ok_or(ConfigurationIssue::MissingThreshold)?;
                self.build(family, Some(threshold), Some(unit.as_str()), config)
            }
            RuleDefinition::LaborManagement {
                category,
                threshold,
                unit,
                period,
                ..
            } => {
                let period = EvaluationPeriod::parse(period).ok_or_else(|| {
                    ConfigurationIssue::UnsupportedPeriod {
                        period: period.clone(),
                    }
                })?;
                let family = match category.trim().to_ascii_lowercase().as_str() {
                    "max_hours" | "working_hours" => match period {
                        EvaluationPeriod::Week => RuleFamily::WeeklyHours,
                        EvaluationPeriod::Month => RuleFamily::MonthlyHours,
                        EvaluationPeriod::Shift | EvaluationPeriod::Day => {
                            return Err(ConfigurationIssue::UnsupportedPeriod {
                                period: format!("{period:?}").to_ascii_lowercase(),
                            })
                        }
                    },
                    _ => RuleFamily::from_name(category).ok_or_else(|| {
                        ConfigurationIssue::UnknownCategory {
                            category: category.clone(),
                        }
                    })?,
                };
                let threshold = threshold.ok_or(ConfigurationIssue::MissingThreshold)?;
                self.build(family, Some(threshold), Some(unit.as_str()), config)
            }
            RuleDefinition::StoreConstraint {
                constraint_type,
                value,
                unit,
                ..
            } => {
                if self.store_id.is_none() {
                    return Err(ConfigurationIssue::MissingStore);
                }
                let family = RuleFamily::from_name(constraint_type).ok_or_else(|| {
                    ConfigurationIssue::UnknownCategory {
                        category: constraint_type.clone(),
                    }
                })?;
                let threshold = match family {
                    RuleFamily::Availability | RuleFamily::Qualification => *value,
                    _ => Some(value.ok_or(ConfigurationIssue::MissingThreshold)?),
                };
                self.build(family, threshold, unit.as_deref(), config)
            }
            RuleDefinition::Validation {
                threshold, unit, ..
            } => {
                let family = RuleFamily::from_code(&self.code).ok_or_else(|| {
                    ConfigurationIssue::UnknownCode {
                        code: self.code.clone(),
                    }
                })?;
                self.build(family, *threshold, unit.as_deref(), config)
            }
        }
    }

    /// Turn a family plus raw threshold into a typed check and its warning margin. A missing
    /// threshold falls back to the statutory default where one exists.
    fn build(
        &self,
        family: RuleFamily,
        threshold: Option<Decimal>,
        unit: Option<&str>,
        config: &EngineConfig,
    ) -> Result<(RuleCheck, Option<Decimal>), ConfigurationIssue> {
        let negative = threshold
            .iter()
            .chain(self.warn_at.iter())
            .find(|value| **value < Decimal::ZERO);
        if let Some(&value) = negative {
            return Err(ConfigurationIssue::NegativeThreshold { value });
        }
        let unit = match unit {
            Some(raw) => Some(RuleUnit::parse(raw).ok_or_else(|| {
                ConfigurationIssue::UnsupportedUnit {
                    unit: raw.to_string(),
                    family,
                }
            })?),
            None => None,
        };
        let unsupported = |unit: RuleUnit| ConfigurationIssue::UnsupportedUnit {
            unit: format!("{unit:?}").to_ascii_lowercase(),
            family,
        };
        let required = |default: Option<Decimal>| {
            threshold
                .or(default)
                .ok_or(ConfigurationIssue::MissingThreshold)
        };

        let hours = |value: Decimal| -> Result<Decimal, ConfigurationIssue> {
            match unit {
                None | Some(RuleUnit::Hours) => Ok(value),
                Some(RuleUnit::Minutes) => Ok(value / Decimal::from(60)),
                Some(other) => Err(unsupported(other)),
            }
        };
        let minutes = |value: Decimal| -> Result<i64, ConfigurationIssue> {
            let value = match unit {
                None | Some(RuleUnit::Minutes) => value,
                Some(RuleUnit::Hours) => value * Decimal::from(60),
                Some(other) => return Err(unsupported(other)),
            };
            whole_number(value)
        };
        let count = |expected: RuleUnit, value: Decimal| -> Result<u32, ConfigurationIssue> {
            match unit {
                None => {}
                Some(found) if found == expected => {}
                Some(other) => return Err(unsupported(other)),
            }
            whole_number(value).and_then(|whole| {
                u32::try_from(whole).map_err(|_| ConfigurationIssue::NotWholeNumber { value })
            })
        };
        let band = || self.band.ok_or(ConfigurationIssue::MissingBand);

        let check = match family {
            RuleFamily::WeeklyHours => RuleCheck::WeeklyHours {
                max_hours: hours(required(Some(Decimal::from(40)))?)?,
            },
            RuleFamily::MonthlyHours => RuleCheck::MonthlyHours {
                max_hours: hours(required(Some(config.standard_monthly_hours))?)?,
            },
            RuleFamily::MonthlyOvertime => RuleCheck::MonthlyOvertime {
                base_hours: config.standard_monthly_hours,
                max_overtime_hours: hours(required(Some(Decimal::from(45)))?)?,
            },
            RuleFamily::MinorLabor => RuleCheck::MinorLabor {
                max_shift_hours: match threshold {
                    Some(value) => Some(hours(value)?),
                    None => None,
                },
            },
            RuleFamily::RestInterval => RuleCheck::RestInterval {
                min_rest_minutes: minutes(required(Some(Decimal::from(11 * 60)))?)?,
            },
            RuleFamily::ConsecutiveDays => RuleCheck::ConsecutiveDays {
                max_days: count(RuleUnit::Days, required(Some(Decimal::from(6)))?)?,
            },
            RuleFamily::BreakTime => {
                let tiers = match threshold {
                    Some(value) => vec![BreakTier {
                        above_hours: self.applies_above_hours.unwrap_or(Decimal::ZERO),
                        min_break_minutes: u32::try_from(minutes(value)?)
                            .map_err(|_| ConfigurationIssue::NotWholeNumber { value })?,
                    }],
                    None => BreakTier::statutory(),
                };
                RuleCheck::BreakTime { tiers }
            }
            RuleFamily::MinStaff => RuleCheck::MinStaff {
                band: band()?,
                min_staff: count(RuleUnit::Staff, required(Some(Decimal::from(2)))?)?,
            },
            RuleFamily::MaxStaff => RuleCheck::MaxStaff {
                band: band()?,
                max_staff: count(RuleUnit::Staff, required(None)?)?,
            },
            RuleFamily::Availability => RuleCheck::Availability,
            RuleFamily::Qualification => RuleCheck::Qualification,
        };

        let Some(raw) = self.warn_at else {
            return Ok((check, None));
        };
        // Margin in the unit the predicate measures, the limit it guards and whether the
        // limit is a cap.
        let (margin, limit, cap) = match &check {
            RuleCheck::WeeklyHours { max_hours } | RuleCheck::MonthlyHours { max_hours } => {
                (hours(raw)?, *max_hours, true)
            }
            RuleCheck::MonthlyOvertime {
                max_overtime_hours, ..
            } => (hours(raw)?, *max_overtime_hours, true),
            RuleCheck::RestInterval { min_rest_minutes } => (
                Decimal::from(minutes(raw)?),
                Decimal::from(*min_rest_minutes),
                false,
            ),
            RuleCheck::ConsecutiveDays { max_days } => (
                Decimal::from(count(RuleUnit::Days, raw)?),
                Decimal::from(*max_days),
                true,
            ),
            RuleCheck::MinStaff { min_staff, .. } => (
                Decimal::from(count(RuleUnit::Staff, raw)?),
                Decimal::from(*min_staff),
                false,
            ),
            RuleCheck::MaxStaff { max_staff, .. } => (
                Decimal::from(count(RuleUnit::Staff, raw)?),
                Decimal::from(*max_staff),
                true,
            ),
            RuleCheck::MinorLabor { .. }
            | RuleCheck::BreakTime { .. }
            | RuleCheck::Availability
            | RuleCheck::Qualification => {
                return Err(ConfigurationIssue::WarningNotSupported { family })
            }
        };
        if (cap && margin > limit) || (!cap && margin < limit) {
            return Err(ConfigurationIssue::WarningBeyondLimit {
                warn_at: margin,
                limit,
            });
        }
        Ok((check, Some(margin)))
    }
}

fn whole_number(value: Decimal) -> Result<i64, ConfigurationIssue> {
    if value.fract() != Decimal::ZERO {
        return Err(ConfigurationIssue::NotWholeNumber { value });
    }
    value
        .to_i64()
        .ok_or(ConfigurationIssue::NotWholeNumber { value })
}

/// Worked-hours threshold above which a minimum break applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakTier {
    pub above_hours: Decimal,
    pub min_break_minutes: u32,
}

impl BreakTier {
    /// More than 8 h needs 60 min, more than 6 h needs 45 min. Highest trigger first.
    pub fn statutory() -> Vec<Self> {
        vec![
            Self {
                above_hours: Decimal::from(8),
                min_break_minutes: 60,
            },
            Self {
                above_hours: Decimal::from(6),
                min_break_minutes: 45,
            },
        ]
    }
}

/// Typed parameters for each predicate family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum RuleCheck {
    WeeklyHours {
        max_hours: Decimal,
    },
    MonthlyHours {
        max_hours: Decimal,
    },
    MonthlyOvertime {
        base_hours: Decimal,
        max_overtime_hours: Decimal,
    },
    MinorLabor {
        max_shift_hours: Option<Decimal>,
    },
    RestInterval {
        min_rest_minutes: i64,
    },
    ConsecutiveDays {
        max_days: u32,
    },
    BreakTime {
        tiers: Vec<BreakTier>,
    },
    MinStaff {
        band: TimeBand,
        min_staff: u32,
    },
    MaxStaff {
        band: TimeBand,
        max_staff: u32,
    },
    Availability,
    Qualification,
}

impl RuleCheck {
    pub const fn family(&self) -> RuleFamily {
        match self {
            Self::WeeklyHours { .. } => RuleFamily::WeeklyHours,
            Self::MonthlyHours { .. } => RuleFamily::MonthlyHours,
            Self::MonthlyOvertime { .. } => RuleFamily::MonthlyOvertime,
            Self::MinorLabor { .. } => RuleFamily::MinorLabor,
            Self::RestInterval { .. } => RuleFamily::RestInterval,
            Self::ConsecutiveDays { .. } => RuleFamily::ConsecutiveDays,
            Self::BreakTime { .. } => RuleFamily::BreakTime,
            Self::MinStaff { .. } => RuleFamily::MinStaff,
            Self::MaxStaff { .. } => RuleFamily::MaxStaff,
            Self::Availability => RuleFamily::Availability,
            Self::Qualification => RuleFamily::Qualification,
        }
    }
}

/// A rule ready for evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule {
    pub rule_id: RuleId,
    pub code: String,
    pub name: String,
    pub category: RuleCategory,
    pub severity: Severity,
    pub store_id: Option<StoreId>,
    pub applies_to: BTreeSet<EmploymentType>,
    pub check: RuleCheck,
    /// Warning margin in the unit the check measures: hours, rest minutes, days or staff.
    pub warn_at: Option<Decimal>,
}

impl CompiledRule {
    pub fn family(&self) -> RuleFamily {
        self.check.family()
    }

    pub fn covers_employment(&self, employment: EmploymentType) -> bool {
        self.applies_to.is_empty() || self.applies_to.contains(&employment)
    }

    pub fn covers_store(&self, store_id: Option<StoreId>) -> bool {
        match self.store_id {
            Some(scope) => store_id == Some(scope),
            None => true,
        }
    }

    /// Severity of a near-limit finding; never above the rule's own.
    pub fn warning_severity(&self) -> Severity {
        self.severity.min(Severity::Warning)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ConfigurationIssue {
    #[error("unknown rule code '{code}'")]
    UnknownCode { code: String },
    #[error("unknown rule category '{category}'")]
    UnknownCategory { category: String },
    #[error("threshold is required but missing")]
    MissingThreshold,
    #[error("threshold {value} is negative")]
    NegativeThreshold { value: Decimal },
    #[error("threshold {value} must be a whole number")]
    NotWholeNumber { value: Decimal },
    #[error("unit '{unit}' is not supported for {family} rules")]
    UnsupportedUnit { unit: String, family: RuleFamily },
    #[error("evaluation period '{period}' is not supported")]
    UnsupportedPeriod { period: String },
    #[error("staffing rules need a time band")]
    MissingBand,
    #[error("store constraints need a store")]
    MissingStore,
    #[error("{family} rules do not take a warning margin")]
    WarningNotSupported { family: RuleFamily },
    #[error("warning margin {warn_at} lies past the limit {limit}")]
    WarningBeyondLimit { warn_at: Decimal, limit: Decimal },
}

/// A rule that could not be used. Listed in the report next to, never among, violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationError {
    pub rule_id: RuleId,
    pub rule_code: String,
    pub category: RuleCategory,
    #[serde(flatten)]
    pub issue: ConfigurationIssue,
    pub explanation: String,
}

impl ConfigurationError {
    fn new(rule: &ComplianceRule, issue: ConfigurationIssue) -> Self {
        Self {
            rule_id: rule.rule_id,
            rule_code: rule.code.clone(),
            category: rule.category(),
            explanation: format!("rule {} ({}): {issue}", rule.code, rule.name),
            issue,
        }
    }
}
