use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::definition::{CompiledRule, ConfigurationError, RuleCategory, RuleFamily, Severity};
use crate::planning::domain::{RuleId, ShiftId, StaffId, StoreId};

/// One rule breach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub rule_id: RuleId,
    pub rule_code: String,
    pub rule_name: String,
    pub category: RuleCategory,
    pub family: RuleFamily,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<StaffId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<StoreId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub shift_ids: Vec<ShiftId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<Decimal>,
    pub explanation: String,
}

impl Violation {
    pub(crate) fn new(rule: &CompiledRule, explanation: String) -> Self {
        Self {
            rule_id: rule.rule_id,
            rule_code: rule.code.clone(),
            rule_name: rule.name.clone(),
            category: rule.category,
            family: rule.family(),
            severity: rule.severity,
            staff_id: None,
            store_id: None,
            date: None,
            shift_ids: Vec::new(),
            observed: None,
            limit: None,
            explanation,
        }
    }

    pub(crate) fn staff(mut self, staff_id: StaffId) -> Self {
        self.staff_id = Some(staff_id);
        self
    }

    pub(crate) fn store(mut self, store_id: Option<StoreId>) -> Self {
        self.store_id = store_id;
        self
    }

    pub(crate) fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub(crate) fn shifts(mut self, mut shift_ids: Vec<ShiftId>) -> Self {
        shift_ids.sort();
        shift_ids.dedup();
        self.shift_ids = shift_ids;
        self
    }

    pub(crate) fn measured(mut self, observed: Decimal, limit: Decimal) -> Self {
        self.observed = Some(observed);
        self.limit = Some(limit);
        self
    }

    pub(crate) fn graded(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity.blocks_approval()
    }

    fn sort_key(
        &self,
    ) -> (
        RuleCategory,
        Option<StaffId>,
        Option<NaiveDate>,
        &str,
        &[ShiftId],
        Option<StoreId>,
        RuleId,
        &str,
    ) {
        (
            self.category,
            self.staff_id,
            self.date,
            self.rule_code.as_str(),
            self.shift_ids.as_slice(),
            self.store_id,
            self.rule_id,
            self.explanation.as_str(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataGapKind {
    UnknownStaff,
    MissingBirthDate,
    InvalidShift,
}

/// A snapshot defect found while evaluating. Recorded, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DataGap {
    pub kind: DataGapKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<StaffId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift_id: Option<ShiftId>,
    pub explanation: String,
}

/// Result of one evaluation pass. Always held in its canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViolationReport {
    pub violations: Vec<Violation>,
    pub configuration_errors: Vec<ConfigurationError>,
    pub data_gaps: Vec<DataGap>,
}

impl ViolationReport {
    pub fn new(
        mut violations: Vec<Violation>,
        mut configuration_errors: Vec<ConfigurationError>,
        mut data_gaps: Vec<DataGap>,
    ) -> Self {
        violations.sort_by(|left, right| left.sort_key().cmp(&right.sort_key()));
        violations.dedup();
        configuration_errors.sort_by(|left, right| {
            (left.category, &left.rule_code, left.rule_id).cmp(&(
                right.category,
                &right.rule_code,
                right.rule_id,
            ))
        });
        data_gaps.sort();
        data_gaps.dedup();

        Self {
            violations,
            configuration_errors,
            data_gaps,
        }
    }

    pub fn has_blocking(&self) -> bool {
        self.violations.iter().any(Violation::is_blocking)
    }

    pub fn blocking(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|violation| violation.is_blocking())
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.configuration_errors.is_empty()
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            configuration_errors: self.configuration_errors.len(),
            data_gaps: self.data_gaps.len(),
            ..ReportSummary::default()
        };
        for violation in &self.violations {
            match violation.severity {
                Severity::Blocking => summary.blocking += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Info => summary.info += 1,
            }
            *summary.by_family.entry(violation.family).or_default() += 1;
        }
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub blocking: usize,
    pub warning: usize,
    pub info: usize,
    pub configuration_errors: usize,
    pub data_gaps: usize,
    pub by_family: BTreeMap<RuleFamily, usize>,
}

impl ReportSummary {
    pub fn violations(&self) -> usize {
        self.blocking + self.warning + self.info
    }
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} violation(s): {} blocking, {} warning, {} info; {} configuration error(s); {} data gap(s)",
            self.violations(),
            self.blocking,
            self.warning,
            self.info,
            self.configuration_errors,
            self.data_gaps
        )
    }
}
