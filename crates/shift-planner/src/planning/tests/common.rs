use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::EngineConfig;
use crate::planning::domain::{
    Compensation, EmploymentType, PlanId, PlanPeriod, RequiredQualifications, RuleId, Shift,
    ShiftId, Staff, StaffDirectory, StaffId, StoreId, TenantId,
};
use crate::planning::rules::{
    BreachAction, ComplianceRule, PenaltyLevel, RuleDefinition, Severity, TimeBand,
};
use crate::planning::snapshot::PlanSnapshot;
use crate::planning::support::SupportShiftReconciler;
use crate::planning::time::{ClockTime, ShiftCategory};

pub(super) const TENANT: TenantId = TenantId(1);
pub(super) const HOME_STORE: StoreId = StoreId(10);
pub(super) const OTHER_STORE: StoreId = StoreId(11);
pub(super) const PLAN: PlanId = PlanId(1);

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn clock(raw: &str) -> ClockTime {
    raw.parse().expect("valid clock time")
}

pub(super) fn period() -> PlanPeriod {
    PlanPeriod::new(2025, 6).expect("valid period")
}

pub(super) fn engine_config() -> EngineConfig {
    EngineConfig::default()
}

pub(super) fn staff(id: u32, employment_type: EmploymentType) -> Staff {
    let compensation = if employment_type.is_salaried() {
        Compensation::Monthly {
            salary: dec!(346000),
        }
    } else {
        Compensation::Hourly { rate: dec!(1200) }
    };

    Staff {
        id: StaffId(id),
        tenant_id: TENANT,
        name: format!("Staff {id}"),
        home_store_id: Some(HOME_STORE),
        employment_type,
        compensation,
        birth_date: Some(date(1990, 4, 1)),
        hire_date: date(2020, 1, 1),
        termination_date: None,
        active: true,
        available_categories: BTreeSet::new(),
        credentials: Vec::new(),
    }
}

pub(super) fn minor_staff(id: u32) -> Staff {
    Staff {
        birth_date: Some(date(2010, 1, 1)),
        ..staff(id, EmploymentType::PartTime)
    }
}

pub(super) fn available_for(mut staff: Staff, categories: &[ShiftCategory]) -> Staff {
    staff.available_categories = categories.iter().copied().collect();
    staff
}

pub(super) fn shift(
    id: u64,
    staff_id: u32,
    on: NaiveDate,
    start: &str,
    end: &str,
    break_minutes: u32,
) -> Shift {
    Shift {
        id: ShiftId(id),
        plan_id: PLAN,
        staff_id: StaffId(staff_id),
        store_id: Some(HOME_STORE),
        date: on,
        start: clock(start),
        end: clock(end),
        break_minutes,
        requirements: RequiredQualifications::default(),
    }
}

pub(super) fn at_store(mut shift: Shift, store_id: StoreId) -> Shift {
    shift.store_id = Some(store_id);
    shift
}

pub(super) fn directory(staff: Vec<Staff>) -> StaffDirectory {
    StaffDirectory::from(staff)
}

pub(super) fn snapshot(shifts: Vec<Shift>, directory: StaffDirectory) -> PlanSnapshot {
    PlanSnapshot::assemble(
        TENANT,
        HOME_STORE,
        period(),
        shifts,
        directory,
        &SupportShiftReconciler::from_config(&engine_config()),
    )
    .expect("snapshot assembles")
}

fn rule(id: u32, code: &str, definition: RuleDefinition) -> ComplianceRule {
    ComplianceRule {
        rule_id: RuleId(id),
        tenant_id: TENANT,
        store_id: None,
        code: code.to_string(),
        name: format!("{code} rule"),
        active: true,
        applies_to: BTreeSet::new(),
        band: None,
        applies_above_hours: None,
        warn_at: None,
        definition,
    }
}

pub(super) fn validation_rule(id: u32, code: &str, severity: Severity) -> ComplianceRule {
    rule(
        id,
        code,
        RuleDefinition::Validation {
            severity,
            threshold: None,
            unit: None,
        },
    )
}

pub(super) fn labor_law_rule(
    id: u32,
    code: &str,
    category: &str,
    value: Option<Decimal>,
    unit: &str,
    penalty_level: PenaltyLevel,
) -> ComplianceRule {
    rule(
        id,
        code,
        RuleDefinition::LaborLaw {
            category: category.to_string(),
            value,
            unit: unit.to_string(),
            penalty_level,
        },
    )
}

pub(super) fn management_rule(
    id: u32,
    code: &str,
    category: &str,
    threshold: Option<Decimal>,
    unit: &str,
    period: &str,
    action: BreachAction,
) -> ComplianceRule {
    rule(
        id,
        code,
        RuleDefinition::LaborManagement {
            category: category.to_string(),
            threshold,
            unit: unit.to_string(),
            period: period.to_string(),
            action,
        },
    )
}

pub(super) fn store_rule(
    id: u32,
    constraint_type: &str,
    value: Decimal,
    band: Option<(&str, &str)>,
    severity: Severity,
) -> ComplianceRule {
    ComplianceRule {
        store_id: Some(HOME_STORE),
        band: band.map(|(start, end)| TimeBand {
            start: clock(start),
            end: clock(end),
        }),
        ..rule(
            id,
            &format!("STORE_{id:03}"),
            RuleDefinition::StoreConstraint {
                constraint_type: constraint_type.to_string(),
                value: Some(value),
                unit: Some("staff".to_string()),
                severity,
            },
        )
    }
}
