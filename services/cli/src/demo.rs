use crate::evaluate::{render_report, render_snapshot};
use crate::infra::parse_period;
use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::json;
use shift_planner::config::EngineConfig;
use shift_planner::error::AppError;
use shift_planner::planning::{
    ApprovalInputs, Compensation, ComplianceRule, EmploymentType, InMemoryPlanRepository,
    LifecycleError, PlanId, PlanLifecycle, PlanPeriod, PlanType, Shift, ShiftId, Staff,
    StaffDirectory, StaffId, StoreId, TenantId, ViolationReport,
};
use std::collections::BTreeSet;
use std::sync::Arc;

const TENANT: TenantId = TenantId(1);

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Plan month (YYYY-MM). Defaults to 2025-06.
    #[arg(long, value_parser = parse_period)]
    pub(crate) period: Option<PlanPeriod>,
    /// Home store of the demo roster. Defaults to 10.
    #[arg(long)]
    pub(crate) store: Option<u32>,
    /// Print each report as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_demo(args: DemoArgs, config: &EngineConfig) -> Result<(), AppError> {
    let DemoArgs {
        period,
        store,
        json: as_json,
    } = args;
    let period = period.unwrap_or(PlanPeriod {
        year: 2025,
        month: 6,
    });
    let store_id = StoreId(store.unwrap_or(10));
    let day = |day: u32| NaiveDate::from_ymd_opt(period.year, period.month, day);

    let directory = demo_roster(store_id, period);
    let rules = demo_rules()?;
    let lifecycle = PlanLifecycle::new(
        Arc::new(InMemoryPlanRepository::default()),
        config.clone(),
    );

    println!("Shift plan demo for store {store_id}, {period}");
    let plan = lifecycle.create(TENANT, store_id, period, PlanType::First)?;
    println!("Created {}", plan.summary());

    let drafts = [
        demo_shift(1, 1, store_id, day(14), "09:00", "18:00", 60),
        demo_shift(2, 2, store_id, day(14), "22:00", "06:00", 60),
        demo_shift(3, 1, StoreId(store_id.0 + 1), day(15), "10:00", "15:00", 0),
    ];
    for shift in drafts.into_iter().flatten() {
        lifecycle.add_or_update_shift(plan.id, shift)?;
    }

    let inputs = ApprovalInputs {
        directory: &directory,
        rules: &rules,
        coverage_score: None,
    };

    println!("\nRequesting approval");
    match lifecycle.request_approval(plan.id, inputs) {
        Err(LifecycleError::ComplianceBlocked(report)) => {
            println!("Approval blocked");
            print_report(&report, as_json)?;
        }
        Err(err) => return Err(err.into()),
        Ok(approval) => {
            println!("Approved unexpectedly: {}", approval.plan.summary());
            return Ok(());
        }
    }

    println!("\nRemoving the minor's night shift and retrying");
    lifecycle.remove_shift(plan.id, ShiftId(2))?;
    let approval = lifecycle.request_approval(plan.id, inputs)?;
    println!("Approved {}", approval.plan.summary());
    let snapshot = lifecycle.snapshot(&approval.plan, &directory)?;
    render_snapshot(&snapshot);
    print_report(&approval.report, as_json)?;

    println!("\nOpening a second-round revision");
    let revision = lifecycle.supersede(approval.plan.id, PlanType::Second)?;
    println!("Created {}", revision.summary());
    if let Some(extra) = demo_shift(4, 2, store_id, day(21), "10:00", "16:00", 45) {
        let mutation = lifecycle.add_or_update_shift(revision.id, extra)?;
        println!(
            "Added a day shift for the minor; re-approval required: {}",
            mutation.requires_reapproval
        );
    }
    let approval = lifecycle.request_approval(revision.id, inputs)?;
    println!("Approved {}", approval.plan.summary());

    if let Some(current) = lifecycle.authoritative_plan(TENANT, store_id, period)? {
        println!("Authoritative plan: {}", current.summary());
    }
    Ok(())
}

fn print_report(
    report: &ViolationReport,
    as_json: bool,
) -> Result<(), AppError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        render_report(report);
    }
    Ok(())
}

fn demo_roster(store_id: StoreId, period: PlanPeriod) -> StaffDirectory {
    let member = |id: u32, name: &str, birth_year: i32, rate: i64| Staff {
        id: StaffId(id),
        tenant_id: TENANT,
        name: name.to_string(),
        home_store_id: Some(store_id),
        employment_type: EmploymentType::PartTime,
        compensation: Compensation::Hourly {
            rate: Decimal::from(rate),
        },
        birth_date: NaiveDate::from_ymd_opt(birth_year, 1, 1),
        hire_date: NaiveDate::from_ymd_opt(period.year - 1, 4, 1).unwrap_or(NaiveDate::MIN),
        termination_date: None,
        active: true,
        available_categories: BTreeSet::new(),
        credentials: Vec::new(),
    };
    // Born on January 1st, so both ages hold for every month of the plan year.
    vec![
        member(1, "Aiko", period.year - 33, 1100),
        member(2, "Ren", period.year - 16, 1000),
    ]
    .into()
}

fn demo_rules() -> Result<Vec<ComplianceRule>, AppError> {
    let rules = serde_json::from_value(json!([
        {
            "rule_id": 1,
            "tenant_id": TENANT,
            "code": "VAL001",
            "name": "No night work for minors",
            "definition": { "kind": "validation", "severity": "blocking" }
        },
        {
            "rule_id": 2,
            "tenant_id": TENANT,
            "code": "LAW_002",
            "name": "Statutory weekly hours",
            "definition": {
                "kind": "labor_law",
                "category": "weekly_hours",
                "value": "40",
                "unit": "hours",
                "penalty_level": "high"
            }
        },
        {
            "rule_id": 3,
            "tenant_id": TENANT,
            "code": "VAL004",
            "name": "Rest between shifts",
            "definition": { "kind": "validation", "severity": "warning" }
        },
        {
            "rule_id": 4,
            "tenant_id": TENANT,
            "code": "LM004",
            "name": "Consecutive working days",
            "definition": {
                "kind": "labor_management",
                "category": "consecutive_days",
                "threshold": "6",
                "unit": "days",
                "period": "week",
                "action": "warn"
            }
        }
    ]))?;
    Ok(rules)
}

fn demo_shift(
    id: u64,
    staff_id: u32,
    store_id: StoreId,
    date: Option<NaiveDate>,
    start: &str,
    end: &str,
    break_minutes: u32,
) -> Option<Shift> {
    Some(Shift {
        id: ShiftId(id),
        plan_id: PlanId(0),
        staff_id: StaffId(staff_id),
        store_id: Some(store_id),
        date: date?,
        start: start.parse().ok()?,
        end: end.parse().ok()?,
        break_minutes,
        requirements: Default::default(),
    })
}
