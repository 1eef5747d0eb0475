use crate::infra::{load_snapshot_file, parse_clock};
use clap::Args;
use shift_planner::config::EngineConfig;
use shift_planner::error::AppError;
use shift_planner::planning::time::{to_hours, worked_minutes};
use shift_planner::planning::{
    ClockTime, PlanSnapshot, RuleEngine, ShiftCategory, SupportShiftReconciler, ViolationReport,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct HoursArgs {
    /// Shift start (HH:MM)
    #[arg(long, value_parser = parse_clock)]
    pub(crate) start: ClockTime,
    /// Shift end (HH:MM); an end at or before the start runs past midnight
    #[arg(long, value_parser = parse_clock)]
    pub(crate) end: ClockTime,
    /// Unpaid break in minutes
    #[arg(long = "break", default_value_t = 0)]
    pub(crate) break_minutes: u32,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// JSON file holding the tenant, store, period, staff, shifts and rules
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Print the full report as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_hours(args: HoursArgs, config: &EngineConfig) -> Result<(), AppError> {
    let HoursArgs {
        start,
        end,
        break_minutes,
    } = args;

    let minutes = worked_minutes(start, end, break_minutes)?;
    let category = ShiftCategory::of(start, end, &config.night);
    println!("Shift {start}-{end} with a {break_minutes} minute break");
    println!("  worked: {} h ({minutes} min)", to_hours(minutes));
    println!("  night shift: {}", config.night.matches(start, end));
    println!("  category: {}", category.label());
    Ok(())
}

pub(crate) fn run_evaluate(args: EvaluateArgs, config: &EngineConfig) -> Result<(), AppError> {
    let file = load_snapshot_file(&args.snapshot)?;
    let reconciler = SupportShiftReconciler::from_config(config);
    let snapshot = PlanSnapshot::assemble(
        file.tenant_id,
        file.store_id,
        file.period,
        file.shifts,
        file.staff,
        &reconciler,
    )?;

    let report = RuleEngine::new(config.clone()).evaluate(&snapshot, &file.rules);
    info!(
        path = %args.snapshot.display(),
        summary = %report.summary(),
        "snapshot evaluated"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_snapshot(&snapshot);
        render_report(&report);
    }
    Ok(())
}

pub(crate) fn render_snapshot(snapshot: &PlanSnapshot) {
    let aggregate = &snapshot.aggregate;
    println!(
        "Store {} for {}: {} shift(s), {} h, cost {}",
        snapshot.store_id,
        snapshot.period,
        snapshot.shifts.len(),
        aggregate.total_hours(),
        aggregate.total_cost()
    );
    for (store_id, totals) in &aggregate.per_store {
        println!(
            "  store {store_id}: {} h ({} h support), cost {}",
            totals.hours, totals.support_hours, totals.cost
        );
    }
    if aggregate.unassigned.shift_count > 0 {
        println!(
            "  unassigned: {} h over {} shift(s)",
            aggregate.unassigned.hours, aggregate.unassigned.shift_count
        );
    }
}

pub(crate) fn render_report(report: &ViolationReport) {
    println!("Compliance: {}", report.summary());
    for violation in &report.violations {
        println!(
            "  [{}] {} {}: {}",
            violation.severity.label(),
            violation.rule_code,
            violation.family,
            violation.explanation
        );
    }
    for error in &report.configuration_errors {
        println!("  [config] {}: {}", error.rule_code, error.explanation);
    }
    for gap in &report.data_gaps {
        println!("  [data] {}", gap.explanation);
    }
}
