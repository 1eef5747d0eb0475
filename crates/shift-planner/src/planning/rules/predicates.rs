//! One predicate per rule family, each run over a prepared view of the snapshot.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use rust_decimal::{Decimal, RoundingStrategy};

use super::definition::{BreakTier, CompiledRule, RuleCheck, Severity, TimeBand};
use super::report::{DataGap, DataGapKind, Violation};
use crate::planning::domain::{CredentialKind, Shift, ShiftId, Staff, StaffId, StoreId};
use crate::planning::eligibility::{EligibilityError, EligibilityEvaluator};
use crate::planning::snapshot::PlanSnapshot;
use crate::planning::time::ShiftWindow;

/// A valid shift with everything the predicates keep asking for.
pub(crate) struct ShiftFacts<'a> {
    pub shift: &'a Shift,
    pub staff: Option<&'a Staff>,
    pub hours: Decimal,
    pub window: ShiftWindow,
}

pub(crate) struct EvaluationContext<'a> {
    eligibility: &'a EligibilityEvaluator,
    /// Sorted by staff, then start instant, then shift id.
    facts: Vec<ShiftFacts<'a>>,
}

#[derive(Default)]
pub(crate) struct Findings {
    pub violations: Vec<Violation>,
    pub gaps: Vec<DataGap>,
}

impl<'a> EvaluationContext<'a> {
    pub fn prepare(
        snapshot: &'a PlanSnapshot,
        eligibility: &'a EligibilityEvaluator,
        findings: &mut Findings,
    ) -> Self {
        let mut facts = Vec::with_capacity(snapshot.shifts.len());
        for shift in &snapshot.shifts {
            let hours = match shift.total_hours() {
                Ok(hours) => hours,
                Err(err) => {
                    findings.gaps.push(DataGap {
                        kind: DataGapKind::InvalidShift,
                        staff_id: Some(shift.staff_id),
                        shift_id: Some(shift.id),
                        explanation: format!("shift {} skipped: {err}", shift.id),
                    });
                    continue;
                }
            };
            let staff = snapshot.directory.get(shift.staff_id);
            if staff.is_none() {
                findings.gaps.push(DataGap {
                    kind: DataGapKind::UnknownStaff,
                    staff_id: Some(shift.staff_id),
                    shift_id: Some(shift.id),
                    explanation: format!(
                        "shift {} references staff {} missing from the directory",
                        shift.id, shift.staff_id
                    ),
                });
            }
            facts.push(ShiftFacts {
                shift,
                staff,
                hours,
                window: shift.window(),
            });
        }
        facts.sort_by_key(|fact| (fact.shift.staff_id, fact.window.starts_at, fact.shift.id));

        Self { eligibility, facts }
    }

    /// Shifts a rule applies to: worked at a covered store by a covered employment type.
    /// Unknown staff only pass rules that are not restricted by employment type.
    fn in_scope<'s>(
        &'s self,
        rule: &'s CompiledRule,
    ) -> impl Iterator<Item = &'s ShiftFacts<'a>> + 's {
        self.facts.iter().filter(move |fact| {
            rule.covers_store(fact.shift.store_id)
                && match fact.staff {
                    Some(staff) => rule.covers_employment(staff.employment_type),
                    None => rule.applies_to.is_empty(),
                }
        })
    }
}

pub(crate) fn run(rule: &CompiledRule, context: &EvaluationContext<'_>, findings: &mut Findings) {
    match &rule.check {
        RuleCheck::WeeklyHours { max_hours } => weekly_hours(rule, context, *max_hours, findings),
        RuleCheck::MonthlyHours { max_hours } => {
            monthly_hours(rule, context, Decimal::ZERO, *max_hours, findings)
        }
        RuleCheck::MonthlyOvertime {
            base_hours,
            max_overtime_hours,
        } => monthly_hours(rule, context, *base_hours, *max_overtime_hours, findings),
        RuleCheck::MinorLabor { max_shift_hours } => {
            minor_labor(rule, context, *max_shift_hours, findings)
        }
        RuleCheck::RestInterval { min_rest_minutes } => {
            rest_interval(rule, context, *min_rest_minutes, findings)
        }
        RuleCheck::ConsecutiveDays { max_days } => {
            consecutive_days(rule, context, *max_days, findings)
        }
        RuleCheck::BreakTime { tiers } => break_time(rule, context, tiers, findings),
        RuleCheck::MinStaff { band, min_staff } => staffing(
            rule,
            context,
            band,
            StaffingBound::Minimum(*min_staff),
            findings,
        ),
        RuleCheck::MaxStaff { band, max_staff } => staffing(
            rule,
            context,
            band,
            StaffingBound::Maximum(*max_staff),
            findings,
        ),
        RuleCheck::Availability => availability(rule, context, findings),
        RuleCheck::Qualification => qualification(rule, context, findings),
    }
}

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn minutes_as_hours(minutes: i64) -> Decimal {
    round(Decimal::from(minutes) / Decimal::from(60))
}

/// Which threshold of a rule an observation crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Crossing {
    Limit,
    /// Within the limit but past the warning margin.
    Margin(Decimal),
}

impl Crossing {
    /// For caps.
    fn above(observed: Decimal, limit: Decimal, margin: Option<Decimal>) -> Option<Self> {
        if observed > limit {
            return Some(Self::Limit);
        }
        margin.filter(|margin| observed > *margin).map(Self::Margin)
    }

    /// For minimums.
    fn below(observed: Decimal, limit: Decimal, margin: Option<Decimal>) -> Option<Self> {
        if observed < limit {
            return Some(Self::Limit);
        }
        margin.filter(|margin| observed < *margin).map(Self::Margin)
    }

    fn threshold(self, limit: Decimal) -> Decimal {
        match self {
            Self::Limit => limit,
            Self::Margin(margin) => margin,
        }
    }

    fn severity(self, rule: &CompiledRule) -> Severity {
        match self {
            Self::Limit => rule.severity,
            Self::Margin(_) => rule.warning_severity(),
        }
    }

    /// "above the 40 h limit" or "above the 36 h warning margin of the 40 h limit".
    fn describe(self, direction: &str, limit: Decimal, unit: &str, noun: &str) -> String {
        match self {
            Self::Limit => format!("{direction} the {limit} {unit} {noun}"),
            Self::Margin(margin) => {
                format!("{direction} the {margin} {unit} warning margin of the {limit} {unit} {noun}")
            }
        }
    }
}

fn weekly_hours(
    rule: &CompiledRule,
    context: &EvaluationContext<'_>,
    max_hours: Decimal,
    findings: &mut Findings,
) {
    let mut weeks: BTreeMap<(StaffId, i32, u32), (Decimal, Vec<ShiftId>)> = BTreeMap::new();
    for fact in context.in_scope(rule) {
        let week = fact.shift.date.iso_week();
        let entry = weeks
            .entry((fact.shift.staff_id, week.year(), week.week()))
            .or_default();
        entry.0 += fact.hours;
        entry.1.push(fact.shift.id);
    }

    for ((staff_id, year, week), (hours, shift_ids)) in weeks {
        let Some(crossing) = Crossing::above(hours, max_hours, rule.warn_at) else {
            continue;
        };
        let mut violation = Violation::new(
            rule,
            format!(
                "staff {staff_id} works {hours} h in ISO week {year}-W{week:02}, {}",
                crossing.describe("above", max_hours, "h", "limit")
            ),
        )
        .staff(staff_id)
        .shifts(shift_ids)
        .measured(hours, crossing.threshold(max_hours))
        .graded(crossing.severity(rule));
        if let Some(monday) = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon) {
            violation = violation.on(monday);
        }
        findings.violations.push(violation);
    }
}

/// Monthly totals per staff member. With a non-zero `base_hours` the limit applies to the
/// hours above the base (overtime); otherwise to the plain total.
fn monthly_hours(
    rule: &CompiledRule,
    context: &EvaluationContext<'_>,
    base_hours: Decimal,
    limit: Decimal,
    findings: &mut Findings,
) {
    let mut months: BTreeMap<(StaffId, i32, u32), (Decimal, Vec<ShiftId>)> = BTreeMap::new();
    for fact in context.in_scope(rule) {
        let date = fact.shift.date;
        let entry = months
            .entry((fact.shift.staff_id, date.year(), date.month()))
            .or_default();
        entry.0 += fact.hours;
        entry.1.push(fact.shift.id);
    }

    for ((staff_id, year, month), (hours, shift_ids)) in months {
        let observed = hours - base_hours;
        let Some(crossing) = Crossing::above(observed, limit, rule.warn_at) else {
            continue;
        };
        let explanation = if base_hours.is_zero() {
            format!(
                "staff {staff_id} works {hours} h in {year}-{month:02}, {}",
                crossing.describe("above", limit, "h", "limit")
            )
        } else {
            format!(
                "staff {staff_id} works {observed} h of overtime in {year}-{month:02} ({hours} h against a {base_hours} h base), {}",
                crossing.describe("above", limit, "h", "cap")
            )
        };
        let mut violation = Violation::new(rule, explanation)
            .staff(staff_id)
            .shifts(shift_ids)
            .measured(observed, crossing.threshold(limit))
            .graded(crossing.severity(rule));
        if let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) {
            violation = violation.on(first);
        }
        findings.violations.push(violation);
    }
}

fn minor_labor(
    rule: &CompiledRule,
    context: &EvaluationContext<'_>,
    max_shift_hours: Option<Decimal>,
    findings: &mut Findings,
) {
    let night = context.eligibility.night_window();
    for fact in context.in_scope(rule) {
        let Some(staff) = fact.staff else {
            continue;
        };
        let minor = match context.eligibility.is_minor(staff, fact.shift.date) {
            Ok(minor) => minor,
            Err(err) => {
                findings.gaps.push(age_gap(fact.shift, &err));
                continue;
            }
        };
        if !minor {
            continue;
        }

        let shift = fact.shift;
        if shift.is_night(night) {
            findings.violations.push(
                Violation::new(
                    rule,
                    format!(
                        "minor staff {} ({}) is assigned night shift {} {}-{}",
                        staff.id, staff.name, shift.date, shift.start, shift.end
                    ),
                )
                .staff(staff.id)
                .store(shift.store_id)
                .on(shift.date)
                .shifts(vec![shift.id]),
            );
        }
        if let Some(cap) = max_shift_hours {
            if fact.hours > cap {
                findings.violations.push(
                    Violation::new(
                        rule,
                        format!(
                            "minor staff {} works {} h on {}, above the {cap} h cap for minors",
                            staff.id, fact.hours, shift.date
                        ),
                    )
                    .staff(staff.id)
                    .store(shift.store_id)
                    .on(shift.date)
                    .shifts(vec![shift.id])
                    .measured(fact.hours, cap),
                );
            }
        }
    }
}

fn age_gap(shift: &Shift, err: &EligibilityError) -> DataGap {
    DataGap {
        kind: DataGapKind::MissingBirthDate,
        staff_id: Some(shift.staff_id),
        shift_id: Some(shift.id),
        explanation: format!("age check for shift {} skipped: {err}", shift.id),
    }
}

/// Rest before each shift, measured from the latest finish among the same staff member's
/// shifts on earlier days.
fn rest_interval(
    rule: &CompiledRule,
    context: &EvaluationContext<'_>,
    min_rest_minutes: i64,
    findings: &mut Findings,
) {
    let mut by_staff: BTreeMap<StaffId, Vec<&ShiftFacts<'_>>> = BTreeMap::new();
    for fact in context.in_scope(rule) {
        by_staff.entry(fact.shift.staff_id).or_default().push(fact);
    }
    let limit = minutes_as_hours(min_rest_minutes);
    let margin = rule
        .warn_at
        .map(|minutes| round(minutes / Decimal::from(60)));

    for (staff_id, facts) in by_staff {
        for fact in &facts {
            let latest = facts
                .iter()
                .filter(|prior| prior.shift.date < fact.shift.date)
                .max_by_key(|prior| (prior.window.ends_at, prior.shift.id));
            let Some(prior) = latest else {
                continue;
            };

            let observed = minutes_as_hours(prior.window.rest_until(&fact.window));
            let Some(crossing) = Crossing::below(observed, limit, margin) else {
                continue;
            };
            findings.violations.push(
                Violation::new(
                    rule,
                    format!(
                        "staff {staff_id} rests {observed} h between {} {} and {} {}, {}",
                        prior.shift.date,
                        prior.shift.end,
                        fact.shift.date,
                        fact.shift.start,
                        crossing.describe("below", limit, "h", "minimum")
                    ),
                )
                .staff(staff_id)
                .store(fact.shift.store_id)
                .on(fact.shift.date)
                .shifts(vec![prior.shift.id, fact.shift.id])
                .measured(observed, crossing.threshold(limit))
                .graded(crossing.severity(rule)),
            );
        }
    }
}

fn consecutive_days(
    rule: &CompiledRule,
    context: &EvaluationContext<'_>,
    max_days: u32,
    findings: &mut Findings,
) {
    let mut worked: BTreeMap<StaffId, BTreeMap<NaiveDate, Vec<ShiftId>>> = BTreeMap::new();
    for fact in context.in_scope(rule) {
        worked
            .entry(fact.shift.staff_id)
            .or_default()
            .entry(fact.shift.date)
            .or_default()
            .push(fact.shift.id);
    }

    for (staff_id, days) in worked {
        let mut runs: Vec<Vec<(NaiveDate, Vec<ShiftId>)>> = Vec::new();
        for (date, shift_ids) in days {
            let continues = runs
                .last()
                .and_then(|run| run.last())
                .is_some_and(|(last, _)| *last + Duration::days(1) == date);
            match runs.last_mut() {
                Some(run) if continues => run.push((date, shift_ids)),
                _ => runs.push(vec![(date, shift_ids)]),
            }
        }

        let limit = Decimal::from(max_days);
        for run in runs {
            let length = run.len();
            let Some(crossing) = Crossing::above(Decimal::from(length), limit, rule.warn_at)
            else {
                continue;
            };
            let Some(((first, _), (last, _))) = run.first().zip(run.last()) else {
                continue;
            };
            let (first, last) = (*first, *last);
            let shift_ids = run.into_iter().flat_map(|(_, ids)| ids).collect();
            findings.violations.push(
                Violation::new(
                    rule,
                    format!(
                        "staff {staff_id} works {length} consecutive days from {first} to {last}, {}",
                        crossing.describe("above", limit, "day", "limit")
                    ),
                )
                .staff(staff_id)
                .on(first)
                .shifts(shift_ids)
                .measured(Decimal::from(length), crossing.threshold(limit))
                .graded(crossing.severity(rule)),
            );
        }
    }
}

fn break_time(
    rule: &CompiledRule,
    context: &EvaluationContext<'_>,
    tiers: &[BreakTier],
    findings: &mut Findings,
) {
    let mut tiers = tiers.to_vec();
    tiers.sort_by(|left, right| right.above_hours.cmp(&left.above_hours));

    for fact in context.in_scope(rule) {
        let Some(tier) = tiers.iter().find(|tier| fact.hours > tier.above_hours) else {
            continue;
        };
        let shift = fact.shift;
        if shift.break_minutes >= tier.min_break_minutes {
            continue;
        }
        findings.violations.push(
            Violation::new(
                rule,
                format!(
                    "shift {} on {} works {} h with a {} min break; more than {} h needs {} min",
                    shift.id,
                    shift.date,
                    fact.hours,
                    shift.break_minutes,
                    tier.above_hours,
                    tier.min_break_minutes
                ),
            )
            .staff(shift.staff_id)
            .store(shift.store_id)
            .on(shift.date)
            .shifts(vec![shift.id])
            .measured(
                Decimal::from(shift.break_minutes),
                Decimal::from(tier.min_break_minutes),
            ),
        );
    }
}

#[derive(Debug, Clone, Copy)]
enum StaffingBound {
    Minimum(u32),
    Maximum(u32),
}

impl StaffingBound {
    fn crossed_by(self, heads: u32, margin: Option<Decimal>) -> Option<Crossing> {
        let heads = Decimal::from(heads);
        match self {
            Self::Minimum(min) => Crossing::below(heads, Decimal::from(min), margin),
            Self::Maximum(max) => Crossing::above(heads, Decimal::from(max), margin),
        }
    }

    fn limit(self) -> u32 {
        match self {
            Self::Minimum(limit) | Self::Maximum(limit) => limit,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Minimum(_) => "minimum",
            Self::Maximum(_) => "maximum",
        }
    }
}

/// Head counts per store, sampled at the start of each band segment and checked only on
/// dates the store has shifts. Adjacent segments crossing the same threshold collapse into
/// one violation.
fn staffing(
    rule: &CompiledRule,
    context: &EvaluationContext<'_>,
    band: &TimeBand,
    bound: StaffingBound,
    findings: &mut Findings,
) {
    let mut by_store: BTreeMap<StoreId, Vec<&ShiftFacts<'_>>> = BTreeMap::new();
    for fact in context.facts.iter() {
        if let Some(store_id) = fact.shift.store_id {
            if rule.covers_store(Some(store_id)) {
                by_store.entry(store_id).or_default().push(fact);
            }
        }
    }
    let segments = band.segments();

    for (store_id, facts) in by_store {
        let dates: BTreeSet<NaiveDate> = facts.iter().map(|fact| fact.shift.date).collect();
        for date in dates {
            let midnight = date.and_time(NaiveTime::MIN);
            let mut run: Option<StaffingRun> = None;
            for &(from, to) in &segments {
                let instant = midnight + Duration::minutes(i64::from(from));
                let covering: Vec<&ShiftFacts<'_>> = facts
                    .iter()
                    .copied()
                    .filter(|fact| fact.window.covers(instant))
                    .collect();
                let heads = covering
                    .iter()
                    .map(|fact| fact.shift.staff_id)
                    .collect::<BTreeSet<_>>()
                    .len();
                let heads = u32::try_from(heads).unwrap_or(u32::MAX);

                let Some(crossing) = bound.crossed_by(heads, rule.warn_at) else {
                    if let Some(closed) = run.take() {
                        findings.violations.push(closed.finish(rule, store_id, date, bound));
                    }
                    continue;
                };
                let open = match run.take() {
                    Some(open) if open.end_minute == from && open.crossing == crossing => open,
                    Some(closed) => {
                        findings.violations.push(closed.finish(rule, store_id, date, bound));
                        StaffingRun::start(from, heads, crossing)
                    }
                    None => StaffingRun::start(from, heads, crossing),
                };
                run = Some(open.extend(to, heads, bound, &covering));
            }
            if let Some(closed) = run.take() {
                findings.violations.push(closed.finish(rule, store_id, date, bound));
            }
        }
    }
}

fn clock_label(minute_of_day: u32) -> String {
    format!("{:02}:{:02}", minute_of_day / 60, minute_of_day % 60)
}

struct StaffingRun {
    start_minute: u32,
    end_minute: u32,
    worst: u32,
    crossing: Crossing,
    shift_ids: BTreeSet<ShiftId>,
}

impl StaffingRun {
    fn start(minute: u32, heads: u32, crossing: Crossing) -> Self {
        Self {
            start_minute: minute,
            end_minute: minute,
            worst: heads,
            crossing,
            shift_ids: BTreeSet::new(),
        }
    }

    fn extend(
        mut self,
        end_minute: u32,
        heads: u32,
        bound: StaffingBound,
        covering: &[&ShiftFacts<'_>],
    ) -> Self {
        self.end_minute = end_minute;
        self.worst = match bound {
            StaffingBound::Minimum(_) => self.worst.min(heads),
            StaffingBound::Maximum(_) => self.worst.max(heads),
        };
        self.shift_ids
            .extend(covering.iter().map(|fact| fact.shift.id));
        self
    }

    fn finish(
        self,
        rule: &CompiledRule,
        store_id: StoreId,
        date: NaiveDate,
        bound: StaffingBound,
    ) -> Violation {
        let limit = Decimal::from(bound.limit());
        let threshold = match self.crossing {
            Crossing::Limit => format!("{} is {limit}", bound.describe()),
            Crossing::Margin(margin) => {
                format!("{} is {limit}, warning margin {margin}", bound.describe())
            }
        };
        Violation::new(
            rule,
            format!(
                "store {store_id} has {} staff on {date} between {} and {}; {threshold}",
                self.worst,
                clock_label(self.start_minute),
                clock_label(self.end_minute),
            ),
        )
        .store(Some(store_id))
        .on(date)
        .shifts(self.shift_ids.into_iter().collect())
        .measured(Decimal::from(self.worst), self.crossing.threshold(limit))
        .graded(self.crossing.severity(rule))
    }
}

fn availability(rule: &CompiledRule, context: &EvaluationContext<'_>, findings: &mut Findings) {
    let night = context.eligibility.night_window();
    for fact in context.in_scope(rule) {
        let Some(staff) = fact.staff else {
            continue;
        };
        // No declaration at all is not a refusal.
        if staff.available_categories.is_empty() {
            continue;
        }
        let shift = fact.shift;
        let category = shift.category(night);
        if context
            .eligibility
            .is_available_for_category(staff, category)
        {
            continue;
        }
        findings.violations.push(
            Violation::new(
                rule,
                format!(
                    "staff {} has not declared availability for {} shifts ({} {}-{})",
                    staff.id,
                    category.label(),
                    shift.date,
                    shift.start,
                    shift.end
                ),
            )
            .staff(staff.id)
            .store(shift.store_id)
            .on(shift.date)
            .shifts(vec![shift.id]),
        );
    }
}

fn qualification(rule: &CompiledRule, context: &EvaluationContext<'_>, findings: &mut Findings) {
    for fact in context.in_scope(rule) {
        let Some(staff) = fact.staff else {
            continue;
        };
        let shift = fact.shift;
        if context
            .eligibility
            .is_qualified(staff, shift, &shift.requirements)
        {
            continue;
        }

        let explanation = if !staff.is_active_on(shift.date) {
            format!("staff {} is not active on {}", staff.id, shift.date)
        } else {
            let missing: Vec<&str> = shift
                .requirements
                .skills
                .iter()
                .filter(|code| !staff.holds(CredentialKind::Skill, code, shift.date))
                .chain(
                    shift
                        .requirements
                        .certifications
                        .iter()
                        .filter(|code| {
                            !staff.holds(CredentialKind::Certification, code, shift.date)
                        }),
                )
                .map(String::as_str)
                .collect();
            format!(
                "staff {} lacks {} for shift {} on {}",
                staff.id,
                missing.join(", "),
                shift.id,
                shift.date
            )
        };
        findings.violations.push(
            Violation::new(rule, explanation)
                .staff(staff.id)
                .store(shift.store_id)
                .on(shift.date)
                .shifts(vec![shift.id]),
        );
    }
}
