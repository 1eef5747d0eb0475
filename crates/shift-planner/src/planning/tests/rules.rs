use rust_decimal_macros::dec;

use super::common::*;
use crate::config::EngineConfig;
use crate::planning::domain::{EmploymentType, RuleId, ShiftId, StaffId, TenantId};
use crate::planning::rules::{
    BreachAction, ConfigurationIssue, DataGapKind, PenaltyLevel, RuleCategory, RuleEngine,
    RuleFamily, Severity, TimeBand,
};
use crate::planning::time::ShiftCategory;

fn engine() -> RuleEngine {
    RuleEngine::new(engine_config())
}

/// Six 8-hour shifts Monday to Saturday of ISO week 23 of 2025.
fn six_day_week(staff_id: u32, first_id: u64) -> Vec<crate::planning::domain::Shift> {
    (0..6)
        .map(|offset| {
            shift(
                first_id + offset,
                staff_id,
                date(2025, 6, 2 + offset as u32),
                "09:00",
                "18:00",
                60,
            )
        })
        .collect()
}

#[test]
fn minor_on_night_shift_is_blocking() {
    let snapshot = snapshot(
        vec![shift(1, 8, date(2025, 6, 15), "22:00", "06:00", 60)],
        directory(vec![minor_staff(8)]),
    );
    let rules = vec![validation_rule(1, "VAL001", Severity::Blocking)];

    let report = engine().evaluate(&snapshot, &rules);

    assert!(report.has_blocking());
    assert_eq!(report.violations.len(), 1);
    let violation = &report.violations[0];
    assert_eq!(violation.family, RuleFamily::MinorLabor);
    assert_eq!(violation.staff_id, Some(StaffId(8)));
    assert_eq!(violation.shift_ids, vec![ShiftId(1)]);
}

#[test]
fn minor_hour_cap_applies_to_day_shifts() {
    let snapshot = snapshot(
        vec![shift(1, 8, date(2025, 6, 16), "08:00", "18:00", 60)],
        directory(vec![minor_staff(8)]),
    );
    let rules = vec![labor_law_rule(
        7,
        "LAW_007",
        "minor_labor",
        Some(dec!(8)),
        "hours",
        PenaltyLevel::Critical,
    )];

    let report = engine().evaluate(&snapshot, &rules);

    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].observed, Some(dec!(9)));
    assert_eq!(report.violations[0].limit, Some(dec!(8)));
}

#[test]
fn adult_night_shift_passes_minor_rules() {
    let snapshot = snapshot(
        vec![shift(1, 1, date(2025, 6, 15), "22:00", "06:00", 60)],
        directory(vec![staff(1, EmploymentType::PartTime)]),
    );
    let rules = vec![validation_rule(1, "VAL001", Severity::Blocking)];

    assert!(engine().evaluate(&snapshot, &rules).is_clean());
}

#[test]
fn weekly_hours_above_limit_are_reported_per_iso_week() {
    let snapshot = snapshot(
        six_day_week(1, 1),
        directory(vec![staff(1, EmploymentType::PartTime)]),
    );
    let rules = vec![labor_law_rule(
        2,
        "LAW_002",
        "weekly_hours",
        Some(dec!(40)),
        "hours",
        PenaltyLevel::High,
    )];

    let report = engine().evaluate(&snapshot, &rules);

    assert_eq!(report.violations.len(), 1);
    let violation = &report.violations[0];
    assert_eq!(violation.severity, Severity::Blocking);
    assert_eq!(violation.date, Some(date(2025, 6, 2)));
    assert_eq!(violation.observed, Some(dec!(48)));
    assert_eq!(violation.shift_ids.len(), 6);
    assert!(violation.explanation.contains("2025-W23"));
}

#[test]
fn rest_interval_accounts_for_shift_end_times() {
    let snapshot = snapshot(
        vec![
            shift(1, 1, date(2025, 6, 2), "15:00", "23:00", 60),
            shift(2, 1, date(2025, 6, 3), "07:00", "15:00", 60),
            shift(3, 1, date(2025, 6, 4), "07:00", "15:00", 60),
        ],
        directory(vec![staff(1, EmploymentType::PartTime)]),
    );
    let rules = vec![validation_rule(4, "VAL004", Severity::Warning)];

    let report = engine().evaluate(&snapshot, &rules);

    assert_eq!(report.violations.len(), 1);
    let violation = &report.violations[0];
    assert_eq!(violation.shift_ids, vec![ShiftId(1), ShiftId(2)]);
    assert_eq!(violation.observed, Some(dec!(8)));
    assert_eq!(violation.limit, Some(dec!(11)));
    assert!(!report.has_blocking());
}

#[test]
fn overnight_shift_shortens_the_next_rest() {
    let snapshot = snapshot(
        vec![
            shift(1, 1, date(2025, 6, 2), "22:00", "06:00", 60),
            shift(2, 1, date(2025, 6, 3), "15:00", "23:00", 60),
        ],
        directory(vec![staff(1, EmploymentType::PartTime)]),
    );
    let rules = vec![validation_rule(4, "VAL004", Severity::Warning)];

    let report = engine().evaluate(&snapshot, &rules);

    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].observed, Some(dec!(9)));
}

#[test]
fn consecutive_days_beyond_the_default_limit() {
    let shifts = (0..7)
        .map(|offset| {
            shift(
                10 + offset,
                1,
                date(2025, 6, 2 + offset as u32),
                "09:00",
                "13:00",
                0,
            )
        })
        .collect();
    let snapshot = snapshot(shifts, directory(vec![staff(1, EmploymentType::PartTime)]));
    let rules = vec![validation_rule(5, "LM005", Severity::Warning)];

    let report = engine().evaluate(&snapshot, &rules);

    assert_eq!(report.violations.len(), 1);
    let violation = &report.violations[0];
    assert_eq!(violation.family, RuleFamily::ConsecutiveDays);
    assert_eq!(violation.observed, Some(dec!(7)));
    assert_eq!(violation.date, Some(date(2025, 6, 2)));
}

#[test]
fn statutory_break_ladder_applies_without_a_threshold() {
    let snapshot = snapshot(
        vec![
            shift(1, 1, date(2025, 6, 2), "09:00", "18:00", 30),
            shift(2, 1, date(2025, 6, 3), "09:00", "16:00", 30),
            shift(3, 1, date(2025, 6, 4), "09:00", "15:00", 0),
            shift(4, 1, date(2025, 6, 5), "09:00", "18:00", 60),
        ],
        directory(vec![staff(1, EmploymentType::PartTime)]),
    );
    let rules = vec![validation_rule(3, "VAL003", Severity::Blocking)];

    let report = engine().evaluate(&snapshot, &rules);

    let flagged: Vec<_> = report
        .violations
        .iter()
        .map(|violation| (violation.shift_ids[0], violation.limit))
        .collect();
    assert_eq!(
        flagged,
        vec![(ShiftId(1), Some(dec!(60))), (ShiftId(2), Some(dec!(45)))]
    );
}

#[test]
fn employment_scope_limits_staff_rules() {
    let mut shifts = six_day_week(1, 1);
    shifts.extend((0..4).map(|offset| {
        shift(
            20 + offset,
            2,
            date(2025, 6, 9 + offset as u32),
            "09:00",
            "18:00",
            60,
        )
    }));
    let snapshot = snapshot(
        shifts,
        directory(vec![
            staff(1, EmploymentType::PartTime),
            staff(2, EmploymentType::FullTime),
        ]),
    );
    let mut rule = management_rule(
        6,
        "LM001",
        "max_hours",
        Some(dec!(30)),
        "hours",
        "month",
        BreachAction::Warn,
    );
    rule.applies_to.insert(EmploymentType::FullTime);

    let report = engine().evaluate(&snapshot, &[rule]);

    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].staff_id, Some(StaffId(2)));
    assert_eq!(report.violations[0].family, RuleFamily::MonthlyHours);
    assert_eq!(report.violations[0].severity, Severity::Warning);
}

#[test]
fn monthly_overtime_is_measured_above_the_standard_hours() {
    let snapshot = snapshot(
        six_day_week(1, 1),
        directory(vec![staff(1, EmploymentType::PartTime)]),
    );
    let engine = RuleEngine::new(EngineConfig {
        standard_monthly_hours: dec!(40),
        ..engine_config()
    });
    let rules = vec![labor_law_rule(
        11,
        "LAW_011",
        "monthly_overtime",
        Some(dec!(5)),
        "hours",
        PenaltyLevel::Critical,
    )];

    let report = engine.evaluate(&snapshot, &rules);

    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].observed, Some(dec!(8)));
    assert_eq!(report.violations[0].limit, Some(dec!(5)));
}

#[test]
fn understaffed_slots_merge_into_runs() {
    let snapshot = snapshot(
        vec![
            shift(1, 1, date(2025, 6, 2), "09:00", "17:00", 60),
            shift(2, 2, date(2025, 6, 2), "10:00", "11:00", 0),
        ],
        directory(vec![
            staff(1, EmploymentType::PartTime),
            staff(2, EmploymentType::PartTime),
        ]),
    );
    let rules = vec![store_rule(
        30,
        "min_staff",
        dec!(2),
        Some(("09:00", "13:00")),
        Severity::Warning,
    )];

    let report = engine().evaluate(&snapshot, &rules);

    let windows: Vec<&str> = report
        .violations
        .iter()
        .map(|violation| violation.explanation.as_str())
        .collect();
    assert_eq!(windows.len(), 2, "got {windows:?}");
    assert!(windows[0].contains("between 09:00 and 10:00"));
    assert!(windows[1].contains("between 11:00 and 13:00"));
    assert!(report
        .violations
        .iter()
        .all(|violation| violation.store_id == Some(HOME_STORE)
            && violation.category == RuleCategory::StoreConstraint));
}

#[test]
fn overstaffing_reports_the_peak_head_count() {
    let snapshot = snapshot(
        vec![
            shift(1, 1, date(2025, 6, 2), "09:00", "17:00", 60),
            shift(2, 2, date(2025, 6, 2), "09:00", "17:00", 60),
            shift(3, 3, date(2025, 6, 2), "12:00", "13:00", 0),
        ],
        directory(vec![
            staff(1, EmploymentType::PartTime),
            staff(2, EmploymentType::PartTime),
            staff(3, EmploymentType::PartTime),
        ]),
    );
    let rules = vec![store_rule(
        31,
        "max_staff",
        dec!(2),
        Some(("09:00", "17:00")),
        Severity::Info,
    )];

    let report = engine().evaluate(&snapshot, &rules);

    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].observed, Some(dec!(3)));
    assert_eq!(
        report.violations[0].shift_ids,
        vec![ShiftId(1), ShiftId(2), ShiftId(3)]
    );
}

#[test]
fn declared_availability_is_advisory() {
    let snapshot = snapshot(
        vec![
            shift(1, 1, date(2025, 6, 2), "22:00", "06:00", 60),
            shift(2, 2, date(2025, 6, 2), "22:00", "06:00", 60),
        ],
        directory(vec![
            available_for(
                staff(1, EmploymentType::PartTime),
                &[ShiftCategory::Morning],
            ),
            staff(2, EmploymentType::PartTime),
        ]),
    );
    let rules = vec![validation_rule(40, "availability", Severity::Info)];

    let report = engine().evaluate(&snapshot, &rules);

    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].staff_id, Some(StaffId(1)));
    assert!(!report.has_blocking());
}

#[test]
fn missing_certification_is_named() {
    let mut guarded = shift(1, 1, date(2025, 6, 2), "09:00", "17:00", 60);
    guarded
        .requirements
        .certifications
        .insert("food_hygiene".to_string());
    let snapshot = snapshot(
        vec![guarded],
        directory(vec![staff(1, EmploymentType::PartTime)]),
    );
    let rules = vec![validation_rule(6, "VAL006", Severity::Blocking)];

    let report = engine().evaluate(&snapshot, &rules);

    assert_eq!(report.violations.len(), 1);
    assert!(report.violations[0].explanation.contains("food_hygiene"));
}

#[test]
fn unusable_rules_become_configuration_errors() {
    let snapshot = snapshot(
        vec![shift(1, 8, date(2025, 6, 15), "22:00", "06:00", 60)],
        directory(vec![minor_staff(8)]),
    );
    let rules = vec![
        validation_rule(1, "VAL999", Severity::Blocking),
        labor_law_rule(
            2,
            "LAW_002",
            "weekly_hours",
            None,
            "hours",
            PenaltyLevel::High,
        ),
        labor_law_rule(
            3,
            "LAW_020",
            "weekly_hours",
            Some(dec!(-1)),
            "hours",
            PenaltyLevel::High,
        ),
        labor_law_rule(
            4,
            "LAW_021",
            "weekly_hours",
            Some(dec!(40)),
            "parsecs",
            PenaltyLevel::High,
        ),
        management_rule(
            5,
            "LM010",
            "max_hours",
            Some(dec!(40)),
            "hours",
            "fortnight",
            BreachAction::Block,
        ),
        store_rule(6, "min_staff", dec!(2), None, Severity::Warning),
        validation_rule(7, "VAL001", Severity::Blocking),
    ];

    let report = engine().evaluate(&snapshot, &rules);

    let issues: Vec<(RuleId, &ConfigurationIssue)> = report
        .configuration_errors
        .iter()
        .map(|err| (err.rule_id, &err.issue))
        .collect();
    assert_eq!(issues.len(), 6, "got {issues:?}");
    assert!(matches!(issues[0], (RuleId(2), ConfigurationIssue::MissingThreshold)));
    assert!(matches!(
        issues[1],
        (RuleId(3), ConfigurationIssue::NegativeThreshold { .. })
    ));
    assert!(matches!(
        issues[2],
        (RuleId(4), ConfigurationIssue::UnsupportedUnit { .. })
    ));
    assert!(matches!(
        issues[3],
        (RuleId(5), ConfigurationIssue::UnsupportedPeriod { .. })
    ));
    assert!(matches!(issues[4], (RuleId(6), ConfigurationIssue::MissingBand)));
    assert!(matches!(
        issues[5],
        (RuleId(1), ConfigurationIssue::UnknownCode { .. })
    ));

    assert_eq!(report.violations.len(), 1, "remaining rules still run");
    assert!(report.has_blocking());
}

#[test]
fn foreign_and_inactive_rules_are_ignored() {
    let snapshot = snapshot(
        vec![shift(1, 8, date(2025, 6, 15), "22:00", "06:00", 60)],
        directory(vec![minor_staff(8)]),
    );
    let mut foreign = validation_rule(1, "VAL001", Severity::Blocking);
    foreign.tenant_id = TenantId(99);
    let mut inactive = validation_rule(2, "VAL001", Severity::Blocking);
    inactive.active = false;

    let report = engine().evaluate(&snapshot, &[foreign, inactive]);

    assert!(report.is_clean());
}

#[test]
fn snapshot_defects_are_recorded_as_data_gaps() {
    let mut undated = staff(3, EmploymentType::PartTime);
    undated.birth_date = None;
    let snapshot = snapshot(
        vec![
            shift(1, 3, date(2025, 6, 2), "22:00", "06:00", 60),
            shift(2, 99, date(2025, 6, 2), "09:00", "17:00", 60),
        ],
        directory(vec![undated]),
    );
    let rules = vec![
        validation_rule(1, "VAL001", Severity::Blocking),
        validation_rule(2, "VAL003", Severity::Blocking),
    ];

    let report = engine().evaluate(&snapshot, &rules);

    let kinds: Vec<DataGapKind> = report.data_gaps.iter().map(|gap| gap.kind).collect();
    assert_eq!(
        kinds,
        vec![DataGapKind::UnknownStaff, DataGapKind::MissingBirthDate]
    );
    assert!(report.violations.is_empty());
}

#[test]
fn violations_follow_category_then_staff_then_date() {
    let mut shifts = six_day_week(2, 1);
    shifts.push(shift(20, 1, date(2025, 6, 3), "09:00", "18:00", 30));
    let snapshot = snapshot(
        shifts,
        directory(vec![
            staff(1, EmploymentType::PartTime),
            staff(2, EmploymentType::PartTime),
        ]),
    );
    let rules = vec![
        validation_rule(3, "VAL003", Severity::Blocking),
        store_rule(
            30,
            "min_staff",
            dec!(3),
            Some(("09:00", "10:00")),
            Severity::Warning,
        ),
        labor_law_rule(
            2,
            "LAW_002",
            "weekly_hours",
            Some(dec!(40)),
            "hours",
            PenaltyLevel::High,
        ),
    ];

    let report = engine().evaluate(&snapshot, &rules);

    let order: Vec<(RuleCategory, Option<StaffId>)> = report
        .violations
        .iter()
        .map(|violation| (violation.category, violation.staff_id))
        .collect();
    assert_eq!(order[0], (RuleCategory::LaborLaw, Some(StaffId(2))));
    assert!(order[1..7]
        .iter()
        .all(|entry| *entry == (RuleCategory::StoreConstraint, None)));
    assert_eq!(order[7], (RuleCategory::Validation, Some(StaffId(1))));
    assert_eq!(order.len(), 8);

    let summary = report.summary();
    assert_eq!(summary.blocking, 2);
    assert_eq!(summary.warning, 6);
    assert_eq!(summary.by_family[&RuleFamily::MinStaff], 6);
}

#[test]
fn evaluation_is_byte_for_byte_repeatable() {
    let mut shifts = six_day_week(1, 1);
    shifts.push(shift(30, 8, date(2025, 6, 14), "22:00", "06:00", 60));
    let snapshot = snapshot(
        shifts,
        directory(vec![staff(1, EmploymentType::PartTime), minor_staff(8)]),
    );
    let rules = vec![
        validation_rule(1, "VAL001", Severity::Blocking),
        validation_rule(2, "VAL002", Severity::Blocking),
        validation_rule(3, "VAL003", Severity::Blocking),
        validation_rule(4, "VAL004", Severity::Warning),
        validation_rule(9, "VAL999", Severity::Warning),
    ];
    let engine = engine();

    let first = serde_json::to_string(&engine.evaluate(&snapshot, &rules)).expect("serialize");
    let second = serde_json::to_string(&engine.evaluate(&snapshot, &rules)).expect("serialize");
    assert_eq!(first, second);
}

#[test]
fn rest_is_measured_from_the_latest_finish_on_earlier_days() {
    let snapshot = snapshot(
        vec![
            shift(1, 1, date(2025, 6, 14), "08:00", "23:00", 60),
            shift(2, 1, date(2025, 6, 14), "09:00", "10:00", 0),
            shift(3, 1, date(2025, 6, 15), "06:00", "12:00", 30),
        ],
        directory(vec![staff(1, EmploymentType::PartTime)]),
    );
    let rules = vec![validation_rule(4, "VAL004", Severity::Warning)];

    let report = engine().evaluate(&snapshot, &rules);

    assert_eq!(report.violations.len(), 1, "got {:?}", report.violations);
    let violation = &report.violations[0];
    assert_eq!(violation.shift_ids, vec![ShiftId(1), ShiftId(3)]);
    assert_eq!(violation.observed, Some(dec!(7)));
    assert!(violation.explanation.contains("2025-06-14 23:00"));
}

#[test]
fn staffing_samples_the_band_start_when_it_is_off_the_hour() {
    let snapshot = snapshot(
        vec![shift(1, 1, date(2025, 6, 2), "10:00", "14:00", 0)],
        directory(vec![staff(1, EmploymentType::PartTime)]),
    );
    let rules = vec![store_rule(
        32,
        "min_staff",
        dec!(1),
        Some(("09:30", "12:00")),
        Severity::Warning,
    )];

    let report = engine().evaluate(&snapshot, &rules);

    assert_eq!(report.violations.len(), 1, "got {:?}", report.violations);
    let violation = &report.violations[0];
    assert!(violation.explanation.contains("between 09:30 and 10:00"));
    assert_eq!(violation.observed, Some(dec!(0)));
}

#[test]
fn band_segments_open_at_the_band_start() {
    let band = TimeBand {
        start: clock("09:30"),
        end: clock("12:00"),
    };
    assert_eq!(band.segments(), vec![(570, 600), (600, 660), (660, 720)]);

    let overnight = TimeBand {
        start: clock("22:45"),
        end: clock("01:00"),
    };
    assert_eq!(
        overnight.segments(),
        vec![(0, 60), (1365, 1380), (1380, 1440)]
    );
}

#[test]
fn weekly_hours_inside_the_margin_warn_without_blocking() {
    let mut week = six_day_week(1, 1);
    week.pop();
    week.extend(six_day_week(2, 20));
    let snapshot = snapshot(
        week,
        directory(vec![
            staff(1, EmploymentType::PartTime),
            staff(2, EmploymentType::PartTime),
        ]),
    );
    let mut rule = labor_law_rule(
        2,
        "LAW_002",
        "weekly_hours",
        Some(dec!(40)),
        "hours",
        PenaltyLevel::High,
    );
    rule.warn_at = Some(dec!(36));

    let report = engine().evaluate(&snapshot, &[rule]);

    assert_eq!(report.violations.len(), 2, "got {:?}", report.violations);
    let near = &report.violations[0];
    assert_eq!(near.staff_id, Some(StaffId(1)));
    assert_eq!(near.severity, Severity::Warning);
    assert_eq!(near.observed, Some(dec!(40)));
    assert_eq!(near.limit, Some(dec!(36)));
    assert!(near.explanation.contains("warning margin"));
    let over = &report.violations[1];
    assert_eq!(over.staff_id, Some(StaffId(2)));
    assert_eq!(over.severity, Severity::Blocking);
    assert_eq!(over.limit, Some(dec!(40)));
}

#[test]
fn six_consecutive_days_warn_and_seven_block() {
    let run = |staff_id: u32, first_id: u64, days: u64| {
        (0..days).map(move |offset| {
            shift(
                first_id + offset,
                staff_id,
                date(2025, 6, 2 + offset as u32),
                "09:00",
                "13:00",
                0,
            )
        })
    };
    let shifts = run(1, 1, 6).chain(run(2, 20, 7)).collect();
    let snapshot = snapshot(
        shifts,
        directory(vec![
            staff(1, EmploymentType::PartTime),
            staff(2, EmploymentType::PartTime),
        ]),
    );
    let mut rule = labor_law_rule(
        10,
        "LAW_010",
        "consecutive_days",
        Some(dec!(6)),
        "days",
        PenaltyLevel::Critical,
    );
    rule.warn_at = Some(dec!(5));

    let report = engine().evaluate(&snapshot, &[rule]);

    let graded: Vec<(Option<StaffId>, Severity)> = report
        .violations
        .iter()
        .map(|violation| (violation.staff_id, violation.severity))
        .collect();
    assert_eq!(
        graded,
        vec![
            (Some(StaffId(1)), Severity::Warning),
            (Some(StaffId(2)), Severity::Blocking),
        ]
    );
}

#[test]
fn short_rest_blocks_and_near_minimum_rest_warns() {
    let snapshot = snapshot(
        vec![
            shift(1, 1, date(2025, 6, 2), "09:00", "20:00", 60),
            shift(2, 1, date(2025, 6, 3), "07:30", "12:00", 0),
            shift(3, 2, date(2025, 6, 2), "15:00", "23:00", 60),
            shift(4, 2, date(2025, 6, 3), "07:00", "15:00", 60),
        ],
        directory(vec![
            staff(1, EmploymentType::PartTime),
            staff(2, EmploymentType::PartTime),
        ]),
    );
    let mut rule = labor_law_rule(
        6,
        "LAW_006",
        "rest_interval",
        Some(dec!(11)),
        "hours",
        PenaltyLevel::Critical,
    );
    rule.warn_at = Some(dec!(12));

    let report = engine().evaluate(&snapshot, &[rule]);

    assert_eq!(report.violations.len(), 2, "got {:?}", report.violations);
    let near = &report.violations[0];
    assert_eq!(near.severity, Severity::Warning);
    assert_eq!(near.observed, Some(dec!(11.5)));
    assert_eq!(near.limit, Some(dec!(12)));
    let short = &report.violations[1];
    assert_eq!(short.severity, Severity::Blocking);
    assert_eq!(short.observed, Some(dec!(8)));
    assert_eq!(short.limit, Some(dec!(11)));
}

#[test]
fn empty_store_blocks_while_a_lone_clerk_warns() {
    let snapshot = snapshot(
        vec![shift(1, 1, date(2025, 6, 2), "11:00", "17:00", 0)],
        directory(vec![staff(1, EmploymentType::PartTime)]),
    );
    let mut rule = store_rule(
        33,
        "min_staff",
        dec!(1),
        Some(("09:00", "13:00")),
        Severity::Blocking,
    );
    rule.warn_at = Some(dec!(2));

    let report = engine().evaluate(&snapshot, &[rule]);

    let runs: Vec<(Severity, Option<rust_decimal::Decimal>, &str)> = report
        .violations
        .iter()
        .map(|violation| {
            (
                violation.severity,
                violation.observed,
                violation.explanation.as_str(),
            )
        })
        .collect();
    assert_eq!(runs.len(), 2, "got {runs:?}");
    assert_eq!(runs[0].0, Severity::Blocking);
    assert_eq!(runs[0].1, Some(dec!(0)));
    assert!(runs[0].2.contains("between 09:00 and 11:00"));
    assert_eq!(runs[1].0, Severity::Warning);
    assert_eq!(runs[1].1, Some(dec!(1)));
    assert!(runs[1].2.contains("between 11:00 and 13:00"));
}

#[test]
fn margin_never_raises_an_informational_rule() {
    let snapshot = snapshot(
        six_day_week(1, 1).into_iter().take(5).collect(),
        directory(vec![staff(1, EmploymentType::PartTime)]),
    );
    let mut rule = management_rule(
        3,
        "LM003",
        "max_hours",
        Some(dec!(40)),
        "hours",
        "week",
        BreachAction::Notify,
    );
    rule.warn_at = Some(dec!(36));

    let report = engine().evaluate(&snapshot, &[rule]);

    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].severity, Severity::Info);
}

#[test]
fn misplaced_margins_are_configuration_errors() {
    let snapshot = snapshot(
        six_day_week(1, 1),
        directory(vec![staff(1, EmploymentType::PartTime)]),
    );
    let mut beyond = labor_law_rule(
        2,
        "LAW_002",
        "weekly_hours",
        Some(dec!(40)),
        "hours",
        PenaltyLevel::High,
    );
    beyond.warn_at = Some(dec!(50));
    let mut unsupported = validation_rule(3, "VAL003", Severity::Warning);
    unsupported.warn_at = Some(dec!(30));
    let mut negative = validation_rule(5, "LM005", Severity::Warning);
    negative.warn_at = Some(dec!(-1));
    let mut under_minimum = validation_rule(4, "VAL004", Severity::Warning);
    under_minimum.warn_at = Some(dec!(600));

    let report = engine().evaluate(&snapshot, &[beyond, unsupported, negative, under_minimum]);

    let issue = |id: u32| {
        report
            .configuration_errors
            .iter()
            .find(|err| err.rule_id == RuleId(id))
            .map(|err| err.issue.clone())
    };
    assert_eq!(
        issue(2),
        Some(ConfigurationIssue::WarningBeyondLimit {
            warn_at: dec!(50),
            limit: dec!(40),
        })
    );
    assert_eq!(
        issue(3),
        Some(ConfigurationIssue::WarningNotSupported {
            family: RuleFamily::BreakTime,
        })
    );
    assert!(matches!(
        issue(5),
        Some(ConfigurationIssue::NegativeThreshold { .. })
    ));
    assert_eq!(
        issue(4),
        Some(ConfigurationIssue::WarningBeyondLimit {
            warn_at: dec!(600),
            limit: dec!(660),
        })
    );
    assert!(report.violations.is_empty());
}
