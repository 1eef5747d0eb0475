use rust_decimal_macros::dec;

use super::common::*;
use crate::planning::domain::{Compensation, EmploymentType, ShiftId, StaffId};
use crate::planning::support::{ShiftKind, SupportShiftReconciler};

fn reconciler() -> SupportShiftReconciler {
    SupportShiftReconciler::from_config(&engine_config())
}

#[test]
fn shift_at_another_store_is_support() {
    let staff = staff(1, EmploymentType::PartTime);
    let shift = at_store(
        shift(1, 1, date(2025, 6, 2), "09:00", "18:00", 60),
        OTHER_STORE,
    );

    let classification = reconciler().classify(&shift, &staff);
    assert_eq!(classification.kind, ShiftKind::Support);
    assert!(!classification.ambiguous);
}

#[test]
fn missing_store_references_default_to_ambiguous_home() {
    let mut staff = staff(1, EmploymentType::PartTime);
    let mut shift = shift(1, 1, date(2025, 6, 2), "09:00", "18:00", 60);
    shift.store_id = None;

    let classification = reconciler().classify(&shift, &staff);
    assert_eq!(classification.kind, ShiftKind::Home);
    assert!(classification.ambiguous);

    shift.store_id = Some(OTHER_STORE);
    staff.home_store_id = None;
    assert!(reconciler().classify(&shift, &staff).ambiguous);
}

#[test]
fn aggregate_splits_home_and_support_hours() {
    let directory = directory(vec![staff(1, EmploymentType::PartTime)]);
    let shifts = vec![
        shift(1, 1, date(2025, 6, 2), "09:00", "18:00", 60),
        at_store(
            shift(2, 1, date(2025, 6, 3), "09:00", "18:00", 60),
            OTHER_STORE,
        ),
        at_store(
            shift(3, 1, date(2025, 6, 3), "19:00", "21:30", 0),
            OTHER_STORE,
        ),
    ];

    let aggregate = reconciler()
        .aggregate(&shifts, &directory)
        .expect("valid shifts");

    let home = &aggregate.per_store[&HOME_STORE];
    assert_eq!(home.hours, dec!(8.00));
    assert_eq!(home.support_hours, dec!(0));
    assert_eq!(home.cost, dec!(9600.00));

    let other = &aggregate.per_store[&OTHER_STORE];
    assert_eq!(other.hours, dec!(10.50));
    assert_eq!(other.support_hours, dec!(10.50));
    assert_eq!(other.shift_count, 2);

    let person = &aggregate.per_staff[&StaffId(1)];
    assert_eq!(person.hours, dec!(18.50));
    assert_eq!(person.support_hours, dec!(10.50));
    assert_eq!(person.support_days, 1);
    assert_eq!(aggregate.total_hours(), dec!(18.50));
    assert_eq!(aggregate.total_cost(), dec!(22200.00));
}

#[test]
fn salaried_cost_uses_the_standard_monthly_hours() {
    let mut salaried = staff(2, EmploymentType::FullTime);
    salaried.compensation = Compensation::Monthly {
        salary: dec!(346000),
    };
    let directory = directory(vec![salaried]);
    let shifts = vec![shift(1, 2, date(2025, 6, 2), "09:00", "18:00", 60)];

    let aggregate = reconciler()
        .aggregate(&shifts, &directory)
        .expect("valid shifts");

    // 346000 / 173 = 2000 per hour.
    assert_eq!(aggregate.per_staff[&StaffId(2)].cost, dec!(16000.00));
}

#[test]
fn unknown_staff_keep_their_hours_at_zero_cost() {
    let directory = directory(vec![staff(1, EmploymentType::PartTime)]);
    let shifts = vec![shift(9, 42, date(2025, 6, 2), "09:00", "13:00", 0)];

    let aggregate = reconciler()
        .aggregate(&shifts, &directory)
        .expect("valid shifts");

    assert!(aggregate.unknown_staff.contains(&ShiftId(9)));
    assert_eq!(aggregate.per_store[&HOME_STORE].hours, dec!(4.00));
    assert_eq!(aggregate.per_store[&HOME_STORE].cost, dec!(0));
    let classification = aggregate
        .classification(ShiftId(9))
        .expect("shift accounted");
    assert!(classification.ambiguous);
}

#[test]
fn shifts_without_a_store_land_in_the_unassigned_bucket() {
    let directory = directory(vec![staff(1, EmploymentType::PartTime)]);
    let mut floating = shift(1, 1, date(2025, 6, 2), "09:00", "12:00", 0);
    floating.store_id = None;

    let aggregate = reconciler()
        .aggregate(&[floating], &directory)
        .expect("valid shifts");

    assert!(aggregate.per_store.is_empty());
    assert_eq!(aggregate.unassigned.hours, dec!(3.00));
    assert_eq!(aggregate.total_hours(), dec!(3.00));
}

#[test]
fn invalid_span_aborts_aggregation() {
    let directory = directory(vec![staff(1, EmploymentType::PartTime)]);
    let shifts = vec![
        shift(1, 1, date(2025, 6, 2), "09:00", "18:00", 60),
        shift(2, 1, date(2025, 6, 3), "10:00", "11:00", 90),
    ];

    let err = reconciler()
        .aggregate(&shifts, &directory)
        .expect_err("break exceeds span");
    assert_eq!(err.break_minutes, 90);
}

#[test]
fn input_order_does_not_change_totals() {
    let directory = directory(vec![
        staff(1, EmploymentType::PartTime),
        staff(2, EmploymentType::FullTime),
    ]);
    let shifts = vec![
        shift(1, 1, date(2025, 6, 2), "09:00", "17:20", 35),
        at_store(
            shift(2, 2, date(2025, 6, 2), "22:00", "06:00", 60),
            OTHER_STORE,
        ),
        shift(3, 2, date(2025, 6, 4), "13:10", "21:55", 45),
        shift(4, 1, date(2025, 6, 5), "07:05", "12:00", 0),
    ];
    let mut reversed = shifts.clone();
    reversed.reverse();

    let forward = reconciler()
        .aggregate(&shifts, &directory)
        .expect("valid shifts");
    let backward = reconciler()
        .aggregate(&reversed, &directory)
        .expect("valid shifts");
    assert_eq!(forward, backward);
}
