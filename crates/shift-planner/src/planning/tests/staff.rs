use rust_decimal_macros::dec;
use serde_json::{json, Value};

use super::common::*;
use crate::planning::domain::{Compensation, EmploymentType, Staff, StaffDirectory, StaffError};

fn record(employment_type: &str, pay: Value) -> Value {
    let mut record = json!({
        "id": 7,
        "tenant_id": 1,
        "name": "Sora",
        "employment_type": employment_type,
        "hire_date": "2023-04-01",
        "active": true
    });
    if let (Some(record), Some(pay)) = (record.as_object_mut(), pay.as_object()) {
        record.extend(pay.clone());
    }
    record
}

fn assert_rejected(record: Value, expected: StaffError) {
    let message = serde_json::from_value::<Staff>(record)
        .expect_err("record is rejected")
        .to_string();
    assert!(message.contains(&expected.to_string()), "got {message}");
}

#[test]
fn hourly_column_builds_hourly_pay() {
    let staff: Staff =
        serde_json::from_value(record("part_time", json!({ "hourly_rate": "1150" })))
            .expect("valid record");

    assert_eq!(staff.compensation, Compensation::Hourly { rate: dec!(1150) });
}

#[test]
fn tagged_salary_is_accepted_for_full_time_staff() {
    let staff: Staff = serde_json::from_value(record(
        "full_time",
        json!({ "compensation": { "basis": "monthly", "salary": "320000" } }),
    ))
    .expect("valid record");

    assert_eq!(staff.compensation, Compensation::Monthly { salary: dec!(320000) });
}

#[test]
fn serialized_staff_reads_back() {
    let original = staff(3, EmploymentType::FullTime);
    let text = serde_json::to_string(&original).expect("serialize");

    let parsed: Staff = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(parsed, original);
}

#[test]
fn record_without_pay_is_rejected() {
    assert_rejected(
        record("part_time", json!({})),
        StaffError::MissingCompensation(EmploymentType::PartTime),
    );
}

#[test]
fn record_with_both_columns_is_rejected() {
    assert_rejected(
        record(
            "part_time",
            json!({ "hourly_rate": "1150", "monthly_salary": "200000" }),
        ),
        StaffError::AmbiguousCompensation(EmploymentType::PartTime),
    );
}

#[test]
fn tagged_pay_next_to_a_column_is_rejected() {
    assert_rejected(
        record(
            "full_time",
            json!({
                "compensation": { "basis": "monthly", "salary": "320000" },
                "hourly_rate": "1500"
            }),
        ),
        StaffError::AmbiguousCompensation(EmploymentType::FullTime),
    );
}

#[test]
fn full_time_staff_paid_hourly_are_rejected() {
    assert_rejected(
        record(
            "full_time",
            json!({ "compensation": { "basis": "hourly", "rate": "1500" } }),
        ),
        StaffError::BasisMismatch {
            employment: EmploymentType::FullTime,
            expected: "monthly",
        },
    );
}

#[test]
fn part_time_staff_on_salary_are_rejected() {
    assert_rejected(
        record("part_time", json!({ "monthly_salary": "200000" })),
        StaffError::BasisMismatch {
            employment: EmploymentType::PartTime,
            expected: "hourly",
        },
    );
}

#[test]
fn negative_pay_is_rejected() {
    assert_rejected(
        record("part_time", json!({ "hourly_rate": "-1" })),
        StaffError::NegativeCompensation(dec!(-1)),
    );
}

#[test]
fn one_invalid_record_rejects_the_directory() {
    let records = json!([
        record("part_time", json!({ "hourly_rate": "1150" })),
        record("contract", json!({ "hourly_rate": "2000" })),
    ]);

    assert!(serde_json::from_value::<StaffDirectory>(records).is_err());
}
