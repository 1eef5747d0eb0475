use serde::Deserialize;
use shift_planner::error::AppError;
use shift_planner::planning::{
    ClockTime, ComplianceRule, PlanPeriod, Shift, StaffDirectory, StoreId, TenantId,
};
use std::fs;
use std::path::Path;

/// Everything `evaluate` needs, read from one JSON document.
#[derive(Debug, Deserialize)]
pub(crate) struct SnapshotFile {
    pub(crate) tenant_id: TenantId,
    pub(crate) store_id: StoreId,
    #[serde(deserialize_with = "deserialize_period")]
    pub(crate) period: PlanPeriod,
    #[serde(default)]
    pub(crate) shifts: Vec<Shift>,
    #[serde(default)]
    pub(crate) staff: StaffDirectory,
    #[serde(default)]
    pub(crate) rules: Vec<ComplianceRule>,
}

pub(crate) fn load_snapshot_file(path: &Path) -> Result<SnapshotFile, AppError> {
    let raw = fs::read_to_string(path)?;
    let file = serde_json::from_str(&raw)?;
    Ok(file)
}

pub(crate) fn parse_clock(raw: &str) -> Result<ClockTime, String> {
    raw.parse::<ClockTime>().map_err(|err| err.to_string())
}

pub(crate) fn parse_period(raw: &str) -> Result<PlanPeriod, String> {
    let invalid = || format!("failed to parse '{raw}' as YYYY-MM");
    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let month = month.parse::<u32>().map_err(|_| invalid())?;
    PlanPeriod::new(year, month).ok_or_else(invalid)
}

pub(crate) fn deserialize_period<'de, D>(deserializer: D) -> Result<PlanPeriod, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_period(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periods_parse_as_year_and_month() {
        assert_eq!(parse_period("2025-06"), Ok(PlanPeriod { year: 2025, month: 6 }));
        assert!(parse_period("2025-13").is_err());
        assert!(parse_period("June").is_err());
    }

    #[test]
    fn snapshot_file_reads_staff_as_a_list() {
        let file: SnapshotFile = serde_json::from_str(
            r#"{
                "tenant_id": 1,
                "store_id": 10,
                "period": "2025-06",
                "staff": [{
                    "id": 4,
                    "tenant_id": 1,
                    "name": "Mio",
                    "employment_type": "part_time",
                    "compensation": { "basis": "hourly", "rate": "1150" },
                    "hire_date": "2024-01-10",
                    "active": true
                }],
                "shifts": [{
                    "id": 1,
                    "plan_id": 1,
                    "staff_id": 4,
                    "store_id": 10,
                    "date": "2025-06-02",
                    "start": "09:00",
                    "end": "17:00",
                    "break_minutes": 45
                }]
            }"#,
        )
        .expect("snapshot file parses");

        assert_eq!(file.period.to_string(), "2025-06");
        assert_eq!(file.staff.len(), 1);
        assert_eq!(file.shifts.len(), 1);
        assert!(file.rules.is_empty());
    }
}
