use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::time::{self, ClockTime, InvalidShiftError, NightWindow, ShiftCategory, ShiftWindow};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

identifier!(TenantId(u32));
identifier!(StoreId(u32));
identifier!(StaffId(u32));
identifier!(PlanId(u64));
identifier!(ShiftId(u64));
identifier!(
    /// Identifier of a persisted compliance rule row.
    RuleId(u32)
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Freelance,
}

impl EmploymentType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullTime => "full-time",
            Self::PartTime => "part-time",
            Self::Contract => "contract",
            Self::Freelance => "freelance",
        }
    }

    /// Salaried staff are paid monthly; everyone else is waged by the hour.
    pub const fn is_salaried(self) -> bool {
        matches!(self, Self::FullTime | Self::Contract)
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a staff member is paid. Exactly one basis exists per staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum Compensation {
    Hourly { rate: Decimal },
    Monthly { salary: Decimal },
}

impl Compensation {
    /// Build the compensation from the two nullable columns staff records carry.
    pub fn for_employment(
        employment: EmploymentType,
        hourly_rate: Option<Decimal>,
        monthly_salary: Option<Decimal>,
    ) -> Result<Self, StaffError> {
        let compensation = match (hourly_rate, monthly_salary) {
            (Some(rate), None) => Self::Hourly { rate },
            (None, Some(salary)) => Self::Monthly { salary },
            (None, None) => return Err(StaffError::MissingCompensation(employment)),
            (Some(_), Some(_)) => return Err(StaffError::AmbiguousCompensation(employment)),
        };
        compensation.check(employment)?;
        Ok(compensation)
    }

    pub fn check(&self, employment: EmploymentType) -> Result<(), StaffError> {
        let amount = match self {
            Self::Hourly { rate } => *rate,
            Self::Monthly { salary } => *salary,
        };
        if amount < Decimal::ZERO {
            return Err(StaffError::NegativeCompensation(amount));
        }

        let monthly = matches!(self, Self::Monthly { .. });
        if monthly != employment.is_salaried() {
            return Err(StaffError::BasisMismatch {
                employment,
                expected: if employment.is_salaried() {
                    "monthly"
                } else {
                    "hourly"
                },
            });
        }
        Ok(())
    }

    /// Hourly cost of the staff member; salaries are spread over the standard monthly hours.
    pub fn effective_hourly_rate(&self, standard_monthly_hours: Decimal) -> Decimal {
        match self {
            Self::Hourly { rate } => *rate,
            Self::Monthly { salary } if standard_monthly_hours > Decimal::ZERO => {
                *salary / standard_monthly_hours
            }
            Self::Monthly { .. } => Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StaffError {
    #[error("{0} staff need an hourly rate or a monthly salary")]
    MissingCompensation(EmploymentType),
    #[error("{0} staff cannot carry both an hourly rate and a monthly salary")]
    AmbiguousCompensation(EmploymentType),
    #[error("{employment} staff must be paid on a {expected} basis")]
    BasisMismatch {
        employment: EmploymentType,
        expected: &'static str,
    },
    #[error("compensation cannot be negative (found {0})")]
    NegativeCompensation(Decimal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    Skill,
    Certification,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub kind: CredentialKind,
    pub code: String,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}

impl Credential {
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        self.expires_on.map_or(true, |expiry| date <= expiry)
    }
}

/// A staff member. Deserialization validates the pay basis against the employment type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StaffRecord")]
pub struct Staff {
    pub id: StaffId,
    pub tenant_id: TenantId,
    pub name: String,
    #[serde(default)]
    pub home_store_id: Option<StoreId>,
    pub employment_type: EmploymentType,
    pub compensation: Compensation,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    pub hire_date: NaiveDate,
    #[serde(default)]
    pub termination_date: Option<NaiveDate>,
    pub active: bool,
    #[serde(default)]
    pub available_categories: BTreeSet<ShiftCategory>,
    #[serde(default)]
    pub credentials: Vec<Credential>,
}

/// Staff as stored. Pay arrives either as a tagged `compensation` object or as the nullable
/// `hourly_rate` and `monthly_salary` columns, never both.
#[derive(Debug, Deserialize)]
struct StaffRecord {
    id: StaffId,
    tenant_id: TenantId,
    name: String,
    #[serde(default)]
    home_store_id: Option<StoreId>,
    employment_type: EmploymentType,
    #[serde(default)]
    compensation: Option<Compensation>,
    #[serde(default)]
    hourly_rate: Option<Decimal>,
    #[serde(default)]
    monthly_salary: Option<Decimal>,
    #[serde(default)]
    birth_date: Option<NaiveDate>,
    hire_date: NaiveDate,
    #[serde(default)]
    termination_date: Option<NaiveDate>,
    active: bool,
    #[serde(default)]
    available_categories: BTreeSet<ShiftCategory>,
    #[serde(default)]
    credentials: Vec<Credential>,
}

impl TryFrom<StaffRecord> for Staff {
    type Error = StaffError;

    fn try_from(record: StaffRecord) -> Result<Self, Self::Error> {
        let employment = record.employment_type;
        let compensation = match record.compensation {
            Some(_) if record.hourly_rate.is_some() || record.monthly_salary.is_some() => {
                return Err(StaffError::AmbiguousCompensation(employment));
            }
            Some(compensation) => {
                compensation.check(employment)?;
                compensation
            }
            None => Compensation::for_employment(
                employment,
                record.hourly_rate,
                record.monthly_salary,
            )?,
        };

        Ok(Self {
            id: record.id,
            tenant_id: record.tenant_id,
            name: record.name,
            home_store_id: record.home_store_id,
            employment_type: employment,
            compensation,
            birth_date: record.birth_date,
            hire_date: record.hire_date,
            termination_date: record.termination_date,
            active: record.active,
            available_categories: record.available_categories,
            credentials: record.credentials,
        })
    }
}

impl Staff {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.active
            && self.hire_date <= date
            && self.termination_date.map_or(true, |end| date <= end)
    }

    pub fn holds(&self, kind: CredentialKind, code: &str, on: NaiveDate) -> bool {
        self.credentials.iter().any(|credential| {
            credential.kind == kind && credential.code == code && credential.is_valid_on(on)
        })
    }

    /// Soft-deactivate at termination. Records stay for referential history.
    pub fn terminate(&mut self, on: NaiveDate) {
        self.termination_date = Some(on);
        self.active = false;
    }
}

/// Skills and certifications a shift demands of whoever works it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredQualifications {
    #[serde(default)]
    pub skills: BTreeSet<String>,
    #[serde(default)]
    pub certifications: BTreeSet<String>,
}

impl RequiredQualifications {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.certifications.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub plan_id: PlanId,
    pub staff_id: StaffId,
    /// Store the shift is worked at; may differ from the staff member's home store.
    #[serde(default)]
    pub store_id: Option<StoreId>,
    pub date: NaiveDate,
    pub start: ClockTime,
    pub end: ClockTime,
    #[serde(default)]
    pub break_minutes: u32,
    #[serde(default, skip_serializing_if = "RequiredQualifications::is_empty")]
    pub requirements: RequiredQualifications,
}

impl Shift {
    pub fn worked_minutes(&self) -> Result<u32, InvalidShiftError> {
        time::worked_minutes(self.start, self.end, self.break_minutes)
    }

    pub fn total_hours(&self) -> Result<Decimal, InvalidShiftError> {
        self.worked_minutes().map(time::to_hours)
    }

    pub fn window(&self) -> ShiftWindow {
        ShiftWindow::on(self.date, self.start, self.end)
    }

    pub fn is_night(&self, night: &NightWindow) -> bool {
        night.matches(self.start, self.end)
    }

    pub fn category(&self, night: &NightWindow) -> ShiftCategory {
        ShiftCategory::of(self.start, self.end, night)
    }
}

/// Staff records the caller loaded for a plan, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Staff>", into = "Vec<Staff>")]
pub struct StaffDirectory {
    staff: BTreeMap<StaffId, Staff>,
}

impl StaffDirectory {
    pub fn get(&self, id: StaffId) -> Option<&Staff> {
        self.staff.get(&id)
    }

    pub fn insert(&mut self, staff: Staff) -> Option<Staff> {
        self.staff.insert(staff.id, staff)
    }

    pub fn len(&self) -> usize {
        self.staff.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staff.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Staff> {
        self.staff.values()
    }
}

impl FromIterator<Staff> for StaffDirectory {
    fn from_iter<I: IntoIterator<Item = Staff>>(iter: I) -> Self {
        Self {
            staff: iter.into_iter().map(|staff| (staff.id, staff)).collect(),
        }
    }
}

impl From<Vec<Staff>> for StaffDirectory {
    fn from(value: Vec<Staff>) -> Self {
        value.into_iter().collect()
    }
}

impl From<StaffDirectory> for Vec<Staff> {
    fn from(value: StaffDirectory) -> Self {
        value.staff.into_values().collect()
    }
}

/// Calendar month a plan covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlanPeriod {
    pub year: i32,
    pub month: u32,
}

impl PlanPeriod {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for PlanPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Planning round. A SECOND plan revises the FIRST plan for the same period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    First,
    Second,
}

impl PlanType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "FIRST",
            Self::Second => "SECOND",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Draft,
    Approved,
}

impl PlanStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Approved => "APPROVED",
        }
    }
}
