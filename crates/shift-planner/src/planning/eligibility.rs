use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::domain::{CredentialKind, RequiredQualifications, Shift, ShiftId, Staff, StaffId};
use super::time::{NightWindow, ShiftCategory};
use crate::config::EngineConfig;

/// Raised only for malformed staff data. "Not eligible" is an ordinary `false`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EligibilityError {
    #[error("staff {0} has no birth date on file")]
    MissingBirthDate(StaffId),
    #[error("staff {staff_id} has a birth date after {as_of}")]
    BornAfterReference { staff_id: StaffId, as_of: NaiveDate },
}

/// Everything the rule engine wants to know about one staff member on one shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityAssessment {
    pub staff_id: StaffId,
    pub shift_id: ShiftId,
    pub minor: bool,
    pub night_shift: bool,
    pub category: ShiftCategory,
    pub available: bool,
    pub qualified: bool,
    pub active: bool,
}

impl EligibilityAssessment {
    /// Hard blockers only; declared availability is advisory.
    pub fn is_clear(&self) -> bool {
        self.active && self.qualified && !(self.minor && self.night_shift)
    }
}

#[derive(Debug, Clone)]
pub struct EligibilityEvaluator {
    minor_age: u32,
    night: NightWindow,
}

impl Default for EligibilityEvaluator {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl EligibilityEvaluator {
    pub fn new(minor_age: u32, night: NightWindow) -> Self {
        Self { minor_age, night }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.minor_age, config.night)
    }

    pub fn night_window(&self) -> &NightWindow {
        &self.night
    }

    /// Whole years, dropping one when the birthday has not come round yet on `as_of`.
    pub fn age_on(&self, staff: &Staff, as_of: NaiveDate) -> Result<u32, EligibilityError> {
        let birth = staff
            .birth_date
            .ok_or(EligibilityError::MissingBirthDate(staff.id))?;

        let mut age = as_of.year() - birth.year();
        if (as_of.month(), as_of.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }

        u32::try_from(age).map_err(|_| EligibilityError::BornAfterReference {
            staff_id: staff.id,
            as_of,
        })
    }

    pub fn is_minor(&self, staff: &Staff, as_of: NaiveDate) -> Result<bool, EligibilityError> {
        self.age_on(staff, as_of).map(|age| age < self.minor_age)
    }

    pub fn is_available_for_category(&self, staff: &Staff, category: ShiftCategory) -> bool {
        staff.available_categories.contains(&category)
    }

    pub fn is_qualified(
        &self,
        staff: &Staff,
        shift: &Shift,
        required: &RequiredQualifications,
    ) -> bool {
        if !staff.is_active_on(shift.date) {
            return false;
        }

        let skills = required
            .skills
            .iter()
            .all(|code| staff.holds(CredentialKind::Skill, code, shift.date));
        let certifications = required
            .certifications
            .iter()
            .all(|code| staff.holds(CredentialKind::Certification, code, shift.date));

        skills && certifications
    }

    /// Assess a staff member against a shift, using the shift date as the age reference.
    pub fn assess(
        &self,
        staff: &Staff,
        shift: &Shift,
    ) -> Result<EligibilityAssessment, EligibilityError> {
        let minor = self.is_minor(staff, shift.date)?;
        let category = shift.category(&self.night);

        Ok(EligibilityAssessment {
            staff_id: staff.id,
            shift_id: shift.id,
            minor,
            night_shift: shift.is_night(&self.night),
            category,
            available: self.is_available_for_category(staff, category),
            qualified: self.is_qualified(staff, shift, &shift.requirements),
            active: staff.is_active_on(shift.date),
        })
    }
}
