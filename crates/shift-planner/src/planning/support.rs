use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::debug;

use super::domain::{Shift, ShiftId, Staff, StaffDirectory, StaffId, StoreId};
use super::time::InvalidShiftError;
use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftKind {
    Home,
    Support,
}

impl ShiftKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "HOME",
            Self::Support => "SUPPORT",
        }
    }
}

/// Home/support verdict. `ambiguous` marks a default taken because a store reference was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShiftClassification {
    pub kind: ShiftKind,
    pub ambiguous: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreTotals {
    pub hours: Decimal,
    pub cost: Decimal,
    pub support_hours: Decimal,
    pub shift_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StaffTotals {
    pub hours: Decimal,
    pub cost: Decimal,
    pub support_hours: Decimal,
    /// Distinct dates with at least one support shift.
    pub support_days: usize,
    pub shift_count: usize,
}

/// Per-shift figures the totals are built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiftAccount {
    pub shift_id: ShiftId,
    pub staff_id: StaffId,
    pub store_id: Option<StoreId>,
    pub date: NaiveDate,
    pub hours: Decimal,
    pub cost: Decimal,
    pub classification: ShiftClassification,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SupportAggregate {
    pub per_store: BTreeMap<StoreId, StoreTotals>,
    pub per_staff: BTreeMap<StaffId, StaffTotals>,
    /// Shifts with no worked store recorded.
    pub unassigned: StoreTotals,
    pub shifts: BTreeMap<ShiftId, ShiftAccount>,
    /// Shifts whose staff member is not in the directory; counted for hours at zero cost.
    pub unknown_staff: BTreeSet<ShiftId>,
}

impl SupportAggregate {
    pub fn total_hours(&self) -> Decimal {
        self.per_store
            .values()
            .map(|totals| totals.hours)
            .sum::<Decimal>()
            + self.unassigned.hours
    }

    pub fn total_cost(&self) -> Decimal {
        self.per_store
            .values()
            .map(|totals| totals.cost)
            .sum::<Decimal>()
            + self.unassigned.cost
    }

    pub fn classification(&self, shift_id: ShiftId) -> Option<ShiftClassification> {
        self.shifts
            .get(&shift_id)
            .map(|account| account.classification)
    }
}

#[derive(Debug, Clone)]
pub struct SupportShiftReconciler {
    standard_monthly_hours: Decimal,
}

impl Default for SupportShiftReconciler {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl SupportShiftReconciler {
    pub fn new(standard_monthly_hours: Decimal) -> Self {
        Self {
            standard_monthly_hours,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.standard_monthly_hours)
    }

    pub fn classify(&self, shift: &Shift, staff: &Staff) -> ShiftClassification {
        match (shift.store_id, staff.home_store_id) {
            (Some(worked), Some(home)) if worked != home => ShiftClassification {
                kind: ShiftKind::Support,
                ambiguous: false,
            },
            (Some(_), Some(_)) => ShiftClassification {
                kind: ShiftKind::Home,
                ambiguous: false,
            },
            _ => ShiftClassification {
                kind: ShiftKind::Home,
                ambiguous: true,
            },
        }
    }

    /// Hour and cost totals per worked store and per staff member.
    ///
    /// Every figure is an exact decimal sum of per-shift values, so the input order never
    /// changes the result. A single invalid span aborts the whole aggregation.
    pub fn aggregate(
        &self,
        shifts: &[Shift],
        directory: &StaffDirectory,
    ) -> Result<SupportAggregate, InvalidShiftError> {
        let mut aggregate = SupportAggregate::default();
        let mut support_dates: BTreeMap<StaffId, BTreeSet<NaiveDate>> = BTreeMap::new();

        for shift in shifts {
            let hours = shift.total_hours()?;
            let (classification, cost) = match directory.get(shift.staff_id) {
                Some(staff) => (self.classify(shift, staff), self.cost_of(staff, hours)),
                None => {
                    debug!(shift = %shift.id, staff = %shift.staff_id, "shift staff missing from directory");
                    aggregate.unknown_staff.insert(shift.id);
                    (
                        ShiftClassification {
                            kind: ShiftKind::Home,
                            ambiguous: true,
                        },
                        Decimal::ZERO,
                    )
                }
            };
            let support_hours = match classification.kind {
                ShiftKind::Support => hours,
                ShiftKind::Home => Decimal::ZERO,
            };

            let store_totals = match shift.store_id {
                Some(store_id) => aggregate.per_store.entry(store_id).or_default(),
                None => &mut aggregate.unassigned,
            };
            store_totals.hours += hours;
            store_totals.cost += cost;
            store_totals.support_hours += support_hours;
            store_totals.shift_count += 1;

            let staff_totals = aggregate.per_staff.entry(shift.staff_id).or_default();
            staff_totals.hours += hours;
            staff_totals.cost += cost;
            staff_totals.support_hours += support_hours;
            staff_totals.shift_count += 1;
            if classification.kind == ShiftKind::Support {
                support_dates
                    .entry(shift.staff_id)
                    .or_default()
                    .insert(shift.date);
            }

            aggregate.shifts.insert(
                shift.id,
                ShiftAccount {
                    shift_id: shift.id,
                    staff_id: shift.staff_id,
                    store_id: shift.store_id,
                    date: shift.date,
                    hours,
                    cost,
                    classification,
                },
            );
        }

        for (staff_id, dates) in support_dates {
            if let Some(totals) = aggregate.per_staff.get_mut(&staff_id) {
                totals.support_days = dates.len();
            }
        }

        Ok(aggregate)
    }

    fn cost_of(&self, staff: &Staff, hours: Decimal) -> Decimal {
        let rate = staff
            .compensation
            .effective_hourly_rate(self.standard_monthly_hours);
        (hours * rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}
