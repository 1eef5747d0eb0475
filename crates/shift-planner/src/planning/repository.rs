use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::{
    PlanId, PlanPeriod, PlanStatus, PlanType, Shift, ShiftId, StoreId, TenantId,
};

/// Uniqueness scope of a current plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlanKey {
    pub tenant_id: TenantId,
    pub store_id: StoreId,
    pub period: PlanPeriod,
    pub plan_type: PlanType,
}

impl fmt::Display for PlanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tenant {} / store {} / {} / {}",
            self.tenant_id,
            self.store_id,
            self.period,
            self.plan_type.label()
        )
    }
}

/// Figures frozen onto a plan when it is approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanMetrics {
    pub total_labor_hours: Decimal,
    pub total_labor_cost: Decimal,
    /// Supplied by the caller; not derived from the shifts.
    #[serde(default)]
    pub coverage_score: Option<Decimal>,
    pub constraint_violations: usize,
}

/// Repository record for one plan revision and its shifts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftPlan {
    pub id: PlanId,
    pub tenant_id: TenantId,
    pub store_id: StoreId,
    pub period: PlanPeriod,
    pub plan_type: PlanType,
    pub status: PlanStatus,
    /// Bumped by every successful repository update.
    pub version: u64,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub metrics: Option<PlanMetrics>,
    #[serde(default)]
    pub supersedes: Option<PlanId>,
    #[serde(default)]
    pub superseded_by: Option<PlanId>,
}

impl ShiftPlan {
    pub fn key(&self) -> PlanKey {
        PlanKey {
            tenant_id: self.tenant_id,
            store_id: self.store_id,
            period: self.period,
            plan_type: self.plan_type,
        }
    }

    pub fn is_superseded(&self) -> bool {
        self.superseded_by.is_some()
    }

    pub fn is_approved(&self) -> bool {
        self.status == PlanStatus::Approved
    }

    pub fn shift(&self, shift_id: ShiftId) -> Option<&Shift> {
        self.shifts.iter().find(|shift| shift.id == shift_id)
    }

    pub fn summary(&self) -> String {
        format!(
            "plan {} ({}, {}, {} shift(s), v{})",
            self.id,
            self.key(),
            self.status.label(),
            self.shifts.len(),
            self.version
        )
    }
}

/// Storage abstraction for plans. Implementations serialise writers per plan through
/// `expected_version`.
pub trait PlanRepository: Send + Sync {
    fn next_id(&self) -> Result<PlanId, RepositoryError>;
    fn insert(&self, plan: ShiftPlan) -> Result<ShiftPlan, RepositoryError>;
    /// Store `plan` if the stored copy is still at `expected_version`; returns the stored copy.
    fn update(&self, plan: ShiftPlan, expected_version: u64) -> Result<ShiftPlan, RepositoryError>;
    fn fetch(&self, id: PlanId) -> Result<Option<ShiftPlan>, RepositoryError>;
    /// The plan for `key` that has not been superseded, if any.
    fn find_current(&self, key: &PlanKey) -> Result<Option<ShiftPlan>, RepositoryError>;
    fn list_period(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        period: PlanPeriod,
    ) -> Result<Vec<ShiftPlan>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("plan {plan_id} is at version {found}, expected {expected}")]
    VersionConflict {
        plan_id: PlanId,
        expected: u64,
        found: u64,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local plan store for the CLI and tests.
#[derive(Debug)]
pub struct InMemoryPlanRepository {
    plans: Mutex<BTreeMap<PlanId, ShiftPlan>>,
    sequence: AtomicU64,
}

impl Default for InMemoryPlanRepository {
    fn default() -> Self {
        Self {
            plans: Mutex::new(BTreeMap::new()),
            sequence: AtomicU64::new(1),
        }
    }
}

impl InMemoryPlanRepository {
    fn plans(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<PlanId, ShiftPlan>>, RepositoryError> {
        self.plans
            .lock()
            .map_err(|_| RepositoryError::Unavailable("plan store mutex poisoned".to_string()))
    }
}

impl PlanRepository for InMemoryPlanRepository {
    fn next_id(&self) -> Result<PlanId, RepositoryError> {
        Ok(PlanId(self.sequence.fetch_add(1, Ordering::Relaxed)))
    }

    fn insert(&self, mut plan: ShiftPlan) -> Result<ShiftPlan, RepositoryError> {
        let mut plans = self.plans()?;
        if plans.contains_key(&plan.id) {
            return Err(RepositoryError::Conflict);
        }
        plan.version = 1;
        plans.insert(plan.id, plan.clone());
        Ok(plan)
    }

    fn update(
        &self,
        mut plan: ShiftPlan,
        expected_version: u64,
    ) -> Result<ShiftPlan, RepositoryError> {
        let mut plans = self.plans()?;
        let stored = plans.get_mut(&plan.id).ok_or(RepositoryError::NotFound)?;
        if stored.version != expected_version {
            return Err(RepositoryError::VersionConflict {
                plan_id: plan.id,
                expected: expected_version,
                found: stored.version,
            });
        }
        plan.version = expected_version + 1;
        *stored = plan.clone();
        Ok(plan)
    }

    fn fetch(&self, id: PlanId) -> Result<Option<ShiftPlan>, RepositoryError> {
        Ok(self.plans()?.get(&id).cloned())
    }

    fn find_current(&self, key: &PlanKey) -> Result<Option<ShiftPlan>, RepositoryError> {
        Ok(self
            .plans()?
            .values()
            .find(|plan| plan.key() == *key && !plan.is_superseded())
            .cloned())
    }

    fn list_period(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        period: PlanPeriod,
    ) -> Result<Vec<ShiftPlan>, RepositoryError> {
        Ok(self
            .plans()?
            .values()
            .filter(|plan| {
                plan.tenant_id == tenant_id && plan.store_id == store_id && plan.period == period
            })
            .cloned()
            .collect())
    }
}
