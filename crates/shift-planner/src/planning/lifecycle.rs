use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use super::domain::{
    PlanId, PlanPeriod, PlanStatus, PlanType, Shift, ShiftId, StaffDirectory, StoreId, TenantId,
};
use super::repository::{PlanKey, PlanMetrics, PlanRepository, RepositoryError, ShiftPlan};
use super::rules::{ComplianceRule, RuleEngine, ViolationReport};
use super::snapshot::PlanSnapshot;
use super::support::SupportShiftReconciler;
use super::time::InvalidShiftError;
use crate::config::EngineConfig;

/// Result of a shift mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftMutation {
    pub plan: ShiftPlan,
    /// Set when the plan revises an approved plan, so the change needs a fresh approval
    /// before it takes over from the approved figures.
    pub requires_reapproval: bool,
}

/// Everything approval needs besides the plan itself.
#[derive(Debug, Clone, Copy)]
pub struct ApprovalInputs<'a> {
    pub directory: &'a StaffDirectory,
    pub rules: &'a [ComplianceRule],
    pub coverage_score: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Approval {
    pub plan: ShiftPlan,
    /// Non-blocking findings that were accepted with the approval.
    pub report: ViolationReport,
}

/// Draft/approved state machine across FIRST and SECOND planning rounds.
pub struct PlanLifecycle<R> {
    repository: Arc<R>,
    engine: RuleEngine,
    reconciler: SupportShiftReconciler,
}

impl<R> PlanLifecycle<R>
where
    R: PlanRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: EngineConfig) -> Self {
        let reconciler = SupportShiftReconciler::from_config(&config);
        let engine = RuleEngine::new(config);
        Self {
            repository,
            engine,
            reconciler,
        }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn create(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        period: PlanPeriod,
        plan_type: PlanType,
    ) -> Result<ShiftPlan, LifecycleError> {
        let key = PlanKey {
            tenant_id,
            store_id,
            period,
            plan_type,
        };
        if let Some(existing) = self.repository.find_current(&key)? {
            return Err(LifecycleError::DuplicatePlan {
                key,
                existing: existing.id,
            });
        }

        let plan = ShiftPlan {
            id: self.repository.next_id()?,
            tenant_id,
            store_id,
            period,
            plan_type,
            status: PlanStatus::Draft,
            version: 0,
            shifts: Vec::new(),
            metrics: None,
            supersedes: None,
            superseded_by: None,
        };
        let stored = self.repository.insert(plan)?;
        info!(plan = %stored.id, key = %key, "plan created");
        Ok(stored)
    }

    /// Insert the shift, or replace the plan's shift with the same id.
    pub fn add_or_update_shift(
        &self,
        plan_id: PlanId,
        mut shift: Shift,
    ) -> Result<ShiftMutation, LifecycleError> {
        let mut plan = self.editable(plan_id)?;
        shift.worked_minutes()?;
        if !plan.period.contains(shift.date) {
            return Err(LifecycleError::ShiftOutsidePeriod {
                shift_id: shift.id,
                date: shift.date,
                period: plan.period,
            });
        }

        shift.plan_id = plan.id;
        match plan.shifts.iter_mut().find(|existing| existing.id == shift.id) {
            Some(existing) => *existing = shift,
            None => plan.shifts.push(shift),
        }
        self.store_mutation(plan)
    }

    pub fn remove_shift(
        &self,
        plan_id: PlanId,
        shift_id: ShiftId,
    ) -> Result<ShiftMutation, LifecycleError> {
        let mut plan = self.editable(plan_id)?;
        let before = plan.shifts.len();
        plan.shifts.retain(|shift| shift.id != shift_id);
        if plan.shifts.len() == before {
            return Err(LifecycleError::ShiftNotFound { plan_id, shift_id });
        }
        self.store_mutation(plan)
    }

    /// Reconcile a plan's shifts into the snapshot the rule engine evaluates.
    pub fn snapshot(
        &self,
        plan: &ShiftPlan,
        directory: &StaffDirectory,
    ) -> Result<PlanSnapshot, LifecycleError> {
        let snapshot = PlanSnapshot::assemble(
            plan.tenant_id,
            plan.store_id,
            plan.period,
            plan.shifts.clone(),
            directory.clone(),
            &self.reconciler,
        )?;
        Ok(snapshot)
    }

    /// Evaluate the plan and approve it when nothing blocking remains. Metrics are computed
    /// here once and frozen with the approved record.
    pub fn request_approval(
        &self,
        plan_id: PlanId,
        inputs: ApprovalInputs<'_>,
    ) -> Result<Approval, LifecycleError> {
        let mut plan = self.editable(plan_id)?;
        let snapshot = self.snapshot(&plan, inputs.directory)?;
        let report = self.engine.evaluate(&snapshot, inputs.rules);

        if report.has_blocking() {
            info!(plan = %plan.id, summary = %report.summary(), "approval blocked");
            return Err(LifecycleError::ComplianceBlocked(Box::new(report)));
        }

        plan.metrics = Some(PlanMetrics {
            total_labor_hours: snapshot.aggregate.total_hours(),
            total_labor_cost: snapshot.aggregate.total_cost(),
            coverage_score: inputs.coverage_score,
            constraint_violations: report.violations.len(),
        });
        plan.status = PlanStatus::Approved;
        let expected = plan.version;
        let plan = self.repository.update(plan, expected)?;
        info!(plan = %plan.id, summary = %report.summary(), "plan approved");

        Ok(Approval { plan, report })
    }

    /// Open a new draft revision of an approved plan. The prior plan stays on record with a
    /// `superseded_by` reference to its successor.
    pub fn supersede(
        &self,
        plan_id: PlanId,
        plan_type: PlanType,
    ) -> Result<ShiftPlan, LifecycleError> {
        let prior = self.fetch(plan_id)?;
        if let Some(successor) = prior.superseded_by {
            return Err(LifecycleError::AlreadySuperseded {
                plan_id,
                successor,
            });
        }
        if !prior.is_approved() {
            return Err(LifecycleError::NotApproved(plan_id));
        }
        if prior.plan_type == PlanType::Second && plan_type == PlanType::First {
            return Err(LifecycleError::InvalidRevision {
                from: prior.plan_type,
                to: plan_type,
            });
        }

        let key = PlanKey {
            plan_type,
            ..prior.key()
        };
        if let Some(existing) = self.repository.find_current(&key)? {
            if existing.id != prior.id {
                return Err(LifecycleError::DuplicatePlan {
                    key,
                    existing: existing.id,
                });
            }
        }

        let successor_id = self.repository.next_id()?;
        let shifts = prior
            .shifts
            .iter()
            .cloned()
            .map(|mut shift| {
                shift.plan_id = successor_id;
                shift
            })
            .collect();
        let successor = ShiftPlan {
            id: successor_id,
            tenant_id: prior.tenant_id,
            store_id: prior.store_id,
            period: prior.period,
            plan_type,
            status: PlanStatus::Draft,
            version: 0,
            shifts,
            metrics: None,
            supersedes: Some(prior.id),
            superseded_by: None,
        };

        let expected = prior.version;
        let mut retired = prior;
        retired.superseded_by = Some(successor_id);
        self.repository.update(retired, expected)?;
        let stored = self.repository.insert(successor)?;
        info!(plan = %stored.id, supersedes = %plan_id, key = %key, "plan superseded");
        Ok(stored)
    }

    /// The approved plan reporting should use: an approved SECOND plan over an approved FIRST,
    /// the latest revision within a round.
    pub fn authoritative_plan(
        &self,
        tenant_id: TenantId,
        store_id: StoreId,
        period: PlanPeriod,
    ) -> Result<Option<ShiftPlan>, LifecycleError> {
        let plans = self.repository.list_period(tenant_id, store_id, period)?;
        Ok(plans
            .into_iter()
            .filter(ShiftPlan::is_approved)
            .max_by_key(|plan| (plan.plan_type, plan.superseded_by.is_none(), plan.id)))
    }

    fn fetch(&self, plan_id: PlanId) -> Result<ShiftPlan, LifecycleError> {
        self.repository
            .fetch(plan_id)?
            .ok_or(LifecycleError::PlanNotFound(plan_id))
    }

    fn editable(&self, plan_id: PlanId) -> Result<ShiftPlan, LifecycleError> {
        let plan = self.fetch(plan_id)?;
        if plan.is_approved() {
            return Err(LifecycleError::PlanLocked {
                plan_id,
                state: "approved",
            });
        }
        if plan.is_superseded() {
            return Err(LifecycleError::PlanLocked {
                plan_id,
                state: "superseded",
            });
        }
        Ok(plan)
    }

    fn store_mutation(&self, plan: ShiftPlan) -> Result<ShiftMutation, LifecycleError> {
        let requires_reapproval = match plan.supersedes {
            Some(prior) => self
                .repository
                .fetch(prior)?
                .is_some_and(|prior| prior.is_approved()),
            None => false,
        };
        let expected = plan.version;
        let plan = self.repository.update(plan, expected)?;
        Ok(ShiftMutation {
            plan,
            requires_reapproval,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("a current plan already exists for {key} (plan {existing})")]
    DuplicatePlan { key: PlanKey, existing: PlanId },
    #[error("plan {plan_id} is {state} and cannot be changed; open a new revision instead")]
    PlanLocked {
        plan_id: PlanId,
        state: &'static str,
    },
    #[error("approval blocked: {}", .0.summary())]
    ComplianceBlocked(Box<ViolationReport>),
    #[error(transparent)]
    InvalidShift(#[from] InvalidShiftError),
    #[error("shift {shift_id} on {date} falls outside plan period {period}")]
    ShiftOutsidePeriod {
        shift_id: ShiftId,
        date: NaiveDate,
        period: PlanPeriod,
    },
    #[error("plan {0} not found")]
    PlanNotFound(PlanId),
    #[error("shift {shift_id} not found in plan {plan_id}")]
    ShiftNotFound { plan_id: PlanId, shift_id: ShiftId },
    #[error("a {} plan cannot be revised into a {} plan", .from.label(), .to.label())]
    InvalidRevision { from: PlanType, to: PlanType },
    #[error("plan {0} must be approved before it can be superseded")]
    NotApproved(PlanId),
    #[error("plan {plan_id} was already superseded by plan {successor}")]
    AlreadySuperseded { plan_id: PlanId, successor: PlanId },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
