//! Shift plan compliance and time accounting.
//!
//! Everything here is synchronous and works on values the caller has already loaded:
//! shifts, the staff directory and the tenant's rule rows. Persistence is reached only
//! through [`PlanRepository`], and no component keeps process-wide state.

pub mod domain;
pub mod eligibility;
pub mod lifecycle;
pub mod repository;
pub mod rules;
pub mod snapshot;
pub mod support;
pub mod time;

#[cfg(test)]
mod tests;

pub use domain::{
    Compensation, Credential, CredentialKind, EmploymentType, PlanId, PlanPeriod, PlanStatus,
    PlanType, RequiredQualifications, RuleId, Shift, ShiftId, Staff, StaffDirectory, StaffError,
    StaffId, StoreId, TenantId,
};
pub use eligibility::{EligibilityAssessment, EligibilityError, EligibilityEvaluator};
pub use lifecycle::{Approval, ApprovalInputs, LifecycleError, PlanLifecycle, ShiftMutation};
pub use repository::{
    InMemoryPlanRepository, PlanKey, PlanMetrics, PlanRepository, RepositoryError, ShiftPlan,
};
pub use rules::{
    ComplianceRule, ConfigurationError, RuleDefinition, RuleEngine, Severity, Violation,
    ViolationReport,
};
pub use snapshot::PlanSnapshot;
pub use support::{
    ShiftClassification, ShiftKind, StaffTotals, StoreTotals, SupportAggregate,
    SupportShiftReconciler,
};
pub use time::{ClockTime, InvalidShiftError, NightWindow, ShiftCategory};
