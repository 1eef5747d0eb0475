use serde::Serialize;

use super::domain::{PlanPeriod, Shift, StaffDirectory, StoreId, TenantId};
use super::support::{SupportAggregate, SupportShiftReconciler};
use super::time::InvalidShiftError;

/// Fully materialised view of one plan: everything the rule engine reads, nothing it writes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanSnapshot {
    pub tenant_id: TenantId,
    pub store_id: StoreId,
    pub period: PlanPeriod,
    pub shifts: Vec<Shift>,
    pub directory: StaffDirectory,
    pub aggregate: SupportAggregate,
}

impl PlanSnapshot {
    /// Reconcile the shifts and bundle them with the directory they were checked against.
    pub fn assemble(
        tenant_id: TenantId,
        store_id: StoreId,
        period: PlanPeriod,
        shifts: Vec<Shift>,
        directory: StaffDirectory,
        reconciler: &SupportShiftReconciler,
    ) -> Result<Self, InvalidShiftError> {
        let aggregate = reconciler.aggregate(&shifts, &directory)?;
        Ok(Self {
            tenant_id,
            store_id,
            period,
            shifts,
            directory,
            aggregate,
        })
    }
}
