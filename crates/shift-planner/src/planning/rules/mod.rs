//! Data-driven compliance evaluation over a plan snapshot.

pub mod definition;
pub(crate) mod predicates;
pub mod report;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::planning::eligibility::EligibilityEvaluator;
use crate::planning::snapshot::PlanSnapshot;

pub use definition::{
    BreachAction, BreakTier, CompiledRule, ComplianceRule, ConfigurationError,
    ConfigurationIssue, PenaltyLevel, RuleCategory, RuleCheck, RuleDefinition, RuleFamily,
    Severity, TimeBand,
};
pub use report::{DataGap, DataGapKind, ReportSummary, Violation, ViolationReport};

use predicates::{EvaluationContext, Findings};

/// Stateless evaluator. Safe to share across threads and to call for any number of plans.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    config: EngineConfig,
    eligibility: EligibilityEvaluator,
}

impl RuleEngine {
    pub fn new(config: EngineConfig) -> Self {
        let eligibility = EligibilityEvaluator::from_config(&config);
        Self {
            config,
            eligibility,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate every active rule of the snapshot's tenant. Unusable rules are reported as
    /// configuration errors and the rest still run.
    pub fn evaluate(&self, snapshot: &PlanSnapshot, rules: &[ComplianceRule]) -> ViolationReport {
        let mut configuration_errors = Vec::new();
        let mut compiled = Vec::new();
        for rule in rules {
            if !rule.active || rule.tenant_id != snapshot.tenant_id {
                continue;
            }
            match rule.compile(&self.config) {
                Ok(rule) => compiled.push(rule),
                Err(err) => {
                    warn!(
                        rule_id = %err.rule_id,
                        code = %err.rule_code,
                        "skipping unusable compliance rule: {}",
                        err.issue
                    );
                    configuration_errors.push(err);
                }
            }
        }

        let mut findings = Findings::default();
        let context = EvaluationContext::prepare(snapshot, &self.eligibility, &mut findings);
        for rule in &compiled {
            let before = findings.violations.len();
            predicates::run(rule, &context, &mut findings);
            debug!(
                rule_id = %rule.rule_id,
                code = %rule.code,
                family = %rule.family(),
                violations = findings.violations.len() - before,
                "rule evaluated"
            );
        }

        ViolationReport::new(findings.violations, configuration_errors, findings.gaps)
    }
}
