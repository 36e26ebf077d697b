//! Plan rule repository and service traits.

use async_trait::async_trait;

use super::rules_model::{NewPlanRule, PlanRule};
use crate::errors::Result;

/// Trait defining the contract for plan rule persistence.
///
/// Implementations must make `create` and `activate` atomic: a concurrent
/// reader may never observe two active rules, or a half-assigned version.
#[async_trait]
pub trait RuleRepositoryTrait: Send + Sync {
    /// Retrieves a rule by its ID.
    fn get_rule(&self, rule_id: &str) -> Result<PlanRule>;

    /// Returns the single active rule, if any.
    fn get_active(&self) -> Result<Option<PlanRule>>;

    /// Returns the highest-version rule regardless of active state.
    fn get_latest(&self) -> Result<Option<PlanRule>>;

    /// Lists all rules, newest version first.
    fn list_rules(&self) -> Result<Vec<PlanRule>>;

    /// Persists a validated draft; the store assigns `version = latest + 1`.
    async fn create(&self, new_rule: NewPlanRule) -> Result<PlanRule>;

    /// Deactivates the current holder and activates `rule_id` as one unit.
    ///
    /// No-op (returning the rule) when the target is already active;
    /// `NotFound` when it does not exist.
    async fn activate(&self, rule_id: &str) -> Result<PlanRule>;
}

/// Trait defining the contract for rule management operations.
#[async_trait]
pub trait RuleServiceTrait: Send + Sync {
    fn get_rule(&self, rule_id: &str) -> Result<PlanRule>;

    fn get_active(&self) -> Result<Option<PlanRule>>;

    fn get_latest(&self) -> Result<Option<PlanRule>>;

    fn list_rules(&self) -> Result<Vec<PlanRule>>;

    /// Validates band coverage and parameters, then persists the draft.
    async fn create_rule(&self, new_rule: NewPlanRule) -> Result<PlanRule>;

    /// Promotes `rule_id` to be the single active rule.
    async fn activate(&self, rule_id: &str) -> Result<PlanRule>;
}
