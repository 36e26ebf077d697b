use log::debug;
use std::sync::Arc;

use super::rules_model::{NewPlanRule, PlanRule};
use super::rules_traits::{RuleRepositoryTrait, RuleServiceTrait};
use crate::errors::Result;

/// Service for managing payout rule sets and their activation.
pub struct RuleService {
    repository: Arc<dyn RuleRepositoryTrait>,
}

impl RuleService {
    pub fn new(repository: Arc<dyn RuleRepositoryTrait>) -> Self {
        RuleService { repository }
    }
}

#[async_trait::async_trait]
impl RuleServiceTrait for RuleService {
    fn get_rule(&self, rule_id: &str) -> Result<PlanRule> {
        self.repository.get_rule(rule_id)
    }

    fn get_active(&self) -> Result<Option<PlanRule>> {
        self.repository.get_active()
    }

    fn get_latest(&self) -> Result<Option<PlanRule>> {
        self.repository.get_latest()
    }

    fn list_rules(&self) -> Result<Vec<PlanRule>> {
        self.repository.list_rules()
    }

    async fn create_rule(&self, new_rule: NewPlanRule) -> Result<PlanRule> {
        new_rule.validate()?;
        debug!("Creating plan rule draft '{}'", new_rule.name);
        self.repository.create(new_rule).await
    }

    async fn activate(&self, rule_id: &str) -> Result<PlanRule> {
        debug!("Activating plan rule {}", rule_id);
        self.repository.activate(rule_id).await
    }
}
