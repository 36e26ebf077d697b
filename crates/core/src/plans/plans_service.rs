use log::debug;
use std::sync::Arc;

use super::plans_model::{InvestmentPlan, InvestmentPlanUpdate, NewInvestmentPlan};
use super::plans_traits::{PlanRepositoryTrait, PlanServiceTrait};
use crate::errors::{Error, Result, ValidationError};

/// Service for managing the investment plan catalog.
pub struct PlanService {
    repository: Arc<dyn PlanRepositoryTrait>,
}

impl PlanService {
    pub fn new(repository: Arc<dyn PlanRepositoryTrait>) -> Self {
        PlanService { repository }
    }
}

#[async_trait::async_trait]
impl PlanServiceTrait for PlanService {
    fn get_plan(&self, plan_id: &str) -> Result<InvestmentPlan> {
        self.repository.get_plan(plan_id)
    }

    fn list_plans(&self) -> Result<Vec<InvestmentPlan>> {
        self.repository.list_plans()
    }

    async fn create_plan(
        &self,
        new_plan: NewInvestmentPlan,
        force: bool,
    ) -> Result<InvestmentPlan> {
        new_plan.validate()?;
        debug!("Creating plan '{}' (force: {})", new_plan.title, force);
        self.repository.create(new_plan, force).await
    }

    async fn update_plan(
        &self,
        update: InvestmentPlanUpdate,
        force: bool,
    ) -> Result<InvestmentPlan> {
        update.validate()?;
        self.repository.update(update, force).await
    }

    async fn swap_sort_order(
        &self,
        plan_id_a: &str,
        plan_id_b: &str,
    ) -> Result<(InvestmentPlan, InvestmentPlan)> {
        if plan_id_a == plan_id_b {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Cannot swap a plan with itself".to_string(),
            )));
        }
        self.repository.swap_sort_order(plan_id_a, plan_id_b).await
    }

    async fn set_active(&self, plan_id: &str, active: bool) -> Result<InvestmentPlan> {
        self.repository.set_active(plan_id, active).await
    }

    async fn delete_plan(&self, plan_id: &str) -> Result<usize> {
        self.repository.delete(plan_id).await
    }
}
