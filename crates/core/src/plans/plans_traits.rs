//! Investment plan repository and service traits.

use async_trait::async_trait;

use super::plans_model::{InvestmentPlan, InvestmentPlanUpdate, NewInvestmentPlan};
use crate::errors::Result;

/// Trait defining the contract for plan persistence.
///
/// The overlap check and the write run inside one transaction; `force`
/// bypasses the check, it never bypasses field validation.
#[async_trait]
pub trait PlanRepositoryTrait: Send + Sync {
    /// Retrieves a plan by its ID.
    fn get_plan(&self, plan_id: &str) -> Result<InvestmentPlan>;

    /// Lists all plans by display rank ascending.
    fn list_plans(&self) -> Result<Vec<InvestmentPlan>>;

    /// Inserts a plan, checking the month range against active plans
    /// unless `force` is set.
    async fn create(&self, new_plan: NewInvestmentPlan, force: bool) -> Result<InvestmentPlan>;

    /// Updates a plan under the same overlap discipline as `create`.
    async fn update(&self, update: InvestmentPlanUpdate, force: bool) -> Result<InvestmentPlan>;

    /// Swaps two plans' display ranks atomically - both or neither.
    async fn swap_sort_order(
        &self,
        plan_id_a: &str,
        plan_id_b: &str,
    ) -> Result<(InvestmentPlan, InvestmentPlan)>;

    /// Toggles the soft active flag.
    async fn set_active(&self, plan_id: &str, active: bool) -> Result<InvestmentPlan>;

    /// Removes a plan. Returns the number of deleted records.
    async fn delete(&self, plan_id: &str) -> Result<usize>;
}

/// Trait defining the contract for plan management operations.
#[async_trait]
pub trait PlanServiceTrait: Send + Sync {
    fn get_plan(&self, plan_id: &str) -> Result<InvestmentPlan>;

    fn list_plans(&self) -> Result<Vec<InvestmentPlan>>;

    async fn create_plan(&self, new_plan: NewInvestmentPlan, force: bool)
        -> Result<InvestmentPlan>;

    async fn update_plan(
        &self,
        update: InvestmentPlanUpdate,
        force: bool,
    ) -> Result<InvestmentPlan>;

    async fn swap_sort_order(
        &self,
        plan_id_a: &str,
        plan_id_b: &str,
    ) -> Result<(InvestmentPlan, InvestmentPlan)>;

    async fn set_active(&self, plan_id: &str, active: bool) -> Result<InvestmentPlan>;

    async fn delete_plan(&self, plan_id: &str) -> Result<usize>;
}
