//! Tests for the plan service against an in-memory repository.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, RwLock};

    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::errors::{ConflictError, Error, Result};
    use crate::plans::{
        check_range_conflict, InvestmentPlan, InvestmentPlanUpdate, NewInvestmentPlan,
        PlanRepositoryTrait, PlanService, PlanServiceTrait,
    };

    /// In-memory repository mirroring the store's transactional semantics:
    /// the overlap check and the write happen under one write lock.
    struct MockPlanRepository {
        plans: RwLock<Vec<InvestmentPlan>>,
    }

    impl MockPlanRepository {
        fn new() -> Self {
            Self {
                plans: RwLock::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PlanRepositoryTrait for MockPlanRepository {
        fn get_plan(&self, plan_id: &str) -> Result<InvestmentPlan> {
            self.plans
                .read()
                .unwrap()
                .iter()
                .find(|p| p.id == plan_id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("Investment plan {}", plan_id)))
        }

        fn list_plans(&self) -> Result<Vec<InvestmentPlan>> {
            let mut plans = self.plans.read().unwrap().clone();
            plans.sort_by_key(|p| p.sort_order);
            Ok(plans)
        }

        async fn create(
            &self,
            new_plan: NewInvestmentPlan,
            force: bool,
        ) -> Result<InvestmentPlan> {
            let mut plans = self.plans.write().unwrap();
            if !force && new_plan.is_active {
                check_range_conflict(&plans, new_plan.start_month, new_plan.end_month, None)?;
            }
            let now = Utc::now();
            let sort_order = new_plan
                .sort_order
                .unwrap_or_else(|| plans.iter().map(|p| p.sort_order).max().unwrap_or(0) + 1);
            let plan = InvestmentPlan {
                id: Uuid::new_v4().to_string(),
                title: new_plan.title,
                start_month: new_plan.start_month,
                end_month: new_plan.end_month,
                annual_return_percent: new_plan.annual_return_percent,
                min_investment: new_plan.min_investment,
                is_active: new_plan.is_active,
                sort_order,
                created_at: now,
                updated_at: now,
            };
            plans.push(plan.clone());
            Ok(plan)
        }

        async fn update(
            &self,
            update: InvestmentPlanUpdate,
            force: bool,
        ) -> Result<InvestmentPlan> {
            let mut plans = self.plans.write().unwrap();
            if !force && update.is_active {
                check_range_conflict(
                    &plans,
                    update.start_month,
                    update.end_month,
                    Some(&update.id),
                )?;
            }
            let plan = plans
                .iter_mut()
                .find(|p| p.id == update.id)
                .ok_or_else(|| Error::NotFound(format!("Investment plan {}", update.id)))?;
            plan.title = update.title;
            plan.start_month = update.start_month;
            plan.end_month = update.end_month;
            plan.annual_return_percent = update.annual_return_percent;
            plan.min_investment = update.min_investment;
            plan.is_active = update.is_active;
            plan.updated_at = Utc::now();
            Ok(plan.clone())
        }

        async fn swap_sort_order(
            &self,
            plan_id_a: &str,
            plan_id_b: &str,
        ) -> Result<(InvestmentPlan, InvestmentPlan)> {
            let mut plans = self.plans.write().unwrap();
            let pos_a = plans
                .iter()
                .position(|p| p.id == plan_id_a)
                .ok_or_else(|| Error::NotFound(format!("Investment plan {}", plan_id_a)))?;
            let pos_b = plans
                .iter()
                .position(|p| p.id == plan_id_b)
                .ok_or_else(|| Error::NotFound(format!("Investment plan {}", plan_id_b)))?;
            let rank_a = plans[pos_a].sort_order;
            let rank_b = plans[pos_b].sort_order;
            plans[pos_a].sort_order = rank_b;
            plans[pos_b].sort_order = rank_a;
            Ok((plans[pos_a].clone(), plans[pos_b].clone()))
        }

        async fn set_active(&self, plan_id: &str, active: bool) -> Result<InvestmentPlan> {
            let mut plans = self.plans.write().unwrap();
            let plan = plans
                .iter_mut()
                .find(|p| p.id == plan_id)
                .ok_or_else(|| Error::NotFound(format!("Investment plan {}", plan_id)))?;
            plan.is_active = active;
            Ok(plan.clone())
        }

        async fn delete(&self, plan_id: &str) -> Result<usize> {
            let mut plans = self.plans.write().unwrap();
            let before = plans.len();
            plans.retain(|p| p.id != plan_id);
            Ok(before - plans.len())
        }
    }

    fn new_plan(title: &str, start_month: u32, end_month: u32) -> NewInvestmentPlan {
        NewInvestmentPlan {
            title: title.to_string(),
            start_month,
            end_month,
            annual_return_percent: dec!(0.48),
            min_investment: dec!(25000),
            is_active: true,
            sort_order: None,
        }
    }

    fn make_service() -> PlanService {
        PlanService::new(Arc::new(MockPlanRepository::new()))
    }

    #[tokio::test]
    async fn test_overlap_rejected_without_force() {
        let service = make_service();
        service
            .create_plan(new_plan("Silver", 4, 9), false)
            .await
            .unwrap();

        let err = service
            .create_plan(new_plan("Gold", 1, 6), false)
            .await
            .unwrap_err();
        match err {
            Error::Conflict(conflict) => assert_eq!(conflict.code(), "OVERLAP"),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_force_bypasses_overlap() {
        let service = make_service();
        service
            .create_plan(new_plan("Silver", 4, 9), false)
            .await
            .unwrap();
        let forced = service
            .create_plan(new_plan("Gold", 1, 6), true)
            .await
            .unwrap();
        assert_eq!(forced.title, "Gold");
        assert_eq!(service.list_plans().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_inactive_plan_does_not_block_range() {
        let service = make_service();
        let silver = service
            .create_plan(new_plan("Silver", 4, 9), false)
            .await
            .unwrap();
        service.set_active(&silver.id, false).await.unwrap();

        assert!(service
            .create_plan(new_plan("Gold", 1, 6), false)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_update_own_range_is_not_a_conflict() {
        let service = make_service();
        let silver = service
            .create_plan(new_plan("Silver", 4, 9), false)
            .await
            .unwrap();

        let update = InvestmentPlanUpdate {
            id: silver.id.clone(),
            title: "Silver Plus".to_string(),
            start_month: 4,
            end_month: 10,
            annual_return_percent: dec!(0.5),
            min_investment: dec!(30000),
            is_active: true,
        };
        let updated = service.update_plan(update, false).await.unwrap();
        assert_eq!(updated.end_month, 10);
        assert_eq!(updated.title, "Silver Plus");
    }

    #[tokio::test]
    async fn test_sort_orders_are_dense_and_swappable() {
        let service = make_service();
        let first = service
            .create_plan(new_plan("Silver", 1, 3), false)
            .await
            .unwrap();
        let second = service
            .create_plan(new_plan("Gold", 4, 9), false)
            .await
            .unwrap();
        assert_eq!(first.sort_order, 1);
        assert_eq!(second.sort_order, 2);

        let (swapped_a, swapped_b) = service
            .swap_sort_order(&first.id, &second.id)
            .await
            .unwrap();
        assert_eq!(swapped_a.sort_order, 2);
        assert_eq!(swapped_b.sort_order, 1);

        // No duplicate ranks after the swap
        let ranks: Vec<i32> = service
            .list_plans()
            .unwrap()
            .iter()
            .map(|p| p.sort_order)
            .collect();
        assert_eq!(ranks, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_swap_with_self_rejected() {
        let service = make_service();
        let plan = service
            .create_plan(new_plan("Silver", 1, 3), false)
            .await
            .unwrap();
        assert!(matches!(
            service.swap_sort_order(&plan.id, &plan.id).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_swap_with_unknown_plan_changes_nothing() {
        let service = make_service();
        let plan = service
            .create_plan(new_plan("Silver", 1, 3), false)
            .await
            .unwrap();
        assert!(matches!(
            service.swap_sort_order(&plan.id, "missing").await,
            Err(Error::NotFound(_))
        ));
        assert_eq!(service.get_plan(&plan.id).unwrap().sort_order, 1);
    }

    #[tokio::test]
    async fn test_delete_plan() {
        let service = make_service();
        let plan = service
            .create_plan(new_plan("Silver", 1, 3), false)
            .await
            .unwrap();
        assert_eq!(service.delete_plan(&plan.id).await.unwrap(), 1);
        assert!(matches!(
            service.get_plan(&plan.id),
            Err(Error::NotFound(_))
        ));
    }
}
