//! Tests for the payout service lifecycle orchestration.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, RwLock};

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::errors::{ConflictError, Error, Result};
    use crate::payouts::{
        GenerateSchedule, Payout, PayoutEvent, PayoutRepositoryTrait, PayoutService,
        PayoutServiceTrait, PayoutStateUpdate, PayoutStatus,
    };
    use crate::rules::{NewPlanRule, PlanRule, RateBand, RuleServiceTrait};
    use crate::wallets::{LedgerEntryKind, WalletEffect};

    // ============== Mock rule service ==============

    struct MockRuleService {
        active: RwLock<Option<PlanRule>>,
    }

    impl MockRuleService {
        fn with_rule(rule: PlanRule) -> Self {
            Self {
                active: RwLock::new(Some(rule)),
            }
        }

        fn empty() -> Self {
            Self {
                active: RwLock::new(None),
            }
        }

        fn set_active(&self, rule: PlanRule) {
            *self.active.write().unwrap() = Some(rule);
        }
    }

    #[async_trait]
    impl RuleServiceTrait for MockRuleService {
        fn get_rule(&self, _: &str) -> Result<PlanRule> {
            unimplemented!()
        }
        fn get_active(&self) -> Result<Option<PlanRule>> {
            Ok(self.active.read().unwrap().clone())
        }
        fn get_latest(&self) -> Result<Option<PlanRule>> {
            unimplemented!()
        }
        fn list_rules(&self) -> Result<Vec<PlanRule>> {
            unimplemented!()
        }
        async fn create_rule(&self, _: NewPlanRule) -> Result<PlanRule> {
            unimplemented!()
        }
        async fn activate(&self, _: &str) -> Result<PlanRule> {
            unimplemented!()
        }
    }

    // ============== Mock payout repository ==============

    /// Mirrors the store contract: status compare inside the "transaction",
    /// credits keyed on the payout id applied at most once.
    struct MockPayoutRepository {
        payouts: RwLock<Vec<Payout>>,
        credits: RwLock<Vec<(String, Decimal)>>,
    }

    impl MockPayoutRepository {
        fn new() -> Self {
            Self {
                payouts: RwLock::new(Vec::new()),
                credits: RwLock::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PayoutRepositoryTrait for MockPayoutRepository {
        fn get_payout(&self, payout_id: &str) -> Result<Payout> {
            self.payouts
                .read()
                .unwrap()
                .iter()
                .find(|p| p.id == payout_id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("Payout {}", payout_id)))
        }

        fn list_for_investment(&self, investment_id: &str) -> Result<Vec<Payout>> {
            let mut payouts: Vec<Payout> = self
                .payouts
                .read()
                .unwrap()
                .iter()
                .filter(|p| p.investment_id == investment_id)
                .cloned()
                .collect();
            payouts.sort_by_key(|p| p.month_no);
            Ok(payouts)
        }

        fn list_due(&self, as_of: DateTime<Utc>) -> Result<Vec<Payout>> {
            Ok(self
                .payouts
                .read()
                .unwrap()
                .iter()
                .filter(|p| p.status == PayoutStatus::Scheduled && p.due_date <= as_of)
                .cloned()
                .collect())
        }

        async fn create_many(&self, new_payouts: Vec<Payout>) -> Result<usize> {
            let mut payouts = self.payouts.write().unwrap();
            let count = new_payouts.len();
            payouts.extend(new_payouts);
            Ok(count)
        }

        async fn transition(
            &self,
            payout_id: &str,
            expected: PayoutStatus,
            update: PayoutStateUpdate,
            effect: Option<WalletEffect>,
        ) -> Result<Payout> {
            let mut payouts = self.payouts.write().unwrap();
            let payout = payouts
                .iter_mut()
                .find(|p| p.id == payout_id)
                .ok_or_else(|| Error::NotFound(format!("Payout {}", payout_id)))?;
            if payout.status != expected {
                return Err(Error::Conflict(ConflictError::ConcurrentMutation(format!(
                    "payout {} is {}",
                    payout_id,
                    payout.status.as_str()
                ))));
            }
            if let Some(effect) = effect {
                let mut credits = self.credits.write().unwrap();
                let already_credited = credits.iter().any(|(id, _)| id == payout_id);
                if effect.op.kind() == LedgerEntryKind::Credit && !already_credited {
                    credits.push((payout_id.to_string(), effect.op.amount()));
                }
            }
            payout.status = update.status;
            if update.amount.is_some() {
                payout.amount = update.amount;
            }
            if update.reason.is_some() {
                payout.reason = update.reason;
            }
            if update.paid_at.is_some() {
                payout.paid_at = update.paid_at;
            }
            payout.updated_at = Utc::now();
            Ok(payout.clone())
        }
    }

    // ============== Helpers ==============

    fn band(from_month: u32, to_month: u32, rate: Decimal) -> RateBand {
        RateBand {
            from_month,
            to_month,
            monthly_rate: rate,
        }
    }

    fn rule_with_rate(rate: Decimal) -> PlanRule {
        let now = Utc::now();
        PlanRule {
            id: "rule-1".to_string(),
            name: "Standard".to_string(),
            min_amount: dec!(10000),
            special_min: dec!(500000),
            special_rate: dec!(0.05),
            bands: vec![band(1, 12, rate)],
            admin_charge: dec!(0.05),
            booster: dec!(0.01),
            active: true,
            version: 1,
            effective_from: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn make_service(
        rule_service: Arc<MockRuleService>,
    ) -> (PayoutService, Arc<MockPayoutRepository>) {
        let repo = Arc::new(MockPayoutRepository::new());
        (PayoutService::new(repo.clone(), rule_service), repo)
    }

    fn schedule_request(months: u32) -> GenerateSchedule {
        GenerateSchedule {
            investment_id: "inv-1".to_string(),
            user_id: "user-1".to_string(),
            principal: dec!(100000),
            accepted_at: Utc::now() - Duration::days(400),
            duration_months: months,
            booster_applied: false,
        }
    }

    // ============== Schedule generation ==============

    #[tokio::test]
    async fn test_generate_schedule_creates_one_payout_per_month() {
        let rules = Arc::new(MockRuleService::with_rule(rule_with_rate(dec!(0.04))));
        let (service, _) = make_service(rules);

        let payouts = service.generate_schedule(schedule_request(12)).await.unwrap();

        assert_eq!(payouts.len(), 12);
        for (i, payout) in payouts.iter().enumerate() {
            assert_eq!(payout.month_no as usize, i + 1);
            assert_eq!(payout.status, PayoutStatus::Scheduled);
            assert!(payout.amount.is_none());
        }
        // Due dates advance month by month
        assert!(payouts.windows(2).all(|w| w[0].due_date < w[1].due_date));
    }

    #[tokio::test]
    async fn test_generate_schedule_rejects_principal_below_minimum() {
        let rules = Arc::new(MockRuleService::with_rule(rule_with_rate(dec!(0.04))));
        let (service, _) = make_service(rules);

        let mut request = schedule_request(12);
        request.principal = dec!(9999);
        assert!(matches!(
            service.generate_schedule(request).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_schedule_requires_active_rule() {
        let (service, _) = make_service(Arc::new(MockRuleService::empty()));
        assert!(matches!(
            service.generate_schedule(schedule_request(12)).await,
            Err(Error::NotFound(_))
        ));
    }

    // ============== Batch advancement ==============

    #[tokio::test]
    async fn test_advance_credits_and_pays_due_payouts() {
        let rules = Arc::new(MockRuleService::with_rule(rule_with_rate(dec!(0.04))));
        let (service, repo) = make_service(rules);

        service.generate_schedule(schedule_request(3)).await.unwrap();
        let outcome = service.advance_due_schedules(Utc::now()).await.unwrap();

        assert_eq!(outcome.paid.len(), 3);
        assert!(outcome.failed.is_empty());
        for payout in repo.payouts.read().unwrap().iter() {
            assert_eq!(payout.status, PayoutStatus::Paid);
            // net = 100000 * 0.04 * 0.95
            assert_eq!(payout.amount, Some(dec!(3800.00)));
            assert!(payout.paid_at.is_some());
        }
        let credits = repo.credits.read().unwrap();
        assert_eq!(credits.len(), 3);
        assert!(credits.iter().all(|(_, amount)| *amount == dec!(3800.00)));
    }

    #[tokio::test]
    async fn test_advance_skips_undue_and_held_payouts() {
        let rules = Arc::new(MockRuleService::with_rule(rule_with_rate(dec!(0.04))));
        let (service, repo) = make_service(rules);

        let mut request = schedule_request(12);
        request.accepted_at = Utc::now() - Duration::days(65);
        let payouts = service.generate_schedule(request).await.unwrap();
        service
            .transition(&payouts[0].id, PayoutEvent::Hold)
            .await
            .unwrap();

        let outcome = service.advance_due_schedules(Utc::now()).await.unwrap();

        // Two months elapsed, one of them held
        assert_eq!(outcome.paid.len(), 1);
        assert_eq!(outcome.paid[0], payouts[1].id);
        let stored = repo.payouts.read().unwrap();
        assert_eq!(
            stored.iter().find(|p| p.id == payouts[0].id).unwrap().status,
            PayoutStatus::OnHold
        );
    }

    #[tokio::test]
    async fn test_amounts_follow_the_rule_active_at_due_date() {
        let rules = Arc::new(MockRuleService::with_rule(rule_with_rate(dec!(0.04))));
        let (service, repo) = make_service(rules.clone());

        let mut request = schedule_request(2);
        request.accepted_at = Utc::now() - Duration::days(35);
        let payouts = service.generate_schedule(request).await.unwrap();

        // The rate changes after the schedule was created
        rules.set_active(rule_with_rate(dec!(0.03)));
        service.advance_due_schedules(Utc::now()).await.unwrap();

        let stored = repo.payouts.read().unwrap();
        let first = stored.iter().find(|p| p.id == payouts[0].id).unwrap();
        // 100000 * 0.03 * 0.95 - computed live, not frozen at creation
        assert_eq!(first.amount, Some(dec!(2850.00)));
    }

    #[tokio::test]
    async fn test_uncovered_month_marks_payout_failed() {
        let rules = Arc::new(MockRuleService::with_rule(rule_with_rate(dec!(0.04))));
        let (service, repo) = make_service(rules.clone());

        // 14-month schedule against a 12-month band table
        let mut request = schedule_request(14);
        request.accepted_at = Utc::now() - Duration::days(450);
        service.generate_schedule(request).await.unwrap();

        let outcome = service.advance_due_schedules(Utc::now()).await.unwrap();

        assert_eq!(outcome.paid.len(), 12);
        assert_eq!(outcome.failed.len(), 2);
        let stored = repo.payouts.read().unwrap();
        let failed: Vec<_> = stored
            .iter()
            .filter(|p| p.status == PayoutStatus::Failed)
            .collect();
        assert_eq!(failed.len(), 2);
        assert!(failed.iter().all(|p| p
            .reason
            .as_deref()
            .unwrap()
            .contains("No rate band covers month")));
    }

    // ============== Single transitions ==============

    #[tokio::test]
    async fn test_reprocess_does_not_credit_twice() {
        let rules = Arc::new(MockRuleService::with_rule(rule_with_rate(dec!(0.04))));
        let (service, repo) = make_service(rules);

        let payouts = service.generate_schedule(schedule_request(1)).await.unwrap();
        let id = payouts[0].id.clone();

        // First attempt: credit lands, confirmation is then failed by an admin
        service
            .transition(&id, PayoutEvent::BeginProcessing)
            .await
            .unwrap();
        service
            .transition(
                &id,
                PayoutEvent::Fail {
                    reason: "rail timeout".to_string(),
                },
            )
            .await
            .unwrap();

        // Retry loop re-enters processing; the repository skips the credit
        service.transition(&id, PayoutEvent::Reprocess).await.unwrap();
        service
            .transition(&id, PayoutEvent::BeginProcessing)
            .await
            .unwrap();
        let paid = service.transition(&id, PayoutEvent::ConfirmPaid).await.unwrap();

        assert_eq!(paid.status, PayoutStatus::Paid);
        assert_eq!(repo.credits.read().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_event_is_rejected() {
        let rules = Arc::new(MockRuleService::with_rule(rule_with_rate(dec!(0.04))));
        let (service, _) = make_service(rules);

        let payouts = service.generate_schedule(schedule_request(1)).await.unwrap();
        assert!(matches!(
            service
                .transition(&payouts[0].id, PayoutEvent::ConfirmPaid)
                .await,
            Err(Error::Validation(_))
        ));
    }
}
