use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use payvest_core::rules::{NewPlanRule, PlanRule, RuleRepositoryTrait};
use payvest_core::{Error, Result};

use super::model::PlanRuleDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::plan_rules;
use crate::utils::format_timestamp;

pub struct RuleRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl RuleRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        RuleRepository { pool, writer }
    }
}

fn load_rule_tx(conn: &mut SqliteConnection, rule_id: &str) -> Result<Option<PlanRuleDB>> {
    plan_rules::table
        .find(rule_id)
        .first::<PlanRuleDB>(conn)
        .optional()
        .map_err(StorageError::from)
        .map_err(Error::from)
}

#[async_trait]
impl RuleRepositoryTrait for RuleRepository {
    fn get_rule(&self, rule_id: &str) -> Result<PlanRule> {
        let mut conn = get_connection(&self.pool)?;
        let row: Option<PlanRuleDB> = plan_rules::table
            .find(rule_id)
            .first::<PlanRuleDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        row.map(PlanRule::from)
            .ok_or_else(|| Error::NotFound(format!("Plan rule {}", rule_id)))
    }

    fn get_active(&self) -> Result<Option<PlanRule>> {
        let mut conn = get_connection(&self.pool)?;
        let row: Option<PlanRuleDB> = plan_rules::table
            .filter(plan_rules::is_active.eq(true))
            .first::<PlanRuleDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(PlanRule::from))
    }

    fn get_latest(&self) -> Result<Option<PlanRule>> {
        let mut conn = get_connection(&self.pool)?;
        let row: Option<PlanRuleDB> = plan_rules::table
            .order(plan_rules::version.desc())
            .first::<PlanRuleDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(PlanRule::from))
    }

    fn list_rules(&self) -> Result<Vec<PlanRule>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = plan_rules::table
            .order(plan_rules::version.desc())
            .load::<PlanRuleDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(PlanRule::from).collect())
    }

    async fn create(&self, new_rule: NewPlanRule) -> Result<PlanRule> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PlanRule> {
                let bands_json = serde_json::to_string(&new_rule.bands)
                    .map_err(|e| StorageError::SerializationError(e.to_string()))?;

                // Version assignment happens under the writer transaction,
                // so concurrent drafts cannot collide.
                let latest: Option<i32> = plan_rules::table
                    .select(max(plan_rules::version))
                    .first(conn)
                    .map_err(StorageError::from)?;

                let now = Utc::now();
                let now_str = format_timestamp(now);
                let row = PlanRuleDB {
                    id: Uuid::new_v4().to_string(),
                    name: new_rule.name,
                    min_amount: new_rule.min_amount.to_string(),
                    special_min: new_rule.special_min.to_string(),
                    special_rate: new_rule.special_rate.to_string(),
                    bands: bands_json,
                    admin_charge: new_rule.admin_charge.to_string(),
                    booster: new_rule.booster.to_string(),
                    is_active: false,
                    version: latest.unwrap_or(0) + 1,
                    effective_from: format_timestamp(new_rule.effective_from.unwrap_or(now)),
                    created_at: now_str.clone(),
                    updated_at: now_str,
                };

                diesel::insert_into(plan_rules::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(PlanRule::from(row))
            })
            .await
    }

    async fn activate(&self, rule_id: &str) -> Result<PlanRule> {
        let rule_id = rule_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PlanRule> {
                let target = load_rule_tx(conn, &rule_id)?
                    .ok_or_else(|| Error::NotFound(format!("Plan rule {}", rule_id)))?;

                // Already active: nothing to flip, not an error
                if target.is_active {
                    return Ok(PlanRule::from(target));
                }

                let now_str = format_timestamp(Utc::now());

                // Clear the previous holder and promote the target as one
                // transaction; readers never observe two active rules.
                diesel::update(plan_rules::table.filter(plan_rules::is_active.eq(true)))
                    .set((
                        plan_rules::is_active.eq(false),
                        plan_rules::updated_at.eq(&now_str),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                diesel::update(plan_rules::table.find(&rule_id))
                    .set((
                        plan_rules::is_active.eq(true),
                        plan_rules::updated_at.eq(&now_str),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let activated = load_rule_tx(conn, &rule_id)?
                    .ok_or_else(|| Error::NotFound(format!("Plan rule {}", rule_id)))?;
                Ok(PlanRule::from(activated))
            })
            .await
    }
}
