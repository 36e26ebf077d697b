use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use payvest_core::plans::{
    check_range_conflict, InvestmentPlan, InvestmentPlanUpdate, NewInvestmentPlan,
    PlanRepositoryTrait,
};
use payvest_core::{Error, Result};

use super::model::InvestmentPlanDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::investment_plans;
use crate::utils::format_timestamp;

pub struct PlanRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PlanRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PlanRepository { pool, writer }
    }
}

/// Overlap validation against the active catalog, inside the caller's
/// transaction. The check and the subsequent write commit together, so a
/// concurrent admin cannot slip a conflicting range in between.
fn check_overlap_tx(
    conn: &mut SqliteConnection,
    start_month: u32,
    end_month: u32,
    exclude_id: Option<&str>,
) -> Result<()> {
    let active: Vec<InvestmentPlanDB> = investment_plans::table
        .filter(investment_plans::is_active.eq(true))
        .load::<InvestmentPlanDB>(conn)
        .map_err(StorageError::from)?;
    let plans: Vec<InvestmentPlan> = active.into_iter().map(InvestmentPlan::from).collect();
    check_range_conflict(&plans, start_month, end_month, exclude_id)
}

fn load_plan_tx(conn: &mut SqliteConnection, plan_id: &str) -> Result<InvestmentPlanDB> {
    investment_plans::table
        .find(plan_id)
        .first::<InvestmentPlanDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::NotFound(format!("Investment plan {}", plan_id)))
}

#[async_trait]
impl PlanRepositoryTrait for PlanRepository {
    fn get_plan(&self, plan_id: &str) -> Result<InvestmentPlan> {
        let mut conn = get_connection(&self.pool)?;
        let row: Option<InvestmentPlanDB> = investment_plans::table
            .find(plan_id)
            .first::<InvestmentPlanDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        row.map(InvestmentPlan::from)
            .ok_or_else(|| Error::NotFound(format!("Investment plan {}", plan_id)))
    }

    fn list_plans(&self) -> Result<Vec<InvestmentPlan>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = investment_plans::table
            .order(investment_plans::sort_order.asc())
            .load::<InvestmentPlanDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(InvestmentPlan::from).collect())
    }

    async fn create(&self, new_plan: NewInvestmentPlan, force: bool) -> Result<InvestmentPlan> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<InvestmentPlan> {
                if !force && new_plan.is_active {
                    check_overlap_tx(conn, new_plan.start_month, new_plan.end_month, None)?;
                }

                let sort_order = match new_plan.sort_order {
                    Some(rank) => rank,
                    None => {
                        let highest: Option<i32> = investment_plans::table
                            .select(max(investment_plans::sort_order))
                            .first(conn)
                            .map_err(StorageError::from)?;
                        highest.unwrap_or(0) + 1
                    }
                };

                let now_str = format_timestamp(Utc::now());
                let row = InvestmentPlanDB {
                    id: Uuid::new_v4().to_string(),
                    title: new_plan.title,
                    start_month: new_plan.start_month as i32,
                    end_month: new_plan.end_month as i32,
                    annual_return_percent: new_plan.annual_return_percent.to_string(),
                    min_investment: new_plan.min_investment.to_string(),
                    is_active: new_plan.is_active,
                    sort_order,
                    created_at: now_str.clone(),
                    updated_at: now_str,
                };

                diesel::insert_into(investment_plans::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(InvestmentPlan::from(row))
            })
            .await
    }

    async fn update(&self, update: InvestmentPlanUpdate, force: bool) -> Result<InvestmentPlan> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<InvestmentPlan> {
                if !force && update.is_active {
                    check_overlap_tx(
                        conn,
                        update.start_month,
                        update.end_month,
                        Some(&update.id),
                    )?;
                }

                let mut row = load_plan_tx(conn, &update.id)?;
                row.title = update.title;
                row.start_month = update.start_month as i32;
                row.end_month = update.end_month as i32;
                row.annual_return_percent = update.annual_return_percent.to_string();
                row.min_investment = update.min_investment.to_string();
                row.is_active = update.is_active;
                row.updated_at = format_timestamp(Utc::now());

                diesel::update(investment_plans::table.find(&update.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(InvestmentPlan::from(row))
            })
            .await
    }

    async fn swap_sort_order(
        &self,
        plan_id_a: &str,
        plan_id_b: &str,
    ) -> Result<(InvestmentPlan, InvestmentPlan)> {
        let plan_id_a = plan_id_a.to_string();
        let plan_id_b = plan_id_b.to_string();
        self.writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<(InvestmentPlan, InvestmentPlan)> {
                    let row_a = load_plan_tx(conn, &plan_id_a)?;
                    let row_b = load_plan_tx(conn, &plan_id_b)?;
                    let now_str = format_timestamp(Utc::now());

                    // Both ranks move in one transaction, so a failure
                    // cannot leave duplicate positions behind.
                    diesel::update(investment_plans::table.find(&plan_id_a))
                        .set((
                            investment_plans::sort_order.eq(row_b.sort_order),
                            investment_plans::updated_at.eq(&now_str),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    diesel::update(investment_plans::table.find(&plan_id_b))
                        .set((
                            investment_plans::sort_order.eq(row_a.sort_order),
                            investment_plans::updated_at.eq(&now_str),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;

                    let swapped_a = load_plan_tx(conn, &plan_id_a)?;
                    let swapped_b = load_plan_tx(conn, &plan_id_b)?;
                    Ok((
                        InvestmentPlan::from(swapped_a),
                        InvestmentPlan::from(swapped_b),
                    ))
                },
            )
            .await
    }

    async fn set_active(&self, plan_id: &str, active: bool) -> Result<InvestmentPlan> {
        let plan_id = plan_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<InvestmentPlan> {
                load_plan_tx(conn, &plan_id)?;
                diesel::update(investment_plans::table.find(&plan_id))
                    .set((
                        investment_plans::is_active.eq(active),
                        investment_plans::updated_at.eq(format_timestamp(Utc::now())),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let row = load_plan_tx(conn, &plan_id)?;
                Ok(InvestmentPlan::from(row))
            })
            .await
    }

    async fn delete(&self, plan_id: &str) -> Result<usize> {
        let plan_id = plan_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(
                    diesel::delete(investment_plans::table.find(&plan_id))
                        .execute(conn)
                        .map_err(StorageError::from)?,
                )
            })
            .await
    }
}
