//! Investment plans module - the catalog shown to investors.

mod plans_model;
mod plans_service;
mod plans_traits;


#[cfg(test)]
mod plans_service_tests;

pub use plans_model::{
    check_range_conflict, ranges_overlap, InvestmentPlan, InvestmentPlanUpdate, NewInvestmentPlan,
};
pub use plans_service::PlanService;
pub use plans_traits::{PlanRepositoryTrait, PlanServiceTrait};
