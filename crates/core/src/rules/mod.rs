//! Plan rules module - rate bands, global payout parameters, activation.

mod rules_model;
mod rules_service;
mod rules_traits;



pub use rules_model::{validate_bands, NewPlanRule, PlanRule, RateBand};
pub use rules_service::RuleService;
pub use rules_traits::{RuleRepositoryTrait, RuleServiceTrait};
