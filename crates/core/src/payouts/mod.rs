//! Payouts module - the return calculator and the schedule lifecycle.

mod calculator;
mod payouts_model;
mod payouts_service;
mod payouts_traits;


#[cfg(test)]
mod payouts_service_tests;

pub use calculator::{compute_payout, PayoutBreakdown};
pub use payouts_model::{
    AdvanceOutcome, GenerateSchedule, Payout, PayoutEvent, PayoutFailure, PayoutSimulateResponse,
    PayoutStateUpdate, PayoutStatus,
};
pub use payouts_service::PayoutService;
pub use payouts_traits::{PayoutRepositoryTrait, PayoutServiceTrait};
