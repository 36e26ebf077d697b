//! Withdrawals module - request lifecycle and fund locking.

mod withdrawals_model;
mod withdrawals_service;
mod withdrawals_traits;

#[cfg(test)]
mod withdrawals_model_tests;


pub use withdrawals_model::{
    NewWithdrawalRequest, Withdrawal, WithdrawalEvent, WithdrawalSource, WithdrawalStateUpdate,
    WithdrawalStatus,
};
pub use withdrawals_service::WithdrawalService;
pub use withdrawals_traits::{WithdrawalRepositoryTrait, WithdrawalServiceTrait};
