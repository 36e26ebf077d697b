//! Wallets module - user balances, locked funds, and the audit ledger.

mod wallets_model;
mod wallets_service;
mod wallets_traits;


pub use wallets_model::{LedgerEntry, LedgerEntryKind, Wallet, WalletEffect, WalletOp};
pub use wallets_service::WalletService;
pub use wallets_traits::{WalletRepositoryTrait, WalletServiceTrait};
