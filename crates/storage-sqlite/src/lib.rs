//! SQLite storage implementation for the payout engine.
//!
//! This crate provides all database-related functionality using Diesel ORM
//! with SQLite. It implements the repository traits defined in
//! `payvest-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for every engine entity
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place where Diesel dependencies exist; the core
//! crate is database-agnostic and works with traits. All mutations funnel
//! through a single writer actor holding one connection, so read-check-write
//! sequences (wallet invariants, status compares, overlap checks) execute
//! inside one immediate transaction.

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod payouts;
pub mod plans;
pub mod rules;
pub mod settings;
pub mod wallets;
pub mod withdrawals;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors
pub use errors::StorageError;

// Re-export from payvest-core for convenience
pub use payvest_core::errors::{DatabaseError, Error, Result};
