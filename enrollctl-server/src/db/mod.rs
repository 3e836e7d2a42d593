//! Database layer - connection pool and repositories
//!
//! # Design Principles
//!
//! - Connection pool passed explicitly - no global handle
//! - One query per operation where SQL allows it
//! - Uniqueness pre-checks give friendly conflicts; constraint violations
//!   from races map to the same conflicts
//! - Transactions for multi-step operations

pub mod pool;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options, PoolSettings};
pub use repos::*;
