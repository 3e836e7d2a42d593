//! enrollctl-server: Postgres storage and the HTTP API
//!
//! - `db`: connection pool, repositories, Postgres enrollment store
//! - `http`: axum router, extractors, boundary error

pub mod db;
pub mod http;

pub use db::{create_pool, create_pool_with_options, PoolSettings};
pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
