//! oneonone-server: HTTP service for one-on-one meetings
//!
//! - `models`: validated value types for user input
//! - `db`: Postgres pool, migrations and repositories
//! - `store`: the persistence gateway handlers depend on
//! - `http`: axum router, extractors, forms and route handlers

pub mod db;
pub mod http;
pub mod models;
pub mod store;

pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};
pub use store::{MemoryStore, PgStore, Store};
