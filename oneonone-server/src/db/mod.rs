//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - Connection pool (configurable, default 5) - no Arc<Mutex<Connection>>
//! - List operations use JOINs or one batched query - no N+1 queries
//! - Rely on DB constraints, map violations to `DbError`
//! - Transactions for multi-table writes

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::create_pool;
pub use repos::*;
