//! Command implementations for the oneonone CLI

pub mod migrate;
pub mod serve;

pub use migrate::{run_migrate, MigrateArgs};
pub use serve::{run_serve, ServeArgs};
