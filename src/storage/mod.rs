mod expenses;
mod flat_file;
mod repository;
mod users;

pub use expenses::*;
pub use flat_file::*;
pub use repository::*;

/// SQL migration for the initial schema (users + expenses)
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");
