//! Database reset for integration tests.
//!
//! [`clean_database`] empties every table of a PostgreSQL schema and restarts
//! its sequences at 1, leaving the migration history table alone so the
//! schema does not have to be migrated again.

mod config;
mod error;
mod reset;

pub use config::{ResetConfig, DEFAULT_EXCLUDED_TABLE, DEFAULT_SCHEMA};
pub use error::ResetError;
pub use reset::{clean_database, clean_database_with, ResetReport};
