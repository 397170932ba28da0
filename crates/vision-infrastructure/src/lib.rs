//! # Vision Infrastructure
//!
//! PostgreSQL implementations of the vision-core repository ports.

pub mod database;

pub use database::{create_pool, run_migrations, PgCompanyRepository, PgGrantRepository, PgVisionRepository};
