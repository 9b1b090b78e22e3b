//! GovDesk Database — SurrealDB connection management, schema
//! migrations, repository implementations, and demo seeding.

mod connection;
mod error;
pub mod repository;
mod schema;
pub mod seed;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
