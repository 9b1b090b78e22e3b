//! Database-specific error types and conversions.

use govdesk_core::error::GovError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    Conflict { entity: String },
}

impl DbError {
    /// Classify a failed statement check. Unique-index violations
    /// surface as `Conflict`, everything else as `Query`.
    pub(crate) fn from_check(err: surrealdb::Error, entity: &str) -> Self {
        let msg = err.to_string();
        if msg.contains("already contains") {
            DbError::Conflict {
                entity: entity.into(),
            }
        } else {
            DbError::Query(msg)
        }
    }
}

impl From<DbError> for GovError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => GovError::NotFound { entity, id },
            DbError::Conflict { entity } => GovError::AlreadyExists { entity },
            other => GovError::Database(other.to_string()),
        }
    }
}
