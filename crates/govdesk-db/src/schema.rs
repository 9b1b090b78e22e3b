//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as snake_case strings
//! with ASSERT constraints for validation. Calendar dates are stored
//! as ISO `YYYY-MM-DD` strings so they round-trip without timezone
//! drift.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (global scope)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Users (tenant scope; email is the global login key)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD roles ON TABLE user TYPE array;
DEFINE FIELD roles.* ON TABLE user TYPE string;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_tenant ON TABLE user COLUMNS tenant_id;

-- =======================================================================
-- Compliance KPI measurements (tenant scope)
-- =======================================================================
DEFINE TABLE compliance_kpi SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE compliance_kpi TYPE string;
DEFINE FIELD kpi_id ON TABLE compliance_kpi TYPE string;
DEFINE FIELD name ON TABLE compliance_kpi TYPE string;
DEFINE FIELD value ON TABLE compliance_kpi TYPE float;
DEFINE FIELD measured_at ON TABLE compliance_kpi TYPE datetime;
DEFINE INDEX idx_kpi_tenant_kpi_id ON TABLE compliance_kpi \
    COLUMNS tenant_id, kpi_id UNIQUE;

-- =======================================================================
-- ISO referential enablement (tenant scope)
-- =======================================================================
DEFINE TABLE tenant_iso_profile SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE tenant_iso_profile TYPE string;
DEFINE FIELD iso_code ON TABLE tenant_iso_profile TYPE string;
DEFINE FIELD name ON TABLE tenant_iso_profile TYPE string;
DEFINE FIELD enabled ON TABLE tenant_iso_profile TYPE bool \
    DEFAULT false;
DEFINE INDEX idx_iso_tenant_code ON TABLE tenant_iso_profile \
    COLUMNS tenant_id, iso_code UNIQUE;

-- =======================================================================
-- AI usage policy (tenant scope, at most one row per tenant)
-- =======================================================================
DEFINE TABLE ai_usage_policy SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE ai_usage_policy TYPE string;
DEFINE FIELD min_iqi_authorized ON TABLE ai_usage_policy TYPE float;
DEFINE FIELD min_iqi_assisted ON TABLE ai_usage_policy TYPE float;
DEFINE FIELD updated_at ON TABLE ai_usage_policy TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_policy_tenant ON TABLE ai_usage_policy \
    COLUMNS tenant_id UNIQUE;

-- =======================================================================
-- Knowledge sources and documents (tenant scope)
-- =======================================================================
DEFINE TABLE knowledge_source SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE knowledge_source TYPE string;
DEFINE FIELD source_id ON TABLE knowledge_source TYPE string;
DEFINE FIELD source_type ON TABLE knowledge_source TYPE string;
DEFINE FIELD name ON TABLE knowledge_source TYPE string;
DEFINE FIELD description ON TABLE knowledge_source TYPE string;
DEFINE INDEX idx_source_tenant_id ON TABLE knowledge_source \
    COLUMNS tenant_id, source_id UNIQUE;

DEFINE TABLE knowledge_document SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE knowledge_document TYPE string;
DEFINE FIELD document_id ON TABLE knowledge_document TYPE string;
DEFINE FIELD source_id ON TABLE knowledge_document TYPE string;
DEFINE FIELD title ON TABLE knowledge_document TYPE string;
DEFINE FIELD doc_type ON TABLE knowledge_document TYPE string;
DEFINE FIELD url ON TABLE knowledge_document TYPE string;
DEFINE FIELD last_updated ON TABLE knowledge_document TYPE string;
DEFINE FIELD confidence_score ON TABLE knowledge_document TYPE float;
DEFINE FIELD validated ON TABLE knowledge_document TYPE bool \
    DEFAULT false;
DEFINE FIELD owner ON TABLE knowledge_document TYPE string;
DEFINE INDEX idx_document_tenant_id ON TABLE knowledge_document \
    COLUMNS tenant_id, document_id UNIQUE;

-- =======================================================================
-- AI usage log (tenant scope, append-only)
-- =======================================================================
DEFINE TABLE ai_usage_log SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD tenant_id ON TABLE ai_usage_log TYPE string;
DEFINE FIELD document_id ON TABLE ai_usage_log TYPE string;
DEFINE FIELD decision ON TABLE ai_usage_log TYPE string \
    ASSERT $value IN ['authorized', 'assisted', 'forbidden'];
DEFINE FIELD checked_at ON TABLE ai_usage_log TYPE datetime;
DEFINE FIELD intent ON TABLE ai_usage_log TYPE string;
DEFINE INDEX idx_usage_tenant_time ON TABLE ai_usage_log \
    COLUMNS tenant_id, checked_at;

-- =======================================================================
-- Governance programs (tenant scope, at most one per tenant)
-- =======================================================================
DEFINE TABLE program SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE program TYPE string;
DEFINE FIELD name ON TABLE program TYPE string;
DEFINE FIELD status ON TABLE program TYPE string \
    ASSERT $value IN ['not_started', 'in_progress', 'completed'];
DEFINE FIELD start_date ON TABLE program TYPE option<string>;
DEFINE FIELD end_date ON TABLE program TYPE option<string>;
DEFINE FIELD created_by ON TABLE program TYPE string;
DEFINE FIELD created_at ON TABLE program TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE program TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_program_tenant ON TABLE program \
    COLUMNS tenant_id UNIQUE;

-- =======================================================================
-- Workshop instances (program scope)
-- =======================================================================
DEFINE TABLE workshop_instance SCHEMAFULL;
DEFINE FIELD program_id ON TABLE workshop_instance TYPE string;
DEFINE FIELD workshop_number ON TABLE workshop_instance TYPE int;
DEFINE FIELD status ON TABLE workshop_instance TYPE string \
    ASSERT $value IN ['not_started', 'in_progress', 'completed'];
DEFINE FIELD completion_criteria_state ON TABLE workshop_instance \
    TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD started_at ON TABLE workshop_instance \
    TYPE option<datetime>;
DEFINE FIELD completed_at ON TABLE workshop_instance \
    TYPE option<datetime>;
DEFINE INDEX idx_workshop_program_number ON TABLE workshop_instance \
    COLUMNS program_id, workshop_number UNIQUE;

-- =======================================================================
-- Checklist item instances (program scope)
-- =======================================================================
DEFINE TABLE item_instance SCHEMAFULL;
DEFINE FIELD program_id ON TABLE item_instance TYPE string;
DEFINE FIELD item_id ON TABLE item_instance TYPE string;
DEFINE FIELD workshop_number ON TABLE item_instance TYPE int;
DEFINE FIELD status ON TABLE item_instance TYPE string \
    ASSERT $value IN ['not_started', 'in_progress', 'done', \
    'validated'];
DEFINE FIELD owner_user_id ON TABLE item_instance TYPE option<string>;
DEFINE FIELD due_date ON TABLE item_instance TYPE option<string>;
DEFINE FIELD notes_markdown ON TABLE item_instance \
    TYPE option<string>;
DEFINE FIELD acceptance_state ON TABLE item_instance \
    TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD done_override ON TABLE item_instance TYPE bool \
    DEFAULT false;
DEFINE FIELD validated_by ON TABLE item_instance TYPE option<string>;
DEFINE FIELD validated_at ON TABLE item_instance \
    TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE item_instance TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE item_instance TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_item_program_item_id ON TABLE item_instance \
    COLUMNS program_id, item_id UNIQUE;
DEFINE INDEX idx_item_program_workshop ON TABLE item_instance \
    COLUMNS program_id, workshop_number;

-- =======================================================================
-- Action ledger (program scope)
-- =======================================================================
DEFINE TABLE action SCHEMAFULL;
DEFINE FIELD program_id ON TABLE action TYPE string;
DEFINE FIELD workshop_number ON TABLE action TYPE option<int>;
DEFINE FIELD item_id ON TABLE action TYPE option<string>;
DEFINE FIELD title ON TABLE action TYPE string;
DEFINE FIELD description ON TABLE action TYPE option<string>;
DEFINE FIELD priority ON TABLE action TYPE string \
    ASSERT $value IN ['low', 'medium', 'high', 'critical'];
DEFINE FIELD status ON TABLE action TYPE string \
    ASSERT $value IN ['open', 'in_progress', 'done', 'closed'];
DEFINE FIELD owner_user_id ON TABLE action TYPE option<string>;
DEFINE FIELD due_date ON TABLE action TYPE option<string>;
DEFINE FIELD created_at ON TABLE action TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE action TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_action_program ON TABLE action COLUMNS program_id;

-- =======================================================================
-- Decision ledger (program scope)
-- =======================================================================
DEFINE TABLE decision SCHEMAFULL;
DEFINE FIELD program_id ON TABLE decision TYPE string;
DEFINE FIELD workshop_number ON TABLE decision TYPE option<int>;
DEFINE FIELD item_id ON TABLE decision TYPE option<string>;
DEFINE FIELD decision_text ON TABLE decision TYPE string;
DEFINE FIELD decided_by ON TABLE decision TYPE string;
DEFINE FIELD decided_at ON TABLE decision TYPE datetime;
DEFINE FIELD evidence_links ON TABLE decision TYPE array;
DEFINE FIELD evidence_links.* ON TABLE decision TYPE string;
DEFINE FIELD created_at ON TABLE decision TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_decision_program ON TABLE decision COLUMNS program_id;

-- =======================================================================
-- Evidence ledger (program scope)
-- =======================================================================
DEFINE TABLE evidence SCHEMAFULL;
DEFINE FIELD program_id ON TABLE evidence TYPE string;
DEFINE FIELD workshop_number ON TABLE evidence TYPE option<int>;
DEFINE FIELD item_id ON TABLE evidence TYPE option<string>;
DEFINE FIELD evidence_type ON TABLE evidence TYPE string \
    ASSERT $value IN ['document', 'link', 'screenshot', 'file'];
DEFINE FIELD title ON TABLE evidence TYPE string;
DEFINE FIELD url ON TABLE evidence TYPE option<string>;
DEFINE FIELD file_ref ON TABLE evidence TYPE option<string>;
DEFINE FIELD date ON TABLE evidence TYPE string;
DEFINE FIELD owner ON TABLE evidence TYPE string;
DEFINE FIELD created_at ON TABLE evidence TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_evidence_program ON TABLE evidence COLUMNS program_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn schema_defines_every_table() {
        for table in [
            "tenant",
            "user",
            "compliance_kpi",
            "tenant_iso_profile",
            "ai_usage_policy",
            "knowledge_source",
            "knowledge_document",
            "ai_usage_log",
            "program",
            "workshop_instance",
            "item_instance",
            "action",
            "decision",
            "evidence",
        ] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} ")),
                "missing table definition: {table}"
            );
        }
    }
}
