//! SurrealDB implementation of [`ProgramRepository`].
//!
//! Program creation is transactional: the program row and every
//! workshop and item instance are written in a single BEGIN/COMMIT
//! block so a concurrent creation attempt leaves no partial state
//! behind. The unique index on `program.tenant_id` is the arbiter;
//! the loser's transaction rolls back and surfaces as a conflict.

use chrono::{DateTime, Utc};
use govdesk_core::error::GovResult;
use govdesk_core::models::program::{Program, ProgramStatus};
use govdesk_core::models::workshop::WorkshopInstance;
use govdesk_core::models::item::ItemInstance;
use govdesk_core::repository::ProgramRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{bool_map_to_json, date_to_string, parse_date, parse_uuid};

#[derive(Debug, SurrealValue)]
struct ProgramRow {
    record_id: String,
    tenant_id: String,
    name: String,
    status: String,
    start_date: Option<String>,
    end_date: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<ProgramStatus, DbError> {
    ProgramStatus::parse(s)
        .ok_or_else(|| DbError::Query(format!("unknown program status: {s}")))
}

impl ProgramRow {
    fn try_into_program(self) -> Result<Program, DbError> {
        Ok(Program {
            id: parse_uuid(&self.record_id, "program")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            name: self.name,
            status: parse_status(&self.status)?,
            start_date: parse_date(self.start_date, "start_date")?,
            end_date: parse_date(self.end_date, "end_date")?,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn workshop_payload(w: &WorkshopInstance) -> serde_json::Value {
    // Datetime columns are left out so the schema's DEFAULT applies;
    // started_at/completed_at are absent at creation by construction.
    serde_json::json!({
        "id": w.id.to_string(),
        "program_id": w.program_id.to_string(),
        "workshop_number": w.workshop_number,
        "status": w.status.as_str(),
        "completion_criteria_state": bool_map_to_json(&w.completion_criteria_state),
    })
}

fn item_payload(i: &ItemInstance) -> serde_json::Value {
    serde_json::json!({
        "id": i.id.to_string(),
        "program_id": i.program_id.to_string(),
        "item_id": i.item_id,
        "workshop_number": i.workshop_number,
        "status": i.status.as_str(),
        "acceptance_state": bool_map_to_json(&i.acceptance_state),
        "done_override": i.done_override,
    })
}

/// SurrealDB implementation of the Program repository.
#[derive(Clone)]
pub struct SurrealProgramRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProgramRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProgramRepository for SurrealProgramRepository<C> {
    async fn insert_with_instances(
        &self,
        program: Program,
        workshops: Vec<WorkshopInstance>,
        items: Vec<ItemInstance>,
    ) -> GovResult<Program> {
        let id_str = program.id.to_string();
        let workshop_payloads: Vec<serde_json::Value> =
            workshops.iter().map(workshop_payload).collect();
        let item_payloads: Vec<serde_json::Value> = items.iter().map(item_payload).collect();

        let query = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('program', $id) SET \
                 tenant_id = $tenant_id, name = $name, \
                 status = $status, start_date = $start_date, \
                 end_date = $end_date, created_by = $created_by; \
                 INSERT INTO workshop_instance $workshops; \
                 INSERT INTO item_instance $items; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", program.tenant_id.to_string()))
            .bind(("name", program.name))
            .bind(("status", program.status.as_str()))
            .bind(("start_date", program.start_date.map(date_to_string)))
            .bind(("end_date", program.end_date.map(date_to_string)))
            .bind(("created_by", program.created_by))
            .bind(("workshops", workshop_payloads))
            .bind(("items", item_payloads));

        let result = query.await.map_err(DbError::from)?;
        result
            .check()
            .map_err(|e| DbError::from_check(e, "program"))?;

        // Read the committed row back so defaulted timestamps are
        // authoritative.
        self.get_created(program.id).await
    }

    async fn find_by_tenant(&self, tenant_id: Uuid) -> GovResult<Option<Program>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM program WHERE tenant_id = $tenant_id",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProgramRow> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.try_into_program())
            .transpose()
            .map_err(Into::into)
    }
}

impl<C: Connection> SurrealProgramRepository<C> {
    async fn get_created(&self, id: Uuid) -> GovResult<Program> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('program', $id)",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProgramRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "program".into(),
            id: id_str,
        })?;

        Ok(row.try_into_program()?)
    }
}
