//! SurrealDB implementation of [`WorkshopInstanceRepository`].

use chrono::{DateTime, Utc};
use govdesk_core::error::GovResult;
use govdesk_core::models::workshop::{
    UpdateWorkshopInstance, WorkshopInstance, WorkshopStatus,
};
use govdesk_core::repository::WorkshopInstanceRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{bool_map, bool_map_to_json, parse_uuid};

#[derive(Debug, SurrealValue)]
struct WorkshopRow {
    record_id: String,
    program_id: String,
    workshop_number: u8,
    status: String,
    completion_criteria_state: serde_json::Value,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

fn parse_status(s: &str) -> Result<WorkshopStatus, DbError> {
    WorkshopStatus::parse(s)
        .ok_or_else(|| DbError::Query(format!("unknown workshop status: {s}")))
}

impl WorkshopRow {
    fn try_into_instance(self) -> Result<WorkshopInstance, DbError> {
        Ok(WorkshopInstance {
            id: parse_uuid(&self.record_id, "workshop instance")?,
            program_id: parse_uuid(&self.program_id, "program")?,
            workshop_number: self.workshop_number,
            status: parse_status(&self.status)?,
            completion_criteria_state: bool_map(self.completion_criteria_state),
            started_at: self.started_at,
            completed_at: self.completed_at,
        })
    }
}

/// SurrealDB implementation of the workshop instance repository.
#[derive(Clone)]
pub struct SurrealWorkshopInstanceRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealWorkshopInstanceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> WorkshopInstanceRepository for SurrealWorkshopInstanceRepository<C> {
    async fn list(&self, program_id: Uuid) -> GovResult<Vec<WorkshopInstance>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM workshop_instance \
                 WHERE program_id = $program_id \
                 ORDER BY workshop_number ASC",
            )
            .bind(("program_id", program_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WorkshopRow> = result.take(0).map_err(DbError::from)?;
        let instances = rows
            .into_iter()
            .map(|row| row.try_into_instance())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(instances)
    }

    async fn get(&self, program_id: Uuid, workshop_number: u8) -> GovResult<WorkshopInstance> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM workshop_instance \
                 WHERE program_id = $program_id \
                 AND workshop_number = $number",
            )
            .bind(("program_id", program_id.to_string()))
            .bind(("number", workshop_number))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WorkshopRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "workshop_instance".into(),
            id: workshop_number.to_string(),
        })?;

        Ok(row.try_into_instance()?)
    }

    async fn update(
        &self,
        program_id: Uuid,
        workshop_number: u8,
        patch: UpdateWorkshopInstance,
    ) -> GovResult<WorkshopInstance> {
        let mut sets = Vec::new();
        if patch.status.is_some() {
            sets.push("status = $status");
        }
        if patch.completion_criteria_state.is_some() {
            sets.push("completion_criteria_state = $criteria");
        }
        if patch.started_at.is_some() {
            sets.push("started_at = $started_at");
        }
        if sets.is_empty() {
            return self.get(program_id, workshop_number).await;
        }

        let query = format!(
            "UPDATE workshop_instance SET {} \
             WHERE program_id = $program_id \
             AND workshop_number = $number \
             RETURN meta::id(id) AS record_id, *",
            sets.join(", "),
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("program_id", program_id.to_string()))
            .bind(("number", workshop_number));

        if let Some(status) = patch.status {
            builder = builder.bind(("status", status.as_str()));
        }
        if let Some(criteria) = patch.completion_criteria_state {
            builder = builder.bind(("criteria", bool_map_to_json(&criteria)));
        }
        if let Some(started_at) = patch.started_at {
            builder = builder.bind(("started_at", started_at));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, "workshop_instance"))?;

        let rows: Vec<WorkshopRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "workshop_instance".into(),
            id: workshop_number.to_string(),
        })?;

        Ok(row.try_into_instance()?)
    }

    async fn mark_completed(
        &self,
        program_id: Uuid,
        workshop_number: u8,
        completed_at: DateTime<Utc>,
    ) -> GovResult<WorkshopInstance> {
        // The ?? keeps the original completion time on repeated calls.
        let result = self
            .db
            .query(
                "UPDATE workshop_instance SET \
                 status = 'completed', \
                 completed_at = completed_at ?? $completed_at \
                 WHERE program_id = $program_id \
                 AND workshop_number = $number \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("completed_at", completed_at))
            .bind(("program_id", program_id.to_string()))
            .bind(("number", workshop_number))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, "workshop_instance"))?;

        let rows: Vec<WorkshopRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "workshop_instance".into(),
            id: workshop_number.to_string(),
        })?;

        Ok(row.try_into_instance()?)
    }
}
