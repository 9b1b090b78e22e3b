//! SurrealDB implementation of [`ItemInstanceRepository`].

use chrono::{DateTime, Utc};
use govdesk_core::error::GovResult;
use govdesk_core::models::item::{ItemInstance, ItemStatus, UpdateItemInstance};
use govdesk_core::repository::{ItemFilter, ItemInstanceRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{bool_map, bool_map_to_json, date_to_string, parse_date, parse_uuid};

#[derive(Debug, SurrealValue)]
struct ItemRow {
    record_id: String,
    program_id: String,
    item_id: String,
    workshop_number: u8,
    status: String,
    owner_user_id: Option<String>,
    due_date: Option<String>,
    notes_markdown: Option<String>,
    acceptance_state: serde_json::Value,
    done_override: bool,
    validated_by: Option<String>,
    validated_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<ItemStatus, DbError> {
    ItemStatus::parse(s).ok_or_else(|| DbError::Query(format!("unknown item status: {s}")))
}

impl ItemRow {
    fn try_into_instance(self) -> Result<ItemInstance, DbError> {
        Ok(ItemInstance {
            id: parse_uuid(&self.record_id, "item instance")?,
            program_id: parse_uuid(&self.program_id, "program")?,
            item_id: self.item_id,
            workshop_number: self.workshop_number,
            status: parse_status(&self.status)?,
            owner_user_id: self.owner_user_id,
            due_date: parse_date(self.due_date, "due_date")?,
            notes_markdown: self.notes_markdown,
            acceptance_state: bool_map(self.acceptance_state),
            done_override: self.done_override,
            validated_by: self.validated_by,
            validated_at: self.validated_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the checklist item instance repository.
#[derive(Clone)]
pub struct SurrealItemInstanceRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealItemInstanceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ItemInstanceRepository for SurrealItemInstanceRepository<C> {
    async fn list(&self, program_id: Uuid, filter: ItemFilter) -> GovResult<Vec<ItemInstance>> {
        let mut clauses = vec!["program_id = $program_id"];
        if filter.workshop_number.is_some() {
            clauses.push("workshop_number = $number");
        }
        if filter.status.is_some() {
            clauses.push("status = $status");
        }

        let query = format!(
            "SELECT meta::id(id) AS record_id, * \
             FROM item_instance WHERE {} \
             ORDER BY item_id ASC",
            clauses.join(" AND "),
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("program_id", program_id.to_string()));

        if let Some(number) = filter.workshop_number {
            builder = builder.bind(("number", number));
        }
        if let Some(status) = filter.status {
            builder = builder.bind(("status", status.as_str()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<ItemRow> = result.take(0).map_err(DbError::from)?;
        let instances = rows
            .into_iter()
            .map(|row| row.try_into_instance())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(instances)
    }

    async fn get(&self, program_id: Uuid, item_id: &str) -> GovResult<ItemInstance> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM item_instance \
                 WHERE program_id = $program_id AND item_id = $item_id",
            )
            .bind(("program_id", program_id.to_string()))
            .bind(("item_id", item_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ItemRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "item_instance".into(),
            id: item_id.to_string(),
        })?;

        Ok(row.try_into_instance()?)
    }

    async fn update(
        &self,
        program_id: Uuid,
        item_id: &str,
        patch: UpdateItemInstance,
    ) -> GovResult<ItemInstance> {
        let mut sets = Vec::new();
        if patch.status.is_some() {
            sets.push("status = $status");
        }
        if patch.owner_user_id.is_some() {
            sets.push("owner_user_id = $owner_user_id");
        }
        if patch.due_date.is_some() {
            sets.push("due_date = $due_date");
        }
        if patch.notes_markdown.is_some() {
            sets.push("notes_markdown = $notes_markdown");
        }
        if patch.acceptance_state.is_some() {
            sets.push("acceptance_state = $acceptance_state");
        }
        if patch.done_override.is_some() {
            sets.push("done_override = $done_override");
        }
        if patch.validated_by.is_some() {
            sets.push("validated_by = $validated_by");
        }
        if patch.validated_at.is_some() {
            sets.push("validated_at = $validated_at");
        }
        if sets.is_empty() {
            return self.get(program_id, item_id).await;
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE item_instance SET {} \
             WHERE program_id = $program_id AND item_id = $item_id \
             RETURN meta::id(id) AS record_id, *",
            sets.join(", "),
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("program_id", program_id.to_string()))
            .bind(("item_id", item_id.to_string()));

        if let Some(status) = patch.status {
            builder = builder.bind(("status", status.as_str()));
        }
        if let Some(owner) = patch.owner_user_id {
            builder = builder.bind(("owner_user_id", owner));
        }
        if let Some(due) = patch.due_date {
            builder = builder.bind(("due_date", due.map(date_to_string)));
        }
        if let Some(notes) = patch.notes_markdown {
            builder = builder.bind(("notes_markdown", notes));
        }
        if let Some(acceptance) = patch.acceptance_state {
            builder = builder.bind(("acceptance_state", bool_map_to_json(&acceptance)));
        }
        if let Some(done_override) = patch.done_override {
            builder = builder.bind(("done_override", done_override));
        }
        if let Some(validated_by) = patch.validated_by {
            builder = builder.bind(("validated_by", validated_by));
        }
        if let Some(validated_at) = patch.validated_at {
            builder = builder.bind(("validated_at", validated_at));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, "item_instance"))?;

        let rows: Vec<ItemRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "item_instance".into(),
            id: item_id.to_string(),
        })?;

        Ok(row.try_into_instance()?)
    }
}
