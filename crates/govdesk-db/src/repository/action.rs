//! SurrealDB implementation of [`ActionRepository`].

use chrono::{DateTime, Utc};
use govdesk_core::error::GovResult;
use govdesk_core::models::action::{
    Action, ActionPriority, ActionStatus, CreateAction, UpdateAction,
};
use govdesk_core::repository::{ActionFilter, ActionRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{date_to_string, parse_date, parse_uuid};

#[derive(Debug, SurrealValue)]
struct ActionRow {
    record_id: String,
    program_id: String,
    workshop_number: Option<u8>,
    item_id: Option<String>,
    title: String,
    description: Option<String>,
    priority: String,
    status: String,
    owner_user_id: Option<String>,
    due_date: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_priority(s: &str) -> Result<ActionPriority, DbError> {
    ActionPriority::parse(s)
        .ok_or_else(|| DbError::Query(format!("unknown action priority: {s}")))
}

fn parse_status(s: &str) -> Result<ActionStatus, DbError> {
    ActionStatus::parse(s)
        .ok_or_else(|| DbError::Query(format!("unknown action status: {s}")))
}

impl ActionRow {
    fn try_into_action(self) -> Result<Action, DbError> {
        Ok(Action {
            id: parse_uuid(&self.record_id, "action")?,
            program_id: parse_uuid(&self.program_id, "program")?,
            workshop_number: self.workshop_number,
            item_id: self.item_id,
            title: self.title,
            description: self.description,
            priority: parse_priority(&self.priority)?,
            status: parse_status(&self.status)?,
            owner_user_id: self.owner_user_id,
            due_date: parse_date(self.due_date, "due_date")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the action ledger repository.
#[derive(Clone)]
pub struct SurrealActionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealActionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ActionRepository for SurrealActionRepository<C> {
    async fn create(&self, program_id: Uuid, input: CreateAction) -> GovResult<Action> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let priority = input.priority.unwrap_or(ActionPriority::Medium);

        let result = self
            .db
            .query(
                "CREATE type::record('action', $id) SET \
                 program_id = $program_id, \
                 workshop_number = $workshop_number, \
                 item_id = $item_id, title = $title, \
                 description = $description, priority = $priority, \
                 status = 'open', owner_user_id = $owner_user_id, \
                 due_date = $due_date \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("id", id_str.clone()))
            .bind(("program_id", program_id.to_string()))
            .bind(("workshop_number", input.workshop_number))
            .bind(("item_id", input.item_id))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("priority", priority.as_str()))
            .bind(("owner_user_id", input.owner_user_id))
            .bind(("due_date", input.due_date.map(date_to_string)))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, "action"))?;

        let rows: Vec<ActionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "action".into(),
            id: id_str,
        })?;

        Ok(row.try_into_action()?)
    }

    async fn list(&self, program_id: Uuid, filter: ActionFilter) -> GovResult<Vec<Action>> {
        let mut clauses = vec!["program_id = $program_id"];
        if filter.workshop_number.is_some() {
            clauses.push("workshop_number = $number");
        }
        if filter.item_id.is_some() {
            clauses.push("item_id = $item_id");
        }
        if filter.status.is_some() {
            clauses.push("status = $status");
        }
        if filter.priority.is_some() {
            clauses.push("priority = $priority");
        }

        let query = format!(
            "SELECT meta::id(id) AS record_id, * \
             FROM action WHERE {} \
             ORDER BY created_at DESC",
            clauses.join(" AND "),
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("program_id", program_id.to_string()));

        if let Some(number) = filter.workshop_number {
            builder = builder.bind(("number", number));
        }
        if let Some(item_id) = filter.item_id {
            builder = builder.bind(("item_id", item_id));
        }
        if let Some(status) = filter.status {
            builder = builder.bind(("status", status.as_str()));
        }
        if let Some(priority) = filter.priority {
            builder = builder.bind(("priority", priority.as_str()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<ActionRow> = result.take(0).map_err(DbError::from)?;
        let actions = rows
            .into_iter()
            .map(|row| row.try_into_action())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(actions)
    }

    async fn get(&self, program_id: Uuid, id: Uuid) -> GovResult<Action> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('action', $id) \
                 WHERE program_id = $program_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("program_id", program_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ActionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "action".into(),
            id: id_str,
        })?;

        Ok(row.try_into_action()?)
    }

    async fn update(&self, program_id: Uuid, id: Uuid, patch: UpdateAction) -> GovResult<Action> {
        let mut sets = Vec::new();
        if patch.title.is_some() {
            sets.push("title = $title");
        }
        if patch.description.is_some() {
            sets.push("description = $description");
        }
        if patch.priority.is_some() {
            sets.push("priority = $priority");
        }
        if patch.status.is_some() {
            sets.push("status = $status");
        }
        if patch.owner_user_id.is_some() {
            sets.push("owner_user_id = $owner_user_id");
        }
        if patch.due_date.is_some() {
            sets.push("due_date = $due_date");
        }
        if sets.is_empty() {
            return self.get(program_id, id).await;
        }
        sets.push("updated_at = time::now()");

        let id_str = id.to_string();
        let query = format!(
            "UPDATE type::record('action', $id) SET {} \
             WHERE program_id = $program_id \
             RETURN meta::id(id) AS record_id, *",
            sets.join(", "),
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("program_id", program_id.to_string()));

        if let Some(title) = patch.title {
            builder = builder.bind(("title", title));
        }
        if let Some(description) = patch.description {
            builder = builder.bind(("description", description));
        }
        if let Some(priority) = patch.priority {
            builder = builder.bind(("priority", priority.as_str()));
        }
        if let Some(status) = patch.status {
            builder = builder.bind(("status", status.as_str()));
        }
        if let Some(owner) = patch.owner_user_id {
            builder = builder.bind(("owner_user_id", owner));
        }
        if let Some(due) = patch.due_date {
            builder = builder.bind(("due_date", due.map(date_to_string)));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, "action"))?;

        let rows: Vec<ActionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "action".into(),
            id: id_str,
        })?;

        Ok(row.try_into_action()?)
    }

    async fn delete(&self, program_id: Uuid, id: Uuid) -> GovResult<()> {
        // Existence check first so a miss is reported as not-found
        // rather than silently succeeding.
        self.get(program_id, id).await?;

        self.db
            .query(
                "DELETE type::record('action', $id) \
                 WHERE program_id = $program_id",
            )
            .bind(("id", id.to_string()))
            .bind(("program_id", program_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
