//! SurrealDB implementation of [`DecisionRepository`].

use chrono::{DateTime, Utc};
use govdesk_core::error::GovResult;
use govdesk_core::models::decision::{CreateDecision, Decision};
use govdesk_core::repository::{DecisionRepository, LedgerFilter};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct DecisionRow {
    record_id: String,
    program_id: String,
    workshop_number: Option<u8>,
    item_id: Option<String>,
    decision_text: String,
    decided_by: String,
    decided_at: DateTime<Utc>,
    evidence_links: Vec<String>,
    created_at: DateTime<Utc>,
}

impl DecisionRow {
    fn try_into_decision(self) -> Result<Decision, DbError> {
        Ok(Decision {
            id: parse_uuid(&self.record_id, "decision")?,
            program_id: parse_uuid(&self.program_id, "program")?,
            workshop_number: self.workshop_number,
            item_id: self.item_id,
            decision_text: self.decision_text,
            decided_by: self.decided_by,
            decided_at: self.decided_at,
            evidence_links: self.evidence_links,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the decision ledger repository.
#[derive(Clone)]
pub struct SurrealDecisionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDecisionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DecisionRepository for SurrealDecisionRepository<C> {
    async fn create(
        &self,
        program_id: Uuid,
        decided_by: String,
        input: CreateDecision,
    ) -> GovResult<Decision> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('decision', $id) SET \
                 program_id = $program_id, \
                 workshop_number = $workshop_number, \
                 item_id = $item_id, \
                 decision_text = $decision_text, \
                 decided_by = $decided_by, \
                 decided_at = time::now(), \
                 evidence_links = $evidence_links \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("id", id_str.clone()))
            .bind(("program_id", program_id.to_string()))
            .bind(("workshop_number", input.workshop_number))
            .bind(("item_id", input.item_id))
            .bind(("decision_text", input.decision_text))
            .bind(("decided_by", decided_by))
            .bind(("evidence_links", input.evidence_links))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, "decision"))?;

        let rows: Vec<DecisionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "decision".into(),
            id: id_str,
        })?;

        Ok(row.try_into_decision()?)
    }

    async fn list(&self, program_id: Uuid, filter: LedgerFilter) -> GovResult<Vec<Decision>> {
        let mut clauses = vec!["program_id = $program_id"];
        if filter.workshop_number.is_some() {
            clauses.push("workshop_number = $number");
        }
        if filter.item_id.is_some() {
            clauses.push("item_id = $item_id");
        }

        let query = format!(
            "SELECT meta::id(id) AS record_id, * \
             FROM decision WHERE {} \
             ORDER BY decided_at DESC",
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

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<DecisionRow> = result.take(0).map_err(DbError::from)?;
        let decisions = rows
            .into_iter()
            .map(|row| row.try_into_decision())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(decisions)
    }

    async fn delete(&self, program_id: Uuid, id: Uuid) -> GovResult<()> {
        let id_str = id.to_string();

        // Scoped existence check for a precise not-found error.
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('decision', $id) \
                 WHERE program_id = $program_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("program_id", program_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<DecisionRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "decision".into(),
                id: id_str,
            }
            .into());
        }

        self.db
            .query(
                "DELETE type::record('decision', $id) \
                 WHERE program_id = $program_id",
            )
            .bind(("id", id_str))
            .bind(("program_id", program_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
