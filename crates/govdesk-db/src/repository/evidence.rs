//! SurrealDB implementation of [`EvidenceRepository`].

use chrono::{DateTime, Utc};
use govdesk_core::error::GovResult;
use govdesk_core::models::evidence::{CreateEvidence, Evidence, EvidenceType};
use govdesk_core::repository::{EvidenceRepository, LedgerFilter};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{date_to_string, parse_date, parse_uuid};

#[derive(Debug, SurrealValue)]
struct EvidenceRow {
    record_id: String,
    program_id: String,
    workshop_number: Option<u8>,
    item_id: Option<String>,
    evidence_type: String,
    title: String,
    url: Option<String>,
    file_ref: Option<String>,
    date: String,
    owner: String,
    created_at: DateTime<Utc>,
}

fn parse_type(s: &str) -> Result<EvidenceType, DbError> {
    EvidenceType::parse(s)
        .ok_or_else(|| DbError::Query(format!("unknown evidence type: {s}")))
}

impl EvidenceRow {
    fn try_into_evidence(self) -> Result<Evidence, DbError> {
        let date = parse_date(Some(self.date), "date")?.ok_or_else(|| {
            DbError::Query("evidence date is empty".into())
        })?;
        Ok(Evidence {
            id: parse_uuid(&self.record_id, "evidence")?,
            program_id: parse_uuid(&self.program_id, "program")?,
            workshop_number: self.workshop_number,
            item_id: self.item_id,
            evidence_type: parse_type(&self.evidence_type)?,
            title: self.title,
            url: self.url,
            file_ref: self.file_ref,
            date,
            owner: self.owner,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the evidence ledger repository.
#[derive(Clone)]
pub struct SurrealEvidenceRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEvidenceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> EvidenceRepository for SurrealEvidenceRepository<C> {
    async fn create(
        &self,
        program_id: Uuid,
        owner: String,
        input: CreateEvidence,
    ) -> GovResult<Evidence> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('evidence', $id) SET \
                 program_id = $program_id, \
                 workshop_number = $workshop_number, \
                 item_id = $item_id, \
                 evidence_type = $evidence_type, \
                 title = $title, url = $url, file_ref = $file_ref, \
                 date = $date, owner = $owner \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("id", id_str.clone()))
            .bind(("program_id", program_id.to_string()))
            .bind(("workshop_number", input.workshop_number))
            .bind(("item_id", input.item_id))
            .bind(("evidence_type", input.evidence_type.as_str()))
            .bind(("title", input.title))
            .bind(("url", input.url))
            .bind(("file_ref", input.file_ref))
            .bind(("date", date_to_string(input.date)))
            .bind(("owner", owner))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, "evidence"))?;

        let rows: Vec<EvidenceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "evidence".into(),
            id: id_str,
        })?;

        Ok(row.try_into_evidence()?)
    }

    async fn list(&self, program_id: Uuid, filter: LedgerFilter) -> GovResult<Vec<Evidence>> {
        let mut clauses = vec!["program_id = $program_id"];
        if filter.workshop_number.is_some() {
            clauses.push("workshop_number = $number");
        }
        if filter.item_id.is_some() {
            clauses.push("item_id = $item_id");
        }

        let query = format!(
            "SELECT meta::id(id) AS record_id, * \
             FROM evidence WHERE {} \
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

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<EvidenceRow> = result.take(0).map_err(DbError::from)?;
        let evidences = rows
            .into_iter()
            .map(|row| row.try_into_evidence())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(evidences)
    }

    async fn delete(&self, program_id: Uuid, id: Uuid) -> GovResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('evidence', $id) \
                 WHERE program_id = $program_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("program_id", program_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<EvidenceRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "evidence".into(),
                id: id_str,
            }
            .into());
        }

        self.db
            .query(
                "DELETE type::record('evidence', $id) \
                 WHERE program_id = $program_id",
            )
            .bind(("id", id_str))
            .bind(("program_id", program_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
