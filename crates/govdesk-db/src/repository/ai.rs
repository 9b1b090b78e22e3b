//! SurrealDB implementations of [`AiPolicyRepository`] and
//! [`UsageLogRepository`].

use chrono::{DateTime, Utc};
use govdesk_core::error::GovResult;
use govdesk_core::models::ai::{AiUsageLog, AiUsagePolicy, CreateAiUsageLog, UsageDecision};
use govdesk_core::repository::{AiPolicyRepository, UsageLogRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct PolicyRow {
    tenant_id: String,
    min_iqi_authorized: f64,
    min_iqi_assisted: f64,
}

impl PolicyRow {
    fn try_into_policy(self) -> Result<AiUsagePolicy, DbError> {
        Ok(AiUsagePolicy {
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            min_iqi_authorized: self.min_iqi_authorized,
            min_iqi_assisted: self.min_iqi_assisted,
        })
    }
}

/// SurrealDB implementation of the AI usage policy repository.
#[derive(Clone)]
pub struct SurrealAiPolicyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAiPolicyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AiPolicyRepository for SurrealAiPolicyRepository<C> {
    async fn get(&self, tenant_id: Uuid) -> GovResult<Option<AiUsagePolicy>> {
        let mut result = self
            .db
            .query("SELECT * FROM ai_usage_policy WHERE tenant_id = $tenant_id")
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PolicyRow> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.try_into_policy())
            .transpose()
            .map_err(Into::into)
    }

    async fn upsert(&self, policy: AiUsagePolicy) -> GovResult<AiUsagePolicy> {
        // UPSERT updates the existing row when the tenant already has
        // a policy and creates one otherwise.
        let result = self
            .db
            .query(
                "UPSERT ai_usage_policy SET \
                 tenant_id = $tenant_id, \
                 min_iqi_authorized = $authorized, \
                 min_iqi_assisted = $assisted, \
                 updated_at = time::now() \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("tenant_id", policy.tenant_id.to_string()))
            .bind(("authorized", policy.min_iqi_authorized))
            .bind(("assisted", policy.min_iqi_assisted))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_check(e, "ai_usage_policy"))?;

        Ok(policy)
    }
}

#[derive(Debug, SurrealValue)]
struct UsageLogRow {
    record_id: String,
    tenant_id: String,
    document_id: String,
    decision: String,
    checked_at: DateTime<Utc>,
    intent: String,
}

fn parse_decision(s: &str) -> Result<UsageDecision, DbError> {
    UsageDecision::parse(s)
        .ok_or_else(|| DbError::Query(format!("unknown usage decision: {s}")))
}

impl UsageLogRow {
    fn try_into_log(self) -> Result<AiUsageLog, DbError> {
        Ok(AiUsageLog {
            id: parse_uuid(&self.record_id, "usage log")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            document_id: self.document_id,
            decision: parse_decision(&self.decision)?,
            checked_at: self.checked_at,
            intent: self.intent,
        })
    }
}

/// SurrealDB implementation of the append-only AI usage log.
#[derive(Clone)]
pub struct SurrealUsageLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUsageLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UsageLogRepository for SurrealUsageLogRepository<C> {
    async fn append(&self, input: CreateAiUsageLog) -> GovResult<AiUsageLog> {
        let id = Uuid::new_v4();

        let result = self
            .db
            .query(
                "CREATE type::record('ai_usage_log', $id) SET \
                 tenant_id = $tenant_id, document_id = $document_id, \
                 decision = $decision, checked_at = $checked_at, \
                 intent = $intent",
            )
            .bind(("id", id.to_string()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("document_id", input.document_id.clone()))
            .bind(("decision", input.decision.as_str()))
            .bind(("checked_at", input.checked_at))
            .bind(("intent", input.intent.clone()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_check(e, "ai_usage_log"))?;

        Ok(AiUsageLog {
            id,
            tenant_id: input.tenant_id,
            document_id: input.document_id,
            decision: input.decision,
            checked_at: input.checked_at,
            intent: input.intent,
        })
    }

    async fn list(&self, tenant_id: Uuid) -> GovResult<Vec<AiUsageLog>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM ai_usage_log \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY checked_at DESC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UsageLogRow> = result.take(0).map_err(DbError::from)?;
        let logs = rows
            .into_iter()
            .map(|row| row.try_into_log())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(logs)
    }
}
