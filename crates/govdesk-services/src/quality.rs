//! Knowledge document quality (IQI) scoring and per-document AI usage
//! decisions.

use chrono::{DateTime, Utc};
use govdesk_core::error::GovResult;
use govdesk_core::models::ai::{AiUsagePolicy, UsageDecision};
use govdesk_core::models::knowledge::KnowledgeDocument;
use govdesk_core::repository::{AiPolicyRepository, KnowledgeRepository};
use serde::Serialize;
use uuid::Uuid;

/// Freshness horizon for documents, in days.
const FRESHNESS_DAYS: i64 = 90;

/// Document-corpus quality report.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub iqi_global: f64,
    pub total_documents: usize,
    pub validated_count: usize,
    /// Percent, one decimal.
    pub validation_rate: f64,
    /// Percent, one decimal.
    pub avg_confidence: f64,
    /// Percent, one decimal.
    pub freshness_score: f64,
    pub fresh_documents: usize,
}

/// Per-document AI usage verdict.
#[derive(Debug, Clone, Serialize)]
pub struct UsageVerdict {
    pub document_id: String,
    pub document_title: String,
    pub usage_status: UsageDecision,
    pub iqi_score: f64,
    pub reason: &'static str,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// A document is fresh when its last_updated parses and falls within
/// the horizon. Unparsable dates drop out of the fresh count only.
fn is_fresh(doc: &KnowledgeDocument, now: DateTime<Utc>) -> bool {
    DateTime::parse_from_rfc3339(&doc.last_updated)
        .map(|updated| (now - updated.with_timezone(&Utc)).num_days() < FRESHNESS_DAYS)
        .unwrap_or(false)
}

/// Document quality and AI usage service.
pub struct QualityService<K, P>
where
    K: KnowledgeRepository,
    P: AiPolicyRepository,
{
    knowledge_repo: K,
    policy_repo: P,
}

impl<K, P> QualityService<K, P>
where
    K: KnowledgeRepository,
    P: AiPolicyRepository,
{
    pub fn new(knowledge_repo: K, policy_repo: P) -> Self {
        Self {
            knowledge_repo,
            policy_repo,
        }
    }

    pub async fn list_documents(&self, tenant_id: Uuid) -> GovResult<Vec<KnowledgeDocument>> {
        self.knowledge_repo.list_documents(tenant_id).await
    }

    pub async fn get_document(
        &self,
        tenant_id: Uuid,
        document_id: &str,
    ) -> GovResult<KnowledgeDocument> {
        self.knowledge_repo.get_document(tenant_id, document_id).await
    }

    /// Global IQI: 0.3 × validation rate + 0.5 × average confidence +
    /// 0.2 × freshness rate, rounded to two decimals. All-zero report
    /// when the corpus is empty.
    pub async fn document_quality(&self, tenant_id: Uuid) -> GovResult<QualityReport> {
        let documents = self.knowledge_repo.list_documents(tenant_id).await?;
        if documents.is_empty() {
            return Ok(QualityReport {
                iqi_global: 0.0,
                total_documents: 0,
                validated_count: 0,
                validation_rate: 0.0,
                avg_confidence: 0.0,
                freshness_score: 0.0,
                fresh_documents: 0,
            });
        }

        let total = documents.len();
        let validated = documents.iter().filter(|d| d.validated).count();
        let avg_confidence =
            documents.iter().map(|d| d.confidence_score).sum::<f64>() / total as f64;

        let now = Utc::now();
        let fresh = documents.iter().filter(|d| is_fresh(d, now)).count();

        let validation_score = validated as f64 / total as f64;
        let freshness_score = fresh as f64 / total as f64;
        let iqi_global =
            validation_score * 0.3 + avg_confidence * 0.5 + freshness_score * 0.2;

        Ok(QualityReport {
            iqi_global: round2(iqi_global),
            total_documents: total,
            validated_count: validated,
            validation_rate: round1(validation_score * 100.0),
            avg_confidence: round1(avg_confidence * 100.0),
            freshness_score: round1(freshness_score * 100.0),
            fresh_documents: fresh,
        })
    }

    /// Decide whether AI may use a document, against the tenant's
    /// policy (or the built-in defaults when none is stored).
    pub async fn ai_usage_decision(
        &self,
        tenant_id: Uuid,
        document_id: &str,
    ) -> GovResult<UsageVerdict> {
        let document = self
            .knowledge_repo
            .get_document(tenant_id, document_id)
            .await?;
        let policy = self
            .policy_repo
            .get(tenant_id)
            .await?
            .unwrap_or_else(|| AiUsagePolicy::defaults(tenant_id));

        let iqi_score = document.confidence_score;
        let (usage_status, reason) = if document.validated
            && iqi_score >= policy.min_iqi_authorized
        {
            (
                UsageDecision::Authorized,
                "Document validé avec un score IQI suffisant",
            )
        } else if iqi_score >= policy.min_iqi_assisted {
            (
                UsageDecision::Assisted,
                "Score IQI intermédiaire - utilisation assistée uniquement",
            )
        } else {
            (
                UsageDecision::Forbidden,
                "Score IQI insuffisant ou document non validé",
            )
        };

        Ok(UsageVerdict {
            document_id: document.id,
            document_title: document.title,
            usage_status,
            iqi_score,
            reason,
        })
    }
}
