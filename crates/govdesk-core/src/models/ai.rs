//! AI usage policy and usage log domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default threshold applied when a tenant has no stored policy.
pub const DEFAULT_MIN_IQI_AUTHORIZED: f64 = 0.80;
/// Default threshold applied when a tenant has no stored policy.
pub const DEFAULT_MIN_IQI_ASSISTED: f64 = 0.60;

/// Per-tenant IQI thresholds gating AI usage of documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiUsagePolicy {
    pub tenant_id: Uuid,
    pub min_iqi_authorized: f64,
    pub min_iqi_assisted: f64,
}

impl AiUsagePolicy {
    /// The defaults used when a tenant has never stored a policy.
    pub fn defaults(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            min_iqi_authorized: DEFAULT_MIN_IQI_AUTHORIZED,
            min_iqi_assisted: DEFAULT_MIN_IQI_ASSISTED,
        }
    }
}

/// Outcome of an AI-usage authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageDecision {
    Authorized,
    Assisted,
    Forbidden,
}

impl UsageDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageDecision::Authorized => "authorized",
            UsageDecision::Assisted => "assisted",
            UsageDecision::Forbidden => "forbidden",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "authorized" => Some(UsageDecision::Authorized),
            "assisted" => Some(UsageDecision::Assisted),
            "forbidden" => Some(UsageDecision::Forbidden),
            _ => None,
        }
    }
}

/// One logged AI-usage authorization check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiUsageLog {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub document_id: String,
    pub decision: UsageDecision,
    pub checked_at: DateTime<Utc>,
    pub intent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAiUsageLog {
    pub tenant_id: Uuid,
    pub document_id: String,
    pub decision: UsageDecision,
    pub checked_at: DateTime<Utc>,
    pub intent: String,
}
