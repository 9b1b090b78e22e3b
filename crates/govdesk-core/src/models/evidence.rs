//! Evidence ledger domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    Document,
    Link,
    Screenshot,
    File,
}

impl EvidenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceType::Document => "document",
            EvidenceType::Link => "link",
            EvidenceType::Screenshot => "screenshot",
            EvidenceType::File => "file",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "document" => Some(EvidenceType::Document),
            "link" => Some(EvidenceType::Link),
            "screenshot" => Some(EvidenceType::Screenshot),
            "file" => Some(EvidenceType::File),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub id: Uuid,
    pub program_id: Uuid,
    pub workshop_number: Option<u8>,
    pub item_id: Option<String>,
    pub evidence_type: EvidenceType,
    pub title: String,
    pub url: Option<String>,
    pub file_ref: Option<String>,
    pub date: NaiveDate,
    /// Identity of the authenticated user who attached the evidence.
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

/// Client payload for attaching evidence. Owner is stamped server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEvidence {
    pub evidence_type: EvidenceType,
    pub title: String,
    pub url: Option<String>,
    pub file_ref: Option<String>,
    pub date: NaiveDate,
    pub workshop_number: Option<u8>,
    pub item_id: Option<String>,
}
