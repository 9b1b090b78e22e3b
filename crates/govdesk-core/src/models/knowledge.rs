//! Knowledge base domain models (document-quality scoring inputs).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSource {
    pub id: String,
    pub tenant_id: Uuid,
    pub source_type: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub id: String,
    pub tenant_id: Uuid,
    pub source_id: String,
    pub title: String,
    pub doc_type: String,
    pub url: String,
    /// RFC 3339 timestamp string as supplied by the source system.
    /// Unparsable values are tolerated: the document is then excluded
    /// from freshness counts but still counted in totals.
    pub last_updated: String,
    pub confidence_score: f64,
    pub validated: bool,
    pub owner: String,
}
