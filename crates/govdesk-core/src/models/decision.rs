//! Decision ledger domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub id: Uuid,
    pub program_id: Uuid,
    pub workshop_number: Option<u8>,
    pub item_id: Option<String>,
    pub decision_text: String,
    /// Identity of the authenticated user who recorded the decision.
    pub decided_by: String,
    pub decided_at: DateTime<Utc>,
    pub evidence_links: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Client payload for recording a decision. Decider identity and
/// timestamps are stamped server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDecision {
    pub decision_text: String,
    pub workshop_number: Option<u8>,
    pub item_id: Option<String>,
    pub evidence_links: Vec<String>,
}
