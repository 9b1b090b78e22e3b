//! SurrealDB repository implementations.

mod action;
mod ai;
mod compliance;
mod decision;
mod evidence;
mod item;
mod knowledge;
mod program;
mod tenant;
mod user;
mod workshop;

pub use action::SurrealActionRepository;
pub use ai::{SurrealAiPolicyRepository, SurrealUsageLogRepository};
pub use compliance::{SurrealIsoProfileRepository, SurrealKpiRepository};
pub use decision::SurrealDecisionRepository;
pub use evidence::SurrealEvidenceRepository;
pub use item::SurrealItemInstanceRepository;
pub use knowledge::SurrealKnowledgeRepository;
pub use program::SurrealProgramRepository;
pub use tenant::SurrealTenantRepository;
pub use user::SurrealUserRepository;
pub use workshop::SurrealWorkshopInstanceRepository;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::DbError;

/// Parse a UUID stored as a string field.
pub(crate) fn parse_uuid(s: &str, field: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Query(format!("invalid {field} UUID: {e}")))
}

/// Parse an ISO `YYYY-MM-DD` date stored as an optional string field.
pub(crate) fn parse_date(
    s: Option<String>,
    field: &str,
) -> Result<Option<NaiveDate>, DbError> {
    s.map(|v| {
        NaiveDate::parse_from_str(&v, "%Y-%m-%d")
            .map_err(|e| DbError::Query(format!("invalid {field} date: {e}")))
    })
    .transpose()
}

/// Format a date for storage, ISO `YYYY-MM-DD`.
pub(crate) fn date_to_string(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Convert a FLEXIBLE object field into a criterion-state map.
/// Non-boolean values are dropped.
pub(crate) fn bool_map(value: serde_json::Value) -> BTreeMap<String, bool> {
    match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .filter_map(|(k, v)| v.as_bool().map(|b| (k, b)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

/// Convert a criterion-state map into a JSON object for storage.
pub(crate) fn bool_map_to_json(map: &BTreeMap<String, bool>) -> serde_json::Value {
    serde_json::Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::Bool(*v)))
            .collect(),
    )
}
