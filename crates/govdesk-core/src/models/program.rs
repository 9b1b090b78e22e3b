//! Governance program domain model.
//!
//! At most one program exists per tenant (enforced by a storage-level
//! uniqueness constraint). It is created lazily, together with its full
//! set of workshop and item instances, on first access.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ProgramStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramStatus::NotStarted => "not_started",
            ProgramStatus::InProgress => "in_progress",
            ProgramStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(ProgramStatus::NotStarted),
            "in_progress" => Some(ProgramStatus::InProgress),
            "completed" => Some(ProgramStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub status: ProgramStatus,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// User who triggered the lazy creation.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
