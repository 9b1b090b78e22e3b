//! Workshop instance domain model.
//!
//! One instance exists per (program, workshop_number) pair, created
//! alongside the program. The criterion-state map's key set always
//! equals the corresponding definition's criteria list.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkshopStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl WorkshopStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkshopStatus::NotStarted => "not_started",
            WorkshopStatus::InProgress => "in_progress",
            WorkshopStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(WorkshopStatus::NotStarted),
            "in_progress" => Some(WorkshopStatus::InProgress),
            "completed" => Some(WorkshopStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkshopInstance {
    pub id: Uuid,
    pub program_id: Uuid,
    pub workshop_number: u8,
    pub status: WorkshopStatus,
    /// Checked-state per completion criterion text.
    pub completion_criteria_state: BTreeMap<String, bool>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Partial patch applied to a workshop instance. The criteria map, when
/// present, is the full post-merge map — merging against the stored
/// state is the service layer's job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateWorkshopInstance {
    pub status: Option<WorkshopStatus>,
    pub completion_criteria_state: Option<BTreeMap<String, bool>>,
    /// Stamped by the service on the first transition to in_progress.
    pub started_at: Option<DateTime<Utc>>,
}
