//! Action ledger domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl ActionPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionPriority::Low => "low",
            ActionPriority::Medium => "medium",
            ActionPriority::High => "high",
            ActionPriority::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(ActionPriority::Low),
            "medium" => Some(ActionPriority::Medium),
            "high" => Some(ActionPriority::High),
            "critical" => Some(ActionPriority::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Open,
    InProgress,
    Done,
    Closed,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Open => "open",
            ActionStatus::InProgress => "in_progress",
            ActionStatus::Done => "done",
            ActionStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(ActionStatus::Open),
            "in_progress" => Some(ActionStatus::InProgress),
            "done" => Some(ActionStatus::Done),
            "closed" => Some(ActionStatus::Closed),
            _ => None,
        }
    }

    /// Open or in_progress — the states counted as "open" by the KPI
    /// aggregator and ageing computation.
    pub fn is_open(&self) -> bool {
        matches!(self, ActionStatus::Open | ActionStatus::InProgress)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: Uuid,
    pub program_id: Uuid,
    pub workshop_number: Option<u8>,
    pub item_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub priority: ActionPriority,
    pub status: ActionStatus,
    pub owner_user_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client payload for creating an action. Status always starts `open`;
/// priority defaults to `medium` when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAction {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<ActionPriority>,
    pub workshop_number: Option<u8>,
    pub item_id: Option<String>,
    pub owner_user_id: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Partial patch for an action.
/// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAction {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<ActionPriority>,
    pub status: Option<ActionStatus>,
    pub owner_user_id: Option<Option<String>>,
    pub due_date: Option<Option<NaiveDate>>,
}
