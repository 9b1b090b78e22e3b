//! Checklist item instance domain model.
//!
//! One instance exists per (program, item_id) pair. The acceptance-state
//! key set equals the item definition's acceptance criteria, and
//! `workshop_number` is denormalized from the definition at creation and
//! never changes.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    NotStarted,
    InProgress,
    Done,
    Validated,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::NotStarted => "not_started",
            ItemStatus::InProgress => "in_progress",
            ItemStatus::Done => "done",
            ItemStatus::Validated => "validated",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(ItemStatus::NotStarted),
            "in_progress" => Some(ItemStatus::InProgress),
            "done" => Some(ItemStatus::Done),
            "validated" => Some(ItemStatus::Validated),
            _ => None,
        }
    }

    /// Done or validated — the states that satisfy a mandatory item for
    /// workshop auto-completion.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, ItemStatus::Done | ItemStatus::Validated)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemInstance {
    pub id: Uuid,
    pub program_id: Uuid,
    /// Catalog item id (e.g. `A1-01`).
    pub item_id: String,
    pub workshop_number: u8,
    pub status: ItemStatus,
    pub owner_user_id: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub notes_markdown: Option<String>,
    /// Checked-state per acceptance criterion text.
    pub acceptance_state: BTreeMap<String, bool>,
    /// Manual completion override, independent of acceptance flags.
    pub done_override: bool,
    pub validated_by: Option<String>,
    pub validated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial patch for an item instance. Only present fields are applied.
/// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItemInstance {
    pub status: Option<ItemStatus>,
    pub owner_user_id: Option<Option<String>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub notes_markdown: Option<Option<String>>,
    /// Full post-merge acceptance map (service merges key-by-key).
    pub acceptance_state: Option<BTreeMap<String, bool>>,
    pub done_override: Option<bool>,
    pub validated_by: Option<Option<String>>,
    pub validated_at: Option<Option<DateTime<Utc>>>,
}
