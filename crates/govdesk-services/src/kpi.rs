//! Program KPI aggregation.
//!
//! Every call recomputes from live data; nothing is cached or stored.

use chrono::Utc;
use govdesk_core::catalog::WORKSHOP_COUNT;
use govdesk_core::error::GovResult;
use govdesk_core::models::item::ItemStatus;
use govdesk_core::models::workshop::WorkshopStatus;
use govdesk_core::repository::{
    ActionFilter, ActionRepository, ItemFilter, ItemInstanceRepository,
    DecisionRepository, EvidenceRepository, LedgerFilter, WorkshopInstanceRepository,
};
use serde::Serialize;
use uuid::Uuid;

/// Aggregated program KPIs.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramKpis {
    pub workshops_completed: usize,
    pub workshop_completion_pct: f64,
    pub items_total: usize,
    pub items_done: usize,
    pub items_validated: usize,
    pub items_in_progress: usize,
    pub items_not_started: usize,
    pub actions_open_count: usize,
    pub actions_ageing_avg_days: f64,
    pub actions_ageing_max_days: i64,
    pub decisions_count: usize,
    pub evidence_count: usize,
    pub ownership_missing_pct: f64,
}

/// KPI aggregation service.
pub struct KpiService<W, I, A, D, E>
where
    W: WorkshopInstanceRepository,
    I: ItemInstanceRepository,
    A: ActionRepository,
    D: DecisionRepository,
    E: EvidenceRepository,
{
    workshop_repo: W,
    item_repo: I,
    action_repo: A,
    decision_repo: D,
    evidence_repo: E,
}

impl<W, I, A, D, E> KpiService<W, I, A, D, E>
where
    W: WorkshopInstanceRepository,
    I: ItemInstanceRepository,
    A: ActionRepository,
    D: DecisionRepository,
    E: EvidenceRepository,
{
    pub fn new(
        workshop_repo: W,
        item_repo: I,
        action_repo: A,
        decision_repo: D,
        evidence_repo: E,
    ) -> Self {
        Self {
            workshop_repo,
            item_repo,
            action_repo,
            decision_repo,
            evidence_repo,
        }
    }

    pub async fn compute(&self, program_id: Uuid) -> GovResult<ProgramKpis> {
        let workshops = self.workshop_repo.list(program_id).await?;
        let items = self.item_repo.list(program_id, ItemFilter::default()).await?;
        let actions = self
            .action_repo
            .list(program_id, ActionFilter::default())
            .await?;
        let decisions = self
            .decision_repo
            .list(program_id, LedgerFilter::default())
            .await?;
        let evidence = self
            .evidence_repo
            .list(program_id, LedgerFilter::default())
            .await?;

        let workshops_completed = workshops
            .iter()
            .filter(|w| w.status == WorkshopStatus::Completed)
            .count();
        // The divisor is the fixed workshop count, not the live
        // instance count.
        let workshop_completion_pct =
            workshops_completed as f64 / WORKSHOP_COUNT as f64 * 100.0;

        let items_total = items.len();
        let count_status =
            |s: ItemStatus| items.iter().filter(|i| i.status == s).count();
        let items_done = count_status(ItemStatus::Done);
        let items_validated = count_status(ItemStatus::Validated);
        let items_in_progress = count_status(ItemStatus::InProgress);
        let items_not_started = count_status(ItemStatus::NotStarted);

        let open_actions: Vec<_> = actions.iter().filter(|a| a.status.is_open()).collect();
        let actions_open_count = open_actions.len();

        let now = Utc::now();
        let ages: Vec<i64> = open_actions
            .iter()
            .map(|a| (now - a.created_at).num_days())
            .collect();
        let actions_ageing_avg_days = if ages.is_empty() {
            0.0
        } else {
            ages.iter().sum::<i64>() as f64 / ages.len() as f64
        };
        let actions_ageing_max_days = ages.iter().copied().max().unwrap_or(0);

        let ownerless_items = items.iter().filter(|i| i.owner_user_id.is_none()).count();
        let ownerless_actions = open_actions
            .iter()
            .filter(|a| a.owner_user_id.is_none())
            .count();
        let denominator = items_total + actions_open_count;
        let ownership_missing_pct = if denominator == 0 {
            0.0
        } else {
            (ownerless_items + ownerless_actions) as f64 / denominator as f64 * 100.0
        };

        Ok(ProgramKpis {
            workshops_completed,
            workshop_completion_pct,
            items_total,
            items_done,
            items_validated,
            items_in_progress,
            items_not_started,
            actions_open_count,
            actions_ageing_avg_days,
            actions_ageing_max_days,
            decisions_count: decisions.len(),
            evidence_count: evidence.len(),
            ownership_missing_pct,
        })
    }
}
