//! Action / decision / evidence ledgers.
//!
//! Thin program-scoped CRUD over the ledger repositories. The only
//! derived value is action ageing, computed on read as whole days
//! since creation.

use chrono::Utc;
use govdesk_core::error::GovResult;
use govdesk_core::models::action::{Action, CreateAction, UpdateAction};
use govdesk_core::models::decision::{CreateDecision, Decision};
use govdesk_core::models::evidence::{CreateEvidence, Evidence};
use govdesk_core::repository::{
    ActionFilter, ActionRepository, DecisionRepository, EvidenceRepository, LedgerFilter,
};
use serde::Serialize;
use uuid::Uuid;

/// An action with its ageing in whole days.
#[derive(Debug, Clone, Serialize)]
pub struct AgedAction {
    #[serde(flatten)]
    pub action: Action,
    pub ageing_days: i64,
}

fn age(action: Action) -> AgedAction {
    let ageing_days = (Utc::now() - action.created_at).num_days();
    AgedAction {
        action,
        ageing_days,
    }
}

/// Ledger service over the three program-scoped ledgers.
pub struct LedgerService<A, D, E>
where
    A: ActionRepository,
    D: DecisionRepository,
    E: EvidenceRepository,
{
    action_repo: A,
    decision_repo: D,
    evidence_repo: E,
}

impl<A, D, E> LedgerService<A, D, E>
where
    A: ActionRepository,
    D: DecisionRepository,
    E: EvidenceRepository,
{
    pub fn new(action_repo: A, decision_repo: D, evidence_repo: E) -> Self {
        Self {
            action_repo,
            decision_repo,
            evidence_repo,
        }
    }

    pub async fn create_action(
        &self,
        program_id: Uuid,
        input: CreateAction,
    ) -> GovResult<Action> {
        self.action_repo.create(program_id, input).await
    }

    pub async fn list_actions(
        &self,
        program_id: Uuid,
        filter: ActionFilter,
    ) -> GovResult<Vec<AgedAction>> {
        let actions = self.action_repo.list(program_id, filter).await?;
        Ok(actions.into_iter().map(age).collect())
    }

    pub async fn update_action(
        &self,
        program_id: Uuid,
        id: Uuid,
        patch: UpdateAction,
    ) -> GovResult<Action> {
        self.action_repo.update(program_id, id, patch).await
    }

    pub async fn delete_action(&self, program_id: Uuid, id: Uuid) -> GovResult<()> {
        self.action_repo.delete(program_id, id).await
    }

    /// Record a decision; decider identity comes from the
    /// authenticated caller, never the payload.
    pub async fn record_decision(
        &self,
        program_id: Uuid,
        decided_by: &str,
        input: CreateDecision,
    ) -> GovResult<Decision> {
        self.decision_repo
            .create(program_id, decided_by.to_string(), input)
            .await
    }

    pub async fn list_decisions(
        &self,
        program_id: Uuid,
        filter: LedgerFilter,
    ) -> GovResult<Vec<Decision>> {
        self.decision_repo.list(program_id, filter).await
    }

    pub async fn delete_decision(&self, program_id: Uuid, id: Uuid) -> GovResult<()> {
        self.decision_repo.delete(program_id, id).await
    }

    /// Attach evidence; owner comes from the authenticated caller.
    pub async fn attach_evidence(
        &self,
        program_id: Uuid,
        owner: &str,
        input: CreateEvidence,
    ) -> GovResult<Evidence> {
        self.evidence_repo
            .create(program_id, owner.to_string(), input)
            .await
    }

    pub async fn list_evidence(
        &self,
        program_id: Uuid,
        filter: LedgerFilter,
    ) -> GovResult<Vec<Evidence>> {
        self.evidence_repo.list(program_id, filter).await
    }

    pub async fn delete_evidence(&self, program_id: Uuid, id: Uuid) -> GovResult<()> {
        self.evidence_repo.delete(program_id, id).await
    }
}
