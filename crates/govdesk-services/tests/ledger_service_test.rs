//! Integration tests for the ledger service using in-memory SurrealDB.

use govdesk_core::models::action::{ActionStatus, CreateAction, UpdateAction};
use govdesk_core::models::decision::CreateDecision;
use govdesk_core::repository::{ActionFilter, LedgerFilter};
use govdesk_db::repository::{
    SurrealActionRepository, SurrealDecisionRepository, SurrealEvidenceRepository,
};
use govdesk_services::LedgerService;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> LedgerService<
    SurrealActionRepository<Db>,
    SurrealDecisionRepository<Db>,
    SurrealEvidenceRepository<Db>,
> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    govdesk_db::run_migrations(&db).await.unwrap();
    LedgerService::new(
        SurrealActionRepository::new(db.clone()),
        SurrealDecisionRepository::new(db.clone()),
        SurrealEvidenceRepository::new(db),
    )
}

#[tokio::test]
async fn listed_actions_carry_ageing() {
    let service = setup().await;
    let program_id = Uuid::new_v4();

    let action = service
        .create_action(
            program_id,
            CreateAction {
                title: "Mettre en place la stratégie DLP".into(),
                description: None,
                priority: None,
                workshop_number: Some(2),
                item_id: None,
                owner_user_id: None,
                due_date: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(action.status, ActionStatus::Open);

    let aged = service
        .list_actions(program_id, ActionFilter::default())
        .await
        .unwrap();
    assert_eq!(aged.len(), 1);
    assert_eq!(aged[0].action.id, action.id);
    // Created just now.
    assert_eq!(aged[0].ageing_days, 0);
}

#[tokio::test]
async fn action_update_and_delete_roundtrip() {
    let service = setup().await;
    let program_id = Uuid::new_v4();

    let action = service
        .create_action(
            program_id,
            CreateAction {
                title: "Inventorier les connecteurs".into(),
                description: None,
                priority: None,
                workshop_number: None,
                item_id: None,
                owner_user_id: None,
                due_date: None,
            },
        )
        .await
        .unwrap();

    let updated = service
        .update_action(
            program_id,
            action.id,
            UpdateAction {
                status: Some(ActionStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, ActionStatus::InProgress);

    service.delete_action(program_id, action.id).await.unwrap();
    let remaining = service
        .list_actions(program_id, ActionFilter::default())
        .await
        .unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn decisions_record_the_author() {
    let service = setup().await;
    let program_id = Uuid::new_v4();

    let decision = service
        .record_decision(
            program_id,
            "demo@bizdesk365.local",
            CreateDecision {
                decision_text: "Gel des connecteurs non approuvés".into(),
                workshop_number: Some(2),
                item_id: None,
                evidence_links: vec![],
            },
        )
        .await
        .unwrap();
    assert_eq!(decision.decided_by, "demo@bizdesk365.local");

    let listed = service
        .list_decisions(program_id, LedgerFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    service
        .delete_decision(program_id, decision.id)
        .await
        .unwrap();
    let remaining = service
        .list_decisions(program_id, LedgerFilter::default())
        .await
        .unwrap();
    assert!(remaining.is_empty());
}
