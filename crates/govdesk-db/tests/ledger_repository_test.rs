//! Integration tests for the action, decision and evidence ledger
//! repositories using in-memory SurrealDB.

use chrono::NaiveDate;
use govdesk_core::error::GovError;
use govdesk_core::models::action::{
    ActionPriority, ActionStatus, CreateAction, UpdateAction,
};
use govdesk_core::models::decision::CreateDecision;
use govdesk_core::models::evidence::{CreateEvidence, EvidenceType};
use govdesk_core::repository::{
    ActionFilter, ActionRepository, DecisionRepository, EvidenceRepository, LedgerFilter,
};
use govdesk_db::repository::{
    SurrealActionRepository, SurrealDecisionRepository, SurrealEvidenceRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    govdesk_db::run_migrations(&db).await.unwrap();
    db
}

fn sample_action(title: &str) -> CreateAction {
    CreateAction {
        title: title.into(),
        description: Some("Mettre en place le CoE".into()),
        priority: None,
        workshop_number: Some(2),
        item_id: Some("item-2-1".into()),
        owner_user_id: None,
        due_date: None,
    }
}

// -----------------------------------------------------------------------
// Action tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_action_applies_defaults() {
    let db = setup().await;
    let repo = SurrealActionRepository::new(db);
    let program_id = Uuid::new_v4();

    let action = repo
        .create(program_id, sample_action("Déployer les environnements"))
        .await
        .unwrap();

    assert_eq!(action.program_id, program_id);
    assert_eq!(action.title, "Déployer les environnements");
    assert_eq!(action.status, ActionStatus::Open);
    assert_eq!(action.priority, ActionPriority::Medium);
    assert_eq!(action.workshop_number, Some(2));

    let explicit = repo
        .create(
            program_id,
            CreateAction {
                priority: Some(ActionPriority::High),
                ..sample_action("Former les administrateurs")
            },
        )
        .await
        .unwrap();
    assert_eq!(explicit.priority, ActionPriority::High);
}

#[tokio::test]
async fn list_actions_with_filters() {
    let db = setup().await;
    let repo = SurrealActionRepository::new(db);
    let program_id = Uuid::new_v4();

    let a1 = repo
        .create(program_id, sample_action("Action atelier 2"))
        .await
        .unwrap();
    repo.create(
        program_id,
        CreateAction {
            workshop_number: Some(5),
            item_id: None,
            priority: Some(ActionPriority::High),
            ..sample_action("Action atelier 5")
        },
    )
    .await
    .unwrap();

    let all = repo
        .list(program_id, ActionFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let by_workshop = repo
        .list(
            program_id,
            ActionFilter {
                workshop_number: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_workshop.len(), 1);
    assert_eq!(by_workshop[0].id, a1.id);

    let by_priority = repo
        .list(
            program_id,
            ActionFilter {
                priority: Some(ActionPriority::High),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_priority.len(), 1);

    // Scoped to another program nothing is visible.
    let other = repo
        .list(Uuid::new_v4(), ActionFilter::default())
        .await
        .unwrap();
    assert!(other.is_empty());
}

#[tokio::test]
async fn update_action_status_and_clear_owner() {
    let db = setup().await;
    let repo = SurrealActionRepository::new(db);
    let program_id = Uuid::new_v4();

    let action = repo
        .create(
            program_id,
            CreateAction {
                owner_user_id: Some("pierre.durand".into()),
                ..sample_action("Auditer les connecteurs")
            },
        )
        .await
        .unwrap();

    let updated = repo
        .update(
            program_id,
            action.id,
            UpdateAction {
                status: Some(ActionStatus::Done),
                owner_user_id: Some(None),
                due_date: Some(Some(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, ActionStatus::Done);
    assert!(updated.owner_user_id.is_none());
    assert_eq!(updated.due_date, Some(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()));
    assert!(updated.updated_at >= action.updated_at);
}

#[tokio::test]
async fn delete_action_and_missing_delete_fails() {
    let db = setup().await;
    let repo = SurrealActionRepository::new(db);
    let program_id = Uuid::new_v4();

    let action = repo
        .create(program_id, sample_action("Temporaire"))
        .await
        .unwrap();

    repo.delete(program_id, action.id).await.unwrap();
    let gone = repo.get(program_id, action.id).await;
    assert!(matches!(gone, Err(GovError::NotFound { .. })));

    let missing = repo.delete(program_id, Uuid::new_v4()).await;
    assert!(matches!(missing, Err(GovError::NotFound { .. })));
}

// -----------------------------------------------------------------------
// Decision tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn record_and_list_decisions() {
    let db = setup().await;
    let repo = SurrealDecisionRepository::new(db);
    let program_id = Uuid::new_v4();

    let decision = repo
        .create(
            program_id,
            "demo@bizdesk365.local".into(),
            CreateDecision {
                decision_text: "Adoption du modèle d'environnements par défaut".into(),
                workshop_number: Some(2),
                item_id: None,
                evidence_links: vec!["https://wiki.example.com/decision-1".into()],
            },
        )
        .await
        .unwrap();

    assert_eq!(decision.decided_by, "demo@bizdesk365.local");
    assert_eq!(decision.evidence_links.len(), 1);

    repo.create(
        program_id,
        "demo@bizdesk365.local".into(),
        CreateDecision {
            decision_text: "Choix de l'outil de supervision".into(),
            workshop_number: Some(7),
            item_id: Some("item-7-1".into()),
            evidence_links: vec![],
        },
    )
    .await
    .unwrap();

    let all = repo.list(program_id, LedgerFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    let filtered = repo
        .list(
            program_id,
            LedgerFilter {
                workshop_number: Some(7),
                item_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].decision_text, "Choix de l'outil de supervision");
}

#[tokio::test]
async fn delete_decision_is_scoped_to_program() {
    let db = setup().await;
    let repo = SurrealDecisionRepository::new(db);
    let program_id = Uuid::new_v4();

    let decision = repo
        .create(
            program_id,
            "demo@bizdesk365.local".into(),
            CreateDecision {
                decision_text: "À supprimer".into(),
                workshop_number: None,
                item_id: None,
                evidence_links: vec![],
            },
        )
        .await
        .unwrap();

    // Deleting through the wrong program must not touch the row.
    let wrong = repo.delete(Uuid::new_v4(), decision.id).await;
    assert!(matches!(wrong, Err(GovError::NotFound { .. })));

    repo.delete(program_id, decision.id).await.unwrap();
    let remaining = repo.list(program_id, LedgerFilter::default()).await.unwrap();
    assert!(remaining.is_empty());
}

// -----------------------------------------------------------------------
// Evidence tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn attach_and_list_evidence() {
    let db = setup().await;
    let repo = SurrealEvidenceRepository::new(db);
    let program_id = Uuid::new_v4();

    let evidence = repo
        .create(
            program_id,
            "demo@bizdesk365.local".into(),
            CreateEvidence {
                evidence_type: EvidenceType::Screenshot,
                title: "Capture du centre d'administration".into(),
                url: Some("https://admin.powerplatform.microsoft.com".into()),
                file_ref: None,
                date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
                workshop_number: Some(4),
                item_id: Some("item-4-2".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(evidence.owner, "demo@bizdesk365.local");
    assert_eq!(evidence.evidence_type, EvidenceType::Screenshot);
    assert_eq!(evidence.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());

    let by_item = repo
        .list(
            program_id,
            LedgerFilter {
                workshop_number: None,
                item_id: Some("item-4-2".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(by_item.len(), 1);
    assert_eq!(by_item[0].id, evidence.id);

    repo.delete(program_id, evidence.id).await.unwrap();
    let missing = repo.delete(program_id, evidence.id).await;
    assert!(matches!(missing, Err(GovError::NotFound { .. })));
}
