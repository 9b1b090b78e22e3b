//! Integration tests for the program KPI aggregation service using
//! in-memory SurrealDB.

use chrono::Utc;
use govdesk_core::catalog::Catalog;
use govdesk_core::models::action::{ActionStatus, CreateAction, UpdateAction};
use govdesk_core::models::decision::CreateDecision;
use govdesk_core::models::evidence::{CreateEvidence, EvidenceType};
use govdesk_core::models::item::{ItemStatus, UpdateItemInstance};
use govdesk_core::models::workshop::WorkshopStatus;
use govdesk_core::repository::{
    ActionRepository, DecisionRepository, EvidenceRepository, ItemInstanceRepository,
    WorkshopInstanceRepository,
};
use govdesk_db::repository::{
    SurrealActionRepository, SurrealDecisionRepository, SurrealEvidenceRepository,
    SurrealItemInstanceRepository, SurrealProgramRepository,
    SurrealWorkshopInstanceRepository,
};
use govdesk_services::{KpiService, ProgramService};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

struct Fixture {
    db: Surreal<Db>,
    program_id: Uuid,
}

/// Helper: in-memory DB with migrations and a freshly created program.
async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    govdesk_db::run_migrations(&db).await.unwrap();

    let service = ProgramService::new(
        SurrealProgramRepository::new(db.clone()),
        SurrealWorkshopInstanceRepository::new(db.clone()),
        SurrealItemInstanceRepository::new(db.clone()),
        Catalog::builtin().unwrap(),
    );
    let program = service
        .get_or_create(Uuid::new_v4(), "demo@bizdesk365.local")
        .await
        .unwrap();
    Fixture {
        db,
        program_id: program.id,
    }
}

fn kpi_service(
    db: &Surreal<Db>,
) -> KpiService<
    SurrealWorkshopInstanceRepository<Db>,
    SurrealItemInstanceRepository<Db>,
    SurrealActionRepository<Db>,
    SurrealDecisionRepository<Db>,
    SurrealEvidenceRepository<Db>,
> {
    KpiService::new(
        SurrealWorkshopInstanceRepository::new(db.clone()),
        SurrealItemInstanceRepository::new(db.clone()),
        SurrealActionRepository::new(db.clone()),
        SurrealDecisionRepository::new(db.clone()),
        SurrealEvidenceRepository::new(db.clone()),
    )
}

#[tokio::test]
async fn fresh_program_reports_zeroes() {
    let fx = setup().await;
    let catalog = Catalog::builtin().unwrap();

    let kpis = kpi_service(&fx.db).compute(fx.program_id).await.unwrap();

    assert_eq!(kpis.workshops_completed, 0);
    assert_eq!(kpis.workshop_completion_pct, 0.0);
    assert_eq!(kpis.items_total, catalog.items().len());
    assert_eq!(kpis.items_not_started, catalog.items().len());
    assert_eq!(kpis.items_done, 0);
    assert_eq!(kpis.items_validated, 0);
    assert_eq!(kpis.actions_open_count, 0);
    assert_eq!(kpis.actions_ageing_avg_days, 0.0);
    assert_eq!(kpis.actions_ageing_max_days, 0);
    assert_eq!(kpis.decisions_count, 0);
    assert_eq!(kpis.evidence_count, 0);
    // Every item is ownerless and there are no open actions.
    assert_eq!(kpis.ownership_missing_pct, 100.0);
}

#[tokio::test]
async fn item_status_breakdown_is_counted() {
    let fx = setup().await;
    let item_repo = SurrealItemInstanceRepository::new(fx.db.clone());

    for (item_id, status) in [
        ("A1-01", ItemStatus::Done),
        ("A1-02", ItemStatus::Validated),
        ("A1-03", ItemStatus::InProgress),
        ("A2-01", ItemStatus::InProgress),
    ] {
        item_repo
            .update(
                fx.program_id,
                item_id,
                UpdateItemInstance {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let kpis = kpi_service(&fx.db).compute(fx.program_id).await.unwrap();
    assert_eq!(kpis.items_done, 1);
    assert_eq!(kpis.items_validated, 1);
    assert_eq!(kpis.items_in_progress, 2);
    assert_eq!(kpis.items_not_started, kpis.items_total - 4);
}

#[tokio::test]
async fn workshop_completion_uses_fixed_divisor() {
    let fx = setup().await;
    let workshop_repo = SurrealWorkshopInstanceRepository::new(fx.db.clone());

    workshop_repo
        .mark_completed(fx.program_id, 1, Utc::now())
        .await
        .unwrap();
    workshop_repo
        .mark_completed(fx.program_id, 2, Utc::now())
        .await
        .unwrap();

    let kpis = kpi_service(&fx.db).compute(fx.program_id).await.unwrap();
    assert_eq!(kpis.workshops_completed, 2);
    assert_eq!(kpis.workshop_completion_pct, 20.0);

    let workshops = workshop_repo.list(fx.program_id).await.unwrap();
    assert_eq!(
        workshops
            .iter()
            .filter(|w| w.status == WorkshopStatus::Completed)
            .count(),
        2
    );
}

#[tokio::test]
async fn action_ageing_covers_open_actions_only() {
    let fx = setup().await;
    let action_repo = SurrealActionRepository::new(fx.db.clone());

    let open = action_repo
        .create(
            fx.program_id,
            CreateAction {
                title: "Action ouverte".into(),
                description: None,
                priority: None,
                workshop_number: None,
                item_id: None,
                owner_user_id: Some("jean.dupont".into()),
                due_date: None,
            },
        )
        .await
        .unwrap();
    let closed = action_repo
        .create(
            fx.program_id,
            CreateAction {
                title: "Action fermée".into(),
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
    action_repo
        .update(
            fx.program_id,
            closed.id,
            UpdateAction {
                status: Some(ActionStatus::Done),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let kpis = kpi_service(&fx.db).compute(fx.program_id).await.unwrap();
    assert_eq!(kpis.actions_open_count, 1);
    // Created just now, so ageing is zero days.
    assert_eq!(kpis.actions_ageing_avg_days, 0.0);
    assert_eq!(kpis.actions_ageing_max_days, 0);

    // The open action has an owner; the done one does not count.
    let items_total = kpis.items_total;
    let expected =
        items_total as f64 / (items_total + 1) as f64 * 100.0;
    assert_eq!(kpis.ownership_missing_pct, expected);
    assert_eq!(open.owner_user_id.as_deref(), Some("jean.dupont"));
}

#[tokio::test]
async fn decision_and_evidence_counts() {
    let fx = setup().await;

    SurrealDecisionRepository::new(fx.db.clone())
        .create(
            fx.program_id,
            "demo@bizdesk365.local".into(),
            CreateDecision {
                decision_text: "Stratégie DLP adoptée".into(),
                workshop_number: Some(2),
                item_id: None,
                evidence_links: vec![],
            },
        )
        .await
        .unwrap();

    SurrealEvidenceRepository::new(fx.db.clone())
        .create(
            fx.program_id,
            "demo@bizdesk365.local".into(),
            CreateEvidence {
                evidence_type: EvidenceType::Link,
                title: "Politique DLP publiée".into(),
                url: Some("https://wiki.example.com/dlp".into()),
                file_ref: None,
                date: Utc::now().date_naive(),
                workshop_number: Some(2),
                item_id: None,
            },
        )
        .await
        .unwrap();

    let kpis = kpi_service(&fx.db).compute(fx.program_id).await.unwrap();
    assert_eq!(kpis.decisions_count, 1);
    assert_eq!(kpis.evidence_count, 1);
}
