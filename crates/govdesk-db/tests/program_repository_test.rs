//! Integration tests for program, workshop instance and item instance
//! repositories using in-memory SurrealDB.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use govdesk_core::catalog::Catalog;
use govdesk_core::error::GovError;
use govdesk_core::models::item::{ItemInstance, ItemStatus, UpdateItemInstance};
use govdesk_core::models::program::{Program, ProgramStatus};
use govdesk_core::models::workshop::{
    UpdateWorkshopInstance, WorkshopInstance, WorkshopStatus,
};
use govdesk_core::repository::{
    ItemFilter, ItemInstanceRepository, ProgramRepository, WorkshopInstanceRepository,
};
use govdesk_db::repository::{
    SurrealItemInstanceRepository, SurrealProgramRepository, SurrealWorkshopInstanceRepository,
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

/// Helper: build a program with one workshop instance per catalog
/// workshop and one item instance per catalog item.
fn build_program(
    catalog: &Catalog,
    tenant_id: Uuid,
) -> (Program, Vec<WorkshopInstance>, Vec<ItemInstance>) {
    let program_id = Uuid::new_v4();
    let program = Program {
        id: program_id,
        tenant_id,
        name: "Programme de Gouvernance Power Platform".into(),
        status: ProgramStatus::NotStarted,
        start_date: None,
        end_date: None,
        created_by: "demo@bizdesk365.local".into(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let workshops = catalog
        .workshops()
        .iter()
        .map(|def| WorkshopInstance {
            id: Uuid::new_v4(),
            program_id,
            workshop_number: def.workshop_number,
            status: WorkshopStatus::NotStarted,
            completion_criteria_state: def
                .completion_criteria
                .iter()
                .map(|c| (c.clone(), false))
                .collect(),
            started_at: None,
            completed_at: None,
        })
        .collect();

    let items = catalog
        .items()
        .iter()
        .map(|def| ItemInstance {
            id: Uuid::new_v4(),
            program_id,
            item_id: def.item_id.clone(),
            workshop_number: def.workshop_number,
            status: ItemStatus::NotStarted,
            owner_user_id: None,
            due_date: None,
            notes_markdown: None,
            acceptance_state: def
                .acceptance_criteria
                .iter()
                .map(|c| (c.clone(), false))
                .collect(),
            done_override: false,
            validated_by: None,
            validated_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .collect();

    (program, workshops, items)
}

/// Helper: seed a full program tree and return its ID.
async fn seed_program(db: &Surreal<surrealdb::engine::local::Db>, tenant_id: Uuid) -> Uuid {
    let catalog = Catalog::builtin().unwrap();
    let (program, workshops, items) = build_program(&catalog, tenant_id);
    SurrealProgramRepository::new(db.clone())
        .insert_with_instances(program, workshops, items)
        .await
        .unwrap()
        .id
}

// -----------------------------------------------------------------------
// Program tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn insert_creates_program_with_all_instances() {
    let db = setup().await;
    let catalog = Catalog::builtin().unwrap();
    let tenant_id = Uuid::new_v4();

    let (program, workshops, items) = build_program(&catalog, tenant_id);
    let expected_id = program.id;

    let created = SurrealProgramRepository::new(db.clone())
        .insert_with_instances(program, workshops, items)
        .await
        .unwrap();

    assert_eq!(created.id, expected_id);
    assert_eq!(created.tenant_id, tenant_id);
    assert_eq!(created.status, ProgramStatus::NotStarted);
    assert_eq!(created.name, "Programme de Gouvernance Power Platform");

    let stored_workshops = SurrealWorkshopInstanceRepository::new(db.clone())
        .list(created.id)
        .await
        .unwrap();
    assert_eq!(stored_workshops.len(), catalog.workshops().len());
    assert_eq!(stored_workshops[0].workshop_number, 1);
    assert!(stored_workshops[0].started_at.is_none());
    assert!(
        stored_workshops[0]
            .completion_criteria_state
            .values()
            .all(|v| !v)
    );

    let stored_items = SurrealItemInstanceRepository::new(db)
        .list(created.id, ItemFilter::default())
        .await
        .unwrap();
    assert_eq!(stored_items.len(), catalog.items().len());
}

#[tokio::test]
async fn find_by_tenant_returns_none_before_creation() {
    let db = setup().await;
    let repo = SurrealProgramRepository::new(db);

    let found = repo.find_by_tenant(Uuid::new_v4()).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn second_program_for_tenant_is_rejected_atomically() {
    let db = setup().await;
    let catalog = Catalog::builtin().unwrap();
    let tenant_id = Uuid::new_v4();
    let repo = SurrealProgramRepository::new(db.clone());

    let first = seed_program(&db, tenant_id).await;

    let (program, workshops, items) = build_program(&catalog, tenant_id);
    let loser_id = program.id;
    let result = repo.insert_with_instances(program, workshops, items).await;
    assert!(matches!(result, Err(GovError::AlreadyExists { .. })));

    // The losing transaction must leave no instances behind.
    let orphans = SurrealWorkshopInstanceRepository::new(db.clone())
        .list(loser_id)
        .await
        .unwrap();
    assert!(orphans.is_empty());

    let found = repo.find_by_tenant(tenant_id).await.unwrap().unwrap();
    assert_eq!(found.id, first);
}

// -----------------------------------------------------------------------
// Workshop instance tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn get_and_update_workshop() {
    let db = setup().await;
    let program_id = seed_program(&db, Uuid::new_v4()).await;
    let repo = SurrealWorkshopInstanceRepository::new(db);

    let workshop = repo.get(program_id, 3).await.unwrap();
    assert_eq!(workshop.workshop_number, 3);
    assert_eq!(workshop.status, WorkshopStatus::NotStarted);

    let mut criteria = workshop.completion_criteria_state.clone();
    if let Some(first) = criteria.keys().next().cloned() {
        criteria.insert(first, true);
    }
    let started = Utc::now();
    let updated = repo
        .update(
            program_id,
            3,
            UpdateWorkshopInstance {
                status: Some(WorkshopStatus::InProgress),
                completion_criteria_state: Some(criteria.clone()),
                started_at: Some(started),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, WorkshopStatus::InProgress);
    assert_eq!(updated.completion_criteria_state, criteria);
    assert!(updated.started_at.is_some());

    // An empty patch is a no-op returning the current row.
    let unchanged = repo
        .update(program_id, 3, UpdateWorkshopInstance::default())
        .await
        .unwrap();
    assert_eq!(unchanged.status, WorkshopStatus::InProgress);
}

#[tokio::test]
async fn unknown_workshop_number_is_not_found() {
    let db = setup().await;
    let program_id = seed_program(&db, Uuid::new_v4()).await;
    let repo = SurrealWorkshopInstanceRepository::new(db);

    let result = repo.get(program_id, 42).await;
    assert!(matches!(result, Err(GovError::NotFound { .. })));
}

#[tokio::test]
async fn mark_completed_keeps_first_completion_time() {
    let db = setup().await;
    let program_id = seed_program(&db, Uuid::new_v4()).await;
    let repo = SurrealWorkshopInstanceRepository::new(db);

    let first_time = Utc::now();
    let completed = repo
        .mark_completed(program_id, 1, first_time)
        .await
        .unwrap();
    assert_eq!(completed.status, WorkshopStatus::Completed);
    let stamped = completed.completed_at.unwrap();

    // A later call must not move the completion time.
    let again = repo
        .mark_completed(program_id, 1, first_time + Duration::hours(2))
        .await
        .unwrap();
    assert_eq!(again.completed_at.unwrap(), stamped);
}

// -----------------------------------------------------------------------
// Item instance tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn list_items_with_filters() {
    let db = setup().await;
    let catalog = Catalog::builtin().unwrap();
    let program_id = seed_program(&db, Uuid::new_v4()).await;
    let repo = SurrealItemInstanceRepository::new(db);

    let workshop_one = repo
        .list(
            program_id,
            ItemFilter {
                workshop_number: Some(1),
                status: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(workshop_one.len(), catalog.items_for_workshop(1).len());
    assert!(workshop_one.iter().all(|i| i.workshop_number == 1));

    // Flip one item to done and filter on status.
    let target = &workshop_one[0].item_id;
    repo.update(
        program_id,
        target,
        UpdateItemInstance {
            status: Some(ItemStatus::Done),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let done = repo
        .list(
            program_id,
            ItemFilter {
                workshop_number: None,
                status: Some(ItemStatus::Done),
            },
        )
        .await
        .unwrap();
    assert_eq!(done.len(), 1);
    assert_eq!(&done[0].item_id, target);
}

#[tokio::test]
async fn update_item_sets_and_clears_fields() {
    let db = setup().await;
    let catalog = Catalog::builtin().unwrap();
    let program_id = seed_program(&db, Uuid::new_v4()).await;
    let repo = SurrealItemInstanceRepository::new(db);

    let item_id = catalog.items()[0].item_id.clone();

    let mut acceptance = BTreeMap::new();
    acceptance.insert("Critère validé".to_string(), true);

    let updated = repo
        .update(
            program_id,
            &item_id,
            UpdateItemInstance {
                status: Some(ItemStatus::InProgress),
                owner_user_id: Some(Some("marie.martin".into())),
                notes_markdown: Some(Some("## Notes\nEn cours".into())),
                acceptance_state: Some(acceptance.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, ItemStatus::InProgress);
    assert_eq!(updated.owner_user_id.as_deref(), Some("marie.martin"));
    assert_eq!(updated.acceptance_state, acceptance);
    assert!(updated.updated_at >= updated.created_at);

    // Some(None) clears a previously set field.
    let cleared = repo
        .update(
            program_id,
            &item_id,
            UpdateItemInstance {
                owner_user_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.owner_user_id.is_none());
    // Untouched fields survive.
    assert_eq!(cleared.status, ItemStatus::InProgress);
}

#[tokio::test]
async fn unknown_item_is_not_found() {
    let db = setup().await;
    let program_id = seed_program(&db, Uuid::new_v4()).await;
    let repo = SurrealItemInstanceRepository::new(db);

    let result = repo.get(program_id, "no-such-item").await;
    assert!(matches!(result, Err(GovError::NotFound { .. })));
}
