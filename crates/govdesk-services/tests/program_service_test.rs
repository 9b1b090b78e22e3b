//! Integration tests for the program lifecycle service — lazy
//! creation, criteria merging and workshop auto-completion — using
//! in-memory SurrealDB.

use std::collections::BTreeMap;

use govdesk_core::catalog::Catalog;
use govdesk_core::error::GovError;
use govdesk_core::models::item::{ItemStatus, UpdateItemInstance};
use govdesk_core::models::workshop::WorkshopStatus;
use govdesk_db::repository::{
    SurrealItemInstanceRepository, SurrealProgramRepository, SurrealWorkshopInstanceRepository,
};
use govdesk_services::ProgramService;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

type Service = ProgramService<
    SurrealProgramRepository<Db>,
    SurrealWorkshopInstanceRepository<Db>,
    SurrealItemInstanceRepository<Db>,
>;

/// Helper: in-memory DB with migrations plus a service over it.
async fn setup() -> Service {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    govdesk_db::run_migrations(&db).await.unwrap();
    ProgramService::new(
        SurrealProgramRepository::new(db.clone()),
        SurrealWorkshopInstanceRepository::new(db.clone()),
        SurrealItemInstanceRepository::new(db),
        Catalog::builtin().unwrap(),
    )
}

/// Helper: check every completion criterion of one workshop.
async fn check_all_criteria(service: &Service, program_id: Uuid, workshop_number: u8) {
    let detail = service
        .get_workshop(program_id, workshop_number)
        .await
        .unwrap();
    let patch: BTreeMap<String, bool> = detail
        .definition
        .completion_criteria
        .iter()
        .map(|c| (c.clone(), true))
        .collect();
    service
        .update_workshop(program_id, workshop_number, None, Some(patch))
        .await
        .unwrap();
}

/// Helper: mark every mandatory item of one workshop done.
async fn fulfil_mandatory_items(service: &Service, program_id: Uuid, workshop_number: u8) {
    let catalog = Catalog::builtin().unwrap();
    for def in catalog.mandatory_items_for_workshop(workshop_number) {
        service
            .update_item(
                program_id,
                &def.item_id,
                UpdateItemInstance {
                    status: Some(ItemStatus::Done),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn get_or_create_is_idempotent() {
    let service = setup().await;
    let tenant_id = Uuid::new_v4();

    let first = service
        .get_or_create(tenant_id, "demo@bizdesk365.local")
        .await
        .unwrap();
    assert_eq!(first.name, "Programme de Gouvernance Power Platform");
    assert_eq!(first.created_by, "demo@bizdesk365.local");

    let second = service
        .get_or_create(tenant_id, "someone.else@bizdesk365.local")
        .await
        .unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_by, "demo@bizdesk365.local");
}

#[tokio::test]
async fn list_workshops_joins_definitions_and_rollups() {
    let service = setup().await;
    let program = service
        .get_or_create(Uuid::new_v4(), "demo")
        .await
        .unwrap();

    let summaries = service.list_workshops(program.id).await.unwrap();
    assert_eq!(summaries.len(), 10);

    let first = &summaries[0];
    assert_eq!(first.definition.workshop_number, 1);
    assert_eq!(first.instance.status, WorkshopStatus::NotStarted);
    assert_eq!(first.items_total, 7);
    assert_eq!(first.items_done, 0);
    assert!(!first.definition.completion_criteria.is_empty());
}

#[tokio::test]
async fn criteria_patch_merges_and_drops_unknown_keys() {
    let service = setup().await;
    let program = service
        .get_or_create(Uuid::new_v4(), "demo")
        .await
        .unwrap();

    let detail = service.get_workshop(program.id, 1).await.unwrap();
    let first_criterion = detail.definition.completion_criteria[0].clone();

    let mut patch = BTreeMap::new();
    patch.insert(first_criterion.clone(), true);
    patch.insert("Critère inconnu".to_string(), true);

    let updated = service
        .update_workshop(program.id, 1, None, Some(patch))
        .await
        .unwrap();

    assert_eq!(
        updated.completion_criteria_state.get(&first_criterion),
        Some(&true)
    );
    assert!(!updated.completion_criteria_state.contains_key("Critère inconnu"));
    // Unpatched criteria keep their state.
    assert_eq!(
        updated.completion_criteria_state.len(),
        detail.definition.completion_criteria.len()
    );
    assert_eq!(
        updated
            .completion_criteria_state
            .values()
            .filter(|v| **v)
            .count(),
        1
    );
}

#[tokio::test]
async fn started_at_is_stamped_once() {
    let service = setup().await;
    let program = service
        .get_or_create(Uuid::new_v4(), "demo")
        .await
        .unwrap();

    let started = service
        .update_workshop(program.id, 2, Some(WorkshopStatus::InProgress), None)
        .await
        .unwrap();
    let stamp = started.started_at.unwrap();

    // Leaving and re-entering in_progress keeps the original stamp.
    service
        .update_workshop(program.id, 2, Some(WorkshopStatus::NotStarted), None)
        .await
        .unwrap();
    let again = service
        .update_workshop(program.id, 2, Some(WorkshopStatus::InProgress), None)
        .await
        .unwrap();
    assert_eq!(again.started_at.unwrap(), stamp);
}

#[tokio::test]
async fn workshop_auto_completes_when_criteria_and_mandatory_items_met() {
    let service = setup().await;
    let program = service
        .get_or_create(Uuid::new_v4(), "demo")
        .await
        .unwrap();

    // Criteria alone do not complete the workshop while mandatory
    // items remain unfulfilled.
    check_all_criteria(&service, program.id, 1).await;
    let pending = service.get_workshop(program.id, 1).await.unwrap();
    assert_ne!(pending.instance.status, WorkshopStatus::Completed);

    fulfil_mandatory_items(&service, program.id, 1).await;
    let completed = service.get_workshop(program.id, 1).await.unwrap();
    assert_eq!(completed.instance.status, WorkshopStatus::Completed);
    assert!(completed.instance.completed_at.is_some());
}

#[tokio::test]
async fn mandatory_items_alone_do_not_complete_workshop() {
    let service = setup().await;
    let program = service
        .get_or_create(Uuid::new_v4(), "demo")
        .await
        .unwrap();

    fulfil_mandatory_items(&service, program.id, 4).await;
    let detail = service.get_workshop(program.id, 4).await.unwrap();
    assert_ne!(detail.instance.status, WorkshopStatus::Completed);
}

#[tokio::test]
async fn completed_workshop_never_reverts() {
    let service = setup().await;
    let program = service
        .get_or_create(Uuid::new_v4(), "demo")
        .await
        .unwrap();

    check_all_criteria(&service, program.id, 1).await;
    fulfil_mandatory_items(&service, program.id, 1).await;
    let completed = service.get_workshop(program.id, 1).await.unwrap();
    assert_eq!(completed.instance.status, WorkshopStatus::Completed);
    let stamp = completed.instance.completed_at.unwrap();

    // Unchecking a criterion afterwards leaves the completion alone.
    let criterion = completed.definition.completion_criteria[0].clone();
    let mut patch = BTreeMap::new();
    patch.insert(criterion, false);
    service
        .update_workshop(program.id, 1, None, Some(patch))
        .await
        .unwrap();

    let after = service.get_workshop(program.id, 1).await.unwrap();
    assert_eq!(after.instance.status, WorkshopStatus::Completed);
    assert_eq!(after.instance.completed_at.unwrap(), stamp);
}

#[tokio::test]
async fn validate_and_unvalidate_item() {
    let service = setup().await;
    let program = service
        .get_or_create(Uuid::new_v4(), "demo")
        .await
        .unwrap();

    let validated = service
        .validate_item(program.id, "A1-01", true, "marie.martin")
        .await
        .unwrap();
    assert_eq!(validated.status, ItemStatus::Validated);
    assert_eq!(validated.validated_by.as_deref(), Some("marie.martin"));
    assert!(validated.validated_at.is_some());

    let reverted = service
        .validate_item(program.id, "A1-01", false, "marie.martin")
        .await
        .unwrap();
    assert_eq!(reverted.status, ItemStatus::Done);
    assert!(reverted.validated_by.is_none());
    assert!(reverted.validated_at.is_none());
}

#[tokio::test]
async fn item_acceptance_patch_merges_key_by_key() {
    let service = setup().await;
    let catalog = Catalog::builtin().unwrap();
    let program = service
        .get_or_create(Uuid::new_v4(), "demo")
        .await
        .unwrap();

    // Pick an item with at least two acceptance criteria.
    let def = catalog
        .items()
        .iter()
        .find(|i| i.acceptance_criteria.len() >= 2)
        .unwrap();

    let mut first_patch = BTreeMap::new();
    first_patch.insert(def.acceptance_criteria[0].clone(), true);
    service
        .update_item(
            program.id,
            &def.item_id,
            UpdateItemInstance {
                acceptance_state: Some(first_patch),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut second_patch = BTreeMap::new();
    second_patch.insert(def.acceptance_criteria[1].clone(), true);
    let updated = service
        .update_item(
            program.id,
            &def.item_id,
            UpdateItemInstance {
                acceptance_state: Some(second_patch),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Both patched keys hold; the first was not wiped by the second.
    assert_eq!(
        updated.acceptance_state.get(&def.acceptance_criteria[0]),
        Some(&true)
    );
    assert_eq!(
        updated.acceptance_state.get(&def.acceptance_criteria[1]),
        Some(&true)
    );
}

#[tokio::test]
async fn unknown_workshop_number_is_rejected() {
    let service = setup().await;
    let program = service
        .get_or_create(Uuid::new_v4(), "demo")
        .await
        .unwrap();

    let result = service.get_workshop(program.id, 11).await;
    assert!(matches!(result, Err(GovError::NotFound { .. })));
}
