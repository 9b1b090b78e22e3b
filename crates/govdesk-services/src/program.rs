//! Program lifecycle — lazy creation, workshop and item state, and
//! workshop auto-completion.

use std::collections::BTreeMap;

use chrono::Utc;
use govdesk_core::catalog::{Catalog, WorkshopDefinition};
use govdesk_core::error::{GovError, GovResult};
use govdesk_core::models::item::{ItemInstance, ItemStatus, UpdateItemInstance};
use govdesk_core::models::program::{Program, ProgramStatus};
use govdesk_core::models::workshop::{
    UpdateWorkshopInstance, WorkshopInstance, WorkshopStatus,
};
use govdesk_core::repository::{
    ItemFilter, ItemInstanceRepository, ProgramRepository, WorkshopInstanceRepository,
};
use serde::Serialize;
use uuid::Uuid;

/// One workshop joined with its definition and item rollups, for the
/// program overview listing.
#[derive(Debug, Clone, Serialize)]
pub struct WorkshopSummary {
    pub definition: WorkshopDefinition,
    pub instance: WorkshopInstance,
    pub items_total: usize,
    /// Items in done or validated state.
    pub items_done: usize,
}

/// One workshop with its full item list.
#[derive(Debug, Clone, Serialize)]
pub struct WorkshopDetail {
    pub definition: WorkshopDefinition,
    pub instance: WorkshopInstance,
    pub items: Vec<ItemInstance>,
}

/// Program lifecycle service.
pub struct ProgramService<P, W, I>
where
    P: ProgramRepository,
    W: WorkshopInstanceRepository,
    I: ItemInstanceRepository,
{
    program_repo: P,
    workshop_repo: W,
    item_repo: I,
    catalog: Catalog,
}

impl<P, W, I> ProgramService<P, W, I>
where
    P: ProgramRepository,
    W: WorkshopInstanceRepository,
    I: ItemInstanceRepository,
{
    pub fn new(program_repo: P, workshop_repo: W, item_repo: I, catalog: Catalog) -> Self {
        Self {
            program_repo,
            workshop_repo,
            item_repo,
            catalog,
        }
    }

    /// Idempotently fetch the tenant's program, creating it (plus one
    /// workshop instance per definition and one item instance per
    /// definition) on first access.
    ///
    /// A concurrent first access is resolved by the storage uniqueness
    /// constraint: the loser re-fetches the winner's program.
    pub async fn get_or_create(&self, tenant_id: Uuid, creator: &str) -> GovResult<Program> {
        if let Some(program) = self.program_repo.find_by_tenant(tenant_id).await? {
            return Ok(program);
        }

        let program_id = Uuid::new_v4();
        let program = Program {
            id: program_id,
            tenant_id,
            name: "Programme de Gouvernance Power Platform".into(),
            status: ProgramStatus::NotStarted,
            start_date: None,
            end_date: None,
            created_by: creator.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let workshops = self
            .catalog
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

        let items = self
            .catalog
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

        match self
            .program_repo
            .insert_with_instances(program, workshops, items)
            .await
        {
            Ok(created) => {
                tracing::info!(tenant_id = %tenant_id, program_id = %created.id, "program created");
                Ok(created)
            }
            Err(GovError::AlreadyExists { .. }) => {
                // Lost the race; the winner's program is authoritative.
                self.program_repo
                    .find_by_tenant(tenant_id)
                    .await?
                    .ok_or_else(|| GovError::NotFound {
                        entity: "program".into(),
                        id: tenant_id.to_string(),
                    })
            }
            Err(e) => Err(e),
        }
    }

    /// All ten workshops joined with their definitions and item
    /// rollups.
    pub async fn list_workshops(&self, program_id: Uuid) -> GovResult<Vec<WorkshopSummary>> {
        let instances = self.workshop_repo.list(program_id).await?;
        let items = self.item_repo.list(program_id, ItemFilter::default()).await?;

        let mut summaries = Vec::with_capacity(instances.len());
        for instance in instances {
            let definition = self.definition(instance.workshop_number)?.clone();
            let workshop_items: Vec<&ItemInstance> = items
                .iter()
                .filter(|i| i.workshop_number == instance.workshop_number)
                .collect();
            let items_done = workshop_items
                .iter()
                .filter(|i| i.status.is_fulfilled())
                .count();
            summaries.push(WorkshopSummary {
                definition,
                items_total: workshop_items.len(),
                items_done,
                instance,
            });
        }
        Ok(summaries)
    }

    /// One workshop with its item list.
    pub async fn get_workshop(
        &self,
        program_id: Uuid,
        workshop_number: u8,
    ) -> GovResult<WorkshopDetail> {
        let definition = self.definition(workshop_number)?.clone();
        let instance = self.workshop_repo.get(program_id, workshop_number).await?;
        let items = self
            .item_repo
            .list(
                program_id,
                ItemFilter {
                    workshop_number: Some(workshop_number),
                    status: None,
                },
            )
            .await?;
        Ok(WorkshopDetail {
            definition,
            instance,
            items,
        })
    }

    /// Apply a workshop patch. Criteria patches merge key-by-key into
    /// the stored map; keys outside the definition's criteria list are
    /// dropped. The first transition to in_progress stamps started_at.
    /// Runs the auto-completion check afterwards.
    pub async fn update_workshop(
        &self,
        program_id: Uuid,
        workshop_number: u8,
        status: Option<WorkshopStatus>,
        criteria_patch: Option<BTreeMap<String, bool>>,
    ) -> GovResult<WorkshopInstance> {
        let definition = self.definition(workshop_number)?;
        let current = self.workshop_repo.get(program_id, workshop_number).await?;

        let merged = criteria_patch.map(|patch| {
            let mut state = current.completion_criteria_state.clone();
            for (key, value) in patch {
                if definition.completion_criteria.contains(&key) {
                    state.insert(key, value);
                }
            }
            state
        });

        let started_at = match status {
            Some(WorkshopStatus::InProgress) if current.started_at.is_none() => Some(Utc::now()),
            _ => None,
        };

        self.workshop_repo
            .update(
                program_id,
                workshop_number,
                UpdateWorkshopInstance {
                    status,
                    completion_criteria_state: merged,
                    started_at,
                },
            )
            .await?;

        self.check_auto_completion(program_id, workshop_number).await
    }

    /// Apply an item patch. The acceptance map merges key-by-key, keys
    /// outside the definition's criteria list are dropped. Runs the
    /// auto-completion check for the item's workshop afterwards.
    pub async fn update_item(
        &self,
        program_id: Uuid,
        item_id: &str,
        mut patch: UpdateItemInstance,
    ) -> GovResult<ItemInstance> {
        let definition = self
            .catalog
            .item(item_id)
            .ok_or_else(|| GovError::NotFound {
                entity: "item_definition".into(),
                id: item_id.to_string(),
            })?;
        let current = self.item_repo.get(program_id, item_id).await?;

        if let Some(acceptance_patch) = patch.acceptance_state.take() {
            let mut state = current.acceptance_state.clone();
            for (key, value) in acceptance_patch {
                if definition.acceptance_criteria.contains(&key) {
                    state.insert(key, value);
                }
            }
            patch.acceptance_state = Some(state);
        }

        let updated = self.item_repo.update(program_id, item_id, patch).await?;
        self.check_auto_completion(program_id, updated.workshop_number)
            .await?;
        Ok(updated)
    }

    /// Validate or un-validate an item. Validation forces status
    /// `validated` and stamps the validator; un-validation reverts to
    /// `done` and clears both.
    pub async fn validate_item(
        &self,
        program_id: Uuid,
        item_id: &str,
        validated: bool,
        validator: &str,
    ) -> GovResult<ItemInstance> {
        let patch = if validated {
            UpdateItemInstance {
                status: Some(ItemStatus::Validated),
                validated_by: Some(Some(validator.to_string())),
                validated_at: Some(Some(Utc::now())),
                ..Default::default()
            }
        } else {
            UpdateItemInstance {
                status: Some(ItemStatus::Done),
                validated_by: Some(None),
                validated_at: Some(None),
                ..Default::default()
            }
        };

        let updated = self.item_repo.update(program_id, item_id, patch).await?;
        self.check_auto_completion(program_id, updated.workshop_number)
            .await?;
        Ok(updated)
    }

    fn definition(&self, workshop_number: u8) -> GovResult<&WorkshopDefinition> {
        self.catalog
            .workshop(workshop_number)
            .ok_or_else(|| GovError::NotFound {
                entity: "workshop_definition".into(),
                id: workshop_number.to_string(),
            })
    }

    /// Mark a workshop completed iff every completion criterion is
    /// checked and every mandatory item of the workshop is done or
    /// validated. Never reverts an already-completed workshop.
    async fn check_auto_completion(
        &self,
        program_id: Uuid,
        workshop_number: u8,
    ) -> GovResult<WorkshopInstance> {
        let instance = self.workshop_repo.get(program_id, workshop_number).await?;
        if instance.status == WorkshopStatus::Completed {
            return Ok(instance);
        }

        let criteria_met = !instance.completion_criteria_state.is_empty()
            && instance.completion_criteria_state.values().all(|v| *v);
        if !criteria_met {
            return Ok(instance);
        }

        let items = self
            .item_repo
            .list(
                program_id,
                ItemFilter {
                    workshop_number: Some(workshop_number),
                    status: None,
                },
            )
            .await?;
        let mandatory_fulfilled = items.iter().all(|item| {
            match self.catalog.item(&item.item_id) {
                Some(def) if def.is_mandatory() => item.status.is_fulfilled(),
                _ => true,
            }
        });
        if !mandatory_fulfilled {
            return Ok(instance);
        }

        tracing::info!(
            program_id = %program_id,
            workshop_number,
            "workshop auto-completed"
        );
        self.workshop_repo
            .mark_completed(program_id, workshop_number, Utc::now())
            .await
    }
}
