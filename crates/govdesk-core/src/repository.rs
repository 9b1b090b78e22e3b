//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant- or program-scoped
//! repositories require the scope as a mandatory parameter — tenant
//! isolation is applied by construction, never as an optional filter.
//! Callers must derive the tenant id from verified token claims only.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::GovResult;
use crate::models::{
    action::{Action, CreateAction, UpdateAction},
    ai::{AiUsageLog, AiUsagePolicy, CreateAiUsageLog},
    compliance::{IsoProfile, Kpi},
    decision::{CreateDecision, Decision},
    evidence::{CreateEvidence, Evidence},
    item::{ItemInstance, ItemStatus, UpdateItemInstance},
    knowledge::{KnowledgeDocument, KnowledgeSource},
    program::Program,
    tenant::{CreateTenant, Tenant},
    user::{CreateUser, User},
    workshop::{UpdateWorkshopInstance, WorkshopInstance},
};

// ---------------------------------------------------------------------------
// Tenants & users
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = GovResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = GovResult<Tenant>> + Send;
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = GovResult<User>> + Send;
    /// Login lookup — email globally identifies a user.
    fn get_by_email(&self, email: &str) -> impl Future<Output = GovResult<User>> + Send;
    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = GovResult<User>> + Send;
}

// ---------------------------------------------------------------------------
// Compliance KPIs, ISO profiles, AI policy (tenant-scoped)
// ---------------------------------------------------------------------------

pub trait KpiRepository: Send + Sync {
    fn insert(&self, kpi: Kpi) -> impl Future<Output = GovResult<Kpi>> + Send;
    fn list(&self, tenant_id: Uuid) -> impl Future<Output = GovResult<Vec<Kpi>>> + Send;
}

pub trait IsoProfileRepository: Send + Sync {
    fn insert(&self, profile: IsoProfile) -> impl Future<Output = GovResult<IsoProfile>> + Send;
    fn list(&self, tenant_id: Uuid) -> impl Future<Output = GovResult<Vec<IsoProfile>>> + Send;
    fn list_enabled(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = GovResult<Vec<IsoProfile>>> + Send;
    /// Set the enabled flag for one referential code. Codes the
    /// tenant does not have are a no-op.
    fn set_enabled(
        &self,
        tenant_id: Uuid,
        iso_code: &str,
        enabled: bool,
    ) -> impl Future<Output = GovResult<()>> + Send;
}

pub trait AiPolicyRepository: Send + Sync {
    fn get(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = GovResult<Option<AiUsagePolicy>>> + Send;
    fn upsert(
        &self,
        policy: AiUsagePolicy,
    ) -> impl Future<Output = GovResult<AiUsagePolicy>> + Send;
}

// ---------------------------------------------------------------------------
// Knowledge base & AI usage logs (tenant-scoped)
// ---------------------------------------------------------------------------

pub trait KnowledgeRepository: Send + Sync {
    fn insert_source(
        &self,
        source: KnowledgeSource,
    ) -> impl Future<Output = GovResult<KnowledgeSource>> + Send;
    fn insert_document(
        &self,
        document: KnowledgeDocument,
    ) -> impl Future<Output = GovResult<KnowledgeDocument>> + Send;
    fn list_sources(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = GovResult<Vec<KnowledgeSource>>> + Send;
    fn list_documents(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = GovResult<Vec<KnowledgeDocument>>> + Send;
    fn get_document(
        &self,
        tenant_id: Uuid,
        document_id: &str,
    ) -> impl Future<Output = GovResult<KnowledgeDocument>> + Send;
}

pub trait UsageLogRepository: Send + Sync {
    /// Append-only — no update or delete operations exist.
    fn append(
        &self,
        input: CreateAiUsageLog,
    ) -> impl Future<Output = GovResult<AiUsageLog>> + Send;
    fn list(&self, tenant_id: Uuid) -> impl Future<Output = GovResult<Vec<AiUsageLog>>> + Send;
}

// ---------------------------------------------------------------------------
// Program and its instances
// ---------------------------------------------------------------------------

pub trait ProgramRepository: Send + Sync {
    /// Transactionally insert a program together with its workshop and
    /// item instances. Fails with `AlreadyExists` when the tenant
    /// already has a program (unique index on tenant_id), in which case
    /// nothing is written.
    fn insert_with_instances(
        &self,
        program: Program,
        workshops: Vec<WorkshopInstance>,
        items: Vec<ItemInstance>,
    ) -> impl Future<Output = GovResult<Program>> + Send;

    fn find_by_tenant(
        &self,
        tenant_id: Uuid,
    ) -> impl Future<Output = GovResult<Option<Program>>> + Send;
}

pub trait WorkshopInstanceRepository: Send + Sync {
    fn list(
        &self,
        program_id: Uuid,
    ) -> impl Future<Output = GovResult<Vec<WorkshopInstance>>> + Send;
    fn get(
        &self,
        program_id: Uuid,
        workshop_number: u8,
    ) -> impl Future<Output = GovResult<WorkshopInstance>> + Send;
    fn update(
        &self,
        program_id: Uuid,
        workshop_number: u8,
        patch: UpdateWorkshopInstance,
    ) -> impl Future<Output = GovResult<WorkshopInstance>> + Send;
    /// Idempotently stamp completed status and completion time.
    fn mark_completed(
        &self,
        program_id: Uuid,
        workshop_number: u8,
        completed_at: DateTime<Utc>,
    ) -> impl Future<Output = GovResult<WorkshopInstance>> + Send;
}

/// Optional filters for item instance listings; omission means
/// "unfiltered".
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub workshop_number: Option<u8>,
    pub status: Option<ItemStatus>,
}

pub trait ItemInstanceRepository: Send + Sync {
    fn list(
        &self,
        program_id: Uuid,
        filter: ItemFilter,
    ) -> impl Future<Output = GovResult<Vec<ItemInstance>>> + Send;
    fn get(
        &self,
        program_id: Uuid,
        item_id: &str,
    ) -> impl Future<Output = GovResult<ItemInstance>> + Send;
    fn update(
        &self,
        program_id: Uuid,
        item_id: &str,
        patch: UpdateItemInstance,
    ) -> impl Future<Output = GovResult<ItemInstance>> + Send;
}

// ---------------------------------------------------------------------------
// Ledgers (program-scoped)
// ---------------------------------------------------------------------------

/// Optional filters for action listings.
#[derive(Debug, Clone, Default)]
pub struct ActionFilter {
    pub workshop_number: Option<u8>,
    pub item_id: Option<String>,
    pub status: Option<crate::models::action::ActionStatus>,
    pub priority: Option<crate::models::action::ActionPriority>,
}

/// Optional filters shared by the decision and evidence ledgers.
#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    pub workshop_number: Option<u8>,
    pub item_id: Option<String>,
}

pub trait ActionRepository: Send + Sync {
    /// Creation stamps server-side id and timestamps; status starts
    /// `open`, priority defaults to `medium`.
    fn create(
        &self,
        program_id: Uuid,
        input: CreateAction,
    ) -> impl Future<Output = GovResult<Action>> + Send;
    fn list(
        &self,
        program_id: Uuid,
        filter: ActionFilter,
    ) -> impl Future<Output = GovResult<Vec<Action>>> + Send;
    fn get(
        &self,
        program_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = GovResult<Action>> + Send;
    fn update(
        &self,
        program_id: Uuid,
        id: Uuid,
        patch: UpdateAction,
    ) -> impl Future<Output = GovResult<Action>> + Send;
    /// Hard delete scoped to (id, program_id).
    fn delete(&self, program_id: Uuid, id: Uuid) -> impl Future<Output = GovResult<()>> + Send;
}

pub trait DecisionRepository: Send + Sync {
    fn create(
        &self,
        program_id: Uuid,
        decided_by: String,
        input: CreateDecision,
    ) -> impl Future<Output = GovResult<Decision>> + Send;
    fn list(
        &self,
        program_id: Uuid,
        filter: LedgerFilter,
    ) -> impl Future<Output = GovResult<Vec<Decision>>> + Send;
    fn delete(&self, program_id: Uuid, id: Uuid) -> impl Future<Output = GovResult<()>> + Send;
}

pub trait EvidenceRepository: Send + Sync {
    fn create(
        &self,
        program_id: Uuid,
        owner: String,
        input: CreateEvidence,
    ) -> impl Future<Output = GovResult<Evidence>> + Send;
    fn list(
        &self,
        program_id: Uuid,
        filter: LedgerFilter,
    ) -> impl Future<Output = GovResult<Vec<Evidence>>> + Send;
    fn delete(&self, program_id: Uuid, id: Uuid) -> impl Future<Output = GovResult<()>> + Send;
}
