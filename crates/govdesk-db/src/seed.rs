//! Demo dataset seeding.
//!
//! Idempotent: if the demo tenant already exists the whole routine is
//! skipped. The dataset mirrors the demo environment used by the
//! frontend: one tenant, one login, three compliance KPIs, four ISO
//! referential profiles, an AI usage policy, one knowledge source with
//! four scored documents, and four usage-log entries.

use chrono::{DateTime, Utc};
use govdesk_core::error::{GovError, GovResult};
use govdesk_core::models::ai::{AiUsagePolicy, CreateAiUsageLog, UsageDecision};
use govdesk_core::models::compliance::{IsoProfile, Kpi};
use govdesk_core::models::knowledge::{KnowledgeDocument, KnowledgeSource};
use govdesk_core::models::tenant::Tenant;
use govdesk_core::models::user::CreateUser;
use govdesk_core::repository::{
    AiPolicyRepository, IsoProfileRepository, KnowledgeRepository, KpiRepository,
    TenantRepository, UsageLogRepository, UserRepository,
};
use surrealdb::{Connection, Surreal};
use tracing::info;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::{
    SurrealAiPolicyRepository, SurrealIsoProfileRepository, SurrealKnowledgeRepository,
    SurrealKpiRepository, SurrealTenantRepository, SurrealUsageLogRepository,
    SurrealUserRepository,
};

/// Fixed id of the demo tenant.
pub const DEMO_TENANT_ID: &str = "11111111-1111-1111-1111-111111111111";
/// Demo login email.
pub const DEMO_USER_EMAIL: &str = "demo@bizdesk365.local";
/// Demo login password (hashed with Argon2id at seed time).
pub const DEMO_USER_PASSWORD: &str = "demo";

fn ts(s: &str) -> GovResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| GovError::Internal(format!("bad seed timestamp {s}: {e}")))
}

fn demo_tenant_id() -> GovResult<Uuid> {
    Uuid::parse_str(DEMO_TENANT_ID)
        .map_err(|e| GovError::Internal(format!("bad demo tenant id: {e}")))
}

/// Seed the demo dataset unless it is already present.
pub async fn seed_demo_data<C: Connection>(
    db: &Surreal<C>,
    pepper: Option<String>,
) -> GovResult<()> {
    let tenant_id = demo_tenant_id()?;

    let tenant_repo = SurrealTenantRepository::new(db.clone());
    match tenant_repo.get_by_id(tenant_id).await {
        Ok(_) => {
            info!("Database already seeded");
            return Ok(());
        }
        Err(GovError::NotFound { .. }) => {}
        Err(e) => return Err(e),
    }

    // The tenant record carries the fixed demo id, so it is created
    // directly rather than through the repository (which mints ids).
    let result = db
        .query("CREATE type::record('tenant', $id) SET name = $name")
        .bind(("id", DEMO_TENANT_ID))
        .bind(("name", "Demo Org"))
        .await
        .map_err(DbError::from)?;
    result
        .check()
        .map_err(|e| DbError::from_check(e, "tenant"))?;

    let kpi_repo = SurrealKpiRepository::new(db.clone());
    let measured_at = ts("2024-01-15T10:00:00Z")?;
    for (id, name, value) in [
        ("kpi-001", "MaturityIndex", 0.72),
        ("kpi-002", "PolicyCoverage", 0.85),
        ("kpi-003", "AuditFreshnessDays", 15.0),
    ] {
        kpi_repo
            .insert(Kpi {
                id: id.into(),
                tenant_id,
                name: name.into(),
                value,
                measured_at,
            })
            .await?;
    }

    let iso_repo = SurrealIsoProfileRepository::new(db.clone());
    for (iso_code, name, enabled) in [
        ("ISO9001", "Qualité", true),
        ("ISO27001", "Sécurité de l'information", true),
        ("ISO14001", "Environnement", false),
        ("ISO45001", "Santé et sécurité", false),
    ] {
        iso_repo
            .insert(IsoProfile {
                tenant_id,
                iso_code: iso_code.into(),
                name: name.into(),
                enabled,
            })
            .await?;
    }

    let policy_repo = SurrealAiPolicyRepository::new(db.clone());
    policy_repo
        .upsert(AiUsagePolicy {
            tenant_id,
            min_iqi_authorized: 0.80,
            min_iqi_assisted: 0.60,
        })
        .await?;

    let knowledge_repo = SurrealKnowledgeRepository::new(db.clone());
    knowledge_repo
        .insert_source(KnowledgeSource {
            id: "source-001".into(),
            tenant_id,
            source_type: "SharePoint".into(),
            name: "Documentation Interne".into(),
            description: "Base documentaire SharePoint principale".into(),
        })
        .await?;

    for (id, title, doc_type, url, last_updated, confidence_score, validated, owner) in [
        (
            "doc-001",
            "Politique de Sécurité Informatique",
            "Politique",
            "https://sharepoint.example.com/doc/001",
            "2024-01-10T14:30:00Z",
            0.92,
            true,
            "Jean Dupont",
        ),
        (
            "doc-002",
            "Procédure de Gestion des Incidents",
            "Procédure",
            "https://sharepoint.example.com/doc/002",
            "2023-11-20T09:15:00Z",
            0.75,
            true,
            "Marie Martin",
        ),
        (
            "doc-003",
            "Guide d'Utilisation IA",
            "Guide",
            "https://sharepoint.example.com/doc/003",
            "2024-01-05T16:45:00Z",
            0.88,
            false,
            "Pierre Durand",
        ),
        (
            "doc-004",
            "Charte Éthique IA",
            "Charte",
            "https://sharepoint.example.com/doc/004",
            "2023-08-01T11:00:00Z",
            0.55,
            false,
            "Sophie Bernard",
        ),
    ] {
        knowledge_repo
            .insert_document(KnowledgeDocument {
                id: id.into(),
                tenant_id,
                source_id: "source-001".into(),
                title: title.into(),
                doc_type: doc_type.into(),
                url: url.into(),
                last_updated: last_updated.into(),
                confidence_score,
                validated,
                owner: owner.into(),
            })
            .await?;
    }

    let usage_repo = SurrealUsageLogRepository::new(db.clone());
    for (document_id, decision, checked_at, intent) in [
        (
            "doc-001",
            UsageDecision::Authorized,
            "2024-01-15T08:00:00Z",
            "Analyse de conformité",
        ),
        (
            "doc-002",
            UsageDecision::Assisted,
            "2024-01-15T09:00:00Z",
            "Recherche procédure",
        ),
        (
            "doc-003",
            UsageDecision::Authorized,
            "2024-01-15T10:00:00Z",
            "Formation utilisateur",
        ),
        (
            "doc-004",
            UsageDecision::Forbidden,
            "2024-01-15T11:00:00Z",
            "Rédaction rapport",
        ),
    ] {
        usage_repo
            .append(CreateAiUsageLog {
                tenant_id,
                document_id: document_id.into(),
                decision,
                checked_at: ts(checked_at)?,
                intent: intent.into(),
            })
            .await?;
    }

    let user_repo = SurrealUserRepository::new(db.clone(), pepper);
    user_repo
        .create(CreateUser {
            tenant_id,
            email: DEMO_USER_EMAIL.into(),
            password: DEMO_USER_PASSWORD.into(),
            roles: vec!["admin".into(), "user".into()],
        })
        .await?;

    info!("Database seeded successfully");
    Ok(())
}

/// Fetch the demo tenant, mainly for tests.
pub async fn demo_tenant<C: Connection>(db: &Surreal<C>) -> GovResult<Tenant> {
    let tenant_repo = SurrealTenantRepository::new(db.clone());
    tenant_repo.get_by_id(demo_tenant_id()?).await
}
