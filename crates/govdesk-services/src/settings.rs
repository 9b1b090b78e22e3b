//! Tenant settings — ISO referential enablement and the AI usage
//! policy.

use govdesk_core::error::{GovError, GovResult};
use govdesk_core::models::ai::AiUsagePolicy;
use govdesk_core::models::compliance::IsoProfile;
use govdesk_core::repository::{AiPolicyRepository, IsoProfileRepository};
use uuid::Uuid;

/// One ISO toggle in an update request.
#[derive(Debug, Clone)]
pub struct IsoToggle {
    pub iso_code: String,
    pub enabled: bool,
}

/// Settings service.
pub struct SettingsService<P, A>
where
    P: IsoProfileRepository,
    A: AiPolicyRepository,
{
    iso_repo: P,
    policy_repo: A,
}

impl<P, A> SettingsService<P, A>
where
    P: IsoProfileRepository,
    A: AiPolicyRepository,
{
    pub fn new(iso_repo: P, policy_repo: A) -> Self {
        Self {
            iso_repo,
            policy_repo,
        }
    }

    pub async fn iso_profiles(&self, tenant_id: Uuid) -> GovResult<Vec<IsoProfile>> {
        self.iso_repo.list(tenant_id).await
    }

    /// Apply each toggle as an upsert, then return the full listing.
    pub async fn update_iso_profiles(
        &self,
        tenant_id: Uuid,
        toggles: Vec<IsoToggle>,
    ) -> GovResult<Vec<IsoProfile>> {
        for toggle in toggles {
            self.iso_repo
                .set_enabled(tenant_id, &toggle.iso_code, toggle.enabled)
                .await?;
        }
        self.iso_repo.list(tenant_id).await
    }

    /// The stored policy, or the built-in defaults when none exists.
    pub async fn ai_policy(&self, tenant_id: Uuid) -> GovResult<AiUsagePolicy> {
        Ok(self
            .policy_repo
            .get(tenant_id)
            .await?
            .unwrap_or_else(|| AiUsagePolicy::defaults(tenant_id)))
    }

    /// Validate and store new thresholds.
    pub async fn update_ai_policy(
        &self,
        tenant_id: Uuid,
        min_iqi_authorized: f64,
        min_iqi_assisted: f64,
    ) -> GovResult<AiUsagePolicy> {
        if min_iqi_authorized < min_iqi_assisted {
            return Err(GovError::Validation {
                message: "Le seuil autorisé doit être supérieur au seuil assisté".into(),
            });
        }
        if !(0.0..=1.0).contains(&min_iqi_authorized)
            || !(0.0..=1.0).contains(&min_iqi_assisted)
        {
            return Err(GovError::Validation {
                message: "Les seuils doivent être compris entre 0 et 1".into(),
            });
        }

        self.policy_repo
            .upsert(AiUsagePolicy {
                tenant_id,
                min_iqi_authorized,
                min_iqi_assisted,
            })
            .await
    }
}
