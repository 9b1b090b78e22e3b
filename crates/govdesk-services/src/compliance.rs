//! Compliance maturity scoring.

use std::collections::BTreeMap;

use govdesk_core::error::GovResult;
use govdesk_core::models::compliance::Kpi;
use govdesk_core::repository::{IsoProfileRepository, KpiRepository};
use serde::Serialize;
use uuid::Uuid;

/// Maturity score with its band and inputs.
#[derive(Debug, Clone, Serialize)]
pub struct MaturityReport {
    pub score: f64,
    pub band: &'static str,
    /// Raw KPI values by name, as read.
    pub inputs: BTreeMap<String, f64>,
    /// Enabled ISO referential codes.
    pub iso_referentials: Vec<String>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Compliance maturity service.
pub struct ComplianceService<K, P>
where
    K: KpiRepository,
    P: IsoProfileRepository,
{
    kpi_repo: K,
    iso_repo: P,
}

impl<K, P> ComplianceService<K, P>
where
    K: KpiRepository,
    P: IsoProfileRepository,
{
    pub fn new(kpi_repo: K, iso_repo: P) -> Self {
        Self { kpi_repo, iso_repo }
    }

    /// Raw KPI listing for the tenant.
    pub async fn latest_kpis(&self, tenant_id: Uuid) -> GovResult<Vec<Kpi>> {
        self.kpi_repo.list(tenant_id).await
    }

    /// Weighted maturity score over the three named KPIs.
    ///
    /// Missing KPIs fall back to MaturityIndex 0.0, PolicyCoverage
    /// 0.0, AuditFreshnessDays 30 (which scores 0.0 freshness).
    pub async fn maturity_score(&self, tenant_id: Uuid) -> GovResult<MaturityReport> {
        let kpis = self.kpi_repo.list(tenant_id).await?;
        let enabled = self.iso_repo.list_enabled(tenant_id).await?;

        let mut maturity_index = 0.0;
        let mut policy_coverage = 0.0;
        let mut audit_freshness = 30.0;
        let mut inputs = BTreeMap::new();
        for kpi in &kpis {
            inputs.insert(kpi.name.clone(), kpi.value);
            match kpi.name.as_str() {
                "MaturityIndex" => maturity_index = kpi.value,
                "PolicyCoverage" => policy_coverage = kpi.value,
                "AuditFreshnessDays" => audit_freshness = kpi.value,
                _ => {}
            }
        }

        let freshness_score = if audit_freshness < 7.0 {
            1.0
        } else if audit_freshness < 30.0 {
            0.5
        } else {
            0.0
        };

        let score = maturity_index * 0.4 + policy_coverage * 0.4 + freshness_score * 0.2;
        let score = round2(score);
        let band = if score >= 0.75 {
            "green"
        } else if score >= 0.50 {
            "yellow"
        } else {
            "red"
        };

        Ok(MaturityReport {
            score,
            band,
            inputs,
            iso_referentials: enabled.into_iter().map(|p| p.iso_code).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::round2;

    #[test]
    fn rounding_is_two_decimals() {
        assert_eq!(round2(0.728), 0.73);
        assert_eq!(round2(0.725), 0.73);
        assert_eq!(round2(0.0), 0.0);
    }
}
