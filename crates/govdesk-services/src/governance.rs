//! AI governance summary over the usage log.

use govdesk_core::error::GovResult;
use govdesk_core::models::ai::UsageDecision;
use govdesk_core::repository::UsageLogRepository;
use serde::Serialize;
use uuid::Uuid;

/// Static follow-up placeholder presented alongside the summary.
#[derive(Debug, Clone, Serialize)]
pub struct CriticalAction {
    pub id: &'static str,
    pub title: &'static str,
    pub priority: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Traceability {
    pub logged: usize,
    pub audited: usize,
    pub anomalies: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GovernanceSummary {
    pub authorized_percentage: f64,
    pub assisted_percentage: f64,
    pub forbidden_percentage: f64,
    pub total_usages: usize,
    pub critical_actions: Vec<CriticalAction>,
    pub traceability: Traceability,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn critical_actions() -> Vec<CriticalAction> {
    vec![
        CriticalAction {
            id: "action-001",
            title: "Revalider les documents avec IQI < 0.6",
            priority: "high",
            status: "pending",
        },
        CriticalAction {
            id: "action-002",
            title: "Mettre à jour la politique d'utilisation IA",
            priority: "medium",
            status: "in_progress",
        },
        CriticalAction {
            id: "action-003",
            title: "Former les utilisateurs aux bonnes pratiques IA",
            priority: "low",
            status: "planned",
        },
    ]
}

/// AI governance reporting service.
pub struct GovernanceService<U: UsageLogRepository> {
    usage_repo: U,
}

impl<U: UsageLogRepository> GovernanceService<U> {
    pub fn new(usage_repo: U) -> Self {
        Self { usage_repo }
    }

    /// Decision-share percentages over all usage logs. The audited
    /// count is a synthetic 85% of total; anomalies equal the
    /// forbidden count.
    pub async fn summary(&self, tenant_id: Uuid) -> GovResult<GovernanceSummary> {
        let logs = self.usage_repo.list(tenant_id).await?;
        let total = logs.len();

        if total == 0 {
            return Ok(GovernanceSummary {
                authorized_percentage: 0.0,
                assisted_percentage: 0.0,
                forbidden_percentage: 0.0,
                total_usages: 0,
                critical_actions: Vec::new(),
                traceability: Traceability {
                    logged: 0,
                    audited: 0,
                    anomalies: 0,
                },
            });
        }

        let count = |d: UsageDecision| logs.iter().filter(|l| l.decision == d).count();
        let authorized = count(UsageDecision::Authorized);
        let assisted = count(UsageDecision::Assisted);
        let forbidden = count(UsageDecision::Forbidden);

        let pct = |n: usize| round1(n as f64 / total as f64 * 100.0);

        Ok(GovernanceSummary {
            authorized_percentage: pct(authorized),
            assisted_percentage: pct(assisted),
            forbidden_percentage: pct(forbidden),
            total_usages: total,
            critical_actions: critical_actions(),
            traceability: Traceability {
                logged: total,
                audited: (total as f64 * 0.85) as usize,
                anomalies: forbidden,
            },
        })
    }
}
