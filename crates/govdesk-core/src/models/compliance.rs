//! Compliance KPI records and ISO referential profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named compliance KPI measurement (e.g. `MaturityIndex`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kpi {
    pub id: String,
    pub tenant_id: Uuid,
    pub name: String,
    pub value: f64,
    pub measured_at: DateTime<Utc>,
}

/// Per-tenant enablement of an ISO referential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsoProfile {
    pub tenant_id: Uuid,
    pub iso_code: String,
    pub name: String,
    pub enabled: bool,
}
