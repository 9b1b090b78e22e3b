//! SurrealDB implementations of [`KpiRepository`] and
//! [`IsoProfileRepository`].

use chrono::{DateTime, Utc};
use govdesk_core::error::GovResult;
use govdesk_core::models::compliance::{IsoProfile, Kpi};
use govdesk_core::repository::{IsoProfileRepository, KpiRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::parse_uuid;

#[derive(Debug, SurrealValue)]
struct KpiRow {
    tenant_id: String,
    kpi_id: String,
    name: String,
    value: f64,
    measured_at: DateTime<Utc>,
}

impl KpiRow {
    fn try_into_kpi(self) -> Result<Kpi, DbError> {
        Ok(Kpi {
            id: self.kpi_id,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            name: self.name,
            value: self.value,
            measured_at: self.measured_at,
        })
    }
}

/// SurrealDB implementation of the compliance KPI repository.
#[derive(Clone)]
pub struct SurrealKpiRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealKpiRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> KpiRepository for SurrealKpiRepository<C> {
    async fn insert(&self, kpi: Kpi) -> GovResult<Kpi> {
        let result = self
            .db
            .query(
                "CREATE compliance_kpi SET \
                 tenant_id = $tenant_id, kpi_id = $kpi_id, \
                 name = $name, value = $value, \
                 measured_at = $measured_at",
            )
            .bind(("tenant_id", kpi.tenant_id.to_string()))
            .bind(("kpi_id", kpi.id.clone()))
            .bind(("name", kpi.name.clone()))
            .bind(("value", kpi.value))
            .bind(("measured_at", kpi.measured_at))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_check(e, "compliance_kpi"))?;

        Ok(kpi)
    }

    async fn list(&self, tenant_id: Uuid) -> GovResult<Vec<Kpi>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM compliance_kpi \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY kpi_id ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<KpiRow> = result.take(0).map_err(DbError::from)?;
        let kpis = rows
            .into_iter()
            .map(|row| row.try_into_kpi())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(kpis)
    }
}

#[derive(Debug, SurrealValue)]
struct IsoProfileRow {
    tenant_id: String,
    iso_code: String,
    name: String,
    enabled: bool,
}

impl IsoProfileRow {
    fn try_into_profile(self) -> Result<IsoProfile, DbError> {
        Ok(IsoProfile {
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            iso_code: self.iso_code,
            name: self.name,
            enabled: self.enabled,
        })
    }
}

/// SurrealDB implementation of the ISO referential profile repository.
#[derive(Clone)]
pub struct SurrealIsoProfileRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealIsoProfileRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> IsoProfileRepository for SurrealIsoProfileRepository<C> {
    async fn insert(&self, profile: IsoProfile) -> GovResult<IsoProfile> {
        let result = self
            .db
            .query(
                "CREATE tenant_iso_profile SET \
                 tenant_id = $tenant_id, iso_code = $iso_code, \
                 name = $name, enabled = $enabled",
            )
            .bind(("tenant_id", profile.tenant_id.to_string()))
            .bind(("iso_code", profile.iso_code.clone()))
            .bind(("name", profile.name.clone()))
            .bind(("enabled", profile.enabled))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_check(e, "tenant_iso_profile"))?;

        Ok(profile)
    }

    async fn list(&self, tenant_id: Uuid) -> GovResult<Vec<IsoProfile>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM tenant_iso_profile \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY iso_code ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IsoProfileRow> = result.take(0).map_err(DbError::from)?;
        let profiles = rows
            .into_iter()
            .map(|row| row.try_into_profile())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(profiles)
    }

    async fn list_enabled(&self, tenant_id: Uuid) -> GovResult<Vec<IsoProfile>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM tenant_iso_profile \
                 WHERE tenant_id = $tenant_id AND enabled = true \
                 ORDER BY iso_code ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IsoProfileRow> = result.take(0).map_err(DbError::from)?;
        let profiles = rows
            .into_iter()
            .map(|row| row.try_into_profile())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(profiles)
    }

    async fn set_enabled(
        &self,
        tenant_id: Uuid,
        iso_code: &str,
        enabled: bool,
    ) -> GovResult<()> {
        let result = self
            .db
            .query(
                "UPDATE tenant_iso_profile SET enabled = $enabled \
                 WHERE tenant_id = $tenant_id AND iso_code = $iso_code",
            )
            .bind(("enabled", enabled))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("iso_code", iso_code.to_string()))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::from_check(e, "tenant_iso_profile"))?;

        Ok(())
    }
}
