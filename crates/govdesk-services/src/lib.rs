//! GovDesk Services — tenant-scoped business logic over the repository
//! traits: program lifecycle, ledgers, KPI aggregation, compliance and
//! document-quality scoring, AI governance, settings, and the module
//! registry.
//!
//! Every service is generic over the repositories it reads so the
//! logic stays independent of the storage backend. Tenant and program
//! scope always arrive as explicit parameters derived from verified
//! token claims.

pub mod compliance;
pub mod governance;
pub mod kpi;
pub mod ledgers;
pub mod program;
pub mod quality;
pub mod registry;
pub mod settings;

pub use compliance::{ComplianceService, MaturityReport};
pub use governance::{GovernanceService, GovernanceSummary};
pub use kpi::{KpiService, ProgramKpis};
pub use ledgers::{AgedAction, LedgerService};
pub use program::{ProgramService, WorkshopDetail, WorkshopSummary};
pub use quality::{QualityService, QualityReport, UsageVerdict};
pub use registry::ModuleRegistry;
pub use settings::{IsoToggle, SettingsService};
