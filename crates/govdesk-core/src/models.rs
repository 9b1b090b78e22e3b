//! Domain models for GOVDESK.
//!
//! These are the core types shared across all crates. Every entity
//! except the static catalog carries a tenant scope, either directly
//! (`tenant_id`) or transitively through a tenant-bound program.

pub mod action;
pub mod ai;
pub mod compliance;
pub mod decision;
pub mod evidence;
pub mod item;
pub mod knowledge;
pub mod module;
pub mod program;
pub mod tenant;
pub mod user;
pub mod workshop;
