//! Static reference catalog: workshop/item definitions and the feature
//! module registry.
//!
//! Immutable configuration loaded once at process start into a
//! constructed, passed-down [`Catalog`] value — never mutable global
//! state. The definitions are embedded at compile time; persisted
//! collections never hold them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GovError, GovResult};
use crate::models::module::{Module, NavItem};

/// Exact status-requirement string marking an item as mandatory for
/// workshop auto-completion. Variants such as `OBLIGATOIRE (si scope)`
/// or `OPTIONNEL` do not count.
pub const MANDATORY_MARKER: &str = "OBLIGATOIRE";

/// Fixed number of workshops in a governance program. The KPI
/// completion percentage divides by this constant.
pub const WORKSHOP_COUNT: usize = 10;

const WORKSHOP_DEFINITIONS_JSON: &str = include_str!("../data/workshop_definitions.json");
const ITEM_DEFINITIONS_JSON: &str = include_str!("../data/item_definitions.json");

/// Static definition of one of the ten governance workshops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkshopDefinition {
    pub workshop_number: u8,
    pub title: String,
    pub description: String,
    /// Ordered completion-criterion texts; instance state maps are
    /// keyed by these strings.
    pub completion_criteria: Vec<String>,
}

/// Static definition of a checklist deliverable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub item_id: String,
    pub workshop_number: u8,
    pub title: String,
    pub module_name: String,
    pub status_requirement: String,
    pub description: String,
    /// Ordered acceptance-criterion texts.
    pub acceptance_criteria: Vec<String>,
}

impl ItemDefinition {
    pub fn is_mandatory(&self) -> bool {
        self.status_requirement == MANDATORY_MARKER
    }
}

/// Read-only reference data shared by all tenants.
#[derive(Debug, Clone)]
pub struct Catalog {
    workshops: Vec<WorkshopDefinition>,
    items: Vec<ItemDefinition>,
    modules: Vec<Module>,
}

impl Catalog {
    /// Load the embedded definitions. Fails only if the embedded data
    /// is internally inconsistent, which is a build defect.
    pub fn builtin() -> GovResult<Self> {
        let workshops: Vec<WorkshopDefinition> = serde_json::from_str(WORKSHOP_DEFINITIONS_JSON)
            .map_err(|e| GovError::Internal(format!("workshop definitions: {e}")))?;
        let items: Vec<ItemDefinition> = serde_json::from_str(ITEM_DEFINITIONS_JSON)
            .map_err(|e| GovError::Internal(format!("item definitions: {e}")))?;

        let catalog = Self {
            workshops,
            items,
            modules: builtin_modules(),
        };
        catalog.verify()?;
        Ok(catalog)
    }

    fn verify(&self) -> GovResult<()> {
        if self.workshops.len() != WORKSHOP_COUNT {
            return Err(GovError::Internal(format!(
                "expected {WORKSHOP_COUNT} workshop definitions, found {}",
                self.workshops.len()
            )));
        }
        for item in &self.items {
            if self.workshop(item.workshop_number).is_none() {
                return Err(GovError::Internal(format!(
                    "item {} references unknown workshop {}",
                    item.item_id, item.workshop_number
                )));
            }
        }
        Ok(())
    }

    pub fn workshops(&self) -> &[WorkshopDefinition] {
        &self.workshops
    }

    pub fn workshop(&self, workshop_number: u8) -> Option<&WorkshopDefinition> {
        self.workshops
            .iter()
            .find(|w| w.workshop_number == workshop_number)
    }

    pub fn items(&self) -> &[ItemDefinition] {
        &self.items
    }

    pub fn item(&self, item_id: &str) -> Option<&ItemDefinition> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    pub fn items_for_workshop(&self, workshop_number: u8) -> Vec<&ItemDefinition> {
        self.items
            .iter()
            .filter(|i| i.workshop_number == workshop_number)
            .collect()
    }

    /// Mandatory items (exact marker match) for one workshop.
    pub fn mandatory_items_for_workshop(&self, workshop_number: u8) -> Vec<&ItemDefinition> {
        self.items
            .iter()
            .filter(|i| i.workshop_number == workshop_number && i.is_mandatory())
            .collect()
    }

    /// The feature module catalog, identical for every tenant.
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }
}

fn flags(entries: &[(&str, bool)]) -> BTreeMap<String, bool> {
    entries
        .iter()
        .map(|(name, enabled)| (name.to_string(), *enabled))
        .collect()
}

fn builtin_modules() -> Vec<Module> {
    vec![
        Module {
            id: "compliance".into(),
            name: "Conformité ISO".into(),
            description: "Tableaux de bord et rapports de conformité ISO".into(),
            enabled: true,
            nav_items: vec![NavItem {
                id: "compliance-overview".into(),
                label: "Vue d'ensemble".into(),
                path: "/dashboards/compliance".into(),
                icon: "ShieldCheck".into(),
            }],
            feature_flags: flags(&[("maturity_score", true), ("audit_tracking", true)]),
        },
        Module {
            id: "enterprise_brain".into(),
            name: "Enterprise Brain".into(),
            description: "Intelligence documentaire et qualité de l'information".into(),
            enabled: true,
            nav_items: vec![NavItem {
                id: "eb-overview".into(),
                label: "Qualité documentaire".into(),
                path: "/dashboards/enterprise-brain".into(),
                icon: "Brain".into(),
            }],
            feature_flags: flags(&[("iqi_score", true), ("document_validation", true)]),
        },
        Module {
            id: "ai_governance".into(),
            name: "Gouvernance IA".into(),
            description: "Tableau de bord exécutif de gouvernance IA".into(),
            enabled: true,
            nav_items: vec![NavItem {
                id: "ai-gov-dashboard".into(),
                label: "Tableau de bord IA".into(),
                path: "/dashboards/ai-governance".into(),
                icon: "Bot".into(),
            }],
            feature_flags: flags(&[("usage_tracking", true), ("policy_enforcement", true)]),
        },
        Module {
            id: "settings".into(),
            name: "Paramètres".into(),
            description: "Configuration de l'organisation".into(),
            enabled: true,
            nav_items: vec![NavItem {
                id: "settings-main".into(),
                label: "Paramètres".into(),
                path: "/settings".into(),
                icon: "Settings".into(),
            }],
            feature_flags: BTreeMap::new(),
        },
        Module {
            id: "power_platform".into(),
            name: "Power Platform Governance".into(),
            description: "Gouvernance Microsoft Power Platform".into(),
            enabled: false,
            nav_items: vec![NavItem {
                id: "pp-overview".into(),
                label: "Power Platform".into(),
                path: "/dashboards/power-platform".into(),
                icon: "Zap".into(),
            }],
            feature_flags: flags(&[("monitoring", false), ("policy_enforcement", false)]),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.workshops().len(), WORKSHOP_COUNT);
        assert_eq!(catalog.items().len(), 66);
    }

    #[test]
    fn workshop_numbers_are_one_through_ten() {
        let catalog = Catalog::builtin().unwrap();
        let numbers: Vec<u8> = catalog.workshops().iter().map(|w| w.workshop_number).collect();
        assert_eq!(numbers, (1..=10).collect::<Vec<u8>>());
    }

    #[test]
    fn item_ids_are_unique() {
        let catalog = Catalog::builtin().unwrap();
        let mut ids: Vec<&str> = catalog.items().iter().map(|i| i.item_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.items().len());
    }

    #[test]
    fn every_workshop_has_items_and_criteria() {
        let catalog = Catalog::builtin().unwrap();
        for ws in catalog.workshops() {
            assert!(!ws.completion_criteria.is_empty());
            assert!(!catalog.items_for_workshop(ws.workshop_number).is_empty());
        }
    }

    #[test]
    fn mandatory_marker_is_exact_match() {
        let catalog = Catalog::builtin().unwrap();
        // A7-02 is "OBLIGATOIRE (si scope)" — not mandatory.
        let scoped = catalog.item("A7-02").unwrap();
        assert!(!scoped.is_mandatory());
        let plain = catalog.item("A1-01").unwrap();
        assert!(plain.is_mandatory());
    }

    #[test]
    fn module_registry_is_static() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.modules().len(), 5);
        let pp = catalog.modules().iter().find(|m| m.id == "power_platform").unwrap();
        assert!(!pp.enabled);
    }
}
