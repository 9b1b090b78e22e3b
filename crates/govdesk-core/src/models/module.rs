//! Feature module registry types.
//!
//! Pure static data driving the navigation listing — every tenant sees
//! the identical catalog. No mutation operations exist.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavItem {
    pub id: String,
    pub label: String,
    pub path: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub nav_items: Vec<NavItem>,
    pub feature_flags: BTreeMap<String, bool>,
}
