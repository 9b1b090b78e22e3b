//! Feature module registry — static navigation listing.

use govdesk_core::catalog::Catalog;
use govdesk_core::models::module::Module;
use uuid::Uuid;

/// Module registry service. Purely static: every tenant sees the
/// identical catalog, the tenant id is accepted for interface symmetry
/// only.
pub struct ModuleRegistry {
    catalog: Catalog,
}

impl ModuleRegistry {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn list_modules(&self, _tenant_id: Uuid) -> Vec<Module> {
        self.catalog.modules().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_is_tenant_independent() {
        let registry = ModuleRegistry::new(Catalog::builtin().unwrap());

        let a = registry.list_modules(Uuid::new_v4());
        let b = registry.list_modules(Uuid::new_v4());
        assert_eq!(a.len(), b.len());
        assert!(a.iter().any(|m| m.id == "power_platform"));
        for module in &a {
            assert!(!module.nav_items.is_empty());
        }
    }
}
