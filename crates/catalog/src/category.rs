use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shoploom_core::{CategoryId, DomainError, DomainResult, Entity, TenantId};
use shoploom_tenancy::{TenantScoped, TenantStamped};

/// A product category (Electronics, Clothing, Food, ...).
///
/// Names are unique per business, enforced by the store layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    tenant_id: TenantId,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Category {
    pub fn create(
        id: CategoryId,
        tenant_id: TenantId,
        name: impl Into<String>,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("category name cannot be empty"));
        }

        Ok(Self {
            id,
            tenant_id,
            name,
            description: description.into(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn rename(&mut self, name: impl Into<String>, now: DateTime<Utc>) -> DomainResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("category name cannot be empty"));
        }
        self.name = name;
        self.updated_at = now;
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>, now: DateTime<Utc>) {
        self.description = description.into();
        self.updated_at = now;
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantScoped for Category {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

impl TenantStamped for Category {
    fn set_tenant_id(&mut self, tenant_id: TenantId) {
        self.tenant_id = tenant_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_blank_name() {
        let err = Category::create(CategoryId::new(), TenantId::new(), " ", "", Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn rename_rejects_blank_name() {
        let mut category =
            Category::create(CategoryId::new(), TenantId::new(), "Fabrics", "", Utc::now())
                .unwrap();
        assert!(category.rename("  ", Utc::now()).is_err());
        assert_eq!(category.name(), "Fabrics");
    }
}
