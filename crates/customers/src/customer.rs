use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shoploom_core::{CustomerId, DomainError, DomainResult, Entity, TenantId};
use shoploom_tenancy::{TenantScoped, TenantStamped};

/// Creation payload for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub notes: String,
}

/// Partial update for a customer. `None` keeps the existing value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// A customer/client of one business.
///
/// Shared across industries: retail buyers and tailoring clients alike.
/// Phone numbers are unique per business (different businesses may share a
/// customer), enforced by the store layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    tenant_id: TenantId,
    name: String,
    phone: String,
    email: Option<String>,
    address: String,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn create(
        id: CustomerId,
        tenant_id: TenantId,
        new: NewCustomer,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if new.name.trim().is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }
        if new.phone.trim().is_empty() {
            return Err(DomainError::validation("customer phone cannot be empty"));
        }

        Ok(Self {
            id,
            tenant_id,
            name: new.name,
            phone: new.phone,
            email: new.email.map(|e| e.to_lowercase()),
            address: new.address,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn apply_patch(&mut self, patch: CustomerPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("customer name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(phone) = patch.phone {
            if phone.trim().is_empty() {
                return Err(DomainError::validation("customer phone cannot be empty"));
            }
            self.phone = phone;
        }
        if let Some(email) = patch.email {
            self.email = email.map(|e| e.to_lowercase());
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantScoped for Customer {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

impl TenantStamped for Customer {
    fn set_tenant_id(&mut self, tenant_id: TenantId) {
        self.tenant_id = tenant_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_customer() -> NewCustomer {
        NewCustomer {
            name: "Kofi Mensah".to_string(),
            phone: "+233241112222".to_string(),
            email: Some("Kofi@Example.com".to_string()),
            address: String::new(),
            notes: String::new(),
        }
    }

    #[test]
    fn create_lowercases_email() {
        let c = Customer::create(CustomerId::new(), TenantId::new(), new_customer(), Utc::now())
            .unwrap();
        assert_eq!(c.email(), Some("kofi@example.com"));
    }

    #[test]
    fn create_rejects_blank_name() {
        let mut new = new_customer();
        new.name = "   ".to_string();
        let err =
            Customer::create(CustomerId::new(), TenantId::new(), new, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn patch_keeps_unspecified_fields() {
        let mut c =
            Customer::create(CustomerId::new(), TenantId::new(), new_customer(), Utc::now())
                .unwrap();

        let patch = CustomerPatch {
            notes: Some("prefers evening fittings".to_string()),
            ..CustomerPatch::default()
        };
        c.apply_patch(patch, Utc::now()).unwrap();

        assert_eq!(c.name(), "Kofi Mensah");
        assert_eq!(c.notes(), "prefers evening fittings");
    }

    #[test]
    fn patch_can_clear_email() {
        let mut c =
            Customer::create(CustomerId::new(), TenantId::new(), new_customer(), Utc::now())
                .unwrap();

        let patch = CustomerPatch {
            email: Some(None),
            ..CustomerPatch::default()
        };
        c.apply_patch(patch, Utc::now()).unwrap();
        assert_eq!(c.email(), None);
    }
}
