use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shoploom_core::{DomainError, DomainResult, Entity, IndustryId, TenantId, UserId};

use crate::Industry;

/// A registered business: one tenant in the multi-tenant system.
///
/// Every other entity (customers, products, tasks, ...) partitions by the
/// business id. Created once at onboarding and never deleted in normal
/// operation; `is_active` gates login instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Business {
    id: TenantId,
    store_name: String,
    email: String,
    phone: String,
    /// ISO 3166-1 alpha-2 country code.
    country: String,
    industry_id: IndustryId,
    /// The designated owner. `None` only transiently during onboarding,
    /// before the owner's user record has been created.
    owner: Option<UserId>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Business {
    /// Register a new business in the given industry.
    ///
    /// The industry must still be open for signups. Email is stored
    /// lowercase so lookups are case-insensitive.
    pub fn register(
        id: TenantId,
        store_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        country: impl Into<String>,
        industry: &Industry,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let store_name = store_name.into();
        if store_name.trim().is_empty() {
            return Err(DomainError::validation("store name cannot be empty"));
        }

        let email = email.into().to_lowercase();
        if email.trim().is_empty() {
            return Err(DomainError::validation("email cannot be empty"));
        }

        if !industry.is_active() {
            return Err(DomainError::validation(format!(
                "industry '{}' is not open for registrations",
                industry.name()
            )));
        }

        Ok(Self {
            id,
            store_name,
            email,
            phone: phone.into(),
            country: country.into(),
            industry_id: *industry.id(),
            owner: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn industry_id(&self) -> IndustryId {
        self.industry_id
    }

    pub fn owner(&self) -> Option<UserId> {
        self.owner
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Designate the owning user. A business has exactly one owner for its
    /// whole life; assigning twice is a conflict.
    pub fn assign_owner(&mut self, owner: UserId, now: DateTime<Utc>) -> DomainResult<()> {
        if self.owner.is_some() {
            return Err(DomainError::conflict("business already has an owner"));
        }
        self.owner = Some(owner);
        self.updated_at = now;
        Ok(())
    }

    /// Whether members of this business may log in. Consumed by the token
    /// issuer; an inactive business keeps its data but loses access.
    pub fn can_login(&self) -> bool {
        self.is_active
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }

    pub fn reactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = true;
        self.updated_at = now;
    }
}

impl Entity for Business {
    type Id = TenantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoploom_core::IndustryId;

    fn retail() -> Industry {
        Industry::new(IndustryId::new(), "Retail", "", Utc::now()).unwrap()
    }

    fn register(industry: &Industry) -> Business {
        Business::register(
            TenantId::new(),
            "Ama's Fabrics",
            "Shop@Example.COM",
            "+233201234567",
            "GH",
            industry,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn registration_lowercases_email() {
        let business = register(&retail());
        assert_eq!(business.email(), "shop@example.com");
        assert!(business.is_active());
        assert!(business.owner().is_none());
    }

    #[test]
    fn registration_rejects_retired_industry() {
        let mut industry = retail();
        industry.retire(Utc::now());

        let err = Business::register(
            TenantId::new(),
            "Ama's Fabrics",
            "shop@example.com",
            "+233201234567",
            "GH",
            &industry,
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn owner_is_assigned_exactly_once() {
        let mut business = register(&retail());
        let owner = UserId::new();

        business.assign_owner(owner, Utc::now()).unwrap();
        assert_eq!(business.owner(), Some(owner));

        let err = business.assign_owner(UserId::new(), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn deactivated_business_cannot_login() {
        let mut business = register(&retail());
        assert!(business.can_login());

        business.deactivate(Utc::now());
        assert!(!business.can_login());

        business.reactivate(Utc::now());
        assert!(business.can_login());
    }
}
