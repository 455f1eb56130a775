use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shoploom_auth::Principal;
use shoploom_core::{DomainError, DomainResult, Entity, TenantId, UserId};

/// The identity behind a principal.
///
/// A user belongs to at most one business. `business_id` is `None` only
/// transiently during onboarding (the owner's user record is created before
/// the business row exists); once attached, a user is never reassigned to a
/// different business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    /// Login identity. Stored lowercase so duplicate accounts can't hide
    /// behind case differences.
    email: String,
    username: String,
    phone: String,
    business_id: Option<TenantId>,
    is_business_owner: bool,
    is_staff_member: bool,
    created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        username: impl Into<String>,
        phone: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let email = email.into().to_lowercase();
        if email.trim().is_empty() {
            return Err(DomainError::validation("email cannot be empty"));
        }

        Ok(Self {
            id,
            email,
            username: username.into(),
            phone: phone.into(),
            business_id: None,
            is_business_owner: false,
            is_staff_member: false,
            created_at: now,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn business_id(&self) -> Option<TenantId> {
        self.business_id
    }

    pub fn is_business_owner(&self) -> bool {
        self.is_business_owner
    }

    pub fn is_staff_member(&self) -> bool {
        self.is_staff_member
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Attach this user to its business as the owner.
    pub fn attach_as_owner(&mut self, business_id: TenantId) -> DomainResult<()> {
        self.attach(business_id)?;
        self.is_business_owner = true;
        Ok(())
    }

    /// Attach this user to its business as a staff member.
    pub fn attach_as_staff(&mut self, business_id: TenantId) -> DomainResult<()> {
        self.attach(business_id)?;
        self.is_staff_member = true;
        Ok(())
    }

    fn attach(&mut self, business_id: TenantId) -> DomainResult<()> {
        if let Some(existing) = self.business_id {
            if existing != business_id {
                return Err(DomainError::conflict(
                    "user already belongs to a different business",
                ));
            }
            return Err(DomainError::conflict("user is already attached"));
        }
        self.business_id = Some(business_id);
        Ok(())
    }

    /// The principal this user acts as.
    pub fn principal(&self) -> Principal {
        Principal::new(
            self.id,
            self.business_id,
            self.is_business_owner,
            self.is_staff_member,
        )
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(UserId::new(), "Owner@Example.COM", "owner", "+233200000000", Utc::now()).unwrap()
    }

    #[test]
    fn email_is_lowercased() {
        assert_eq!(user().email(), "owner@example.com");
    }

    #[test]
    fn unattached_user_has_no_tenant_principal() {
        let principal = user().principal();
        assert_eq!(principal.tenant_id, None);
        assert!(!principal.is_owner);
    }

    #[test]
    fn owner_attachment_sets_flags_once() {
        let mut u = user();
        let business = TenantId::new();
        u.attach_as_owner(business).unwrap();

        assert_eq!(u.business_id(), Some(business));
        assert!(u.is_business_owner());

        let principal = u.principal();
        assert_eq!(principal.tenant_id, Some(business));
        assert!(principal.is_owner);
    }

    #[test]
    fn user_is_never_reassigned_to_another_business() {
        let mut u = user();
        u.attach_as_staff(TenantId::new()).unwrap();

        let err = u.attach_as_staff(TenantId::new()).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn repeated_attachment_to_same_business_is_a_conflict() {
        let mut u = user();
        let business = TenantId::new();
        u.attach_as_owner(business).unwrap();

        let err = u.attach_as_owner(business).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
