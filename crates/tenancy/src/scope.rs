use shoploom_auth::Principal;
use shoploom_core::{DomainError, DomainResult, TenantId};

/// Read-side contract for tenant-owned entities.
pub trait TenantScoped {
    fn tenant_id(&self) -> TenantId;
}

/// Write-side contract: the tenant field can be (re)stamped before persistence.
pub trait TenantStamped: TenantScoped {
    fn set_tenant_id(&mut self, tenant_id: TenantId);
}

/// The tenant a principal's queries are confined to.
///
/// `None` means "match nothing": an unauthenticated caller, or a principal
/// not yet attached to a business, sees an empty result set rather than an
/// error. Stores use this as the query key for tenant-filtered reads.
pub fn tenant_of(principal: Option<&Principal>) -> Option<TenantId> {
    principal.and_then(|p| p.tenant_id)
}

/// Restrict `rows` to the principal's tenant.
///
/// The in-row form of [`tenant_of`]: retains exactly the rows owned by the
/// principal's tenant, and yields nothing when the principal is absent or
/// has no tenant.
pub fn scope<T, I>(principal: Option<&Principal>, rows: I) -> Vec<T>
where
    T: TenantScoped,
    I: IntoIterator<Item = T>,
{
    match tenant_of(principal) {
        Some(tenant_id) => rows
            .into_iter()
            .filter(|row| row.tenant_id() == tenant_id)
            .collect(),
        None => Vec::new(),
    }
}

/// Stamp `entity` with the principal's tenant before persistence.
///
/// Overwrites unconditionally: whatever tenant the entity carried (including
/// one smuggled in from a client payload) is replaced with the principal's.
/// Unlike reads, a tenant-less principal is a hard error here: there is
/// nothing to stamp with.
pub fn stamp<T: TenantStamped>(principal: &Principal, entity: &mut T) -> DomainResult<()> {
    let tenant_id = principal.tenant_id.ok_or(DomainError::NoTenant)?;
    entity.set_tenant_id(tenant_id);
    Ok(())
}

/// Assert that a write may reference `related`.
///
/// Used when an incoming write points at another tenant-scoped entity (a
/// task referencing a customer, a measurement referencing a customer, ...).
pub fn assert_same_tenant<T: TenantScoped>(principal: &Principal, related: &T) -> DomainResult<()> {
    let tenant_id = principal.tenant_id.ok_or(DomainError::NoTenant)?;
    if related.tenant_id() != tenant_id {
        return Err(DomainError::CrossTenantReference);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoploom_core::UserId;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Row {
        tenant_id: TenantId,
        label: &'static str,
    }

    impl TenantScoped for Row {
        fn tenant_id(&self) -> TenantId {
            self.tenant_id
        }
    }

    impl TenantStamped for Row {
        fn set_tenant_id(&mut self, tenant_id: TenantId) {
            self.tenant_id = tenant_id;
        }
    }

    fn rows(a: TenantId, b: TenantId) -> Vec<Row> {
        vec![
            Row { tenant_id: a, label: "a1" },
            Row { tenant_id: b, label: "b1" },
            Row { tenant_id: a, label: "a2" },
        ]
    }

    #[test]
    fn scope_retains_only_own_tenant_rows() {
        let (a, b) = (TenantId::new(), TenantId::new());
        let principal = Principal::owner_of(a, UserId::new());

        let scoped = scope(Some(&principal), rows(a, b));
        assert_eq!(scoped.len(), 2);
        assert!(scoped.iter().all(|r| r.tenant_id == a));
    }

    #[test]
    fn scope_is_empty_for_unauthenticated() {
        let (a, b) = (TenantId::new(), TenantId::new());
        assert!(scope(None, rows(a, b)).is_empty());
    }

    #[test]
    fn scope_is_empty_for_principal_without_tenant() {
        let (a, b) = (TenantId::new(), TenantId::new());
        let principal = Principal::new(UserId::new(), None, false, false);
        assert!(scope(Some(&principal), rows(a, b)).is_empty());
    }

    #[test]
    fn stamp_overrides_client_supplied_tenant() {
        let (own, foreign) = (TenantId::new(), TenantId::new());
        let principal = Principal::staff_of(own, UserId::new());

        let mut row = Row { tenant_id: foreign, label: "x" };
        stamp(&principal, &mut row).unwrap();
        assert_eq!(row.tenant_id, own);
    }

    #[test]
    fn stamp_without_tenant_is_rejected() {
        let principal = Principal::new(UserId::new(), None, false, false);
        let mut row = Row { tenant_id: TenantId::new(), label: "x" };

        assert_eq!(stamp(&principal, &mut row), Err(DomainError::NoTenant));
    }

    #[test]
    fn assert_same_tenant_accepts_own_rows() {
        let tenant = TenantId::new();
        let principal = Principal::owner_of(tenant, UserId::new());
        let row = Row { tenant_id: tenant, label: "x" };

        assert!(assert_same_tenant(&principal, &row).is_ok());
    }

    #[test]
    fn assert_same_tenant_rejects_foreign_rows() {
        let principal = Principal::owner_of(TenantId::new(), UserId::new());
        let row = Row { tenant_id: TenantId::new(), label: "x" };

        assert_eq!(
            assert_same_tenant(&principal, &row),
            Err(DomainError::CrossTenantReference)
        );
    }
}
