use serde::{Deserialize, Serialize};

use shoploom_core::{TenantId, UserId};

/// The authenticated actor making a request.
///
/// Resolved once at the edge (from validated claims) and passed as an
/// explicit parameter to every tenant-scoped operation; there is no
/// ambient "current user" state anywhere in the system.
///
/// `tenant_id` is `None` only for principals whose user record has not yet
/// been attached to a business (a transient onboarding state). Reads by such
/// a principal see an empty result set; writes are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub tenant_id: Option<TenantId>,
    pub is_owner: bool,
    pub is_staff: bool,
}

impl Principal {
    pub fn new(user_id: UserId, tenant_id: Option<TenantId>, is_owner: bool, is_staff: bool) -> Self {
        Self {
            user_id,
            tenant_id,
            is_owner,
            is_staff,
        }
    }

    /// A business owner acting within their tenant.
    pub fn owner_of(tenant_id: TenantId, user_id: UserId) -> Self {
        Self::new(user_id, Some(tenant_id), true, false)
    }

    /// A staff member acting within their tenant.
    pub fn staff_of(tenant_id: TenantId, user_id: UserId) -> Self {
        Self::new(user_id, Some(tenant_id), false, true)
    }
}
