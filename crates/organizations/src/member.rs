use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orgward_auth::Role;
use orgward_core::{Entity, OrganizationId, UserId};

/// A user's membership in one organization.
///
/// # Invariants
/// - At most one membership per `(organization_id, user_id)`.
/// - `role` is the only mutable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationMember {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

impl OrganizationMember {
    pub fn new(
        organization_id: OrganizationId,
        user_id: UserId,
        role: Role,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            organization_id,
            user_id,
            role,
            joined_at,
        }
    }

    /// Membership created for the user who founds an organization.
    pub fn founder(organization_id: OrganizationId, user_id: UserId, joined_at: DateTime<Utc>) -> Self {
        Self::new(organization_id, user_id, Role::Owner, joined_at)
    }

    pub fn change_role(&mut self, role: Role) {
        self.role = role;
    }
}

impl Entity for OrganizationMember {
    type Id = (OrganizationId, UserId);

    fn id(&self) -> Self::Id {
        (self.organization_id, self.user_id)
    }
}
