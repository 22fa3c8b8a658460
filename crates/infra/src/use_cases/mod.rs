//! Use cases: one business operation each, policy checks included.
//!
//! Inputs carry the actor explicitly; nothing is read from ambient state.

/// Implements [`crate::audited::AuditSubject`] for inputs with `actor_id`,
/// `organization_id` and `occurred_at` fields. Visible to the submodules
/// declared below it.
macro_rules! impl_org_scoped_subject {
    ($($t:ty),+ $(,)?) => {
        $(
            impl $crate::audited::AuditSubject for $t {
                fn actor_id(&self) -> orgward_core::UserId {
                    self.actor_id
                }

                fn organization_id(&self) -> Option<orgward_core::OrganizationId> {
                    Some(self.organization_id)
                }

                fn occurred_at(&self) -> chrono::DateTime<chrono::Utc> {
                    self.occurred_at
                }
            }
        )+
    };
}

pub mod audit_log;
pub mod expiry;
pub mod invitations;
pub mod members;
pub mod organizations;
pub mod tasks;

use orgward_core::{DomainError, OrganizationId, UserId};
use orgward_organizations::{Organization, OrganizationMember};

use crate::error::ServiceError;
use crate::repository::{MembershipRepository, OrganizationRepository};

/// Resolve the actor's own membership. Runs before any policy check.
pub(crate) async fn require_actor<S>(
    store: &mut S,
    organization_id: OrganizationId,
    actor_id: UserId,
) -> Result<OrganizationMember, ServiceError>
where
    S: MembershipRepository + ?Sized,
{
    store
        .find_member(organization_id, actor_id)
        .await?
        .ok_or(ServiceError::Domain(DomainError::ActorNotAMember))
}

pub(crate) async fn require_member<S>(
    store: &mut S,
    organization_id: OrganizationId,
    user_id: UserId,
) -> Result<OrganizationMember, ServiceError>
where
    S: MembershipRepository + ?Sized,
{
    store
        .find_member(organization_id, user_id)
        .await?
        .ok_or(ServiceError::Domain(DomainError::MemberNotFound))
}

pub(crate) async fn require_organization<S>(
    store: &mut S,
    organization_id: OrganizationId,
) -> Result<Organization, ServiceError>
where
    S: OrganizationRepository + ?Sized,
{
    store
        .find_organization(organization_id)
        .await?
        .ok_or(ServiceError::Domain(DomainError::OrganizationNotFound))
}
