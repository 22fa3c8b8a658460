//! Repository interfaces consumed by the use cases.
//!
//! Every method takes `&mut self`: a repository is a view over one open
//! transaction, so calls within a unit of work are strictly sequential.
//! Adapters implement all of these traits on their transaction handle, which
//! makes the handle a [`Store`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use orgward_audit::AuditEvent;
use orgward_auth::User;
use orgward_core::{InvitationId, OrganizationId, TaskId, UserId};
use orgward_invitations::{Invitation, InvitationStatus};
use orgward_organizations::{Organization, OrganizationMember};
use orgward_tasks::Task;

use crate::error::StoreError;

#[async_trait]
pub trait OrganizationRepository: Send {
    async fn find_organization(
        &mut self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, StoreError>;

    async fn organization_name_exists(&mut self, name: &str) -> Result<bool, StoreError>;

    /// Insert a new organization. A taken name is a `Conflict`.
    async fn add_organization(&mut self, organization: &Organization) -> Result<(), StoreError>;

    /// Persist changes to an existing organization.
    async fn save_organization(&mut self, organization: &Organization) -> Result<(), StoreError>;

    /// Delete the organization together with its members, tasks and invitations.
    async fn delete_organization(&mut self, id: OrganizationId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait MembershipRepository: Send {
    async fn find_member(
        &mut self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Option<OrganizationMember>, StoreError>;

    /// Insert a membership. An existing `(organization, user)` pair is a `Conflict`.
    async fn add_member(&mut self, member: &OrganizationMember) -> Result<(), StoreError>;

    /// Persist the role of an existing membership.
    async fn save_member(&mut self, member: &OrganizationMember) -> Result<(), StoreError>;

    async fn delete_member(
        &mut self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<(), StoreError>;

    /// All memberships of an organization, oldest first.
    async fn list_members(
        &mut self,
        organization_id: OrganizationId,
    ) -> Result<Vec<OrganizationMember>, StoreError>;

    async fn count_members(&mut self, organization_id: OrganizationId) -> Result<usize, StoreError>;
}

#[async_trait]
pub trait TaskRepository: Send {
    /// Tasks are only visible through their organization.
    async fn find_task(
        &mut self,
        id: TaskId,
        organization_id: OrganizationId,
    ) -> Result<Option<Task>, StoreError>;

    /// Insert or update.
    async fn save_task(&mut self, task: &Task) -> Result<(), StoreError>;

    async fn delete_task(&mut self, id: TaskId) -> Result<(), StoreError>;
}

/// Invitation query. `None` fields do not constrain the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvitationFilter {
    pub organization_id: Option<OrganizationId>,
    pub invited_user_id: Option<UserId>,
    pub status: Option<InvitationStatus>,
}

impl InvitationFilter {
    pub fn for_organization(organization_id: OrganizationId) -> Self {
        Self {
            organization_id: Some(organization_id),
            ..Self::default()
        }
    }

    pub fn for_invitee(user_id: UserId) -> Self {
        Self {
            invited_user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: Option<InvitationStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn matches(&self, invitation: &Invitation) -> bool {
        self.organization_id
            .is_none_or(|id| invitation.organization_id == id)
            && self
                .invited_user_id
                .is_none_or(|id| invitation.invited_user_id == id)
            && self.status.is_none_or(|s| invitation.status == s)
    }
}

#[async_trait]
pub trait InvitationRepository: Send {
    async fn find_invitation(&mut self, id: InvitationId) -> Result<Option<Invitation>, StoreError>;

    /// Matching invitations, newest first.
    async fn list_invitations(
        &mut self,
        filter: InvitationFilter,
    ) -> Result<Vec<Invitation>, StoreError>;

    async fn pending_invitation_exists(
        &mut self,
        organization_id: OrganizationId,
        invited_user_id: UserId,
    ) -> Result<bool, StoreError>;

    /// Insert a new invitation. A second `PENDING` invitation for the same
    /// `(organization, invitee)` pair is a `Conflict`.
    async fn add_invitation(&mut self, invitation: &Invitation) -> Result<(), StoreError>;

    /// Move a stored `PENDING` invitation to `invitation.status`.
    ///
    /// Returns `false` and writes nothing when the stored row has already
    /// left `PENDING`, e.g. through a transaction that committed after this
    /// one read it.
    async fn resolve_pending_invitation(&mut self, invitation: &Invitation) -> Result<bool, StoreError>;

    /// Move every `PENDING` invitation with `expires_at < now` to `EXPIRED`
    /// in one statement. Returns the number of rows transitioned.
    async fn expire_pending_invitations(&mut self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait AuditRepository: Send {
    async fn append_audit_event(&mut self, event: &AuditEvent) -> Result<(), StoreError>;

    /// Most recent events of an organization, newest first.
    async fn list_audit_events(
        &mut self,
        organization_id: OrganizationId,
        limit: u32,
    ) -> Result<Vec<AuditEvent>, StoreError>;
}

/// Read-only lookup of platform users.
#[async_trait]
pub trait UserRepository: Send {
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, StoreError>;
}

/// Every repository over one transaction.
pub trait Store:
    OrganizationRepository
    + MembershipRepository
    + TaskRepository
    + InvitationRepository
    + AuditRepository
    + UserRepository
{
}

impl<T> Store for T where
    T: OrganizationRepository
        + MembershipRepository
        + TaskRepository
        + InvitationRepository
        + AuditRepository
        + UserRepository
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use orgward_auth::Role;
    use proptest::prelude::*;

    fn status_strategy() -> impl Strategy<Value = InvitationStatus> {
        prop_oneof![
            Just(InvitationStatus::Pending),
            Just(InvitationStatus::Accepted),
            Just(InvitationStatus::Rejected),
            Just(InvitationStatus::Expired),
            Just(InvitationStatus::Cancelled),
        ]
    }

    #[test]
    fn empty_filter_matches_everything() {
        let invitation = Invitation::issue(OrganizationId::new(), UserId::new(), UserId::new(), Role::Member, Utc::now());
        assert!(InvitationFilter::default().matches(&invitation));
    }

    #[test]
    fn filters_combine_with_and() {
        let invitation = Invitation::issue(OrganizationId::new(), UserId::new(), UserId::new(), Role::Member, Utc::now());

        let own_org = InvitationFilter::for_organization(invitation.organization_id);
        assert!(own_org.matches(&invitation));
        assert!(!own_org.with_status(Some(InvitationStatus::Accepted)).matches(&invitation));
        assert!(!InvitationFilter::for_organization(OrganizationId::new()).matches(&invitation));
        assert!(
            InvitationFilter::for_invitee(invitation.invited_user_id)
                .with_status(Some(InvitationStatus::Pending))
                .matches(&invitation)
        );
    }

    proptest! {
        #[test]
        fn status_filter_matches_only_that_status(actual in status_strategy(), wanted in status_strategy()) {
            let mut invitation = Invitation::issue(OrganizationId::new(), UserId::new(), UserId::new(), Role::Member, Utc::now());
            invitation.status = actual;
            let filter = InvitationFilter::default().with_status(Some(wanted));
            prop_assert_eq!(filter.matches(&invitation), actual == wanted);
        }
    }
}
