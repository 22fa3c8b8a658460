use async_trait::async_trait;
use chrono::{DateTime, Utc};

use orgward_auth::{Role, assert_can_cancel_invitation, assert_can_invite};
use orgward_core::{DomainError, InvitationId, OrganizationId, UserId};
use orgward_invitations::{Invitation, InvitationStatus};
use orgward_organizations::OrganizationMember;

use super::require_actor;
use crate::audited::{AuditScope, AuditSubject, UseCase};
use crate::error::ServiceError;
use crate::repository::{InvitationFilter, Store};
use crate::uow::TransactionalWork;

impl AuditScope for Invitation {
    fn audit_organization_id(&self) -> Option<OrganizationId> {
        Some(self.organization_id)
    }
}

/// An accepted invitation and the membership it created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedInvitation {
    pub invitation: Invitation,
    pub member: OrganizationMember,
}

impl AuditScope for AcceptedInvitation {
    fn audit_organization_id(&self) -> Option<OrganizationId> {
        Some(self.invitation.organization_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateInvitation {
    pub actor_id: UserId,
    pub organization_id: OrganizationId,
    pub invited_user_id: UserId,
    pub role: Role,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOrganizationInvitations {
    pub actor_id: UserId,
    pub organization_id: OrganizationId,
    pub status: Option<InvitationStatus>,
    pub occurred_at: DateTime<Utc>,
}

impl_org_scoped_subject!(CreateInvitation, ListOrganizationInvitations);

/// Transition of an existing invitation. The organization is only known once
/// the invitation is loaded, so the audit scope comes from the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvitationDecision {
    pub actor_id: UserId,
    pub invitation_id: InvitationId,
    pub occurred_at: DateTime<Utc>,
}

impl AuditSubject for InvitationDecision {
    fn actor_id(&self) -> UserId {
        self.actor_id
    }

    fn organization_id(&self) -> Option<OrganizationId> {
        None
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

async fn require_invitation<S: Store>(
    store: &mut S,
    invitation_id: InvitationId,
) -> Result<Invitation, ServiceError> {
    store
        .find_invitation(invitation_id)
        .await?
        .ok_or(ServiceError::Domain(DomainError::InvitationNotFound))
}

/// Persist a decision taken on a pending snapshot. Fails if another
/// transaction settled the invitation in the meantime.
async fn resolve<S: Store>(store: &mut S, invitation: &Invitation) -> Result<(), ServiceError> {
    if store.resolve_pending_invitation(invitation).await? {
        Ok(())
    } else {
        Err(DomainError::InvitationNotPending.into())
    }
}

fn ensure_invitee(invitation: &Invitation, actor_id: UserId) -> Result<(), ServiceError> {
    if invitation.is_addressed_to(actor_id) {
        Ok(())
    } else {
        Err(DomainError::NotInvitee.into())
    }
}

/// Invite an existing user into the organization.
///
/// Any member may invite, up to their own rank. The pending-pair check here
/// is backed by the storage uniqueness constraint, so a concurrent duplicate
/// still fails with a conflict.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateInvitationUseCase;

#[async_trait]
impl UseCase for CreateInvitationUseCase {
    type Input = CreateInvitation;
    type Output = Invitation;

    async fn execute<S: Store>(
        &self,
        store: &mut S,
        input: CreateInvitation,
    ) -> Result<Invitation, ServiceError> {
        let actor = require_actor(store, input.organization_id, input.actor_id).await?;
        assert_can_invite(actor.role, input.role)?;

        store
            .find_user(input.invited_user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        if store
            .find_member(input.organization_id, input.invited_user_id)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyMember.into());
        }

        if store
            .pending_invitation_exists(input.organization_id, input.invited_user_id)
            .await?
        {
            return Err(DomainError::DuplicatePendingInvitation.into());
        }

        let invitation = Invitation::issue(
            input.organization_id,
            input.invited_user_id,
            input.actor_id,
            input.role,
            input.occurred_at,
        );
        store.add_invitation(&invitation).await?;
        Ok(invitation)
    }
}

/// Invitee accepts; the membership is created in the same transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptInvitationUseCase;

#[async_trait]
impl UseCase for AcceptInvitationUseCase {
    type Input = InvitationDecision;
    type Output = AcceptedInvitation;

    async fn execute<S: Store>(
        &self,
        store: &mut S,
        input: InvitationDecision,
    ) -> Result<AcceptedInvitation, ServiceError> {
        let mut invitation = require_invitation(store, input.invitation_id).await?;
        ensure_invitee(&invitation, input.actor_id)?;

        let invitee = store
            .find_user(input.actor_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;
        invitee.ensure_active()?;

        invitation.accept(input.occurred_at)?;

        if store
            .find_member(invitation.organization_id, input.actor_id)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyMember.into());
        }

        let member = OrganizationMember::new(
            invitation.organization_id,
            input.actor_id,
            invitation.role,
            input.occurred_at,
        );
        resolve(store, &invitation).await?;
        store.add_member(&member).await?;

        Ok(AcceptedInvitation { invitation, member })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RejectInvitationUseCase;

#[async_trait]
impl UseCase for RejectInvitationUseCase {
    type Input = InvitationDecision;
    type Output = Invitation;

    async fn execute<S: Store>(
        &self,
        store: &mut S,
        input: InvitationDecision,
    ) -> Result<Invitation, ServiceError> {
        let mut invitation = require_invitation(store, input.invitation_id).await?;
        ensure_invitee(&invitation, input.actor_id)?;

        invitation.reject()?;
        resolve(store, &invitation).await?;
        Ok(invitation)
    }
}

/// Owner withdraws a pending invitation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancelInvitationUseCase;

#[async_trait]
impl UseCase for CancelInvitationUseCase {
    type Input = InvitationDecision;
    type Output = Invitation;

    async fn execute<S: Store>(
        &self,
        store: &mut S,
        input: InvitationDecision,
    ) -> Result<Invitation, ServiceError> {
        let mut invitation = require_invitation(store, input.invitation_id).await?;
        let actor = require_actor(store, invitation.organization_id, input.actor_id).await?;
        assert_can_cancel_invitation(actor.role)?;

        invitation.cancel()?;
        resolve(store, &invitation).await?;
        Ok(invitation)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListOrganizationInvitationsUseCase;

#[async_trait]
impl UseCase for ListOrganizationInvitationsUseCase {
    type Input = ListOrganizationInvitations;
    type Output = Vec<Invitation>;

    async fn execute<S: Store>(
        &self,
        store: &mut S,
        input: ListOrganizationInvitations,
    ) -> Result<Vec<Invitation>, ServiceError> {
        require_actor(store, input.organization_id, input.actor_id).await?;
        let filter = InvitationFilter::for_organization(input.organization_id).with_status(input.status);
        Ok(store.list_invitations(filter).await?)
    }
}

/// Invitations addressed to the actor. Not organization-scoped, so not audited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListReceivedInvitations {
    pub actor_id: UserId,
    pub status: Option<InvitationStatus>,
}

#[async_trait]
impl<S: Store> TransactionalWork<S> for ListReceivedInvitations {
    type Output = Vec<Invitation>;

    async fn run(self, store: &mut S) -> Result<Vec<Invitation>, ServiceError> {
        let filter = InvitationFilter::for_invitee(self.actor_id).with_status(self.status);
        Ok(store.list_invitations(filter).await?)
    }
}
