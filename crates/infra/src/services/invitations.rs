use chrono::Utc;

use orgward_audit::AuditAction;
use orgward_auth::Role;
use orgward_core::{InvitationId, OrganizationId, UserId};
use orgward_invitations::{Invitation, InvitationStatus};

use super::execute_audited;
use crate::error::ServiceError;
use crate::uow::{UnitOfWork, run_in_transaction};
use crate::use_cases::invitations::{
    AcceptInvitationUseCase, AcceptedInvitation, CancelInvitationUseCase, CreateInvitation,
    CreateInvitationUseCase, InvitationDecision, ListOrganizationInvitations,
    ListOrganizationInvitationsUseCase, ListReceivedInvitations, RejectInvitationUseCase,
};

#[derive(Debug, Clone)]
pub struct InvitationService<U> {
    uow: U,
}

impl<U: UnitOfWork> InvitationService<U> {
    pub fn new(uow: U) -> Self {
        Self { uow }
    }

    /// Invite `invited_user_id`; `role` defaults to `Role::Member`.
    pub async fn create_invitation(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
        invited_user_id: UserId,
        role: Option<Role>,
    ) -> Result<Invitation, ServiceError> {
        let input = CreateInvitation {
            actor_id,
            organization_id,
            invited_user_id,
            role: role.unwrap_or_default(),
            occurred_at: Utc::now(),
        };
        execute_audited(&self.uow, CreateInvitationUseCase, AuditAction::InvitationCreated, input).await
    }

    pub async fn accept_invitation(
        &self,
        actor_id: UserId,
        invitation_id: InvitationId,
    ) -> Result<AcceptedInvitation, ServiceError> {
        let input = decision(actor_id, invitation_id);
        execute_audited(&self.uow, AcceptInvitationUseCase, AuditAction::InvitationAccepted, input).await
    }

    pub async fn reject_invitation(
        &self,
        actor_id: UserId,
        invitation_id: InvitationId,
    ) -> Result<Invitation, ServiceError> {
        let input = decision(actor_id, invitation_id);
        execute_audited(&self.uow, RejectInvitationUseCase, AuditAction::InvitationRejected, input).await
    }

    pub async fn cancel_invitation(
        &self,
        actor_id: UserId,
        invitation_id: InvitationId,
    ) -> Result<Invitation, ServiceError> {
        let input = decision(actor_id, invitation_id);
        execute_audited(&self.uow, CancelInvitationUseCase, AuditAction::InvitationCancelled, input).await
    }

    pub async fn list_organization_invitations(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<Invitation>, ServiceError> {
        let input = ListOrganizationInvitations {
            actor_id,
            organization_id,
            status,
            occurred_at: Utc::now(),
        };
        execute_audited(
            &self.uow,
            ListOrganizationInvitationsUseCase,
            AuditAction::InvitationsListed,
            input,
        )
        .await
    }

    /// Invitations addressed to the actor, across organizations.
    pub async fn list_received_invitations(
        &self,
        actor_id: UserId,
        status: Option<InvitationStatus>,
    ) -> Result<Vec<Invitation>, ServiceError> {
        run_in_transaction(&self.uow, ListReceivedInvitations { actor_id, status }).await
    }
}

fn decision(actor_id: UserId, invitation_id: InvitationId) -> InvitationDecision {
    InvitationDecision {
        actor_id,
        invitation_id,
        occurred_at: Utc::now(),
    }
}
