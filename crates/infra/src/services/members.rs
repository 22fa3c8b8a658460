use chrono::Utc;

use orgward_audit::AuditAction;
use orgward_auth::Role;
use orgward_core::{OrganizationId, UserId};
use orgward_organizations::OrganizationMember;

use super::execute_audited;
use crate::error::ServiceError;
use crate::uow::UnitOfWork;
use crate::use_cases::members::{
    ChangeMemberRole, ChangeMemberRoleUseCase, FireMember, FireMemberUseCase, HireMember,
    HireMemberUseCase, ListMembers, ListMembersUseCase,
};

#[derive(Debug, Clone)]
pub struct MembershipService<U> {
    uow: U,
}

impl<U: UnitOfWork> MembershipService<U> {
    pub fn new(uow: U) -> Self {
        Self { uow }
    }

    pub async fn hire_member(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
        user_id: UserId,
        role: Role,
    ) -> Result<OrganizationMember, ServiceError> {
        let input = HireMember {
            actor_id,
            organization_id,
            user_id,
            role,
            occurred_at: Utc::now(),
        };
        execute_audited(&self.uow, HireMemberUseCase, AuditAction::MemberHired, input).await
    }

    /// Remove `user_id` from the organization. Returns the removed membership.
    pub async fn fire_member(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<OrganizationMember, ServiceError> {
        let input = FireMember {
            actor_id,
            organization_id,
            user_id,
            occurred_at: Utc::now(),
        };
        execute_audited(&self.uow, FireMemberUseCase, AuditAction::MemberFired, input).await
    }

    pub async fn change_member_role(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
        user_id: UserId,
        role: Role,
    ) -> Result<OrganizationMember, ServiceError> {
        let input = ChangeMemberRole {
            actor_id,
            organization_id,
            user_id,
            role,
            occurred_at: Utc::now(),
        };
        execute_audited(&self.uow, ChangeMemberRoleUseCase, AuditAction::MemberRoleChanged, input).await
    }

    pub async fn list_members(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<Vec<OrganizationMember>, ServiceError> {
        let input = ListMembers {
            actor_id,
            organization_id,
            occurred_at: Utc::now(),
        };
        execute_audited(&self.uow, ListMembersUseCase, AuditAction::MembersListed, input).await
    }
}
