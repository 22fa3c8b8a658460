use async_trait::async_trait;
use chrono::{DateTime, Utc};

use orgward_auth::{Role, assert_can_change_role, assert_can_fire, assert_can_hire};
use orgward_core::{DomainError, OrganizationId, UserId};
use orgward_organizations::OrganizationMember;

use super::{require_actor, require_member};
use crate::audited::{AuditScope, UseCase};
use crate::error::ServiceError;
use crate::repository::Store;

impl AuditScope for OrganizationMember {
    fn audit_organization_id(&self) -> Option<OrganizationId> {
        Some(self.organization_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HireMember {
    pub actor_id: UserId,
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub role: Role,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireMember {
    pub actor_id: UserId,
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeMemberRole {
    pub actor_id: UserId,
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub role: Role,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMembers {
    pub actor_id: UserId,
    pub organization_id: OrganizationId,
    pub occurred_at: DateTime<Utc>,
}

impl_org_scoped_subject!(HireMember, FireMember, ChangeMemberRole, ListMembers);

#[derive(Debug, Clone, Copy, Default)]
pub struct HireMemberUseCase;

#[async_trait]
impl UseCase for HireMemberUseCase {
    type Input = HireMember;
    type Output = OrganizationMember;

    async fn execute<S: Store>(
        &self,
        store: &mut S,
        input: HireMember,
    ) -> Result<OrganizationMember, ServiceError> {
        let actor = require_actor(store, input.organization_id, input.actor_id).await?;
        assert_can_hire(actor.role, input.role)?;

        let user = store
            .find_user(input.user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;
        user.ensure_active()?;

        if store
            .find_member(input.organization_id, input.user_id)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyMember.into());
        }

        let member = OrganizationMember::new(
            input.organization_id,
            input.user_id,
            input.role,
            input.occurred_at,
        );
        store.add_member(&member).await?;
        Ok(member)
    }
}

/// Remove a member. Returns the removed membership.
#[derive(Debug, Clone, Copy, Default)]
pub struct FireMemberUseCase;

#[async_trait]
impl UseCase for FireMemberUseCase {
    type Input = FireMember;
    type Output = OrganizationMember;

    async fn execute<S: Store>(
        &self,
        store: &mut S,
        input: FireMember,
    ) -> Result<OrganizationMember, ServiceError> {
        let actor = require_actor(store, input.organization_id, input.actor_id).await?;
        if input.user_id == input.actor_id {
            return Err(DomainError::CannotActOnSelf.into());
        }
        assert_can_fire(actor.role)?;

        let target = require_member(store, input.organization_id, input.user_id).await?;
        store
            .delete_member(target.organization_id, target.user_id)
            .await?;
        Ok(target)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeMemberRoleUseCase;

#[async_trait]
impl UseCase for ChangeMemberRoleUseCase {
    type Input = ChangeMemberRole;
    type Output = OrganizationMember;

    async fn execute<S: Store>(
        &self,
        store: &mut S,
        input: ChangeMemberRole,
    ) -> Result<OrganizationMember, ServiceError> {
        let actor = require_actor(store, input.organization_id, input.actor_id).await?;
        if input.user_id == input.actor_id {
            return Err(DomainError::CannotActOnSelf.into());
        }

        let mut target = require_member(store, input.organization_id, input.user_id).await?;
        assert_can_change_role(actor.role, target.role, input.role)?;

        target.change_role(input.role);
        store.save_member(&target).await?;
        Ok(target)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListMembersUseCase;

#[async_trait]
impl UseCase for ListMembersUseCase {
    type Input = ListMembers;
    type Output = Vec<OrganizationMember>;

    async fn execute<S: Store>(
        &self,
        store: &mut S,
        input: ListMembers,
    ) -> Result<Vec<OrganizationMember>, ServiceError> {
        require_actor(store, input.organization_id, input.actor_id).await?;
        Ok(store.list_members(input.organization_id).await?)
    }
}
