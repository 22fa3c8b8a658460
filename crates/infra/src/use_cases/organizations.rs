use async_trait::async_trait;
use chrono::{DateTime, Utc};

use orgward_auth::{assert_can_delete_organization, assert_can_rename_organization};
use orgward_core::{DomainError, OrganizationId, UserId};
use orgward_organizations::{Organization, OrganizationMember, normalize_name};

use super::{require_actor, require_organization};
use crate::audited::{AuditScope, AuditSubject, UseCase};
use crate::error::ServiceError;
use crate::repository::Store;

impl AuditScope for Organization {
    fn audit_organization_id(&self) -> Option<OrganizationId> {
        Some(self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrganization {
    pub actor_id: UserId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

impl AuditSubject for CreateOrganization {
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOrganization {
    pub actor_id: UserId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganizationRequest {
    pub actor_id: UserId,
    pub organization_id: OrganizationId,
    pub occurred_at: DateTime<Utc>,
}

impl_org_scoped_subject!(RenameOrganization, OrganizationRequest);

/// Found an organization; the actor becomes its owner.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOrganizationUseCase;

#[async_trait]
impl UseCase for CreateOrganizationUseCase {
    type Input = CreateOrganization;
    type Output = Organization;

    async fn execute<S: Store>(
        &self,
        store: &mut S,
        input: CreateOrganization,
    ) -> Result<Organization, ServiceError> {
        let founder = store
            .find_user(input.actor_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;
        founder.ensure_active()?;

        let organization = Organization::new(&input.name, input.occurred_at)?;
        if store.organization_name_exists(&organization.name).await? {
            return Err(DomainError::DuplicateOrganizationName.into());
        }

        store.add_organization(&organization).await?;
        store
            .add_member(&OrganizationMember::founder(
                organization.id,
                input.actor_id,
                input.occurred_at,
            ))
            .await?;

        Ok(organization)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenameOrganizationUseCase;

#[async_trait]
impl UseCase for RenameOrganizationUseCase {
    type Input = RenameOrganization;
    type Output = Organization;

    async fn execute<S: Store>(
        &self,
        store: &mut S,
        input: RenameOrganization,
    ) -> Result<Organization, ServiceError> {
        let actor = require_actor(store, input.organization_id, input.actor_id).await?;
        assert_can_rename_organization(actor.role)?;

        let mut organization = require_organization(store, input.organization_id).await?;
        let name = normalize_name(&input.name)?;
        if name != organization.name && store.organization_name_exists(&name).await? {
            return Err(DomainError::DuplicateOrganizationName.into());
        }

        organization.rename(&name)?;
        store.save_organization(&organization).await?;
        Ok(organization)
    }
}

/// Delete an organization whose owner is its only member.
///
/// Memberships, tasks and invitations go with it; audit events stay.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteOrganizationUseCase;

#[async_trait]
impl UseCase for DeleteOrganizationUseCase {
    type Input = OrganizationRequest;
    type Output = Organization;

    async fn execute<S: Store>(
        &self,
        store: &mut S,
        input: OrganizationRequest,
    ) -> Result<Organization, ServiceError> {
        let actor = require_actor(store, input.organization_id, input.actor_id).await?;
        let member_count = store.count_members(input.organization_id).await?;
        assert_can_delete_organization(actor.role, member_count)?;

        let organization = require_organization(store, input.organization_id).await?;
        store.delete_organization(organization.id).await?;
        Ok(organization)
    }
}

/// Any member may view their organization.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetOrganizationUseCase;

#[async_trait]
impl UseCase for GetOrganizationUseCase {
    type Input = OrganizationRequest;
    type Output = Organization;

    async fn execute<S: Store>(
        &self,
        store: &mut S,
        input: OrganizationRequest,
    ) -> Result<Organization, ServiceError> {
        require_actor(store, input.organization_id, input.actor_id).await?;
        require_organization(store, input.organization_id).await
    }
}
