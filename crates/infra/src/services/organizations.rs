use chrono::Utc;

use orgward_audit::AuditAction;
use orgward_core::{OrganizationId, UserId};
use orgward_organizations::Organization;

use super::execute_audited;
use crate::error::ServiceError;
use crate::uow::UnitOfWork;
use crate::use_cases::organizations::{
    CreateOrganization, CreateOrganizationUseCase, DeleteOrganizationUseCase,
    GetOrganizationUseCase, OrganizationRequest, RenameOrganization, RenameOrganizationUseCase,
};

#[derive(Debug, Clone)]
pub struct OrganizationService<U> {
    uow: U,
}

impl<U: UnitOfWork> OrganizationService<U> {
    pub fn new(uow: U) -> Self {
        Self { uow }
    }

    /// Create an organization owned by `actor_id`.
    pub async fn create_organization(&self, actor_id: UserId, name: &str) -> Result<Organization, ServiceError> {
        let input = CreateOrganization {
            actor_id,
            name: name.to_string(),
            occurred_at: Utc::now(),
        };
        execute_audited(&self.uow, CreateOrganizationUseCase, AuditAction::OrganizationCreated, input).await
    }

    pub async fn rename_organization(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
        name: &str,
    ) -> Result<Organization, ServiceError> {
        let input = RenameOrganization {
            actor_id,
            organization_id,
            name: name.to_string(),
            occurred_at: Utc::now(),
        };
        execute_audited(&self.uow, RenameOrganizationUseCase, AuditAction::OrganizationRenamed, input).await
    }

    /// Delete the organization. Returns it as it was before deletion.
    pub async fn delete_organization(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<Organization, ServiceError> {
        let input = OrganizationRequest {
            actor_id,
            organization_id,
            occurred_at: Utc::now(),
        };
        execute_audited(&self.uow, DeleteOrganizationUseCase, AuditAction::OrganizationDeleted, input).await
    }

    pub async fn get_organization(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<Organization, ServiceError> {
        let input = OrganizationRequest {
            actor_id,
            organization_id,
            occurred_at: Utc::now(),
        };
        execute_audited(&self.uow, GetOrganizationUseCase, AuditAction::OrganizationViewed, input).await
    }
}
