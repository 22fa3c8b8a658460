use chrono::Utc;

use orgward_audit::{AuditAction, AuditEvent};
use orgward_core::{OrganizationId, UserId};

use super::execute_audited;
use crate::error::ServiceError;
use crate::uow::UnitOfWork;
use crate::use_cases::audit_log::{ListAuditEvents, ListAuditEventsUseCase};

#[derive(Debug, Clone)]
pub struct AuditService<U> {
    uow: U,
}

impl<U: UnitOfWork> AuditService<U> {
    pub fn new(uow: U) -> Self {
        Self { uow }
    }

    /// Most recent events first. Viewing the log is itself audited.
    pub async fn list_audit_events(
        &self,
        actor_id: UserId,
        organization_id: OrganizationId,
        limit: u32,
    ) -> Result<Vec<AuditEvent>, ServiceError> {
        let input = ListAuditEvents {
            actor_id,
            organization_id,
            limit,
            occurred_at: Utc::now(),
        };
        execute_audited(&self.uow, ListAuditEventsUseCase, AuditAction::AuditLogViewed, input).await
    }
}
