use async_trait::async_trait;
use chrono::{DateTime, Utc};

use orgward_audit::AuditEvent;
use orgward_auth::assert_can_view_audit_log;
use orgward_core::{OrganizationId, UserId};

use super::require_actor;
use crate::audited::UseCase;
use crate::error::ServiceError;
use crate::repository::Store;

/// Largest page of audit events returned by one call.
pub const MAX_AUDIT_PAGE: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListAuditEvents {
    pub actor_id: UserId,
    pub organization_id: OrganizationId,
    pub limit: u32,
    pub occurred_at: DateTime<Utc>,
}

impl_org_scoped_subject!(ListAuditEvents);

#[derive(Debug, Clone, Copy, Default)]
pub struct ListAuditEventsUseCase;

#[async_trait]
impl UseCase for ListAuditEventsUseCase {
    type Input = ListAuditEvents;
    type Output = Vec<AuditEvent>;

    async fn execute<S: Store>(
        &self,
        store: &mut S,
        input: ListAuditEvents,
    ) -> Result<Vec<AuditEvent>, ServiceError> {
        let actor = require_actor(store, input.organization_id, input.actor_id).await?;
        assert_can_view_audit_log(actor.role)?;

        let limit = input.limit.clamp(1, MAX_AUDIT_PAGE);
        Ok(store.list_audit_events(input.organization_id, limit).await?)
    }
}
