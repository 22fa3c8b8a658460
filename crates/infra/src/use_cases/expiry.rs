use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ServiceError;
use crate::repository::Store;
use crate::uow::TransactionalWork;

/// Bulk `PENDING -> EXPIRED` transition for invitations past `expires_at`.
///
/// One conditional update; rows already moved are not matched again, so
/// repeated runs with no newly stale invitations transition nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpireStaleInvitations {
    pub now: DateTime<Utc>,
}

#[async_trait]
impl<S: Store> TransactionalWork<S> for ExpireStaleInvitations {
    type Output = u64;

    async fn run(self, store: &mut S) -> Result<u64, ServiceError> {
        Ok(store.expire_pending_invitations(self.now).await?)
    }
}
