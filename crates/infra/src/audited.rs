//! Command + audit composition.
//!
//! [`Audited`] pairs one use case with one fixed [`AuditAction`]. Executing it
//! inside a transaction runs the use case, then appends the audit event through
//! the same store:
//!
//! 1. run the use case; a failure returns before anything is audited
//! 2. build the event from the actor, the organization (input first, then
//!    output) and the action tag; an operation with no organization fails
//! 3. append it; a failure here rolls back step 1 with the rest of the unit
//! 4. return the use case output tagged with its event
//!
//! The composition is static: no proxying, no hooks. Whatever the use case
//! wrote is committed if and only if the audit row is.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use orgward_audit::{AuditAction, AuditEvent};
use orgward_core::{OrganizationId, UserId};

use crate::error::ServiceError;
use crate::repository::Store;
use crate::uow::TransactionalWork;

/// Who acted, where, and when. Implemented by every use case input.
pub trait AuditSubject {
    fn actor_id(&self) -> UserId;

    /// Organization known before the use case runs, if any.
    fn organization_id(&self) -> Option<OrganizationId>;

    fn occurred_at(&self) -> DateTime<Utc>;
}

/// Organization an output belongs to, used when the input did not name one.
pub trait AuditScope {
    fn audit_organization_id(&self) -> Option<OrganizationId> {
        None
    }
}

impl<T> AuditScope for Vec<T> {}

/// A business operation over the transactional store.
///
/// Use cases hold no connection of their own; they are built per call and
/// receive the transaction's store as an argument.
#[async_trait]
pub trait UseCase: Send + Sync {
    type Input: AuditSubject + Send;
    type Output: AuditScope + Send;

    async fn execute<S: Store>(
        &self,
        store: &mut S,
        input: Self::Input,
    ) -> Result<Self::Output, ServiceError>;
}

/// Use case output together with the audit event written for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded<T> {
    pub output: T,
    pub event: AuditEvent,
}

#[derive(Debug, Clone)]
pub struct Audited<U> {
    use_case: U,
    action: AuditAction,
}

impl<U: UseCase> Audited<U> {
    pub fn new(use_case: U, action: AuditAction) -> Self {
        Self { use_case, action }
    }

    pub fn action(&self) -> AuditAction {
        self.action
    }

    pub async fn execute_tx<S: Store>(
        &self,
        store: &mut S,
        input: U::Input,
    ) -> Result<Recorded<U::Output>, ServiceError> {
        let actor_id = input.actor_id();
        let input_organization = input.organization_id();
        let occurred_at = input.occurred_at();

        let output = self.use_case.execute(store, input).await?;

        let organization_id = input_organization
            .or_else(|| output.audit_organization_id())
            .ok_or(ServiceError::MissingAuditScope(self.action))?;
        let event = AuditEvent::record(actor_id, organization_id, self.action, occurred_at);
        store.append_audit_event(&event).await?;

        Ok(Recorded { output, event })
    }

    /// Bind an input, producing work for [`crate::uow::run_in_transaction`].
    pub fn call(self, input: U::Input) -> AuditedCall<U> {
        AuditedCall {
            audited: self,
            input,
        }
    }
}

pub struct AuditedCall<U: UseCase> {
    audited: Audited<U>,
    input: U::Input,
}

#[async_trait]
impl<S, U> TransactionalWork<S> for AuditedCall<U>
where
    S: Store,
    U: UseCase,
{
    type Output = Recorded<U::Output>;

    async fn run(self, store: &mut S) -> Result<Self::Output, ServiceError> {
        self.audited.execute_tx(store, self.input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::InMemoryDatabase;
    use crate::uow::run_in_transaction;

    struct Unscoped {
        actor_id: UserId,
        occurred_at: DateTime<Utc>,
    }

    impl AuditSubject for Unscoped {
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

    #[derive(Debug)]
    struct Nothing;

    impl AuditScope for Nothing {}

    struct Noop;

    #[async_trait]
    impl UseCase for Noop {
        type Input = Unscoped;
        type Output = Nothing;

        async fn execute<S: Store>(&self, _store: &mut S, _input: Unscoped) -> Result<Nothing, ServiceError> {
            Ok(Nothing)
        }
    }

    #[tokio::test]
    async fn operation_without_an_organization_is_refused() {
        let db = InMemoryDatabase::new();
        let input = Unscoped {
            actor_id: UserId::new(),
            occurred_at: Utc::now(),
        };

        let work = Audited::new(Noop, AuditAction::OrganizationViewed).call(input);
        let err = run_in_transaction(&db, work).await.unwrap_err();

        assert_eq!(err, ServiceError::MissingAuditScope(AuditAction::OrganizationViewed));
        assert!(db.audit_events().await.is_empty());
    }
}
