//! Service layer: one method per business operation.
//!
//! Each method builds its input (stamping the current time), opens one unit of
//! work, runs a freshly built audited use case on the transaction's store and
//! returns the plain result. Callers are already authenticated; the actor id
//! is an explicit argument on every method.

mod audit;
mod invitations;
mod members;
mod organizations;
mod tasks;

pub use audit::AuditService;
pub use invitations::InvitationService;
pub use members::MembershipService;
pub use organizations::OrganizationService;
pub use tasks::TaskService;

use tracing::info;

use orgward_audit::AuditAction;

use crate::audited::{Audited, UseCase};
use crate::error::ServiceError;
use crate::uow::{UnitOfWork, run_in_transaction};

/// Run `use_case` with its audit record in one transaction.
pub(crate) async fn execute_audited<U, C>(
    uow: &U,
    use_case: C,
    action: AuditAction,
    input: C::Input,
) -> Result<C::Output, ServiceError>
where
    U: UnitOfWork,
    C: UseCase,
{
    let recorded = run_in_transaction(uow, Audited::new(use_case, action).call(input)).await?;

    info!(
        action = %recorded.event.action,
        actor_id = %recorded.event.actor_id,
        organization_id = ?recorded.event.organization_id,
        "privileged action committed"
    );
    Ok(recorded.output)
}

/// Every service over one unit of work.
#[derive(Debug, Clone)]
pub struct Services<U> {
    pub organizations: OrganizationService<U>,
    pub members: MembershipService<U>,
    pub tasks: TaskService<U>,
    pub invitations: InvitationService<U>,
    pub audit: AuditService<U>,
}

impl<U: UnitOfWork + Clone> Services<U> {
    pub fn new(uow: U) -> Self {
        Self {
            organizations: OrganizationService::new(uow.clone()),
            members: MembershipService::new(uow.clone()),
            tasks: TaskService::new(uow.clone()),
            invitations: InvitationService::new(uow.clone()),
            audit: AuditService::new(uow),
        }
    }
}
