//! In-memory unit of work.
//!
//! Intended for tests/dev. Behaves like the Postgres adapter where it matters:
//!
//! - a fixed number of "connections" (semaphore permits), one held per open
//!   transaction and released when the transaction handle drops
//! - transactions work on a private copy of the tables; `commit` publishes the
//!   copy, `rollback` (or drop) discards it
//! - transactions are serialized, which is stricter than read-committed
//! - the same uniqueness and cascade rules as the SQL schema
//!
//! Audit appends can be made to fail on demand to exercise rollback paths.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, OwnedSemaphorePermit, Semaphore};

use orgward_audit::AuditEvent;
use orgward_auth::{User, UserStatus};
use orgward_core::{Entity, InvitationId, OrganizationId, TaskId, UserId};
use orgward_invitations::{Invitation, InvitationStatus};
use orgward_organizations::{Organization, OrganizationMember};
use orgward_tasks::Task;

use crate::error::StoreError;
use crate::repository::{
    AuditRepository, InvitationFilter, InvitationRepository, MembershipRepository,
    OrganizationRepository, TaskRepository, UserRepository,
};
use crate::uow::{TransactionHandle, UnitOfWork};

pub const DEFAULT_CONNECTIONS: usize = 4;

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    organizations: HashMap<OrganizationId, Organization>,
    members: HashMap<(OrganizationId, UserId), OrganizationMember>,
    tasks: HashMap<TaskId, Task>,
    invitations: HashMap<InvitationId, Invitation>,
    audit_events: Vec<AuditEvent>,
}

fn upsert<E: Entity + Clone>(table: &mut HashMap<E::Id, E>, row: &E) {
    table.insert(row.id(), row.clone());
}

#[derive(Debug)]
struct Shared {
    tables: Arc<Mutex<Tables>>,
    connections: Arc<Semaphore>,
    max_connections: usize,
    fail_audit_appends: AtomicBool,
}

/// Shared handle; clones see the same data.
#[derive(Debug, Clone)]
pub struct InMemoryDatabase {
    shared: Arc<Shared>,
}

impl Default for InMemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::with_connections(DEFAULT_CONNECTIONS)
    }

    pub fn with_connections(max_connections: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                tables: Arc::new(Mutex::new(Tables::default())),
                connections: Arc::new(Semaphore::new(max_connections)),
                max_connections,
                fail_audit_appends: AtomicBool::new(false),
            }),
        }
    }

    pub fn max_connections(&self) -> usize {
        self.shared.max_connections
    }

    /// Connections not currently checked out by an open transaction.
    pub fn available_connections(&self) -> usize {
        self.shared.connections.available_permits()
    }

    /// Make every subsequent audit append fail until reset.
    pub fn fail_audit_appends(&self, fail: bool) {
        self.shared.fail_audit_appends.store(fail, Ordering::SeqCst);
    }

    /// Register an active user directly (users are provisioned elsewhere).
    pub async fn seed_user(&self, email: &str) -> User {
        let user = User::new(UserId::new(), email, Utc::now());
        upsert(&mut self.shared.tables.lock().await.users, &user);
        user
    }

    pub async fn set_user_status(&self, id: UserId, status: UserStatus) {
        if let Some(user) = self.shared.tables.lock().await.users.get_mut(&id) {
            user.status = status;
        }
    }

    pub async fn organization(&self, id: OrganizationId) -> Option<Organization> {
        self.shared.tables.lock().await.organizations.get(&id).cloned()
    }

    pub async fn member(&self, organization_id: OrganizationId, user_id: UserId) -> Option<OrganizationMember> {
        self.shared
            .tables
            .lock()
            .await
            .members
            .get(&(organization_id, user_id))
            .cloned()
    }

    pub async fn task(&self, id: TaskId) -> Option<Task> {
        self.shared.tables.lock().await.tasks.get(&id).cloned()
    }

    pub async fn invitation(&self, id: InvitationId) -> Option<Invitation> {
        self.shared.tables.lock().await.invitations.get(&id).cloned()
    }

    /// Committed audit trail in append order.
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.shared.tables.lock().await.audit_events.clone()
    }
}

#[async_trait]
impl UnitOfWork for InMemoryDatabase {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> Result<InMemoryTransaction, StoreError> {
        let permit = self
            .shared
            .connections
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| StoreError::Storage("connection pool closed".to_string()))?;

        let committed = self.shared.tables.clone().lock_owned().await;
        let working = committed.clone();

        Ok(InMemoryTransaction {
            shared: self.shared.clone(),
            committed,
            working,
            _connection: permit,
        })
    }
}

/// Open transaction over [`InMemoryDatabase`].
pub struct InMemoryTransaction {
    shared: Arc<Shared>,
    committed: OwnedMutexGuard<Tables>,
    working: Tables,
    _connection: OwnedSemaphorePermit,
}

impl core::fmt::Debug for InMemoryTransaction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryTransaction").finish_non_exhaustive()
    }
}

#[async_trait]
impl TransactionHandle for InMemoryTransaction {
    async fn commit(mut self) -> Result<(), StoreError> {
        *self.committed = std::mem::take(&mut self.working);
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryTransaction {
    async fn find_organization(&mut self, id: OrganizationId) -> Result<Option<Organization>, StoreError> {
        Ok(self.working.organizations.get(&id).cloned())
    }

    async fn organization_name_exists(&mut self, name: &str) -> Result<bool, StoreError> {
        Ok(self.working.organizations.values().any(|o| o.name == name))
    }

    async fn add_organization(&mut self, organization: &Organization) -> Result<(), StoreError> {
        if self.working.organizations.contains_key(&organization.id) {
            return Err(StoreError::Conflict(format!(
                "organization {} already exists",
                organization.id
            )));
        }
        if self.working.organizations.values().any(|o| o.name == organization.name) {
            return Err(StoreError::Conflict(format!(
                "organization name '{}' is taken",
                organization.name
            )));
        }
        upsert(&mut self.working.organizations, organization);
        Ok(())
    }

    async fn save_organization(&mut self, organization: &Organization) -> Result<(), StoreError> {
        if self
            .working
            .organizations
            .values()
            .any(|o| o.name == organization.name && o.id != organization.id)
        {
            return Err(StoreError::Conflict(format!(
                "organization name '{}' is taken",
                organization.name
            )));
        }
        upsert(&mut self.working.organizations, organization);
        Ok(())
    }

    async fn delete_organization(&mut self, id: OrganizationId) -> Result<(), StoreError> {
        let tables = &mut self.working;
        tables.organizations.remove(&id);
        tables.members.retain(|_, m| m.organization_id != id);
        tables.tasks.retain(|_, t| t.organization_id != id);
        tables.invitations.retain(|_, i| i.organization_id != id);
        Ok(())
    }
}

#[async_trait]
impl MembershipRepository for InMemoryTransaction {
    async fn find_member(
        &mut self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Option<OrganizationMember>, StoreError> {
        Ok(self.working.members.get(&(organization_id, user_id)).cloned())
    }

    async fn add_member(&mut self, member: &OrganizationMember) -> Result<(), StoreError> {
        if !self.working.organizations.contains_key(&member.organization_id) {
            return Err(StoreError::Integrity(format!(
                "organization {} does not exist",
                member.organization_id
            )));
        }
        if self.working.members.contains_key(&member.id()) {
            return Err(StoreError::Conflict(format!(
                "user {} is already a member of {}",
                member.user_id, member.organization_id
            )));
        }
        upsert(&mut self.working.members, member);
        Ok(())
    }

    async fn save_member(&mut self, member: &OrganizationMember) -> Result<(), StoreError> {
        if let Some(existing) = self.working.members.get_mut(&member.id()) {
            existing.role = member.role;
        }
        Ok(())
    }

    async fn delete_member(&mut self, organization_id: OrganizationId, user_id: UserId) -> Result<(), StoreError> {
        self.working.members.remove(&(organization_id, user_id));
        Ok(())
    }

    async fn list_members(&mut self, organization_id: OrganizationId) -> Result<Vec<OrganizationMember>, StoreError> {
        let mut members: Vec<_> = self
            .working
            .members
            .values()
            .filter(|m| m.organization_id == organization_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| (m.joined_at, m.user_id));
        Ok(members)
    }

    async fn count_members(&mut self, organization_id: OrganizationId) -> Result<usize, StoreError> {
        Ok(self
            .working
            .members
            .values()
            .filter(|m| m.organization_id == organization_id)
            .count())
    }
}

#[async_trait]
impl TaskRepository for InMemoryTransaction {
    async fn find_task(&mut self, id: TaskId, organization_id: OrganizationId) -> Result<Option<Task>, StoreError> {
        Ok(self
            .working
            .tasks
            .get(&id)
            .filter(|t| t.organization_id == organization_id)
            .cloned())
    }

    async fn save_task(&mut self, task: &Task) -> Result<(), StoreError> {
        if !self.working.organizations.contains_key(&task.organization_id) {
            return Err(StoreError::Integrity(format!(
                "organization {} does not exist",
                task.organization_id
            )));
        }
        upsert(&mut self.working.tasks, task);
        Ok(())
    }

    async fn delete_task(&mut self, id: TaskId) -> Result<(), StoreError> {
        self.working.tasks.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl InvitationRepository for InMemoryTransaction {
    async fn find_invitation(&mut self, id: InvitationId) -> Result<Option<Invitation>, StoreError> {
        Ok(self.working.invitations.get(&id).cloned())
    }

    async fn list_invitations(&mut self, filter: InvitationFilter) -> Result<Vec<Invitation>, StoreError> {
        let mut invitations: Vec<_> = self
            .working
            .invitations
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(invitations)
    }

    async fn pending_invitation_exists(
        &mut self,
        organization_id: OrganizationId,
        invited_user_id: UserId,
    ) -> Result<bool, StoreError> {
        Ok(self.working.invitations.values().any(|i| {
            i.organization_id == organization_id
                && i.invited_user_id == invited_user_id
                && i.is_pending()
        }))
    }

    async fn add_invitation(&mut self, invitation: &Invitation) -> Result<(), StoreError> {
        if self.working.invitations.contains_key(&invitation.id) {
            return Err(StoreError::Conflict(format!("invitation {} already exists", invitation.id)));
        }
        if !self.working.organizations.contains_key(&invitation.organization_id) {
            return Err(StoreError::Integrity(format!(
                "organization {} does not exist",
                invitation.organization_id
            )));
        }
        // Partial unique index: one PENDING row per (organization, invitee).
        let duplicate_pending = invitation.is_pending()
            && self.working.invitations.values().any(|i| {
                i.id != invitation.id
                    && i.organization_id == invitation.organization_id
                    && i.invited_user_id == invitation.invited_user_id
                    && i.is_pending()
            });
        if duplicate_pending {
            return Err(StoreError::Conflict(format!(
                "pending invitation already exists for user {} in {}",
                invitation.invited_user_id, invitation.organization_id
            )));
        }
        upsert(&mut self.working.invitations, invitation);
        Ok(())
    }

    async fn resolve_pending_invitation(&mut self, invitation: &Invitation) -> Result<bool, StoreError> {
        match self.working.invitations.get_mut(&invitation.id) {
            Some(stored) if stored.is_pending() => {
                stored.status = invitation.status;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn expire_pending_invitations(&mut self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut expired = 0;
        for invitation in self.working.invitations.values_mut() {
            if invitation.is_pending() && invitation.is_past_expiry(now) {
                invitation.status = InvitationStatus::Expired;
                expired += 1;
            }
        }
        Ok(expired)
    }
}

#[async_trait]
impl AuditRepository for InMemoryTransaction {
    async fn append_audit_event(&mut self, event: &AuditEvent) -> Result<(), StoreError> {
        if self.shared.fail_audit_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Storage("audit append failed (injected)".to_string()));
        }
        self.working.audit_events.push(event.clone());
        Ok(())
    }

    async fn list_audit_events(
        &mut self,
        organization_id: OrganizationId,
        limit: u32,
    ) -> Result<Vec<AuditEvent>, StoreError> {
        Ok(self
            .working
            .audit_events
            .iter()
            .rev()
            .filter(|e| e.organization_id == organization_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryTransaction {
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.working.users.get(&id).cloned())
    }
}
