//! Repository implementations over one [`PgTransaction`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{Span, instrument};

use orgward_audit::AuditEvent;
use orgward_auth::User;
use orgward_core::{InvitationId, OrganizationId, TaskId, UserId};
use orgward_invitations::{Invitation, InvitationStatus};
use orgward_organizations::{Organization, OrganizationMember};
use orgward_tasks::Task;

use super::rows::{
    AuditEventRow, InvitationRow, MemberRow, OrganizationRow, TaskRow, UserRow, convert_all,
};
use super::{PgTransaction, map_sqlx_error};
use crate::error::StoreError;
use crate::repository::{
    AuditRepository, InvitationFilter, InvitationRepository, MembershipRepository,
    OrganizationRepository, TaskRepository, UserRepository,
};

const INVITATION_COLUMNS: &str = "id, organization_id, invited_user_id, invited_by_user_id, role, status, created_at, expires_at";

#[async_trait]
impl OrganizationRepository for PgTransaction {
    #[instrument(skip(self), fields(organization_id = %id), err)]
    async fn find_organization(&mut self, id: OrganizationId) -> Result<Option<Organization>, StoreError> {
        let row = sqlx::query_as::<_, OrganizationRow>(
            "SELECT id, name, created_at FROM organizations WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_organization", e))?;

        Ok(row.map(Into::into))
    }

    #[instrument(skip(self), err)]
    async fn organization_name_exists(&mut self, name: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM organizations WHERE name = $1)")
            .bind(name)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("organization_name_exists", e))
    }

    #[instrument(skip(self, organization), fields(organization_id = %organization.id), err)]
    async fn add_organization(&mut self, organization: &Organization) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO organizations (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(organization.id.as_uuid())
            .bind(&organization.name)
            .bind(organization.created_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("add_organization", e))?;
        Ok(())
    }

    #[instrument(skip(self, organization), fields(organization_id = %organization.id), err)]
    async fn save_organization(&mut self, organization: &Organization) -> Result<(), StoreError> {
        sqlx::query("UPDATE organizations SET name = $2 WHERE id = $1")
            .bind(organization.id.as_uuid())
            .bind(&organization.name)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("save_organization", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(organization_id = %id), err)]
    async fn delete_organization(&mut self, id: OrganizationId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_organization", e))?;
        Ok(())
    }
}

#[async_trait]
impl MembershipRepository for PgTransaction {
    #[instrument(skip(self), fields(organization_id = %organization_id, user_id = %user_id), err)]
    async fn find_member(
        &mut self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Option<OrganizationMember>, StoreError> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT organization_id, user_id, role, joined_at
            FROM organization_members
            WHERE organization_id = $1 AND user_id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_member", e))?;

        row.map(OrganizationMember::try_from).transpose()
    }

    #[instrument(
        skip(self, member),
        fields(organization_id = %member.organization_id, user_id = %member.user_id, role = %member.role),
        err
    )]
    async fn add_member(&mut self, member: &OrganizationMember) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO organization_members (organization_id, user_id, role, joined_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(member.organization_id.as_uuid())
        .bind(member.user_id.as_uuid())
        .bind(member.role.as_str())
        .bind(member.joined_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("add_member", e))?;
        Ok(())
    }

    #[instrument(
        skip(self, member),
        fields(organization_id = %member.organization_id, user_id = %member.user_id, role = %member.role),
        err
    )]
    async fn save_member(&mut self, member: &OrganizationMember) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE organization_members SET role = $3 WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(member.organization_id.as_uuid())
        .bind(member.user_id.as_uuid())
        .bind(member.role.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("save_member", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(organization_id = %organization_id, user_id = %user_id), err)]
    async fn delete_member(&mut self, organization_id: OrganizationId, user_id: UserId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM organization_members WHERE organization_id = $1 AND user_id = $2")
            .bind(organization_id.as_uuid())
            .bind(user_id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_member", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(organization_id = %organization_id, member_count = tracing::field::Empty), err)]
    async fn list_members(&mut self, organization_id: OrganizationId) -> Result<Vec<OrganizationMember>, StoreError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT organization_id, user_id, role, joined_at
            FROM organization_members
            WHERE organization_id = $1
            ORDER BY joined_at ASC, user_id ASC
            "#,
        )
        .bind(organization_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("list_members", e))?;

        Span::current().record("member_count", rows.len());
        convert_all(rows)
    }

    #[instrument(skip(self), fields(organization_id = %organization_id), err)]
    async fn count_members(&mut self, organization_id: OrganizationId) -> Result<usize, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM organization_members WHERE organization_id = $1",
        )
        .bind(organization_id.as_uuid())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("count_members", e))?;

        usize::try_from(count).map_err(|_| StoreError::Storage(format!("invalid member count {count}")))
    }
}

#[async_trait]
impl TaskRepository for PgTransaction {
    #[instrument(skip(self), fields(task_id = %id, organization_id = %organization_id), err)]
    async fn find_task(&mut self, id: TaskId, organization_id: OrganizationId) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, organization_id, title, description, status, assigned_to, created_by, created_at
            FROM tasks
            WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(organization_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_task", e))?;

        row.map(Task::try_from).transpose()
    }

    #[instrument(skip(self, task), fields(task_id = %task.id, organization_id = %task.organization_id), err)]
    async fn save_task(&mut self, task: &Task) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO tasks (id, organization_id, title, description, status, assigned_to, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                status = EXCLUDED.status,
                assigned_to = EXCLUDED.assigned_to
            "#,
        )
        .bind(task.id.as_uuid())
        .bind(task.organization_id.as_uuid())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.assigned_to.as_uuid())
        .bind(task.created_by.as_uuid())
        .bind(task.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("save_task", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(task_id = %id), err)]
    async fn delete_task(&mut self, id: TaskId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_task", e))?;
        Ok(())
    }
}

#[async_trait]
impl InvitationRepository for PgTransaction {
    #[instrument(skip(self), fields(invitation_id = %id), err)]
    async fn find_invitation(&mut self, id: InvitationId) -> Result<Option<Invitation>, StoreError> {
        let row = sqlx::query_as::<_, InvitationRow>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM organization_invitations WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_invitation", e))?;

        row.map(Invitation::try_from).transpose()
    }

    #[instrument(skip(self), fields(invitation_count = tracing::field::Empty), err)]
    async fn list_invitations(&mut self, filter: InvitationFilter) -> Result<Vec<Invitation>, StoreError> {
        // NULL parameters leave the corresponding column unconstrained.
        let rows = sqlx::query_as::<_, InvitationRow>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM organization_invitations
            WHERE ($1::uuid IS NULL OR organization_id = $1)
              AND ($2::uuid IS NULL OR invited_user_id = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(filter.organization_id.map(uuid::Uuid::from))
        .bind(filter.invited_user_id.map(uuid::Uuid::from))
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("list_invitations", e))?;

        Span::current().record("invitation_count", rows.len());
        convert_all(rows)
    }

    #[instrument(skip(self), fields(organization_id = %organization_id, invited_user_id = %invited_user_id), err)]
    async fn pending_invitation_exists(
        &mut self,
        organization_id: OrganizationId,
        invited_user_id: UserId,
    ) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM organization_invitations
                WHERE organization_id = $1 AND invited_user_id = $2 AND status = $3
            )
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(invited_user_id.as_uuid())
        .bind(InvitationStatus::Pending.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("pending_invitation_exists", e))
    }

    #[instrument(
        skip(self, invitation),
        fields(invitation_id = %invitation.id, status = %invitation.status),
        err
    )]
    async fn add_invitation(&mut self, invitation: &Invitation) -> Result<(), StoreError> {
        sqlx::query(&format!(
            r#"
            INSERT INTO organization_invitations ({INVITATION_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#
        ))
        .bind(invitation.id.as_uuid())
        .bind(invitation.organization_id.as_uuid())
        .bind(invitation.invited_user_id.as_uuid())
        .bind(invitation.invited_by_user_id.as_uuid())
        .bind(invitation.role.as_str())
        .bind(invitation.status.as_str())
        .bind(invitation.created_at)
        .bind(invitation.expires_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("add_invitation", e))?;
        Ok(())
    }

    #[instrument(
        skip(self, invitation),
        fields(invitation_id = %invitation.id, status = %invitation.status, resolved = tracing::field::Empty),
        err
    )]
    async fn resolve_pending_invitation(&mut self, invitation: &Invitation) -> Result<bool, StoreError> {
        // A concurrent writer holds the row lock until it commits; the WHERE
        // clause is then re-checked against the committed status.
        let result = sqlx::query(
            r#"
            UPDATE organization_invitations
            SET status = $2
            WHERE id = $1 AND status = $3
            "#,
        )
        .bind(invitation.id.as_uuid())
        .bind(invitation.status.as_str())
        .bind(InvitationStatus::Pending.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("resolve_pending_invitation", e))?;

        let resolved = result.rows_affected() == 1;
        Span::current().record("resolved", resolved);
        Ok(resolved)
    }

    #[instrument(skip(self), fields(expired = tracing::field::Empty), err)]
    async fn expire_pending_invitations(&mut self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE organization_invitations
            SET status = $1
            WHERE status = $2 AND expires_at < $3
            "#,
        )
        .bind(InvitationStatus::Expired.as_str())
        .bind(InvitationStatus::Pending.as_str())
        .bind(now)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("expire_pending_invitations", e))?;

        let expired = result.rows_affected();
        Span::current().record("expired", expired);
        Ok(expired)
    }
}

#[async_trait]
impl AuditRepository for PgTransaction {
    #[instrument(
        skip(self, event),
        fields(action = %event.action, actor_id = %event.actor_id),
        err
    )]
    async fn append_audit_event(&mut self, event: &AuditEvent) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO audit_events (id, actor_user_id, organization_id, action, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(event.actor_id.as_uuid())
        .bind(event.organization_id.as_uuid())
        .bind(event.action.as_str())
        .bind(event.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("append_audit_event", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(organization_id = %organization_id), err)]
    async fn list_audit_events(
        &mut self,
        organization_id: OrganizationId,
        limit: u32,
    ) -> Result<Vec<AuditEvent>, StoreError> {
        let rows = sqlx::query_as::<_, AuditEventRow>(
            r#"
            SELECT id, actor_user_id, organization_id, action, created_at
            FROM audit_events
            WHERE organization_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(i64::from(limit))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("list_audit_events", e))?;

        convert_all(rows)
    }
}

#[async_trait]
impl UserRepository for PgTransaction {
    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, status, created_at FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_user", e))?;

        row.map(User::try_from).transpose()
    }
}
