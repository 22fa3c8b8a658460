//! Row types and their conversion into domain values.
//!
//! Enumerations are stored as their upper-case text tags; a tag that does not
//! parse means the row was written by something else and is reported as a
//! storage failure.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use orgward_audit::AuditEvent;
use orgward_auth::User;
use orgward_core::{AuditEventId, InvitationId, OrganizationId, TaskId, UserId};
use orgward_invitations::Invitation;
use orgward_organizations::{Organization, OrganizationMember};
use orgward_tasks::Task;

use crate::error::StoreError;

fn parse_tag<T>(column: &str, value: &str) -> Result<T, StoreError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    value
        .parse()
        .map_err(|e| StoreError::Storage(format!("invalid {column} '{value}' in row: {e}")))
}

#[derive(Debug)]
pub(super) struct UserRow {
    id: Uuid,
    email: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::from_uuid(row.id),
            email: row.email,
            status: parse_tag("status", &row.status)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug)]
pub(super) struct OrganizationRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for OrganizationRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrganizationRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl From<OrganizationRow> for Organization {
    fn from(row: OrganizationRow) -> Self {
        Organization {
            id: OrganizationId::from_uuid(row.id),
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug)]
pub(super) struct MemberRow {
    organization_id: Uuid,
    user_id: Uuid,
    role: String,
    joined_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for MemberRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(MemberRow {
            organization_id: row.try_get("organization_id")?,
            user_id: row.try_get("user_id")?,
            role: row.try_get("role")?,
            joined_at: row.try_get("joined_at")?,
        })
    }
}

impl TryFrom<MemberRow> for OrganizationMember {
    type Error = StoreError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(OrganizationMember {
            organization_id: OrganizationId::from_uuid(row.organization_id),
            user_id: UserId::from_uuid(row.user_id),
            role: parse_tag("role", &row.role)?,
            joined_at: row.joined_at,
        })
    }
}

#[derive(Debug)]
pub(super) struct TaskRow {
    id: Uuid,
    organization_id: Uuid,
    title: String,
    description: String,
    status: String,
    assigned_to: Uuid,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for TaskRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(TaskRow {
            id: row.try_get("id")?,
            organization_id: row.try_get("organization_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            assigned_to: row.try_get("assigned_to")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: TaskId::from_uuid(row.id),
            organization_id: OrganizationId::from_uuid(row.organization_id),
            title: row.title,
            description: row.description,
            status: parse_tag("status", &row.status)?,
            assigned_to: UserId::from_uuid(row.assigned_to),
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug)]
pub(super) struct InvitationRow {
    id: Uuid,
    organization_id: Uuid,
    invited_user_id: Uuid,
    invited_by_user_id: Uuid,
    role: String,
    status: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for InvitationRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(InvitationRow {
            id: row.try_get("id")?,
            organization_id: row.try_get("organization_id")?,
            invited_user_id: row.try_get("invited_user_id")?,
            invited_by_user_id: row.try_get("invited_by_user_id")?,
            role: row.try_get("role")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            expires_at: row.try_get("expires_at")?,
        })
    }
}

impl TryFrom<InvitationRow> for Invitation {
    type Error = StoreError;

    fn try_from(row: InvitationRow) -> Result<Self, Self::Error> {
        Ok(Invitation {
            id: InvitationId::from_uuid(row.id),
            organization_id: OrganizationId::from_uuid(row.organization_id),
            invited_user_id: UserId::from_uuid(row.invited_user_id),
            invited_by_user_id: UserId::from_uuid(row.invited_by_user_id),
            role: parse_tag("role", &row.role)?,
            status: parse_tag("status", &row.status)?,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}

#[derive(Debug)]
pub(super) struct AuditEventRow {
    id: Uuid,
    actor_user_id: Uuid,
    organization_id: Uuid,
    action: String,
    created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for AuditEventRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(AuditEventRow {
            id: row.try_get("id")?,
            actor_user_id: row.try_get("actor_user_id")?,
            organization_id: row.try_get("organization_id")?,
            action: row.try_get("action")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<AuditEventRow> for AuditEvent {
    type Error = StoreError;

    fn try_from(row: AuditEventRow) -> Result<Self, Self::Error> {
        Ok(AuditEvent {
            id: AuditEventId::from_uuid(row.id),
            actor_id: UserId::from_uuid(row.actor_user_id),
            organization_id: OrganizationId::from_uuid(row.organization_id),
            action: parse_tag("action", &row.action)?,
            created_at: row.created_at,
        })
    }
}

/// Convert a batch of rows, failing on the first bad one.
pub(super) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}
