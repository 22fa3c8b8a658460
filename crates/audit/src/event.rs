use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orgward_core::{AuditEventId, DomainError, Entity, OrganizationId, UserId};

/// Privileged action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    OrganizationCreated,
    OrganizationRenamed,
    OrganizationDeleted,
    OrganizationViewed,
    MemberHired,
    MemberFired,
    MemberRoleChanged,
    MembersListed,
    TaskCreated,
    TaskTitleChanged,
    TaskDescriptionChanged,
    TaskStatusChanged,
    TaskDeleted,
    InvitationCreated,
    InvitationAccepted,
    InvitationRejected,
    InvitationCancelled,
    InvitationsListed,
    AuditLogViewed,
}

impl AuditAction {
    pub const ALL: [AuditAction; 19] = [
        AuditAction::OrganizationCreated,
        AuditAction::OrganizationRenamed,
        AuditAction::OrganizationDeleted,
        AuditAction::OrganizationViewed,
        AuditAction::MemberHired,
        AuditAction::MemberFired,
        AuditAction::MemberRoleChanged,
        AuditAction::MembersListed,
        AuditAction::TaskCreated,
        AuditAction::TaskTitleChanged,
        AuditAction::TaskDescriptionChanged,
        AuditAction::TaskStatusChanged,
        AuditAction::TaskDeleted,
        AuditAction::InvitationCreated,
        AuditAction::InvitationAccepted,
        AuditAction::InvitationRejected,
        AuditAction::InvitationCancelled,
        AuditAction::InvitationsListed,
        AuditAction::AuditLogViewed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::OrganizationCreated => "ORGANIZATION_CREATED",
            AuditAction::OrganizationRenamed => "ORGANIZATION_RENAMED",
            AuditAction::OrganizationDeleted => "ORGANIZATION_DELETED",
            AuditAction::OrganizationViewed => "ORGANIZATION_VIEWED",
            AuditAction::MemberHired => "MEMBER_HIRED",
            AuditAction::MemberFired => "MEMBER_FIRED",
            AuditAction::MemberRoleChanged => "MEMBER_ROLE_CHANGED",
            AuditAction::MembersListed => "MEMBERS_LISTED",
            AuditAction::TaskCreated => "TASK_CREATED",
            AuditAction::TaskTitleChanged => "TASK_TITLE_CHANGED",
            AuditAction::TaskDescriptionChanged => "TASK_DESCRIPTION_CHANGED",
            AuditAction::TaskStatusChanged => "TASK_STATUS_CHANGED",
            AuditAction::TaskDeleted => "TASK_DELETED",
            AuditAction::InvitationCreated => "INVITATION_CREATED",
            AuditAction::InvitationAccepted => "INVITATION_ACCEPTED",
            AuditAction::InvitationRejected => "INVITATION_REJECTED",
            AuditAction::InvitationCancelled => "INVITATION_CANCELLED",
            AuditAction::InvitationsListed => "INVITATIONS_LISTED",
            AuditAction::AuditLogViewed => "AUDIT_LOG_VIEWED",
        }
    }
}

impl core::str::FromStr for AuditAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuditAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown audit action '{s}'")))
    }
}

impl core::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable audit record. Appended once, never updated or deleted.
///
/// `organization_id` deliberately outlives the organization it names: the
/// record of a deletion must survive the deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: AuditEventId,
    pub actor_id: UserId,
    pub organization_id: OrganizationId,
    pub action: AuditAction,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn record(
        actor_id: UserId,
        organization_id: OrganizationId,
        action: AuditAction,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AuditEventId::new(),
            actor_id,
            organization_id,
            action,
            created_at,
        }
    }
}

impl Entity for AuditEvent {
    type Id = AuditEventId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_parses_from_its_tag() {
        for action in AuditAction::ALL {
            assert_eq!(action.as_str().parse::<AuditAction>().unwrap(), action);
        }
        assert!("MEMBER_PROMOTED".parse::<AuditAction>().is_err());
    }

    #[test]
    fn serde_uses_the_storage_tag() {
        let json = serde_json::to_string(&AuditAction::MemberRoleChanged).unwrap();
        assert_eq!(json, "\"MEMBER_ROLE_CHANGED\"");
    }
}
