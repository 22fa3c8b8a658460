//! Invitation lifecycle.
//!
//! ```text
//!            ┌──> ACCEPTED   (invitee)
//!            ├──> REJECTED   (invitee)
//! PENDING ───┼──> CANCELLED  (organization owner)
//!            └──> EXPIRED    (sweeper, once expires_at has passed)
//! ```
//!
//! Every transition starts from `PENDING`; all other states are terminal.
//! Authorization (who may trigger which transition) is checked by the caller.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use orgward_auth::Role;
use orgward_core::{DomainError, DomainResult, Entity, InvitationId, OrganizationId, UserId};

/// Fixed lifetime of an invitation.
pub const INVITATION_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Expired,
    Cancelled,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "PENDING",
            InvitationStatus::Accepted => "ACCEPTED",
            InvitationStatus::Rejected => "REJECTED",
            InvitationStatus::Expired => "EXPIRED",
            InvitationStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self != InvitationStatus::Pending
    }
}

impl core::str::FromStr for InvitationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(InvitationStatus::Pending),
            "ACCEPTED" => Ok(InvitationStatus::Accepted),
            "REJECTED" => Ok(InvitationStatus::Rejected),
            "EXPIRED" => Ok(InvitationStatus::Expired),
            "CANCELLED" => Ok(InvitationStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown invitation status '{other}'"
            ))),
        }
    }
}

impl core::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: InvitationId,
    pub organization_id: OrganizationId,
    pub invited_user_id: UserId,
    pub invited_by_user_id: UserId,
    pub role: Role,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Invitation {
    /// Issue a new pending invitation expiring [`INVITATION_TTL_DAYS`] after `created_at`.
    pub fn issue(
        organization_id: OrganizationId,
        invited_user_id: UserId,
        invited_by_user_id: UserId,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InvitationId::new(),
            organization_id,
            invited_user_id,
            invited_by_user_id,
            role,
            status: InvitationStatus::Pending,
            created_at,
            expires_at: created_at + Duration::days(INVITATION_TTL_DAYS),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    pub fn ensure_is_pending(&self) -> DomainResult<()> {
        if self.is_pending() {
            Ok(())
        } else {
            Err(DomainError::InvitationNotPending)
        }
    }

    /// Past its deadline, whether or not the sweeper has caught up yet.
    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    pub fn is_addressed_to(&self, user_id: UserId) -> bool {
        self.invited_user_id == user_id
    }

    /// Invitee accepts. The caller creates the membership in the same unit of work.
    pub fn accept(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_is_pending()?;
        if self.is_past_expiry(now) {
            return Err(DomainError::InvitationExpired);
        }
        self.status = InvitationStatus::Accepted;
        Ok(())
    }

    pub fn reject(&mut self) -> DomainResult<()> {
        self.transition(InvitationStatus::Rejected)
    }

    pub fn cancel(&mut self) -> DomainResult<()> {
        self.transition(InvitationStatus::Cancelled)
    }

    /// Time-driven transition. Bulk expiry in storage applies the same rule.
    pub fn expire(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_is_pending()?;
        if !self.is_past_expiry(now) {
            return Err(DomainError::validation("invitation has not reached its expiry"));
        }
        self.status = InvitationStatus::Expired;
        Ok(())
    }

    fn transition(&mut self, to: InvitationStatus) -> DomainResult<()> {
        self.ensure_is_pending()?;
        self.status = to;
        Ok(())
    }
}

impl Entity for Invitation {
    type Id = InvitationId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> Invitation {
        Invitation::issue(
            OrganizationId::new(),
            UserId::new(),
            UserId::new(),
            Role::Member,
            Utc::now(),
        )
    }

    #[test]
    fn expires_seven_days_after_creation() {
        let inv = pending();
        assert_eq!(inv.expires_at - inv.created_at, Duration::days(7));
        assert_eq!(inv.status, InvitationStatus::Pending);
    }

    #[test]
    fn second_transition_is_rejected() {
        let now = Utc::now();

        let mut inv = pending();
        inv.accept(now).unwrap();
        assert_eq!(inv.accept(now), Err(DomainError::InvitationNotPending));
        assert_eq!(inv.reject(), Err(DomainError::InvitationNotPending));

        let mut inv = pending();
        inv.reject().unwrap();
        assert_eq!(inv.reject(), Err(DomainError::InvitationNotPending));

        let mut inv = pending();
        inv.cancel().unwrap();
        assert_eq!(inv.cancel(), Err(DomainError::InvitationNotPending));
        assert_eq!(inv.status, InvitationStatus::Cancelled);
    }

    #[test]
    fn accept_after_deadline_fails_and_keeps_state() {
        let mut inv = pending();
        let later = inv.expires_at + Duration::seconds(1);
        assert_eq!(inv.accept(later), Err(DomainError::InvitationExpired));
        assert_eq!(inv.status, InvitationStatus::Pending);
    }

    #[test]
    fn expire_requires_deadline_to_pass() {
        let mut inv = pending();
        assert!(inv.expire(inv.created_at).is_err());
        let later = inv.expires_at + Duration::seconds(1);
        inv.expire(later).unwrap();
        assert_eq!(inv.status, InvitationStatus::Expired);
        assert!(inv.status.is_terminal());
    }

    #[test]
    fn status_parses_storage_form() {
        for status in [
            InvitationStatus::Pending,
            InvitationStatus::Accepted,
            InvitationStatus::Rejected,
            InvitationStatus::Expired,
            InvitationStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<InvitationStatus>().unwrap(), status);
        }
    }
}
