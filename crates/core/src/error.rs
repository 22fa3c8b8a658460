//! Domain error model.

use serde::Serialize;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Coarse classification shared by every error that crosses a service boundary.
///
/// Callers (HTTP adapters, workers) branch on the kind, never on concrete variants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A value was malformed.
    Validation,
    /// Caller identity missing or invalid. Produced by the calling layer, not the core.
    Authentication,
    /// Role or ownership policy violation.
    Authorization,
    /// A referenced entity is absent.
    NotFound,
    /// A state invariant would be violated.
    Conflict,
    /// Storage or connection failure.
    Infrastructure,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Authorization => "authorization",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Infrastructure => "infrastructure",
        };
        f.write_str(s)
    }
}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// policy, state invariants). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("insufficient permissions")]
    InsufficientPermissions,

    #[error("actor cannot perform this operation on themselves")]
    CannotActOnSelf,

    #[error("actor is not a member of the organization")]
    ActorNotAMember,

    #[error("actor is not the invited user")]
    NotInvitee,

    #[error("user is not active")]
    UserNotActive,

    /// The organization still has members other than its owner.
    #[error("organization cannot be deleted while it has other members")]
    CannotDeleteOrganization,

    #[error("invitation is not pending")]
    InvitationNotPending,

    #[error("invitation has expired")]
    InvitationExpired,

    #[error("a pending invitation already exists for this user")]
    DuplicatePendingInvitation,

    #[error("user is already a member of the organization")]
    AlreadyMember,

    #[error("organization name is already taken")]
    DuplicateOrganizationName,

    #[error("organization not found")]
    OrganizationNotFound,

    #[error("member not found")]
    MemberNotFound,

    #[error("task not found")]
    TaskNotFound,

    #[error("invitation not found")]
    InvitationNotFound,

    #[error("user not found")]
    UserNotFound,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) | DomainError::InvalidId(_) => ErrorKind::Validation,
            DomainError::InsufficientPermissions
            | DomainError::CannotActOnSelf
            | DomainError::ActorNotAMember
            | DomainError::NotInvitee
            | DomainError::UserNotActive => ErrorKind::Authorization,
            DomainError::CannotDeleteOrganization
            | DomainError::InvitationNotPending
            | DomainError::InvitationExpired
            | DomainError::DuplicatePendingInvitation
            | DomainError::AlreadyMember
            | DomainError::DuplicateOrganizationName => ErrorKind::Conflict,
            DomainError::OrganizationNotFound
            | DomainError::MemberNotFound
            | DomainError::TaskNotFound
            | DomainError::InvitationNotFound
            | DomainError::UserNotFound => ErrorKind::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_violations_are_authorization_errors() {
        assert_eq!(DomainError::InsufficientPermissions.kind(), ErrorKind::Authorization);
        assert_eq!(DomainError::ActorNotAMember.kind(), ErrorKind::Authorization);
        assert_eq!(DomainError::CannotActOnSelf.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn state_violations_are_conflicts() {
        assert_eq!(DomainError::InvitationNotPending.kind(), ErrorKind::Conflict);
        assert_eq!(DomainError::DuplicatePendingInvitation.kind(), ErrorKind::Conflict);
        assert_eq!(DomainError::CannotDeleteOrganization.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn kind_display_is_snake_case() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
    }
}
