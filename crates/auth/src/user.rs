//! Read-only view of a platform user.
//!
//! Users are provisioned outside this system (registration and credentials are
//! handled elsewhere); the organization core only looks them up by id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orgward_core::{DomainError, DomainResult, Entity, UserId};

/// User account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    /// User may join organizations and act within them.
    #[default]
    Active,
    /// User is suspended and cannot accept invitations or be hired.
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "ACTIVE",
            UserStatus::Suspended => "SUSPENDED",
        }
    }
}

impl core::str::FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(UserStatus::Active),
            "SUSPENDED" => Ok(UserStatus::Suspended),
            other => Err(DomainError::validation(format!("unknown user status '{other}'"))),
        }
    }
}

impl core::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, email: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            email: email.into().trim().to_lowercase(),
            status: UserStatus::Active,
            created_at,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn ensure_active(&self) -> DomainResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(DomainError::UserNotActive)
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_users_are_active() {
        let user = User::new(UserId::new(), "  Alice@Example.com ", Utc::now());
        assert_eq!(user.email, "alice@example.com");
        assert!(user.ensure_active().is_ok());
    }

    #[test]
    fn suspended_user_is_rejected() {
        let mut user = User::new(UserId::new(), "bob@example.com", Utc::now());
        user.status = UserStatus::Suspended;
        assert_eq!(user.ensure_active(), Err(DomainError::UserNotActive));
    }

    #[test]
    fn status_parses_storage_form() {
        assert_eq!("SUSPENDED".parse::<UserStatus>().unwrap(), UserStatus::Suspended);
        assert!("gone".parse::<UserStatus>().is_err());
    }
}
