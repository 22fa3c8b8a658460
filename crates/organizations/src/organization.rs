use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orgward_core::{DomainError, DomainResult, Entity, OrganizationId};

/// Upper bound on organization name length, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Tenant root. Members, tasks and invitations hang off an organization and
/// are removed with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    /// Build a new organization with a validated, trimmed name.
    pub fn new(name: &str, created_at: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: OrganizationId::new(),
            name: normalize_name(name)?,
            created_at,
        })
    }

    pub fn rename(&mut self, name: &str) -> DomainResult<()> {
        self.name = normalize_name(name)?;
        Ok(())
    }
}

impl Entity for Organization {
    type Id = OrganizationId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Trim and validate an organization name.
pub fn normalize_name(name: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("organization name cannot be empty"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "organization name exceeds {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}
