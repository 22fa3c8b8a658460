use core::cmp::Ordering;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use orgward_core::DomainError;

/// Organization role used for hierarchy comparisons.
///
/// Roles are totally ordered by rank: `Member < Admin < Owner`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    Member,
    Admin,
    Owner,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Member, Role::Admin, Role::Owner];

    /// Position in the hierarchy (1 = lowest).
    pub const fn rank(self) -> u8 {
        match self {
            Role::Member => 1,
            Role::Admin => 2,
            Role::Owner => 3,
        }
    }

    /// Strictly higher rank than `other`.
    pub fn outranks(self, other: Role) -> bool {
        self.rank() > other.rank()
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "MEMBER",
            Role::Admin => "ADMIN",
            Role::Owner => "OWNER",
        }
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MEMBER" => Ok(Role::Member),
            "ADMIN" => Ok(Role::Admin),
            "OWNER" => Ok(Role::Owner),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ranks_are_strictly_increasing() {
        assert!(Role::Member < Role::Admin);
        assert!(Role::Admin < Role::Owner);
        assert_eq!(Role::Member.rank(), 1);
        assert_eq!(Role::Admin.rank(), 2);
        assert_eq!(Role::Owner.rank(), 3);
    }

    #[test]
    fn parses_storage_representation() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn defaults_to_member() {
        assert_eq!(Role::default(), Role::Member);
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    proptest! {
        /// Property: ordering agrees with rank for every pair.
        #[test]
        fn ordering_matches_rank(a in any_role(), b in any_role()) {
            prop_assert_eq!(a.cmp(&b), a.rank().cmp(&b.rank()));
            prop_assert_eq!(a.outranks(b), a.rank() > b.rank());
        }
    }
}
