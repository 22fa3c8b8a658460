//! Membership policy: who may hire, fire, re-role, invite, and delete.
//!
//! Every function here is a pure decision over roles:
//! - No IO
//! - No panics
//! - Violations are returned as `DomainError` values, never logged
//!
//! Callers resolve the actor's membership first; a missing membership is
//! `ActorNotAMember` and must be reported before any of these checks run.

use orgward_core::{DomainError, DomainResult};

use crate::Role;

/// Only an owner may remove a member, whatever the target's role.
pub fn assert_can_fire(actor_role: Role) -> DomainResult<()> {
    if actor_role == Role::Owner {
        Ok(())
    } else {
        Err(DomainError::InsufficientPermissions)
    }
}

/// Role change rule.
///
/// Permitted iff the actor strictly outranks the target's current role and the
/// new role does not exceed the actor's own rank.
pub fn assert_can_change_role(
    actor_role: Role,
    target_current_role: Role,
    new_role: Role,
) -> DomainResult<()> {
    if actor_role.outranks(target_current_role) && actor_role >= new_role {
        Ok(())
    } else {
        Err(DomainError::InsufficientPermissions)
    }
}

/// Hiring requires an admin or owner, and cannot grant a role above the actor's.
pub fn assert_can_hire(actor_role: Role, role: Role) -> DomainResult<()> {
    if actor_role >= Role::Admin && actor_role >= role {
        Ok(())
    } else {
        Err(DomainError::InsufficientPermissions)
    }
}

/// Any member may invite, but never into a role ranked above their own.
pub fn assert_can_invite(actor_role: Role, role: Role) -> DomainResult<()> {
    if actor_role >= role {
        Ok(())
    } else {
        Err(DomainError::InsufficientPermissions)
    }
}

/// Pending invitations are withdrawn by the organization owner only.
pub fn assert_can_cancel_invitation(actor_role: Role) -> DomainResult<()> {
    if actor_role == Role::Owner {
        Ok(())
    } else {
        Err(DomainError::InsufficientPermissions)
    }
}

pub fn assert_can_rename_organization(actor_role: Role) -> DomainResult<()> {
    if actor_role == Role::Owner {
        Ok(())
    } else {
        Err(DomainError::InsufficientPermissions)
    }
}

/// Deletion needs the owner to be the only remaining member.
///
/// Members must be offboarded first so no membership is orphaned.
pub fn assert_can_delete_organization(actor_role: Role, member_count: usize) -> DomainResult<()> {
    if actor_role == Role::Owner && member_count == 1 {
        Ok(())
    } else {
        Err(DomainError::CannotDeleteOrganization)
    }
}

pub fn assert_can_view_audit_log(actor_role: Role) -> DomainResult<()> {
    if actor_role >= Role::Admin {
        Ok(())
    } else {
        Err(DomainError::InsufficientPermissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    #[test]
    fn admin_may_promote_member_to_admin() {
        assert!(assert_can_change_role(Role::Admin, Role::Member, Role::Admin).is_ok());
    }

    #[test]
    fn admin_may_not_promote_admin_to_owner() {
        assert_eq!(
            assert_can_change_role(Role::Admin, Role::Admin, Role::Owner),
            Err(DomainError::InsufficientPermissions)
        );
    }

    #[test]
    fn admin_may_not_create_owners() {
        assert!(assert_can_change_role(Role::Admin, Role::Member, Role::Owner).is_err());
        assert!(assert_can_hire(Role::Admin, Role::Owner).is_err());
    }

    #[test]
    fn owner_may_demote_admin() {
        assert!(assert_can_change_role(Role::Owner, Role::Admin, Role::Member).is_ok());
    }

    #[test]
    fn members_cannot_hire() {
        assert!(assert_can_hire(Role::Member, Role::Member).is_err());
        assert!(assert_can_hire(Role::Admin, Role::Admin).is_ok());
        assert!(assert_can_hire(Role::Owner, Role::Owner).is_ok());
    }

    #[test]
    fn delete_requires_sole_owner() {
        assert!(assert_can_delete_organization(Role::Owner, 1).is_ok());
        assert_eq!(
            assert_can_delete_organization(Role::Owner, 2),
            Err(DomainError::CannotDeleteOrganization)
        );
        assert_eq!(
            assert_can_delete_organization(Role::Admin, 1),
            Err(DomainError::CannotDeleteOrganization)
        );
    }

    #[test]
    fn audit_log_is_admin_and_above() {
        assert!(assert_can_view_audit_log(Role::Member).is_err());
        assert!(assert_can_view_audit_log(Role::Admin).is_ok());
        assert!(assert_can_view_audit_log(Role::Owner).is_ok());
    }

    proptest! {
        /// Property: a role change never grants a rank above the actor's.
        #[test]
        fn change_role_never_escalates(actor in any_role(), current in any_role(), new in any_role()) {
            if assert_can_change_role(actor, current, new).is_ok() {
                prop_assert!(new.rank() <= actor.rank());
                prop_assert!(actor.rank() > current.rank());
            }
        }

        /// Property: a change is allowed exactly when both rank conditions hold.
        #[test]
        fn change_role_matches_rank_rule(actor in any_role(), current in any_role(), new in any_role()) {
            let expected = actor.rank() > current.rank() && actor.rank() >= new.rank();
            prop_assert_eq!(assert_can_change_role(actor, current, new).is_ok(), expected);
        }

        /// Property: firing succeeds only for owners.
        #[test]
        fn only_owner_can_fire(actor in any_role()) {
            prop_assert_eq!(assert_can_fire(actor).is_ok(), actor == Role::Owner);
        }

        /// Property: invitations never exceed the inviter's rank.
        #[test]
        fn invite_never_escalates(actor in any_role(), role in any_role()) {
            prop_assert_eq!(assert_can_invite(actor, role).is_ok(), role.rank() <= actor.rank());
        }
    }
}
