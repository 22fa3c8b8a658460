//! Task permission policy.

use orgward_core::{DomainError, DomainResult, UserId};

use crate::Role;

/// Decide whether `actor_id` (holding `actor_role`) may edit or delete a task.
///
/// - `Member`: only the task's creator.
/// - `Admin`: only tasks whose assignee ranks below admin.
/// - `Owner`: always.
///
/// A task whose assignee no longer holds a membership is evaluated with
/// `Role::Member` as the assignee role.
pub fn can_change_task_elements(
    actor_role: Role,
    actor_id: UserId,
    task_created_by: UserId,
    assignee_role: Role,
) -> DomainResult<()> {
    let allowed = match actor_role {
        Role::Owner => true,
        Role::Admin => assignee_role < Role::Admin,
        Role::Member => actor_id == task_created_by,
    };

    if allowed {
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
    fn admin_blocked_by_admin_or_owner_assignee() {
        let actor = UserId::new();
        let creator = UserId::new();
        assert!(can_change_task_elements(Role::Admin, actor, creator, Role::Member).is_ok());
        assert_eq!(
            can_change_task_elements(Role::Admin, actor, creator, Role::Admin),
            Err(DomainError::InsufficientPermissions)
        );
        assert_eq!(
            can_change_task_elements(Role::Admin, actor, creator, Role::Owner),
            Err(DomainError::InsufficientPermissions)
        );
    }

    #[test]
    fn admin_rule_ignores_authorship() {
        let actor = UserId::new();
        assert!(can_change_task_elements(Role::Admin, actor, actor, Role::Admin).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

        /// Property: a member succeeds iff they created the task, whatever the assignee.
        #[test]
        fn member_needs_authorship(assignee in any_role(), own in any::<bool>()) {
            let actor = UserId::new();
            let creator = if own { actor } else { UserId::new() };
            let result = can_change_task_elements(Role::Member, actor, creator, assignee);
            prop_assert_eq!(result.is_ok(), own);
        }

        /// Property: an owner is never refused.
        #[test]
        fn owner_always_allowed(assignee in any_role()) {
            let result = can_change_task_elements(Role::Owner, UserId::new(), UserId::new(), assignee);
            prop_assert!(result.is_ok());
        }
    }
}
