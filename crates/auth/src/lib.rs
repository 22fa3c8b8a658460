//! `orgward-auth`: role hierarchy and authorization policies.
//!
//! This crate decides what an already-identified actor may do. It does not
//! authenticate anyone and is decoupled from storage.

pub mod authorize;
pub mod roles;
pub mod task_permissions;
pub mod user;

pub use authorize::{
    assert_can_cancel_invitation, assert_can_change_role, assert_can_delete_organization,
    assert_can_fire, assert_can_hire, assert_can_invite, assert_can_rename_organization,
    assert_can_view_audit_log,
};
pub use roles::Role;
pub use task_permissions::can_change_task_elements;
pub use user::{User, UserStatus};
