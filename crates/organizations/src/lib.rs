//! Organizations domain module (tenants and their memberships).
//!
//! Pure domain logic: no IO, no storage.

pub mod member;
pub mod organization;

pub use member::OrganizationMember;
pub use organization::{MAX_NAME_LEN, Organization, normalize_name};
