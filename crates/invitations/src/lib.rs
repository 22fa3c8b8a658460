//! Invitations domain module: the invitation state machine.

pub mod invitation;

pub use invitation::{INVITATION_TTL_DAYS, Invitation, InvitationStatus};
