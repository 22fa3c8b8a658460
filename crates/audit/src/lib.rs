//! `orgward-audit`: append-only audit trail records.

pub mod event;

pub use event::{AuditAction, AuditEvent};
