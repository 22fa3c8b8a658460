//! Infrastructure and service-boundary errors.

use thiserror::Error;

use orgward_audit::AuditAction;
use orgward_core::{DomainError, ErrorKind};

/// Failure at the repository boundary.
///
/// Adapters translate their native errors into this enum; nothing above the
/// repository layer sees a driver error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (e.g. a concurrent duplicate).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referential constraint rejected the write.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// Connection, driver or decoding failure.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Conflict(_) | StoreError::Integrity(_) => ErrorKind::Conflict,
            StoreError::Storage(_) => ErrorKind::Infrastructure,
        }
    }
}

/// Error returned by every service method.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Neither the input nor the output of an audited operation named an organization.
    #[error("no organization to scope the {0} audit event to")]
    MissingAuditScope(AuditAction),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Domain(e) => e.kind(),
            ServiceError::Store(e) => e.kind(),
            ServiceError::MissingAuditScope(_) => ErrorKind::Infrastructure,
        }
    }

    /// The domain error, if this failure was a rule violation.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(e) => Some(e),
            ServiceError::Store(_) | ServiceError::MissingAuditScope(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violations_surface_as_conflicts() {
        let err = ServiceError::from(StoreError::Conflict("duplicate key".into()));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.as_domain().is_none());
    }

    #[test]
    fn domain_errors_keep_their_kind() {
        let err = ServiceError::from(DomainError::MemberNotFound);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.as_domain(), Some(&DomainError::MemberNotFound));
    }

    #[test]
    fn driver_failures_are_infrastructure() {
        assert_eq!(
            StoreError::Storage("pool timed out".into()).kind(),
            ErrorKind::Infrastructure
        );
    }
}
