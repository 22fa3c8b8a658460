//! Unit of work: one connection, one transaction, all-or-nothing.
//!
//! ```text
//! begin ──> work.run(&mut tx) ──Ok──> commit ──> Ok(output)
//!                │
//!               Err──> rollback ──> Err(original error)
//! ```
//!
//! The connection is owned by the transaction handle and returned to the pool
//! when the handle is dropped, which happens on every exit path (commit,
//! rollback, a failed rollback, or an early `?`). Units of work do not nest.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{ServiceError, StoreError};
use crate::repository::Store;

/// An open transaction. Consuming `commit`/`rollback` ends it.
#[async_trait]
pub trait TransactionHandle: Send {
    async fn commit(self) -> Result<(), StoreError>;
    async fn rollback(self) -> Result<(), StoreError>;
}

/// Source of transactions (a connection pool).
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    type Tx: Store + TransactionHandle;

    /// Check out one connection and open a transaction on it.
    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// A sequence of repository calls executed inside one transaction.
#[async_trait]
pub trait TransactionalWork<S: Send>: Send {
    type Output: Send;

    async fn run(self, store: &mut S) -> Result<Self::Output, ServiceError>;
}

/// Run `work` in a fresh transaction.
///
/// Commits on success. On failure rolls back and returns the error produced by
/// `work`; a rollback failure is logged and never replaces it.
pub async fn run_in_transaction<U, W>(uow: &U, work: W) -> Result<W::Output, ServiceError>
where
    U: UnitOfWork,
    W: TransactionalWork<U::Tx>,
{
    let mut tx = uow.begin().await?;

    match work.run(&mut tx).await {
        Ok(output) => {
            tx.commit().await?;
            Ok(output)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, original = %err, "rollback failed");
            }
            debug!(error = %err, kind = %err.kind(), "transaction rolled back");
            Err(err)
        }
    }
}
