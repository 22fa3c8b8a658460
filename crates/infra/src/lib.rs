//! Infrastructure layer: repositories, transactions, audited use cases and
//! the services built on them, plus in-memory and Postgres storage.

pub mod audited;
pub mod config;
pub mod error;
pub mod in_memory;
pub mod postgres;
pub mod repository;
pub mod services;
pub mod sweeper;
pub mod uow;
pub mod use_cases;


pub use audited::{AuditScope, AuditSubject, Audited, Recorded, UseCase};
pub use config::{ConfigError, InfraConfig};
pub use error::{ServiceError, StoreError};
pub use in_memory::InMemoryDatabase;
pub use postgres::PostgresUnitOfWork;
pub use repository::{
    AuditRepository, InvitationFilter, InvitationRepository, MembershipRepository,
    OrganizationRepository, Store, TaskRepository, UserRepository,
};
pub use services::{
    AuditService, InvitationService, MembershipService, OrganizationService, Services, TaskService,
};
pub use sweeper::{ExpirySweeper, SweeperError, SweeperHandle, SweeperStats};
pub use uow::{TransactionHandle, TransactionalWork, UnitOfWork, run_in_transaction};
