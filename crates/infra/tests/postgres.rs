//! Scenarios against a real Postgres. Skipped unless `DATABASE_URL` is set.

use chrono::{Duration, Utc};
use tokio::sync::OnceCell;
use uuid::Uuid;

use orgward_auth::Role;
use orgward_core::{DomainError, ErrorKind, UserId};
use orgward_audit::AuditAction;
use orgward_infra::use_cases::expiry::ExpireStaleInvitations;
use orgward_infra::use_cases::invitations::{CreateInvitation, CreateInvitationUseCase};
use orgward_infra::{
    Audited, InfraConfig, InvitationFilter, InvitationRepository, PostgresUnitOfWork, ServiceError, Services,
    StoreError, TransactionHandle, UnitOfWork, run_in_transaction,
};
use orgward_invitations::{INVITATION_TTL_DAYS, Invitation, InvitationStatus};

static SCHEMA: OnceCell<()> = OnceCell::const_new();

async fn connect() -> Option<PostgresUnitOfWork> {
    let config = match InfraConfig::from_env() {
        Ok(config) => config,
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping");
            return None;
        }
    };
    let uow = PostgresUnitOfWork::new(config.connect().await.unwrap());
    SCHEMA
        .get_or_init(|| async { uow.ensure_schema().await.unwrap() })
        .await;
    Some(uow)
}

async fn seed_user(uow: &PostgresUnitOfWork) -> UserId {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO users (id, email) VALUES ($1, $2)")
        .bind(id)
        .bind(format!("{id}@orgward.test"))
        .execute(uow.pool())
        .await
        .unwrap();
    UserId::from_uuid(id)
}

fn unique_name(prefix: &str) -> String {
    format!("{prefix} {}", Uuid::now_v7())
}

#[tokio::test]
async fn invitation_lifecycle() {
    let Some(uow) = connect().await else { return };
    let services = Services::new(uow.clone());
    let owner = seed_user(&uow).await;
    let bob = seed_user(&uow).await;

    let org = services
        .organizations
        .create_organization(owner, &unique_name("Acme"))
        .await
        .unwrap();
    let invitation = services
        .invitations
        .create_invitation(owner, org.id, bob, Some(Role::Admin))
        .await
        .unwrap();

    let err = services
        .invitations
        .create_invitation(owner, org.id, bob, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let accepted = services.invitations.accept_invitation(bob, invitation.id).await.unwrap();
    assert_eq!(accepted.member.role, Role::Admin);

    let err = services.invitations.accept_invitation(bob, invitation.id).await.unwrap_err();
    assert_eq!(err, ServiceError::Domain(DomainError::InvitationNotPending));

    let members = services.members.list_members(owner, org.id).await.unwrap();
    assert_eq!(members.len(), 2);

    let events = services.audit.list_audit_events(owner, org.id, 10).await.unwrap();
    assert_eq!(events.len(), 4);
}

#[tokio::test]
async fn partial_unique_index_rejects_second_pending() {
    let Some(uow) = connect().await else { return };
    let services = Services::new(uow.clone());
    let owner = seed_user(&uow).await;
    let bob = seed_user(&uow).await;
    let org = services
        .organizations
        .create_organization(owner, &unique_name("Initech"))
        .await
        .unwrap();

    // Bypass the use case check to hit the index directly.
    let first = Invitation::issue(org.id, bob, owner, Role::Member, Utc::now());
    let second = Invitation::issue(org.id, bob, owner, Role::Member, Utc::now());

    let mut tx = uow.begin().await.unwrap();
    tx.add_invitation(&first).await.unwrap();
    let err = tx.add_invitation(&second).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    tx.rollback().await.unwrap();
}

#[tokio::test]
async fn concurrent_invitations_to_the_same_user_leave_one_pending() {
    let Some(uow) = connect().await else { return };
    let services = Services::new(uow.clone());
    let owner = seed_user(&uow).await;
    let bob = seed_user(&uow).await;
    let org = services
        .organizations
        .create_organization(owner, &unique_name("Umbrella"))
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        services.invitations.create_invitation(owner, org.id, bob, None),
        services.invitations.create_invitation(owner, org.id, bob, None),
    );

    // Whether the loser fails the read check or the unique index, it is a conflict.
    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let err = results.into_iter().find_map(Result::err).unwrap();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let pending = services
        .invitations
        .list_organization_invitations(owner, org.id, Some(InvitationStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
}

#[tokio::test]
async fn stale_decision_does_not_overwrite_an_accepted_invitation() {
    let Some(uow) = connect().await else { return };
    let services = Services::new(uow.clone());
    let owner = seed_user(&uow).await;
    let bob = seed_user(&uow).await;
    let org = services
        .organizations
        .create_organization(owner, &unique_name("Soylent"))
        .await
        .unwrap();
    let invitation = services
        .invitations
        .create_invitation(owner, org.id, bob, None)
        .await
        .unwrap();

    // Read the invitation while it is still pending, then let the accept commit.
    let mut stale = uow.begin().await.unwrap();
    let mut snapshot = stale.find_invitation(invitation.id).await.unwrap().unwrap();
    assert_eq!(snapshot.status, InvitationStatus::Pending);

    services.invitations.accept_invitation(bob, invitation.id).await.unwrap();

    snapshot.cancel().unwrap();
    assert!(!stale.resolve_pending_invitation(&snapshot).await.unwrap());
    stale.rollback().await.unwrap();

    let mut tx = uow.begin().await.unwrap();
    let stored = tx.find_invitation(invitation.id).await.unwrap().unwrap();
    tx.commit().await.unwrap();
    assert_eq!(stored.status, InvitationStatus::Accepted);
}

#[tokio::test]
async fn concurrent_accept_and_cancel_settle_the_invitation_once() {
    let Some(uow) = connect().await else { return };
    let services = Services::new(uow.clone());
    let owner = seed_user(&uow).await;
    let bob = seed_user(&uow).await;
    let org = services
        .organizations
        .create_organization(owner, &unique_name("Cyberdyne"))
        .await
        .unwrap();
    let invitation = services
        .invitations
        .create_invitation(owner, org.id, bob, None)
        .await
        .unwrap();

    let (accepted, cancelled) = tokio::join!(
        services.invitations.accept_invitation(bob, invitation.id),
        services.invitations.cancel_invitation(owner, invitation.id),
    );

    let not_pending = ServiceError::Domain(DomainError::InvitationNotPending);
    let (expected_status, expected_members) = match (accepted, cancelled) {
        (Ok(_), Err(err)) => {
            assert_eq!(err, not_pending);
            (InvitationStatus::Accepted, 2)
        }
        (Err(err), Ok(_)) => {
            assert_eq!(err, not_pending);
            (InvitationStatus::Cancelled, 1)
        }
        other => panic!("expected exactly one decision to succeed, got {other:?}"),
    };

    let invitations = services
        .invitations
        .list_organization_invitations(owner, org.id, None)
        .await
        .unwrap();
    assert_eq!(invitations.len(), 1);
    assert_eq!(invitations[0].status, expected_status);

    let members = services.members.list_members(owner, org.id).await.unwrap();
    assert_eq!(members.len(), expected_members);

    // Created, exactly one decision, then the two listings above.
    let events = services.audit.list_audit_events(owner, org.id, 10).await.unwrap();
    let decisions = events
        .iter()
        .filter(|e| matches!(e.action, AuditAction::InvitationAccepted | AuditAction::InvitationCancelled))
        .count();
    assert_eq!(decisions, 1);
}

#[tokio::test]
async fn expiry_sweep_transitions_once() {
    let Some(uow) = connect().await else { return };
    let services = Services::new(uow.clone());
    let owner = seed_user(&uow).await;
    let org = services
        .organizations
        .create_organization(owner, &unique_name("Globex"))
        .await
        .unwrap();

    // Issued in the past so concurrent tests' fresh invitations stay pending.
    let issued_at = Utc::now() - Duration::days(INVITATION_TTL_DAYS + 1);
    let mut ids = Vec::new();
    for _ in 0..2 {
        let invitee = seed_user(&uow).await;
        let input = CreateInvitation {
            actor_id: owner,
            organization_id: org.id,
            invited_user_id: invitee,
            role: Role::Member,
            occurred_at: issued_at,
        };
        let work = Audited::new(CreateInvitationUseCase, AuditAction::InvitationCreated).call(input);
        ids.push(run_in_transaction(&uow, work).await.unwrap().output.id);
    }

    let now = Utc::now();
    let expired = run_in_transaction(&uow, ExpireStaleInvitations { now }).await.unwrap();
    assert!(expired >= 2);
    let again = run_in_transaction(&uow, ExpireStaleInvitations { now }).await.unwrap();
    assert_eq!(again, 0);

    let mut tx = uow.begin().await.unwrap();
    let listed = tx
        .list_invitations(InvitationFilter::for_organization(org.id))
        .await
        .unwrap();
    tx.commit().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|i| i.status == InvitationStatus::Expired));
    assert!(listed.iter().all(|i| ids.contains(&i.id)));
}

#[tokio::test]
async fn deleting_an_organization_cascades_but_keeps_audit() {
    let Some(uow) = connect().await else { return };
    let services = Services::new(uow.clone());
    let owner = seed_user(&uow).await;
    let org = services
        .organizations
        .create_organization(owner, &unique_name("Hooli"))
        .await
        .unwrap();
    services
        .tasks
        .create_task(owner, org.id, "Ship it", "", owner)
        .await
        .unwrap();

    services.organizations.delete_organization(owner, org.id).await.unwrap();

    let (tasks,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE organization_id = $1")
        .bind(*org.id.as_uuid())
        .fetch_one(uow.pool())
        .await
        .unwrap();
    assert_eq!(tasks, 0);

    let (events,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM audit_events WHERE organization_id = $1")
        .bind(*org.id.as_uuid())
        .fetch_one(uow.pool())
        .await
        .unwrap();
    assert_eq!(events, 3);
}
