//! Repository tests against a real PostgreSQL.
//!
//! Each test connects to `DATABASE_URL`, runs the migrations, and works
//! on rows it created itself, so tests may share one database and run in
//! parallel. Without `DATABASE_URL` the tests return early.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use warden_core::ErrorKind;
use warden_core::config::DatabaseConfig;
use warden_database::DatabasePool;
use warden_database::migration::run_migrations;
use warden_database::repositories::{
    AuditRepository, InvitationRepository, PgAuditRepository, PgInvitationRepository,
    PgSessionRepository, PgUserRepository, SessionRepository, UserRepository,
};
use warden_entity::audit::{CreateSecurityAuditRecord, SecurityEvent};
use warden_entity::invitation::{CreateInvitation, InvitationStatus};
use warden_entity::session::{ClientTag, CreateSession};
use warden_entity::user::{CreateUser, User};

async fn test_pool() -> Option<sqlx::PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set; skipping PostgreSQL repository test");
        return None;
    };

    let config = DatabaseConfig {
        url,
        max_connections: 5,
        min_connections: 1,
        connect_timeout_seconds: 10,
        idle_timeout_seconds: 60,
    };
    let db_pool = DatabasePool::connect(&config)
        .await
        .expect("Failed to connect to test database");
    run_migrations(db_pool.pool())
        .await
        .expect("Failed to run migrations");

    Some(db_pool.pool().clone())
}

/// Current time at whole seconds, so values survive a TIMESTAMPTZ round trip.
fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(Utc::now().timestamp(), 0).expect("valid timestamp")
}

fn token_hash() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4().simple())
}

async fn create_user(users: &PgUserRepository) -> User {
    let suffix = Uuid::new_v4().simple().to_string();
    users
        .create(
            &CreateUser {
                username: format!("user-{suffix}"),
                email: format!("user-{suffix}@example.com"),
                password_hash: "$argon2id$test".to_string(),
            },
            now(),
        )
        .await
        .expect("Failed to create user")
}

fn new_session(user_id: Uuid, expires_at: DateTime<Utc>) -> CreateSession {
    CreateSession {
        user_id,
        token_hash: token_hash(),
        client: ClientTag::new(Some("test-agent".to_string()), Some("127.0.0.1".to_string())),
        expires_at,
    }
}

fn new_invitation(inviter_id: Uuid, email: &str, expires_at: DateTime<Utc>) -> CreateInvitation {
    CreateInvitation {
        inviter_id,
        email: email.to_string(),
        token: token_hash(),
        expires_at,
    }
}

#[tokio::test]
async fn rotate_succeeds_once_per_hash() {
    let Some(pool) = test_pool().await else { return };
    let users = PgUserRepository::new(pool.clone());
    let sessions = PgSessionRepository::new(pool);
    let user = create_user(&users).await;
    let t0 = now();
    let expires = t0 + Duration::days(7);

    let original = sessions.create(&new_session(user.id, expires), t0).await.unwrap();
    let first = new_session(user.id, expires);
    let second = new_session(user.id, expires);

    let rotated = sessions
        .rotate(&original.token_hash, &first, t0)
        .await
        .unwrap()
        .expect("first rotation wins");
    assert_eq!(rotated.token_hash, first.token_hash);
    assert!(rotated.revoked_at.is_none());

    let later = t0 + Duration::seconds(5);
    assert!(
        sessions
            .rotate(&original.token_hash, &second, later)
            .await
            .unwrap()
            .is_none()
    );

    // The losing replacement was rolled back with the failed revoke.
    assert!(sessions.find_by_hash(&second.token_hash).await.unwrap().is_none());

    let old = sessions
        .find_by_hash(&original.token_hash)
        .await
        .unwrap()
        .expect("revoked rows stay visible");
    assert_eq!(old.revoked_at, Some(t0));
}

#[tokio::test]
async fn concurrent_rotations_have_one_winner() {
    let Some(pool) = test_pool().await else { return };
    let users = PgUserRepository::new(pool.clone());
    let sessions = PgSessionRepository::new(pool);
    let user = create_user(&users).await;
    let t0 = now();
    let expires = t0 + Duration::days(7);

    let original = sessions.create(&new_session(user.id, expires), t0).await.unwrap();
    let a = new_session(user.id, expires);
    let b = new_session(user.id, expires);

    let (ra, rb) = tokio::join!(
        sessions.rotate(&original.token_hash, &a, t0),
        sessions.rotate(&original.token_hash, &b, t0),
    );
    let winners = [ra.unwrap(), rb.unwrap()]
        .into_iter()
        .filter(Option::is_some)
        .count();
    assert_eq!(winners, 1);

    let active = sessions.find_active_by_user(user.id, t0).await.unwrap();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn revoke_reports_only_the_first_transition() {
    let Some(pool) = test_pool().await else { return };
    let users = PgUserRepository::new(pool.clone());
    let sessions = PgSessionRepository::new(pool);
    let user = create_user(&users).await;
    let t0 = now();

    let session = sessions
        .create(&new_session(user.id, t0 + Duration::days(7)), t0)
        .await
        .unwrap();

    assert!(sessions.revoke(&session.token_hash, t0).await.unwrap());
    assert!(
        !sessions
            .revoke(&session.token_hash, t0 + Duration::minutes(1))
            .await
            .unwrap()
    );
    assert!(!sessions.revoke(&token_hash(), t0).await.unwrap());

    let stored = sessions.find_by_hash(&session.token_hash).await.unwrap().unwrap();
    assert_eq!(stored.revoked_at, Some(t0));
}

#[tokio::test]
async fn revoke_all_touches_only_active_sessions() {
    let Some(pool) = test_pool().await else { return };
    let users = PgUserRepository::new(pool.clone());
    let sessions = PgSessionRepository::new(pool);
    let user = create_user(&users).await;
    let bystander = create_user(&users).await;
    let t0 = now() - Duration::hours(2);
    let t1 = now();

    let earlier = sessions
        .create(&new_session(user.id, t1 + Duration::days(7)), t0)
        .await
        .unwrap();
    sessions.revoke(&earlier.token_hash, t0).await.unwrap();

    let active_a = sessions
        .create(&new_session(user.id, t1 + Duration::days(7)), t0)
        .await
        .unwrap();
    let active_b = sessions
        .create(&new_session(user.id, t1 + Duration::days(1)), t0)
        .await
        .unwrap();
    let lapsed = sessions
        .create(&new_session(user.id, t1 - Duration::hours(1)), t0)
        .await
        .unwrap();
    let other = sessions
        .create(&new_session(bystander.id, t1 + Duration::days(7)), t0)
        .await
        .unwrap();

    assert_eq!(sessions.revoke_all_for_user(user.id, t1).await.unwrap(), 2);

    let find = |hash: String| {
        let sessions = &sessions;
        async move { sessions.find_by_hash(&hash).await.unwrap().unwrap() }
    };
    assert_eq!(find(earlier.token_hash).await.revoked_at, Some(t0));
    assert_eq!(find(active_a.token_hash).await.revoked_at, Some(t1));
    assert_eq!(find(active_b.token_hash).await.revoked_at, Some(t1));
    assert!(find(lapsed.token_hash).await.revoked_at.is_none());
    assert!(find(other.token_hash).await.revoked_at.is_none());
}

#[tokio::test]
async fn purge_deletes_strictly_expired_sessions() {
    let Some(pool) = test_pool().await else { return };
    let users = PgUserRepository::new(pool.clone());
    let sessions = PgSessionRepository::new(pool);
    let user = create_user(&users).await;
    // Far enough in the past that no other test's rows are affected.
    let cutoff = now() - Duration::days(30);

    let before = sessions
        .create(&new_session(user.id, cutoff - Duration::seconds(1)), cutoff)
        .await
        .unwrap();
    let revoked_before = sessions
        .create(&new_session(user.id, cutoff - Duration::seconds(1)), cutoff)
        .await
        .unwrap();
    sessions.revoke(&revoked_before.token_hash, cutoff).await.unwrap();
    let at = sessions
        .create(&new_session(user.id, cutoff), cutoff)
        .await
        .unwrap();
    let after = sessions
        .create(&new_session(user.id, cutoff + Duration::seconds(1)), cutoff)
        .await
        .unwrap();

    assert!(sessions.purge_expired(cutoff).await.unwrap() >= 2);

    assert!(sessions.find_by_hash(&before.token_hash).await.unwrap().is_none());
    assert!(
        sessions
            .find_by_hash(&revoked_before.token_hash)
            .await
            .unwrap()
            .is_none()
    );
    assert!(sessions.find_by_hash(&at.token_hash).await.unwrap().is_some());
    assert!(sessions.find_by_hash(&after.token_hash).await.unwrap().is_some());
}

#[tokio::test]
async fn invitation_insert_is_refused_once_email_is_taken() {
    let Some(pool) = test_pool().await else { return };
    let users = PgUserRepository::new(pool.clone());
    let invitations = PgInvitationRepository::new(pool);
    let inviter = create_user(&users).await;
    let t0 = now();
    let email = unique_email("taken");

    let created = invitations
        .create_if_vacant(&new_invitation(inviter.id, &email, t0 + Duration::hours(48)), t0)
        .await
        .unwrap()
        .expect("first insert succeeds");
    assert_eq!(created.status, InvitationStatus::Pending);
    assert!(created.email_sent_at.is_none());

    assert!(
        invitations
            .create_if_vacant(&new_invitation(inviter.id, &email, t0 + Duration::hours(48)), t0)
            .await
            .unwrap()
            .is_none()
    );

    let latest = invitations.find_latest_by_email(&email).await.unwrap().unwrap();
    assert_eq!(latest.id, created.id);
}

#[tokio::test]
async fn concurrent_invitation_inserts_have_one_winner() {
    let Some(pool) = test_pool().await else { return };
    let users = PgUserRepository::new(pool.clone());
    let invitations = PgInvitationRepository::new(pool);
    let inviter = create_user(&users).await;
    let t0 = now();
    let email = unique_email("race");

    let a = new_invitation(inviter.id, &email, t0 + Duration::hours(48));
    let b = new_invitation(inviter.id, &email, t0 + Duration::hours(48));
    let (ra, rb) = tokio::join!(
        invitations.create_if_vacant(&a, t0),
        invitations.create_if_vacant(&b, t0),
    );

    let winners = [ra.unwrap(), rb.unwrap()]
        .into_iter()
        .filter(Option::is_some)
        .count();
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn accept_moves_pending_to_accepted_once() {
    let Some(pool) = test_pool().await else { return };
    let users = PgUserRepository::new(pool.clone());
    let invitations = PgInvitationRepository::new(pool);
    let inviter = create_user(&users).await;
    let t0 = now();
    let input = new_invitation(inviter.id, &unique_email("accept"), t0 + Duration::hours(48));
    invitations.create_if_vacant(&input, t0).await.unwrap().unwrap();

    let accepted = invitations
        .accept(&input.token, t0 + Duration::hours(1))
        .await
        .unwrap()
        .expect("pending invitation is accepted");
    assert_eq!(accepted.status, InvitationStatus::Accepted);

    assert!(
        invitations
            .accept(&input.token, t0 + Duration::hours(2))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn accept_refuses_expired_invitation() {
    let Some(pool) = test_pool().await else { return };
    let users = PgUserRepository::new(pool.clone());
    let invitations = PgInvitationRepository::new(pool);
    let inviter = create_user(&users).await;
    let t0 = now();
    let expires = t0 + Duration::hours(48);
    let input = new_invitation(inviter.id, &unique_email("expired"), expires);
    invitations.create_if_vacant(&input, t0).await.unwrap().unwrap();

    assert!(invitations.accept(&input.token, expires).await.unwrap().is_none());

    let stored = invitations.find_by_token(&input.token).await.unwrap().unwrap();
    assert_eq!(stored.status, InvitationStatus::Pending);
}

#[tokio::test]
async fn refresh_replaces_token_only_after_expiry() {
    let Some(pool) = test_pool().await else { return };
    let users = PgUserRepository::new(pool.clone());
    let invitations = PgInvitationRepository::new(pool);
    let inviter = create_user(&users).await;
    let t0 = now();
    let expires = t0 + Duration::hours(48);
    let input = new_invitation(inviter.id, &unique_email("refresh"), expires);
    let created = invitations.create_if_vacant(&input, t0).await.unwrap().unwrap();
    invitations.mark_email_sent(created.id, t0).await.unwrap();

    let fresh = token_hash();
    let new_expiry = expires + Duration::hours(48);
    assert!(
        invitations
            .refresh_expired(created.id, &fresh, new_expiry, t0 + Duration::hours(1))
            .await
            .unwrap()
            .is_none()
    );

    let refreshed = invitations
        .refresh_expired(created.id, &fresh, new_expiry, expires)
        .await
        .unwrap()
        .expect("expired pending invitation is refreshed");
    assert_eq!(refreshed.token, fresh);
    assert_eq!(refreshed.expires_at, new_expiry);
    assert!(refreshed.email_sent_at.is_none());
    assert!(invitations.find_by_token(&input.token).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_user_is_a_validation_error() {
    let Some(pool) = test_pool().await else { return };
    let users = PgUserRepository::new(pool);
    let user = create_user(&users).await;

    let found = users.find_by_email(&user.email).await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(
        users.find_by_username(&user.username).await.unwrap().unwrap().id,
        user.id
    );

    let err = users
        .create(
            &CreateUser {
                username: format!("other-{}", Uuid::new_v4().simple()),
                email: user.email.clone(),
                password_hash: "$argon2id$test".to_string(),
            },
            now(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn audit_records_are_listed_per_user() {
    let Some(pool) = test_pool().await else { return };
    let audit = PgAuditRepository::new(pool);
    let user_id = Uuid::new_v4();
    let t0 = now();

    audit
        .record(
            &CreateSecurityAuditRecord {
                user_id,
                event: SecurityEvent::RefreshTokenReuse,
                user_agent: Some("original-agent".to_string()),
                ip_address: Some("10.0.0.1".to_string()),
                presented_user_agent: Some("replay-agent".to_string()),
                presented_ip_address: Some("10.0.0.2".to_string()),
                original_revoked_at: Some(t0),
                sessions_revoked: 3,
            },
            t0,
        )
        .await
        .unwrap();

    let records = audit.find_by_user(user_id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].event, "refresh_token_reuse");
    assert_eq!(records[0].sessions_revoked, 3);
    assert_eq!(records[0].original_revoked_at, Some(t0));
}
