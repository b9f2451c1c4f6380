//! Login accounts and server-side sessions

mod common;

use common::{print_test_header, MemoryStore};
use ifrs17_reporting::contract::ReportingError;
use ifrs17_reporting::domain::Authenticator;
use std::time::Duration;

fn authenticator(ttl: Duration) -> Authenticator {
    Authenticator::new(MemoryStore::new(), ttl).with_hash_cost(4)
}

#[tokio::test]
async fn test_login_checks_bcrypt_hash() {
    print_test_header(
        "test_login_checks_bcrypt_hash",
        &["Only the stored password opens a session"],
    );
    let auth = authenticator(Duration::from_secs(60));
    auth.ensure_user("admin", "s3cret").await.unwrap();

    let session = auth.login("admin", "s3cret").await.unwrap();
    assert_eq!(session.username, "admin");
    assert_eq!(auth.session(&session.id), Some(session.clone()));

    for (user, password) in [("admin", "wrong"), ("nobody", "s3cret"), ("", "s3cret"), ("admin", "")] {
        assert_eq!(
            auth.login(user, password).await.unwrap_err(),
            ReportingError::InvalidCredentials,
            "{}:{}",
            user,
            password
        );
    }
}

#[tokio::test]
async fn test_ensure_user_resets_password() {
    let auth = authenticator(Duration::from_secs(60));
    auth.ensure_user("admin", "first").await.unwrap();
    auth.ensure_user("admin", "second").await.unwrap();

    assert!(auth.login("admin", "first").await.is_err());
    assert!(auth.login("admin", "second").await.is_ok());

    assert!(matches!(
        auth.ensure_user(" ", "pw").await,
        Err(ReportingError::Validation(ref e)) if e.contains("username")
    ));
}

#[tokio::test]
async fn test_sessions_are_independent_and_expire() {
    print_test_header(
        "test_sessions_are_independent_and_expire",
        &["Logout ends one session; sessions lapse after their TTL"],
    );
    let auth = authenticator(Duration::from_millis(200));
    auth.ensure_user("admin", "s3cret").await.unwrap();

    let a = auth.login("admin", "s3cret").await.unwrap();
    let b = auth.login("admin", "s3cret").await.unwrap();
    assert_ne!(a.id, b.id);

    auth.logout(&a.id);
    assert!(auth.session(&a.id).is_none());
    assert!(auth.session(&b.id).is_some());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(auth.session(&b.id).is_none());
}
