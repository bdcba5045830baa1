use super::*;
use std::sync::atomic::{AtomicU32, Ordering};

#[tokio::test]
async fn non_locked_errors_do_not_retry() {
    let attempts = AtomicU32::new(0);
    let result: Result<(), sqlx::Error> = with_retry(|| {
        attempts.fetch_add(1, Ordering::SeqCst);
        async { Err(sqlx::Error::Io(std::io::Error::other("disk gone"))) }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn success_short_circuits_without_retry() {
    let attempts = AtomicU32::new(0);
    let result = with_retry(|| {
        attempts.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, sqlx::Error>(42) }
    })
    .await
    .unwrap();

    assert_eq!(result, 42);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}
