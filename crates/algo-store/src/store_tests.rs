use super::*;
use algo_core::TaskStatus;

async fn store() -> TaskStore {
    TaskStore::connect_in_memory().await.expect("in-memory store")
}

#[tokio::test]
async fn upsert_start_then_get_round_trips() {
    let store = store().await;
    store.upsert_start("t1", "SCM-WF02", "file:///tmp/x", 1_000).await.unwrap();

    let record = store.get("t1").await.unwrap().expect("row exists");
    assert_eq!(record.status, TaskStatus::Running);
    assert_eq!(record.percentage, 0);
    assert_eq!(record.message, "Initializing");
    assert_eq!(record.scheme_code, "SCM-WF02");
}

#[tokio::test]
async fn get_on_missing_task_is_none() {
    let store = store().await;
    assert!(store.get("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn update_progress_creates_row_when_missing() {
    let store = store().await;
    store.update_progress("t2", "SCM-WF02", "file:///tmp/x", 40, "halfway", 2_000).await.unwrap();

    let record = store.get("t2").await.unwrap().expect("row created");
    assert_eq!(record.percentage, 40);
    assert_eq!(record.message, "halfway");
    assert_eq!(record.status, TaskStatus::Running);
}

#[tokio::test]
async fn percentage_never_decreases() {
    let store = store().await;
    store.update_progress("t3", "SCM-WF02", "file:///tmp/x", 60, "later", 1_000).await.unwrap();
    store.update_progress("t3", "SCM-WF02", "file:///tmp/x", 10, "earlier-looking", 2_000).await.unwrap();

    let record = store.get("t3").await.unwrap().unwrap();
    assert_eq!(record.percentage, 60, "a lower percentage must not regress the stored value");
}

#[tokio::test]
async fn finish_sets_terminal_state_and_percentage_100() {
    let store = store().await;
    store.upsert_start("t4", "SCM-WF02", "file:///tmp/x", 1_000).await.unwrap();
    store.finish("t4", "SCM-WF02", "file:///tmp/x", TaskStatus::Success, "Completed", "", 2_000).await.unwrap();

    let record = store.get("t4").await.unwrap().unwrap();
    assert_eq!(record.status, TaskStatus::Success);
    assert_eq!(record.percentage, 100);
    assert_eq!(record.message, "Completed");
}

#[tokio::test]
async fn finish_on_missing_task_creates_then_finishes() {
    let store = store().await;
    store.finish("t5", "SCM-WF02", "file:///tmp/x", TaskStatus::Failed, "oops", "boom", 1_000).await.unwrap();

    let record = store.get("t5").await.unwrap().unwrap();
    assert_eq!(record.status, TaskStatus::Failed);
    assert_eq!(record.error_message, "boom");
}

#[tokio::test]
async fn finish_is_idempotent() {
    let store = store().await;
    store.upsert_start("t6", "SCM-WF02", "file:///tmp/x", 1_000).await.unwrap();
    store.finish("t6", "SCM-WF02", "file:///tmp/x", TaskStatus::Success, "Completed", "", 2_000).await.unwrap();
    // A second finish (even with a different terminal status) must not
    // change anything: once terminal, writes are no-ops.
    store.finish("t6", "SCM-WF02", "file:///tmp/x", TaskStatus::Failed, "late failure", "late", 3_000).await.unwrap();

    let record = store.get("t6").await.unwrap().unwrap();
    assert_eq!(record.status, TaskStatus::Success);
    assert_eq!(record.error_message, "");
    assert_eq!(record.updated_at_ms, 2_000);
}

#[tokio::test]
async fn update_progress_after_terminal_is_ignored() {
    let store = store().await;
    store.upsert_start("t7", "SCM-WF02", "file:///tmp/x", 1_000).await.unwrap();
    store.finish("t7", "SCM-WF02", "file:///tmp/x", TaskStatus::Cancelled, "Cancelled", "", 2_000).await.unwrap();
    store.update_progress("t7", "SCM-WF02", "file:///tmp/x", 50, "ghost update", 3_000).await.unwrap();

    let record = store.get("t7").await.unwrap().unwrap();
    assert_eq!(record.status, TaskStatus::Cancelled);
    assert_eq!(record.percentage, 100);
}

#[tokio::test]
async fn mark_cancel_requested_sets_status_without_touching_percentage() {
    let store = store().await;
    store.update_progress("t9", "SCM-WF02", "file:///tmp/x", 30, "working", 1_000).await.unwrap();
    store.mark_cancel_requested("t9", 2_000).await.unwrap();

    let record = store.get("t9").await.unwrap().unwrap();
    assert_eq!(record.status, TaskStatus::CancelRequested);
    assert_eq!(record.percentage, 30);
}

#[tokio::test]
async fn mark_cancel_requested_on_terminal_task_is_noop() {
    let store = store().await;
    store.finish("t10", "SCM-WF02", "file:///tmp/x", TaskStatus::Success, "done", "", 1_000).await.unwrap();
    store.mark_cancel_requested("t10", 2_000).await.unwrap();

    let record = store.get("t10").await.unwrap().unwrap();
    assert_eq!(record.status, TaskStatus::Success);
}

#[tokio::test]
async fn list_orders_by_updated_at_descending() {
    let store = store().await;
    store.upsert_start("older", "SCM-WF02", "file:///tmp/x", 1_000).await.unwrap();
    store.upsert_start("newer", "SCM-WF02", "file:///tmp/x", 5_000).await.unwrap();

    let records = store.list().await.unwrap();
    let ids: Vec<_> = records.iter().map(|r| r.task_id.as_str().to_string()).collect();
    assert_eq!(ids, vec!["newer".to_string(), "older".to_string()]);
}

#[tokio::test]
async fn counts_tally_by_status() {
    let store = store().await;
    store.upsert_start("running-1", "SCM-WF02", "file:///tmp/x", 1_000).await.unwrap();
    store.finish("success-1", "SCM-WF02", "file:///tmp/x", TaskStatus::Success, "done", "", 1_000).await.unwrap();
    store.finish("failed-1", "SCM-WF02", "file:///tmp/x", TaskStatus::Failed, "err", "boom", 1_000).await.unwrap();

    let counts = store.counts().await.unwrap();
    assert_eq!(counts.running, 1);
    assert_eq!(counts.success, 1);
    assert_eq!(counts.failed, 1);
}

#[tokio::test]
async fn migrate_is_idempotent_across_reopen() {
    // Exercises the "create table if missing, add column if absent"
    // migration path by reconnecting (simulating daemon restart) against
    // the same in-memory shared-cache database would require a shared
    // filename; here we simply assert a second `connect_in_memory` on a
    // fresh pool doesn't fail, which is the steady-state migration path.
    let store = TaskStore::connect_in_memory().await.unwrap();
    store.upsert_start("t8", "SCM-WF02", "file:///tmp/x", 1_000).await.unwrap();
    assert!(store.get("t8").await.unwrap().is_some());
}
