use std::sync::Arc;
use std::time::Duration;

use algo_core::{FakeClock, TaskStatus, TaskStatusSnapshot};
use algo_sink::ResultSinkClient;
use algo_store::TaskStore;
use tempfile::TempDir;

use super::*;

async fn harness(worker_count: usize) -> (Arc<ProgressManager>, Arc<ProcessManager<FakeClock>>, FakeClock, TempDir) {
    let store = TaskStore::connect_in_memory().await.unwrap();
    let (progress, _writer) = ProgressManager::spawn(store);
    let clock = FakeClock::new(1_000_000);
    let result_root = tempfile::tempdir().unwrap();
    let sink = Arc::new(ResultSinkClient::new(result_root.path().join("result"), None));
    let process = ProcessManager::new(progress.clone(), sink, worker_count, clock.clone());
    (progress, process, clock, result_root)
}

async fn result_artifact(result_root: &TempDir, task_id: &str) -> serde_json::Value {
    let path = result_root.path().join("result").join(format!("{task_id}.json"));
    tokio::time::timeout(Duration::from_secs(2), async {
        while !path.exists() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("result artifact was never written");
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

async fn wait_for_terminal(progress: &ProgressManager, task_id: &str) -> TaskStatusSnapshot {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(snapshot) = progress.snapshot(task_id) {
                if snapshot.status.is_terminal() {
                    return snapshot;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("task did not reach a terminal state in time")
}

async fn wait_until_not_running(process: &ProcessManager<FakeClock>, task_id: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while process.is_running(task_id) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("task was still tracked after the timeout");
}

#[tokio::test]
async fn submit_forwards_progress_and_finish_frames() {
    let (progress, process, _clock, result_root) = harness(2).await;
    progress.register_task("t1", "SCM-WF01", "file:///x", 1_000);

    let script = concat!(
        r#"printf '{"type":"Progress","percentage":40,"message":"working"}\n'; "#,
        r#"printf '{"type":"Finished","status":"SUCCESS","message":"done","error_message":"","data":{"answer":42}}\n'"#
    );
    process.submit("t1", "SCM-WF01", "file:///x", "sh", &["-c".to_string(), script.to_string()]).await.unwrap();

    let snapshot = wait_for_terminal(&progress, "t1").await;
    assert_eq!(snapshot.status, TaskStatus::Success);
    assert_eq!(snapshot.percentage, 100);
    wait_until_not_running(&process, "t1").await;

    let artifact = result_artifact(&result_root, "t1").await;
    assert_eq!(artifact["status"], "SUCCESS");
    assert_eq!(artifact["data"]["answer"], 42);
}

#[tokio::test]
async fn crashed_child_without_a_finished_line_is_synthesized_as_failed() {
    let (progress, process, _clock, result_root) = harness(2).await;
    progress.register_task("t2", "SCM-WF01", "file:///x", 1_000);

    process.submit("t2", "SCM-WF01", "file:///x", "sh", &["-c".to_string(), "exit 7".to_string()]).await.unwrap();

    let snapshot = wait_for_terminal(&progress, "t2").await;
    assert_eq!(snapshot.status, TaskStatus::Failed);

    let artifact = result_artifact(&result_root, "t2").await;
    assert_eq!(artifact["status"], "FAILED");
}

#[tokio::test]
async fn semaphore_permit_is_released_exactly_once_so_the_next_submit_proceeds() {
    let (progress, process, _clock, _result_root) = harness(1).await;
    progress.register_task("a", "SCM-WF01", "file:///x", 1_000);
    progress.register_task("b", "SCM-WF01", "file:///x", 1_000);

    let finish = r#"printf '{"type":"Finished","status":"SUCCESS","message":"done","error_message":""}\n'"#;
    process.submit("a", "SCM-WF01", "file:///x", "sh", &["-c".to_string(), finish.to_string()]).await.unwrap();
    wait_for_terminal(&progress, "a").await;
    wait_until_not_running(&process, "a").await;

    // With worker_count=1 this would hang forever if the permit from the
    // first task were not actually returned to the semaphore.
    process.submit("b", "SCM-WF01", "file:///x", "sh", &["-c".to_string(), finish.to_string()]).await.unwrap();
    let snapshot = wait_for_terminal(&progress, "b").await;
    assert_eq!(snapshot.status, TaskStatus::Success);
}

#[tokio::test]
async fn cancel_sends_sigkill_and_the_monitor_synthesizes_a_cancelled_status() {
    let (progress, process, _clock, result_root) = harness(2).await;
    progress.register_task("t3", "SCM-WF01", "file:///x", 1_000);

    process.submit("t3", "SCM-WF01", "file:///x", "sleep", &["30".to_string()]).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(process.is_running("t3"));

    let outcome = process.cancel("t3");
    assert_eq!(outcome, CancelOutcome::Killed);

    let snapshot = wait_for_terminal(&progress, "t3").await;
    assert_eq!(snapshot.status, TaskStatus::Cancelled);
    wait_until_not_running(&process, "t3").await;

    let artifact = result_artifact(&result_root, "t3").await;
    assert_eq!(artifact["status"], "CANCELLED");
}

#[tokio::test]
async fn cancel_unknown_task_reports_not_found() {
    let (_progress, process, _clock, _result_root) = harness(1).await;
    assert_eq!(process.cancel("does-not-exist"), CancelOutcome::NotFound);
}

#[tokio::test]
async fn notify_cancel_requested_is_observed_by_the_child_over_stdin() {
    let (progress, process, _clock, _result_root) = harness(2).await;
    progress.register_task("t4", "SCM-WF01", "file:///x", 1_000);

    // Reads one line from stdin (the `ParentMessage::CancelRequested`
    // frame), strips the quotes so it can be embedded in a JSON string
    // literal, and reports it back as the finish message.
    let script = concat!(
        "read line; ",
        "clean=$(printf '%s' \"$line\" | tr -d '\"'); ",
        r#"printf '{"type":"Finished","status":"CANCELLED","message":"%s","error_message":""}\n' "$clean""#
    );
    process.submit("t4", "SCM-WF01", "file:///x", "sh", &["-c".to_string(), script.to_string()]).await.unwrap();

    // Give the child a moment to actually block on `read` before writing.
    tokio::time::sleep(Duration::from_millis(150)).await;
    process.notify_cancel_requested("t4").await;

    let snapshot = wait_for_terminal(&progress, "t4").await;
    assert!(snapshot.message.contains("CancelRequested"), "message was {:?}", snapshot.message);
}

#[tokio::test]
async fn notify_cancel_requested_on_unknown_task_is_a_silent_no_op() {
    let (_progress, process, _clock, _result_root) = harness(1).await;
    process.notify_cancel_requested("does-not-exist").await;
}

#[tokio::test]
async fn shutdown_cancels_pending_tasks_and_joins_their_monitors() {
    let (progress, process, _clock, _result_root) = harness(2).await;
    progress.register_task("t5", "SCM-WF01", "file:///x", 1_000);

    process.submit("t5", "SCM-WF01", "file:///x", "sleep", &["30".to_string()]).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    process.shutdown(true, true).await;

    assert!(!process.is_running("t5"));
    let snapshot = progress.snapshot("t5").expect("seeded");
    assert!(snapshot.status.is_terminal());
}

#[tokio::test]
async fn submit_after_shutdown_is_rejected() {
    let (progress, process, _clock, _result_root) = harness(1).await;
    process.shutdown(false, false).await;

    progress.register_task("t6", "SCM-WF01", "file:///x", 1_000);
    let result = process.submit("t6", "SCM-WF01", "file:///x", "sh", &["-c".to_string(), "exit 0".to_string()]).await;
    assert!(matches!(result, Err(ProcessError::ShuttingDown)));
}
