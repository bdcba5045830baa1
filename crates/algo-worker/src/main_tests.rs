use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use algo_core::{AlgoError, AlgorithmDescriptor, ResourceType};
use algo_registry::Registry;
use serde_json::Value as Json;

use super::*;

fn args_of(flags: &[&str]) -> Vec<String> {
    flags.iter().map(|s| s.to_string()).collect()
}

#[test]
fn parse_args_from_accepts_every_flag_in_any_order() {
    let parsed = parse_args_from(
        args_of(&[
            "--data-ref",
            "file:///tmp/x",
            "--task-id",
            "t1",
            "--params",
            r#"{"n":3}"#,
            "--scheme-code",
            "SCM-WF01",
        ])
        .into_iter(),
    )
    .unwrap();

    assert_eq!(parsed.task_id, "t1");
    assert_eq!(parsed.scheme_code, "SCM-WF01");
    assert_eq!(parsed.data_ref, "file:///tmp/x");
    assert_eq!(parsed.params, serde_json::json!({"n": 3}));
}

#[test]
fn parse_args_from_falls_back_to_empty_params_on_malformed_json() {
    let parsed = parse_args_from(
        args_of(&["--task-id", "t1", "--scheme-code", "SCM-WF01", "--data-ref", "file:///x", "--params", "{not json"])
            .into_iter(),
    )
    .unwrap();

    assert_eq!(parsed.params, serde_json::json!({}));
}

#[test]
fn parse_args_from_defaults_params_to_empty_object_when_omitted() {
    let parsed =
        parse_args_from(args_of(&["--task-id", "t1", "--scheme-code", "SCM-WF01", "--data-ref", "file:///x"]).into_iter())
            .unwrap();

    assert_eq!(parsed.params, serde_json::json!({}));
}

#[test]
fn parse_args_from_rejects_a_missing_required_flag() {
    let err = parse_args_from(args_of(&["--scheme-code", "SCM-WF01", "--data-ref", "file:///x"]).into_iter())
        .unwrap_err();
    assert!(err.to_string().contains("--task-id"));
}

#[test]
fn parse_args_from_rejects_an_unrecognized_flag() {
    let err = parse_args_from(args_of(&["--bogus", "1"]).into_iter()).unwrap_err();
    assert!(err.to_string().contains("--bogus"));
}

#[test]
fn parse_args_from_rejects_a_flag_with_no_trailing_value() {
    let err = parse_args_from(args_of(&["--task-id"]).into_iter()).unwrap_err();
    assert!(err.to_string().contains("--task-id"));
}

struct EchoAlgorithm;
impl algo_core::Algorithm for EchoAlgorithm {
    fn execute(&self, ctx: &mut algo_core::ExecutionContext<'_>) -> Result<Json, AlgoError> {
        ctx.reporter.update(50, "halfway")?;
        Ok(serde_json::json!({ "echo": ctx.params.clone() }))
    }
}

struct FailingAlgorithm;
impl algo_core::Algorithm for FailingAlgorithm {
    fn execute(&self, _ctx: &mut algo_core::ExecutionContext<'_>) -> Result<Json, AlgoError> {
        Err(AlgoError::Failed("boom".to_string()))
    }
}

struct CancellingAlgorithm;
impl algo_core::Algorithm for CancellingAlgorithm {
    fn execute(&self, ctx: &mut algo_core::ExecutionContext<'_>) -> Result<Json, AlgoError> {
        ctx.reporter.update(10, "starting")?;
        Err(AlgoError::Cancelled)
    }
}

fn registry_with(code: &str, factory: algo_core::AlgorithmFactory) -> Registry {
    let registry = Registry::new();
    registry.register(AlgorithmDescriptor::new(code, code, ResourceType::Cpu, "algo-worker-test"), factory);
    registry
}

fn reporter(cancelled: bool) -> StdoutReporter {
    StdoutReporter { cancelled: Arc::new(AtomicBool::new(cancelled)) }
}

fn data_file(contents: &str) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn run_reports_success_and_carries_the_algorithm_result() {
    let registry = registry_with("ECHO", || Box::new(EchoAlgorithm));
    let data = data_file("input");
    let args = Args {
        task_id: "t1".to_string(),
        scheme_code: "ECHO".to_string(),
        data_ref: format!("file://{}", data.path().display()),
        params: serde_json::json!({"n": 1}),
    };

    let (status, _message, error_message, result) = run(&registry, &args, &reporter(false));

    assert_eq!(status, TaskStatus::Success);
    assert!(error_message.is_empty());
    assert_eq!(result, serde_json::json!({ "echo": {"n": 1} }));
}

#[test]
fn run_reports_failed_with_the_algorithms_error_message() {
    let registry = registry_with("FAIL", || Box::new(FailingAlgorithm));
    let data = data_file("input");
    let args = Args {
        task_id: "t2".to_string(),
        scheme_code: "FAIL".to_string(),
        data_ref: format!("file://{}", data.path().display()),
        params: serde_json::json!({}),
    };

    let (status, _message, error_message, result) = run(&registry, &args, &reporter(false));

    assert_eq!(status, TaskStatus::Failed);
    assert_eq!(error_message, "boom");
    assert_eq!(result, serde_json::Value::Null);
}

#[test]
fn run_reports_cancelled_when_the_algorithm_raises_it() {
    let registry = registry_with("CANCEL", || Box::new(CancellingAlgorithm));
    let data = data_file("input");
    let args = Args {
        task_id: "t3".to_string(),
        scheme_code: "CANCEL".to_string(),
        data_ref: format!("file://{}", data.path().display()),
        params: serde_json::json!({}),
    };

    let (status, _message, error_message, result) = run(&registry, &args, &reporter(false));

    assert_eq!(status, TaskStatus::Cancelled);
    assert!(error_message.is_empty());
    assert_eq!(result, serde_json::Value::Null);
}

#[test]
fn run_reports_cancelled_when_the_reporter_observes_a_cancel_before_completion() {
    let registry = registry_with("ECHO2", || Box::new(EchoAlgorithm));
    let data = data_file("input");
    let args = Args {
        task_id: "t4".to_string(),
        scheme_code: "ECHO2".to_string(),
        data_ref: format!("file://{}", data.path().display()),
        params: serde_json::json!({}),
    };

    let (status, _message, error_message, result) = run(&registry, &args, &reporter(true));

    assert_eq!(status, TaskStatus::Cancelled);
    assert!(error_message.is_empty());
    assert_eq!(result, serde_json::Value::Null);
}

#[test]
fn run_reports_failed_for_an_unregistered_scheme_code() {
    let registry = Registry::new();
    let data = data_file("input");
    let args = Args {
        task_id: "t5".to_string(),
        scheme_code: "MISSING".to_string(),
        data_ref: format!("file://{}", data.path().display()),
        params: serde_json::json!({}),
    };

    let (status, _message, error_message, _result) = run(&registry, &args, &reporter(false));

    assert_eq!(status, TaskStatus::Failed);
    assert!(error_message.contains("MISSING"));
}

#[test]
fn run_reports_failed_when_the_data_ref_cannot_be_loaded() {
    let registry = registry_with("ECHO3", || Box::new(EchoAlgorithm));
    let args = Args {
        task_id: "t6".to_string(),
        scheme_code: "ECHO3".to_string(),
        data_ref: "file:///does/not/exist".to_string(),
        params: serde_json::json!({}),
    };

    let (status, _message, error_message, _result) = run(&registry, &args, &reporter(false));

    assert_eq!(status, TaskStatus::Failed);
    assert!(!error_message.is_empty());
}
