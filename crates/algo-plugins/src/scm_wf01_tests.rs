use super::*;
use crate::test_support::{ctx, CancellingReporter, NullReporter};

#[test]
fn registers_as_a_gpu_algorithm() {
    let registry = Registry::new();
    register(&registry);
    let descriptor = registry.get("SCM-WF01").expect("registered");
    assert_eq!(descriptor.resource_type, ResourceType::Gpu);
}

#[test]
fn execute_reports_completion_and_returns_findings() {
    let algorithm = ScmWf01;
    let mut execution_context = ctx(&NullReporter);
    let result = algorithm.execute(&mut execution_context).expect("execute");
    assert_eq!(result["is_safe"], true);
    assert_eq!(result["checked_buses"], 85);
}

#[test]
fn execute_propagates_cancellation_from_the_reporter() {
    let algorithm = ScmWf01;
    let mut execution_context = ctx(&CancellingReporter);
    let err = algorithm.execute(&mut execution_context).unwrap_err();
    assert!(err.is_cancelled());
}
