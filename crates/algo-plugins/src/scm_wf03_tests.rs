use super::*;
use crate::test_support::{ctx, CancellingReporter, NullReporter};

#[test]
fn registers_under_its_code() {
    let registry = Registry::new();
    register(&registry);
    let descriptor = registry.get("SCM-WF03").expect("registered");
    assert_eq!(descriptor.resource_type, ResourceType::Cpu);
}

#[test]
fn execute_reports_completion_and_returns_findings() {
    let algorithm = ScmWf03;
    let mut execution_context = ctx(&NullReporter);
    let result = algorithm.execute(&mut execution_context).expect("execute");
    assert_eq!(result["buses_checked"], 85);
    assert_eq!(result["max_sc_current_ka"], 42.5);
}

#[test]
fn execute_propagates_cancellation_from_the_reporter() {
    let algorithm = ScmWf03;
    let mut execution_context = ctx(&CancellingReporter);
    let err = algorithm.execute(&mut execution_context).unwrap_err();
    assert!(err.is_cancelled());
}
