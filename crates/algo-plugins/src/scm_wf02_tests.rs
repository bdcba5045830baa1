use super::*;
use crate::test_support::{ctx, CancellingReporter, NullReporter};

#[test]
fn registers_under_its_code() {
    let registry = Registry::new();
    register(&registry);
    let descriptor = registry.get("SCM-WF02").expect("registered");
    assert_eq!(descriptor.resource_type, ResourceType::Cpu);
    assert_eq!(descriptor.name, "Safety Check - N-1 Contingency Analysis");
}

#[test]
fn execute_reports_completion_and_returns_findings() {
    let algorithm = ScmWf02;
    let mut execution_context = ctx(&NullReporter);
    let result = algorithm.execute(&mut execution_context).expect("execute");
    assert_eq!(result["contingencies_checked"], 150);
    assert_eq!(result["violations_found"], 2);
}

#[test]
fn execute_propagates_cancellation_from_the_reporter() {
    let algorithm = ScmWf02;
    let mut execution_context = ctx(&CancellingReporter);
    let err = algorithm.execute(&mut execution_context).unwrap_err();
    assert!(err.is_cancelled());
}
