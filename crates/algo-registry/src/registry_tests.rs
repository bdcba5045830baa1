use super::*;
use algo_core::{AlgoError, ExecutionContext, ResourceType};

struct NoOp;
impl Algorithm for NoOp {
    fn execute(&self, _ctx: &mut ExecutionContext<'_>) -> Result<serde_json::Value, AlgoError> {
        Ok(serde_json::Value::Null)
    }
}

fn noop_factory() -> Box<dyn Algorithm> {
    Box::new(NoOp)
}

#[test]
fn get_returns_none_for_unknown_code() {
    let registry = Registry::new();
    assert!(registry.get("NOPE").is_none());
}

#[test]
fn register_then_get_round_trips() {
    let registry = Registry::new();
    let descriptor = AlgorithmDescriptor::new("SCM-WF02", "Workflow Two", ResourceType::Cpu, "algo_plugins::wf02");
    registry.register(descriptor.clone(), noop_factory);

    let found = registry.get("SCM-WF02").expect("registered");
    assert_eq!(found.name, "Workflow Two");
    assert_eq!(found.resource_type, ResourceType::Cpu);
}

#[test]
fn duplicate_registration_is_last_write_wins() {
    let registry = Registry::new();
    let first = AlgorithmDescriptor::new("DUP", "First", ResourceType::Cpu, "algo_plugins::first");
    let second = AlgorithmDescriptor::new("DUP", "Second", ResourceType::Gpu, "algo_plugins::second");
    registry.register(first, noop_factory);
    registry.register(second, noop_factory);

    let found = registry.get("DUP").expect("registered");
    assert_eq!(found.name, "Second");
    assert_eq!(found.resource_type, ResourceType::Gpu);
    assert_eq!(registry.len(), 1);
}

#[test]
fn build_constructs_a_fresh_instance() {
    let registry = Registry::new();
    let descriptor = AlgorithmDescriptor::new("SCM-WF02", "Workflow Two", ResourceType::Cpu, "algo_plugins::wf02");
    registry.register(descriptor, noop_factory);

    let algo = registry.build("SCM-WF02").expect("built");
    let mut ctx = ExecutionContext::new(
        algo_core::TaskId::new("t1"),
        serde_json::json!({}),
        algo_core::DataValue::Text(String::new()),
        &NullReporter,
    );
    assert!(algo.execute(&mut ctx).is_ok());
}

#[test]
fn build_unknown_scheme_errors() {
    let registry = Registry::new();
    let err = registry.build("NOPE").unwrap_err();
    assert!(matches!(err, RegistryError::UnknownScheme(code) if code == "NOPE"));
}

#[test]
fn list_reflects_all_registered_codes() {
    let registry = Registry::new();
    registry.register(
        AlgorithmDescriptor::new("A", "A", ResourceType::Cpu, "algo_plugins::a"),
        noop_factory,
    );
    registry.register(
        AlgorithmDescriptor::new("B", "B", ResourceType::Gpu, "algo_plugins::b"),
        noop_factory,
    );
    let mut codes: Vec<_> = registry.list().iter().map(|d| d.code.clone()).collect();
    codes.sort();
    assert_eq!(codes, vec!["A".to_string(), "B".to_string()]);
}

struct NullReporter;
impl algo_core::Reporter for NullReporter {
    fn update(&self, _percentage: u8, _message: &str) -> Result<(), AlgoError> {
        Ok(())
    }
}
