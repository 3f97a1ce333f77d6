use std::sync::Arc;
use std::time::Duration;
use typesynth::engines::evaluation::{Evaluator, ExecLimits};
use typesynth::functions::ModuleRegistry;
use typesynth::types::{ProgramNode, TestCase, Value};

fn evaluator() -> Evaluator {
    let catalog = ModuleRegistry::new()
        .catalog_for(&["arith".to_string(), "compare".to_string(), "logic".to_string()])
        .unwrap();
    Evaluator::new(Arc::new(catalog), ExecLimits::default())
}

fn args() -> Vec<String> {
    vec!["x".to_string(), "y".to_string()]
}

fn plus_tests() -> Vec<TestCase> {
    vec![
        TestCase::new(vec![Value::Integer(2), Value::Integer(3)], Value::Integer(5)),
        TestCase::new(vec![Value::Integer(10), Value::Integer(20)], Value::Integer(30)),
    ]
}

#[test]
fn test_correct_program_scores_full_marks() {
    let node = ProgramNode::call("+", vec![ProgramNode::argument("x"), ProgramNode::argument("y")]);
    let result = evaluator().evaluate(&node, &args(), &plus_tests()).unwrap();

    assert_eq!(result.correctness, 1.0);
    assert!(result.is_perfect());
    assert_eq!(result.size, 3);
}

#[test]
fn test_universally_failing_node_scores_zero_without_error() {
    // x / 0 fails on every input
    let node = ProgramNode::call(
        "/",
        vec![ProgramNode::argument("x"), ProgramNode::literal(Value::Integer(0))],
    );
    let result = evaluator().evaluate(&node, &args(), &plus_tests()).unwrap();

    assert_eq!(result.correctness, 0.0);
    assert_eq!(result.latency, Duration::ZERO);
    assert_eq!(result.size, 3);
}

#[test]
fn test_type_errors_are_non_matches() {
    // `and` applied to numbers fails at runtime
    let node = ProgramNode::call(
        "and",
        vec![ProgramNode::argument("x"), ProgramNode::argument("y")],
    );
    let result = evaluator().evaluate(&node, &args(), &plus_tests()).unwrap();

    assert_eq!(result.correctness, 0.0);
    assert_eq!(result.latency, Duration::ZERO);
}

#[test]
fn test_wrong_output_sort_is_non_match() {
    let node = ProgramNode::call("<", vec![ProgramNode::argument("x"), ProgramNode::argument("y")]);
    let result = evaluator().evaluate(&node, &args(), &plus_tests()).unwrap();
    assert_eq!(result.correctness, 0.0);
}

#[test]
fn test_failing_tests_do_not_contribute_latency() {
    // Only correct on the first case; the second fails by division by zero
    let tests = vec![
        TestCase::new(vec![Value::Integer(4), Value::Integer(2)], Value::Integer(2)),
        TestCase::new(vec![Value::Integer(1), Value::Integer(0)], Value::Integer(0)),
    ];
    let node = ProgramNode::call("/", vec![ProgramNode::argument("x"), ProgramNode::argument("y")]);
    let result = evaluator().evaluate(&node, &args(), &tests).unwrap();
    assert_eq!(result.correctness, 0.5);
}

#[test]
fn test_step_budget_applies_per_invocation() {
    let catalog = ModuleRegistry::new().catalog_for(&["arith".to_string()]).unwrap();
    let tight = Evaluator::new(
        Arc::new(catalog),
        ExecLimits {
            step_limit: 2,
            depth_limit: 64,
        },
    );

    let mut node = ProgramNode::argument("x");
    for _ in 0..3 {
        node = ProgramNode::call("+", vec![node, ProgramNode::literal(Value::Integer(0))]);
    }
    let tests = vec![TestCase::new(vec![Value::Integer(1), Value::Integer(1)], Value::Integer(1))];

    let result = tight.evaluate(&node, &args(), &tests).unwrap();
    assert_eq!(result.correctness, 0.0);

    let shallow = ProgramNode::call(
        "+",
        vec![ProgramNode::argument("x"), ProgramNode::literal(Value::Integer(0))],
    );
    let result = tight.evaluate(&shallow, &args(), &tests).unwrap();
    assert_eq!(result.correctness, 1.0);
}
