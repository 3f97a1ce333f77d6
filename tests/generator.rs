use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::sync::Arc;
use typesynth::config::{Parameter, SearchConfig};
use typesynth::engines::generation::{ProgramGenerator, SymbolTables};
use typesynth::functions::{FunctionDescriptor, ModuleRegistry};
use typesynth::types::{ProgramNode, Terminal, TypeTag, Value};

fn plus_proto() -> Vec<Parameter> {
    vec![
        Parameter::new(TypeTag::num(), "x"),
        Parameter::new(TypeTag::num(), "y"),
    ]
}

fn num_literals() -> BTreeMap<TypeTag, Vec<Value>> {
    let mut literals = BTreeMap::new();
    literals.insert(TypeTag::num(), vec![Value::Integer(0), Value::Integer(1)]);
    literals
}

/// Only `+ : num, num -> num` available
fn plus_generator() -> ProgramGenerator {
    let plus = FunctionDescriptor::new("+", vec![TypeTag::num(), TypeTag::num()], TypeTag::num());
    let tables = SymbolTables::build(&num_literals(), &plus_proto(), vec![plus]);
    ProgramGenerator::new(Arc::new(tables))
}

/// Every built-in module, with the default literals
fn full_generator() -> ProgramGenerator {
    let catalog = ModuleRegistry::new()
        .catalog_for(&[
            "arith".to_string(),
            "compare".to_string(),
            "logic".to_string(),
            "control".to_string(),
        ])
        .unwrap();
    let tables = SymbolTables::build(
        &SearchConfig::default().literals,
        &plus_proto(),
        catalog.descriptors(),
    );
    ProgramGenerator::new(Arc::new(tables))
}

#[test]
fn test_zero_bias_always_yields_terminal() {
    let generator = plus_generator();
    let mut rng = StdRng::seed_from_u64(42);
    let allowed = [
        ProgramNode::literal(Value::Integer(0)),
        ProgramNode::literal(Value::Integer(1)),
        ProgramNode::argument("x"),
        ProgramNode::argument("y"),
    ];

    for _ in 0..500 {
        let node = generator.generate(&TypeTag::num(), 0, &mut rng).unwrap();
        assert!(allowed.contains(&node), "unexpected node {}", node);
    }
}

#[test]
fn test_full_bias_always_yields_plus_at_root() {
    let generator = plus_generator();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..500 {
        let node = generator.generate(&TypeTag::num(), 100, &mut rng).unwrap();
        match &node {
            ProgramNode::Call { operator, args } => {
                assert_eq!(operator, "+");
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected a call, got {}", other),
        }
    }
}

#[test]
fn test_generated_type_matches_request() {
    let generator = full_generator();
    let mut rng = StdRng::seed_from_u64(7);

    for tag in [TypeTag::num(), TypeTag::boolean()] {
        for _ in 0..300 {
            let node = generator.generate(&tag, 70, &mut rng).unwrap();
            assert_eq!(generator.tables().type_of(&node).unwrap(), tag);
        }
    }
}

#[test]
fn test_calls_respect_arity_and_parameter_types() {
    let generator = full_generator();
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..300 {
        let node = generator
            .generate(&TypeTag::Wildcard, ProgramGenerator::DEFAULT_FUNCTION_BIAS, &mut rng)
            .unwrap();
        let tag = generator.tables().type_of(&node).unwrap();
        generator
            .tables()
            .check_well_typed(&node, &tag)
            .unwrap_or_else(|e| panic!("{} is ill-typed: {}", node, e));
    }
}

#[test]
fn test_wildcard_terminals_span_all_sorts() {
    let generator = full_generator().with_argument_rate(0.0);
    let mut rng = StdRng::seed_from_u64(5);
    let mut saw_bool = false;
    let mut saw_num = false;

    for _ in 0..200 {
        if let ProgramNode::Terminal(Terminal::Literal(value)) =
            generator.generate(&TypeTag::Wildcard, 0, &mut rng).unwrap()
        {
            match value {
                Value::Bool(_) => saw_bool = true,
                Value::Integer(_) => saw_num = true,
                _ => {}
            }
        }
    }
    assert!(saw_bool && saw_num);
}

#[test]
fn test_trees_stay_shallow_under_decaying_bias() {
    let generator = plus_generator();
    let mut rng = StdRng::seed_from_u64(3);

    // With a step of 10 the bias reaches zero after at most 10 levels.
    for _ in 0..200 {
        let node = generator.generate(&TypeTag::num(), 100, &mut rng).unwrap();
        assert!(node.depth() <= 11);
    }
}
