use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use typesynth::config::TournamentOrder;
use typesynth::engines::generation::{GenePool, PoolManager, PoolRequirements, SubmitOutcome};
use typesynth::types::{FitnessResult, ProgramNode, Value};
use typesynth::SynthesisError;

fn node(i: i64) -> ProgramNode {
    ProgramNode::literal(Value::Integer(i))
}

fn fitness(correctness: f64, latency: u64, size: usize) -> FitnessResult {
    FitnessResult::new(correctness, Duration::from_millis(latency), size)
}

fn manager(order: TournamentOrder) -> PoolManager<StdRng> {
    PoolManager::new(StdRng::seed_from_u64(42), order, false)
}

#[test]
fn test_fill_then_tournament() {
    let mut pools = vec![GenePool::new(PoolRequirements::new(0.5, 2))];
    let mut manager = manager(TournamentOrder::Lexicographic);
    let mut retests = 0;
    let mut retest = |_: &ProgramNode| -> Result<FitnessResult, SynthesisError> {
        retests += 1;
        Ok(fitness(1.0, 5, 3))
    };

    let first = manager.submit(node(1), &fitness(1.0, 5, 3), &mut pools, &mut retest).unwrap();
    let second = manager.submit(node(2), &fitness(1.0, 2, 3), &mut pools, &mut retest).unwrap();
    assert_eq!(first, SubmitOutcome::Inserted { pool: 0 });
    assert_eq!(second, SubmitOutcome::Inserted { pool: 0 });
    assert_eq!(pools[0].len(), 2);

    // Pool is full: the third submission must re-score one incumbent.
    let third = manager.submit(node(3), &fitness(1.0, 1, 3), &mut pools, &mut retest).unwrap();
    assert_eq!(retests, 1);
    assert_eq!(third, SubmitOutcome::Rejected);
    assert_eq!(pools[0].members(), &[node(1), node(2)]);
}

#[test]
fn test_parsimonious_tournament_prefers_faster_candidate() {
    let mut pools = vec![GenePool::new(PoolRequirements::new(0.5, 2))];
    let mut manager = manager(TournamentOrder::Parsimonious);
    let retest = |_: &ProgramNode| Ok(fitness(1.0, 5, 3));

    manager.submit(node(1), &fitness(1.0, 5, 3), &mut pools, retest).unwrap();
    manager.submit(node(2), &fitness(1.0, 5, 3), &mut pools, retest).unwrap();
    let outcome = manager.submit(node(3), &fitness(1.0, 1, 3), &mut pools, retest).unwrap();

    match outcome {
        SubmitOutcome::Replaced { pool, incumbent } => {
            assert_eq!(pool, 0);
            assert!(incumbent == node(1) || incumbent == node(2));
            assert!(pools[0].members().contains(&node(3)));
            assert!(!pools[0].members().contains(&incumbent));
        }
        other => panic!("expected replacement, got {:?}", other),
    }
    assert_eq!(pools[0].len(), 2);
}

#[test]
fn test_routes_to_first_eligible_pool() {
    let mut pools = vec![
        GenePool::new(PoolRequirements::new(0.9, 5)),
        GenePool::new(PoolRequirements::new(0.4, 5)),
    ];
    let mut manager = manager(TournamentOrder::Lexicographic);
    let retest = |_: &ProgramNode| Ok(fitness(0.0, 0, 1));

    let low = manager.submit(node(1), &fitness(0.5, 1, 1), &mut pools, retest).unwrap();
    let high = manager.submit(node(2), &fitness(1.0, 1, 1), &mut pools, retest).unwrap();
    let tie = manager.submit(node(3), &fitness(0.4, 1, 1), &mut pools, retest).unwrap();

    assert_eq!(low, SubmitOutcome::Inserted { pool: 1 });
    assert_eq!(high, SubmitOutcome::Inserted { pool: 0 });
    assert_eq!(tie, SubmitOutcome::Rejected);
    assert_eq!(pools[0].members(), &[node(2)]);
    assert_eq!(pools[1].members(), &[node(1)]);
}

#[test]
fn test_pool_size_never_exceeds_capacity() {
    let mut pools = vec![GenePool::new(PoolRequirements::new(0.0, 3))];
    let mut manager = manager(TournamentOrder::Lexicographic);

    for i in 0..200 {
        let result = fitness(((i % 10) as f64 + 1.0) / 10.0, (i % 7) as u64, (i % 5) + 1);
        manager
            .submit(node(i as i64), &result, &mut pools, |_| Ok(fitness(0.5, 3, 2)))
            .unwrap();
        assert!(pools[0].len() <= 3);
    }
    assert_eq!(pools[0].len(), 3);
}

#[test]
fn test_non_improving_submissions_leave_pool_unchanged() {
    let mut pools = vec![GenePool::new(PoolRequirements::new(0.0, 2))];
    let mut manager = manager(TournamentOrder::Lexicographic);
    let retest = |_: &ProgramNode| Ok(fitness(1.0, 10, 5));

    manager.submit(node(1), &fitness(1.0, 10, 5), &mut pools, retest).unwrap();
    manager.submit(node(2), &fitness(1.0, 10, 5), &mut pools, retest).unwrap();
    let before = pools.clone();

    for i in 0..50 {
        // Ties and strict losses alike
        let result = if i % 2 == 0 { fitness(1.0, 10, 5) } else { fitness(0.5, 99, 99) };
        let outcome = manager.submit(node(100 + i), &result, &mut pools, retest).unwrap();
        assert_eq!(outcome, SubmitOutcome::Rejected);
    }
    assert_eq!(pools, before);
}

#[test]
fn test_broken_incumbent_loses_tournament() {
    let mut pools = vec![GenePool::new(PoolRequirements::new(0.0, 1))];
    let mut manager = manager(TournamentOrder::Lexicographic);

    manager
        .submit(node(1), &fitness(1.0, 1, 1), &mut pools, |_| Ok(fitness(1.0, 1, 1)))
        .unwrap();
    let outcome = manager
        .submit(node(2), &fitness(0.5, 1, 1), &mut pools, |_| {
            Err(SynthesisError::Compile("unknown operator".to_string()))
        })
        .unwrap();

    assert_eq!(
        outcome,
        SubmitOutcome::Replaced {
            pool: 0,
            incumbent: node(1)
        }
    );
}

#[test]
fn test_ceilings_enforced_when_enabled() {
    let mut requirements = PoolRequirements::new(0.0, 4);
    requirements.max_size = Some(3);
    let mut pools = vec![GenePool::new(requirements)];
    let mut strict = PoolManager::new(
        StdRng::seed_from_u64(1),
        TournamentOrder::Lexicographic,
        true,
    );

    let outcome = strict
        .submit(node(1), &fitness(1.0, 1, 10), &mut pools, |_| Ok(fitness(0.0, 0, 1)))
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Rejected);
    assert!(pools[0].is_empty());
}
