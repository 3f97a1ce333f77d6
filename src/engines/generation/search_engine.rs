use crate::config::function::FunctionSpec;
use crate::config::search::SearchConfig;
use crate::engines::evaluation::Evaluator;
use crate::engines::generation::{
    gene_pool::{PoolManager, SubmitOutcome},
    generator::ProgramGenerator,
};
use crate::error::{Result, SynthesisError};
use crate::types::{FitnessResult, ProgramNode, TestCase, TypeTag};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

/// Counters for one `run`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchStats {
    pub iterations: usize,
    pub generated: usize,
    pub quick_test_failures: usize,
    pub compile_errors: usize,
    /// Candidates that passed the quick test and were fully evaluated
    pub evaluated: usize,
    pub inserted: usize,
    pub replaced: usize,
    pub rejected: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SearchStats {
    fn new(iterations: usize) -> Self {
        let now = Utc::now();
        Self {
            iterations,
            generated: 0,
            quick_test_failures: 0,
            compile_errors: 0,
            evaluated: 0,
            inserted: 0,
            replaced: 0,
            rejected: 0,
            started_at: now,
            finished_at: now,
        }
    }
}

pub trait ProgressCallback: Send {
    fn on_iteration(&mut self, iteration: usize, total: usize);
    fn on_submission(&mut self, iteration: usize, result: &FitnessResult, outcome: &SubmitOutcome);
    fn on_run_complete(&mut self, stats: &SearchStats);
}

/// What became of one generated tree before pool submission.
enum Candidate {
    QuickFailed,
    Broken(SynthesisError),
    Scored {
        node: ProgramNode,
        result: FitnessResult,
    },
}

/// Drives generate → quick test → evaluate → submit iterations against a
/// function's gene pools.
pub struct SearchEngine {
    config: SearchConfig,
    generator: ProgramGenerator,
    evaluator: Evaluator,
    pool_manager: PoolManager<StdRng>,
    rng: StdRng,
}

impl SearchEngine {
    pub fn new(config: SearchConfig, generator: ProgramGenerator, evaluator: Evaluator) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let pool_manager = PoolManager::new(
            StdRng::seed_from_u64(rng.gen()),
            config.tournament_order,
            config.enforce_ceilings,
        );

        Self {
            config,
            generator,
            evaluator,
            pool_manager,
            rng,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn generator(&self) -> &ProgramGenerator {
        &self.generator
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Run exactly `count` iterations in sequence, mutating `spec.gene_pool`.
    /// There is no early stop on a perfect candidate.
    pub fn run<C: ProgressCallback>(
        &mut self,
        spec: &mut FunctionSpec,
        count: usize,
        callback: &mut C,
    ) -> Result<SearchStats> {
        let formal_args = spec.formal_args();
        let mut stats = SearchStats::new(count);

        for iteration in 0..count {
            callback.on_iteration(iteration, count);
            let candidate = Self::produce(
                &self.generator,
                &self.evaluator,
                self.config.function_bias,
                &spec.return_type,
                &formal_args,
                &spec.tests,
                &mut self.rng,
            )?;
            self.absorb(iteration, candidate, spec, &formal_args, &mut stats, callback)?;
        }

        stats.finished_at = Utc::now();
        callback.on_run_complete(&stats);
        Ok(stats)
    }

    /// Like [`run`](Self::run), but generates and scores each batch of
    /// candidates on the rayon pool. Every candidate draws from its own RNG
    /// seeded by the engine, and submissions are applied one at a time in
    /// candidate order, so a seeded run is reproducible.
    pub fn run_parallel<C: ProgressCallback>(
        &mut self,
        spec: &mut FunctionSpec,
        count: usize,
        callback: &mut C,
    ) -> Result<SearchStats> {
        let formal_args = spec.formal_args();
        let batch_size = self.config.batch_size.max(1);
        let mut stats = SearchStats::new(count);
        let mut done = 0;

        while done < count {
            let n = batch_size.min(count - done);
            let seeds: Vec<u64> = (0..n).map(|_| self.rng.gen()).collect();

            let generator = &self.generator;
            let evaluator = &self.evaluator;
            let bias = self.config.function_bias;
            let return_type = &spec.return_type;
            let tests = &spec.tests;
            let args = &formal_args;

            let candidates: Vec<Result<Candidate>> = seeds
                .into_par_iter()
                .map(|seed| {
                    let mut rng = StdRng::seed_from_u64(seed);
                    Self::produce(generator, evaluator, bias, return_type, args, tests, &mut rng)
                })
                .collect();

            for (offset, candidate) in candidates.into_iter().enumerate() {
                let iteration = done + offset;
                callback.on_iteration(iteration, count);
                self.absorb(iteration, candidate?, spec, &formal_args, &mut stats, callback)?;
            }
            done += n;
        }

        stats.finished_at = Utc::now();
        callback.on_run_complete(&stats);
        Ok(stats)
    }

    fn produce<R: Rng>(
        generator: &ProgramGenerator,
        evaluator: &Evaluator,
        function_bias: i32,
        return_type: &TypeTag,
        formal_args: &[String],
        tests: &[TestCase],
        rng: &mut R,
    ) -> Result<Candidate> {
        let node = generator.generate(return_type, function_bias, rng)?;

        let program = match evaluator.compile(&node, formal_args) {
            Ok(program) => program,
            Err(e) => return Ok(Candidate::Broken(e)),
        };
        if !evaluator.passes_quick_test(&program, tests) {
            return Ok(Candidate::QuickFailed);
        }

        let result = evaluator.score(&program, tests);
        Ok(Candidate::Scored { node, result })
    }

    fn absorb<C: ProgressCallback>(
        &mut self,
        iteration: usize,
        candidate: Candidate,
        spec: &mut FunctionSpec,
        formal_args: &[String],
        stats: &mut SearchStats,
        callback: &mut C,
    ) -> Result<()> {
        stats.generated += 1;
        match candidate {
            Candidate::QuickFailed => stats.quick_test_failures += 1,
            Candidate::Broken(e) => {
                log::debug!("Discarding malformed candidate: {}", e);
                stats.compile_errors += 1;
            }
            Candidate::Scored { node, result } => {
                stats.evaluated += 1;
                let evaluator = &self.evaluator;
                let tests = &spec.tests;
                let outcome = self.pool_manager.submit(
                    node,
                    &result,
                    &mut spec.gene_pool,
                    |incumbent| evaluator.evaluate(incumbent, formal_args, tests),
                )?;
                match outcome {
                    SubmitOutcome::Rejected => stats.rejected += 1,
                    SubmitOutcome::Inserted { .. } => stats.inserted += 1,
                    SubmitOutcome::Replaced { .. } => stats.replaced += 1,
                }
                callback.on_submission(iteration, &result, &outcome);
            }
        }
        Ok(())
    }
}
