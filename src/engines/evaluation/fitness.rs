use crate::engines::evaluation::interpreter::{compile, CompiledProgram, ExecLimits};
use crate::error::Result;
use crate::functions::registry::OperatorCatalog;
use crate::types::{FitnessResult, ProgramNode, TestCase};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Scores candidate trees against a test set.
#[derive(Clone)]
pub struct Evaluator {
    catalog: Arc<OperatorCatalog>,
    limits: ExecLimits,
}

impl Evaluator {
    pub fn new(catalog: Arc<OperatorCatalog>, limits: ExecLimits) -> Self {
        Self { catalog, limits }
    }

    pub fn catalog(&self) -> &OperatorCatalog {
        &self.catalog
    }

    pub fn limits(&self) -> ExecLimits {
        self.limits
    }

    pub fn compile(&self, node: &ProgramNode, formal_args: &[String]) -> Result<CompiledProgram> {
        compile(node, formal_args, &self.catalog)
    }

    /// Run `node` over every test. Runtime failures count as non-matches;
    /// only a tree that cannot be compiled is an error.
    pub fn evaluate(
        &self,
        node: &ProgramNode,
        formal_args: &[String],
        tests: &[TestCase],
    ) -> Result<FitnessResult> {
        let program = self.compile(node, formal_args)?;
        Ok(self.score(&program, tests))
    }

    /// Score an already compiled program.
    pub fn score(&self, program: &CompiledProgram, tests: &[TestCase]) -> FitnessResult {
        if tests.is_empty() {
            return FitnessResult::failed(program.size());
        }

        let mut matched = 0usize;
        let mut latency = Duration::ZERO;
        for case in tests {
            if let Some(elapsed) = self.run_case(program, case) {
                matched += 1;
                latency += elapsed;
            }
        }

        FitnessResult::new(matched as f64 / tests.len() as f64, latency, program.size())
    }

    /// Cheap pre-filter: does `node` pass the first test?
    pub fn quick_test(
        &self,
        node: &ProgramNode,
        formal_args: &[String],
        tests: &[TestCase],
    ) -> Result<bool> {
        let program = self.compile(node, formal_args)?;
        Ok(self.passes_quick_test(&program, tests))
    }

    pub fn passes_quick_test(&self, program: &CompiledProgram, tests: &[TestCase]) -> bool {
        tests
            .first()
            .map_or(false, |first| self.run_case(program, first).is_some())
    }

    /// Latency of one invocation if it produced the expected output.
    fn run_case(&self, program: &CompiledProgram, case: &TestCase) -> Option<Duration> {
        let start = Instant::now();
        let outcome = program.run(&case.input, self.limits);
        let elapsed = start.elapsed();

        match outcome {
            Ok(value) if value.matches(&case.expected) => Some(elapsed),
            Ok(value) => {
                log::trace!("Expected {}, got {}", case.expected, value);
                None
            }
            Err(failure) => {
                log::trace!("Candidate failed: {}", failure);
                None
            }
        }
    }
}
