use crate::config::function::{FunctionRecord, FunctionSpec};
use crate::config::search::SearchConfig;
use crate::config::traits::ConfigSection;
use crate::engines::evaluation::Evaluator;
use crate::engines::generation::{
    ConsoleProgressCallback, GenePool, ProgramGenerator, ProgressCallback, SearchEngine,
    SearchStats, SymbolTables,
};
use crate::error::Result;
use crate::functions::registry::ModuleRegistry;
use crate::types::{FitnessResult, ProgramNode};
use std::sync::Arc;

/// Search state for one function: its validated record, tables and engine.
///
/// Configuration problems surface from [`SynthesisSession::new`] before any
/// candidate is generated.
pub struct SynthesisSession {
    spec: FunctionSpec,
    engine: SearchEngine,
}

impl SynthesisSession {
    pub fn new(
        record: FunctionRecord,
        registry: &ModuleRegistry,
        config: SearchConfig,
    ) -> Result<Self> {
        Self::from_spec(record.validate()?, registry, config)
    }

    pub fn from_spec(
        spec: FunctionSpec,
        registry: &ModuleRegistry,
        config: SearchConfig,
    ) -> Result<Self> {
        config.validate()?;

        let catalog = registry.catalog_for(&spec.modules)?;
        let tables = SymbolTables::build(&config.literals, &spec.proto, catalog.descriptors());
        tables.check_coverage(&spec.return_type)?;

        log::info!(
            "Session for {}: {} args, {} tests, {} operators, {} pools",
            spec.name,
            spec.proto.len(),
            spec.tests.len(),
            catalog.len(),
            spec.gene_pool.len()
        );

        let generator = ProgramGenerator::new(Arc::new(tables))
            .with_argument_rate(config.argument_rate)
            .with_bias_step(config.bias_step);
        let evaluator = Evaluator::new(Arc::new(catalog), config.limits());
        let engine = SearchEngine::new(config, generator, evaluator);

        Ok(Self { spec, engine })
    }

    /// Run `count` iterations, logging progress.
    pub fn run(&mut self, count: usize) -> Result<SearchStats> {
        let mut callback = ConsoleProgressCallback::default();
        self.run_with(count, &mut callback)
    }

    pub fn run_with<C: ProgressCallback>(
        &mut self,
        count: usize,
        callback: &mut C,
    ) -> Result<SearchStats> {
        if self.engine.config().parallel {
            self.engine.run_parallel(&mut self.spec, count, callback)
        } else {
            self.engine.run(&mut self.spec, count, callback)
        }
    }

    pub fn pools(&self) -> &[GenePool] {
        &self.spec.gene_pool
    }

    /// Score `node` against this function's tests.
    pub fn fitness(&self, node: &ProgramNode) -> Result<FitnessResult> {
        self.engine
            .evaluator()
            .evaluate(node, &self.spec.formal_args(), &self.spec.tests)
    }

    pub fn spec(&self) -> &FunctionSpec {
        &self.spec
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// Hand back the record with its updated gene pools for persistence.
    pub fn into_record(self) -> FunctionRecord {
        self.spec.into_record()
    }
}
