use super::traits::ConfigSection;
use crate::engines::evaluation::interpreter::ExecLimits;
use crate::error::SynthesisError;
use crate::types::{TypeTag, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Iterations per `run`
    pub iterations: usize,
    /// Percent chance, in `[0, 100]`, that the root of a candidate is a call
    pub function_bias: i32,
    /// Bias lost at each level of depth
    pub bias_step: i32,
    /// Probability a terminal is drawn from the arguments rather than literals
    pub argument_rate: f64,
    pub step_limit: usize,
    pub depth_limit: usize,
    pub seed: Option<u64>,
    pub tournament_order: TournamentOrder,
    /// Apply `max_latency_us` / `max_size` pool ceilings
    pub enforce_ceilings: bool,
    pub parallel: bool,
    /// Candidates generated per parallel batch
    pub batch_size: usize,
    /// Base literals offered as terminals, by sort
    pub literals: BTreeMap<TypeTag, Vec<Value>>,
}

/// How a tournament ranks two fitness results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentOrder {
    /// `(correctness, latency, size)` compared as a tuple, greater wins
    Lexicographic,
    /// Higher correctness, then lower latency, then fewer nodes
    Parsimonious,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let mut literals = BTreeMap::new();
        literals.insert(TypeTag::num(), vec![Value::Integer(0), Value::Integer(1)]);
        literals.insert(TypeTag::boolean(), vec![Value::Bool(true), Value::Bool(false)]);

        Self {
            iterations: 1_000,
            function_bias: 70,
            bias_step: 10,
            argument_rate: 0.7,
            step_limit: 10_000,
            depth_limit: 256,
            seed: None,
            tournament_order: TournamentOrder::Lexicographic,
            enforce_ceilings: false,
            parallel: false,
            batch_size: 64,
            literals,
        }
    }
}

impl SearchConfig {
    pub fn limits(&self) -> ExecLimits {
        ExecLimits {
            step_limit: self.step_limit,
            depth_limit: self.depth_limit,
        }
    }
}

impl ConfigSection for SearchConfig {
    fn section_name() -> &'static str {
        "search"
    }

    fn validate(&self) -> Result<(), SynthesisError> {
        if !(0..=100).contains(&self.function_bias) {
            return Err(SynthesisError::Configuration(
                "function_bias must be between 0 and 100".to_string(),
            ));
        }
        if self.bias_step <= 0 {
            return Err(SynthesisError::Configuration(
                "bias_step must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.argument_rate) {
            return Err(SynthesisError::Configuration(
                "argument_rate must be between 0 and 1".to_string(),
            ));
        }
        if self.step_limit == 0 || self.depth_limit == 0 {
            return Err(SynthesisError::Configuration(
                "step_limit and depth_limit must be positive".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(SynthesisError::Configuration(
                "batch_size must be positive".to_string(),
            ));
        }
        if self.literals.keys().any(TypeTag::is_wildcard) {
            return Err(SynthesisError::Configuration(
                "literals must be keyed by concrete sorts".to_string(),
            ));
        }
        for (tag, values) in &self.literals {
            if let Some(bad) = values.iter().find(|v| v.type_tag() != *tag) {
                return Err(SynthesisError::Configuration(format!(
                    "literal {} listed under {} has sort {}",
                    bad,
                    tag,
                    bad.type_tag()
                )));
            }
        }
        Ok(())
    }
}
