use crate::engines::generation::symbol_table::{SortedTypeTable, SymbolTables, TypedTerminal};
use crate::error::{Result, SynthesisError};
use crate::types::{ProgramNode, TypeTag};
use rand::Rng;
use std::sync::Arc;

/// Builds random, well-typed candidate trees from a function's symbol tables.
///
/// At each position a draw in `[0, 100)` is compared against the current
/// function bias: draws at or above the bias yield a terminal, draws below it
/// yield a call whose children are generated with the bias lowered by
/// `bias_step`. Since the bias only decreases, every branch ends in terminals
/// once it drops to zero.
pub struct ProgramGenerator {
    tables: Arc<SymbolTables>,
    argument_rate: f64,
    bias_step: i32,
}

impl ProgramGenerator {
    pub const DEFAULT_FUNCTION_BIAS: i32 = 70;

    pub fn new(tables: Arc<SymbolTables>) -> Self {
        Self {
            tables,
            argument_rate: 0.7,
            bias_step: 10,
        }
    }

    pub fn with_argument_rate(mut self, rate: f64) -> Self {
        if !rate.is_nan() {
            self.argument_rate = rate.clamp(0.0, 1.0);
        }
        self
    }

    pub fn with_bias_step(mut self, step: i32) -> Self {
        self.bias_step = step.max(1);
        self
    }

    pub fn tables(&self) -> &SymbolTables {
        &self.tables
    }

    /// Generate a tree producing `desired` (any sort for the wildcard).
    pub fn generate<R: Rng>(
        &self,
        desired: &TypeTag,
        function_bias: i32,
        rng: &mut R,
    ) -> Result<ProgramNode> {
        let draw: i32 = rng.gen_range(0..100);
        if draw >= function_bias {
            return self.build_terminal(desired, rng);
        }
        self.build_call(desired, function_bias, rng)
    }

    fn build_call<R: Rng>(
        &self,
        desired: &TypeTag,
        function_bias: i32,
        rng: &mut R,
    ) -> Result<ProgramNode> {
        let functions = match self.tables.functions.lookup(desired) {
            Ok(functions) if !functions.is_empty() => functions,
            _ => return self.build_terminal(desired, rng),
        };

        let function = functions[rng.gen_range(0..functions.len())];
        let child_bias = function_bias - self.bias_step;

        let mut args = Vec::with_capacity(function.arity());
        for param in &function.params {
            args.push(self.generate(param, child_bias, rng)?);
        }

        Ok(ProgramNode::Call {
            operator: function.alias.clone(),
            args,
        })
    }

    fn build_terminal<R: Rng>(&self, desired: &TypeTag, rng: &mut R) -> Result<ProgramNode> {
        let (first, second) = if rng.gen_bool(self.argument_rate) {
            (&self.tables.arguments, &self.tables.literals)
        } else {
            (&self.tables.literals, &self.tables.arguments)
        };

        let candidates = non_empty(first, desired)
            .or_else(|| non_empty(second, desired))
            .ok_or_else(|| SynthesisError::NoCandidate(desired.clone()))?;

        Ok(candidates[rng.gen_range(0..candidates.len())].to_node())
    }
}

fn non_empty<'a>(
    table: &'a SortedTypeTable<TypedTerminal>,
    tag: &TypeTag,
) -> Option<Vec<&'a TypedTerminal>> {
    table.lookup(tag).ok().filter(|entries| !entries.is_empty())
}
