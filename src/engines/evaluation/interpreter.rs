use crate::error::{Result, RuntimeFailure, SynthesisError};
use crate::functions::registry::OperatorCatalog;
use crate::functions::traits::Operator;
use crate::types::{ProgramNode, Terminal, Value};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Execution ceilings applied to every single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecLimits {
    /// Operator applications allowed per invocation
    pub step_limit: usize,
    /// Maximum nesting of calls, user-defined function frames included
    pub depth_limit: usize,
}

impl Default for ExecLimits {
    fn default() -> Self {
        Self {
            step_limit: 10_000,
            depth_limit: 256,
        }
    }
}

/// Budget tracker for one invocation. Shared across nested function frames so
/// that recursive module functions exhaust the same budget.
#[derive(Debug)]
pub struct ExecContext {
    limits: ExecLimits,
    steps: usize,
    depth: usize,
}

impl ExecContext {
    pub fn new(limits: ExecLimits) -> Self {
        Self {
            limits,
            steps: 0,
            depth: 0,
        }
    }

    fn step(&mut self) -> std::result::Result<(), RuntimeFailure> {
        self.steps += 1;
        if self.steps > self.limits.step_limit {
            return Err(RuntimeFailure::StepLimitExceeded(self.limits.step_limit));
        }
        Ok(())
    }

    fn enter(&mut self) -> std::result::Result<(), RuntimeFailure> {
        self.depth += 1;
        if self.depth > self.limits.depth_limit {
            self.depth -= 1;
            return Err(RuntimeFailure::DepthLimitExceeded(self.limits.depth_limit));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

enum CompiledNode {
    Literal(Value),
    Argument(usize),
    Call {
        operator: Arc<dyn Operator>,
        args: Vec<CompiledNode>,
    },
}

/// A program tree with operators and argument names resolved.
pub struct CompiledProgram {
    root: CompiledNode,
    arity: usize,
    size: usize,
}

impl std::fmt::Debug for CompiledProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledProgram")
            .field("arity", &self.arity)
            .field("size", &self.size)
            .finish()
    }
}

/// Resolve `node` against `catalog`, binding terminals named in
/// `formal_args` to argument positions.
pub fn compile(
    node: &ProgramNode,
    formal_args: &[String],
    catalog: &OperatorCatalog,
) -> Result<CompiledProgram> {
    let root = compile_node(node, formal_args, catalog)?;
    Ok(CompiledProgram {
        root,
        arity: formal_args.len(),
        size: node.size(),
    })
}

fn compile_node(
    node: &ProgramNode,
    formal_args: &[String],
    catalog: &OperatorCatalog,
) -> Result<CompiledNode> {
    match node {
        ProgramNode::Terminal(Terminal::Literal(value)) => Ok(CompiledNode::Literal(value.clone())),
        ProgramNode::Terminal(Terminal::Argument(name)) => formal_args
            .iter()
            .position(|arg| arg == name)
            .map(CompiledNode::Argument)
            .ok_or_else(|| SynthesisError::Compile(format!("unbound argument {}", name))),
        ProgramNode::Call { operator, args } => {
            let op = catalog
                .get(operator)
                .ok_or_else(|| SynthesisError::Compile(format!("unknown operator {}", operator)))?;
            if op.arity() != args.len() {
                return Err(SynthesisError::Compile(format!(
                    "{} expects {} args, got {}",
                    operator,
                    op.arity(),
                    args.len()
                )));
            }
            let args = args
                .iter()
                .map(|arg| compile_node(arg, formal_args, catalog))
                .collect::<Result<Vec<_>>>()?;
            Ok(CompiledNode::Call { operator: op, args })
        }
    }
}

impl CompiledProgram {
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run with a fresh budget.
    pub fn run(
        &self,
        bindings: &[Value],
        limits: ExecLimits,
    ) -> std::result::Result<Value, RuntimeFailure> {
        let mut ctx = ExecContext::new(limits);
        self.apply(bindings, &mut ctx)
    }

    /// Run under an existing budget, as a nested frame of `ctx`.
    pub fn apply(
        &self,
        bindings: &[Value],
        ctx: &mut ExecContext,
    ) -> std::result::Result<Value, RuntimeFailure> {
        if bindings.len() != self.arity {
            return Err(RuntimeFailure::ArityMismatch {
                operator: "<program>".to_string(),
                expected: self.arity,
                actual: bindings.len(),
            });
        }
        ctx.enter()?;
        let result = eval(&self.root, bindings, ctx);
        ctx.leave();
        result
    }
}

fn eval(
    node: &CompiledNode,
    bindings: &[Value],
    ctx: &mut ExecContext,
) -> std::result::Result<Value, RuntimeFailure> {
    match node {
        CompiledNode::Literal(value) => Ok(value.clone()),
        CompiledNode::Argument(index) => bindings
            .get(*index)
            .cloned()
            .ok_or_else(|| RuntimeFailure::UnboundArgument(format!("#{}", index))),
        CompiledNode::Call { operator, args } => {
            ctx.step()?;
            ctx.enter()?;
            let values: std::result::Result<Vec<Value>, RuntimeFailure> =
                args.iter().map(|arg| eval(arg, bindings, ctx)).collect();
            let result = values.and_then(|values| operator.execute(&values, ctx));
            ctx.leave();
            result
        }
    }
}
