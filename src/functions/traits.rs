use crate::engines::evaluation::interpreter::ExecContext;
use crate::error::RuntimeFailure;
use crate::types::{TypeTag, Value};
use serde::{Deserialize, Serialize};

/// Callable building block usable inside a generated expression.
pub trait Operator: Send + Sync {
    /// Alias used in program trees
    fn alias(&self) -> &str;

    /// Parameter sorts, in order
    fn input_types(&self) -> Vec<TypeTag>;

    /// Return sort
    fn output_type(&self) -> TypeTag;

    fn arity(&self) -> usize {
        self.input_types().len()
    }

    /// Apply to already evaluated arguments.
    fn execute(&self, args: &[Value], ctx: &mut ExecContext) -> Result<Value, RuntimeFailure>;

    fn descriptor(&self) -> FunctionDescriptor {
        FunctionDescriptor {
            alias: self.alias().to_string(),
            params: self.input_types(),
            returns: self.output_type(),
        }
    }
}

/// Typing information of an operator, as seen by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub alias: String,
    pub params: Vec<TypeTag>,
    pub returns: TypeTag,
}

impl FunctionDescriptor {
    pub fn new(alias: impl Into<String>, params: Vec<TypeTag>, returns: TypeTag) -> Self {
        Self {
            alias: alias.into(),
            params,
            returns,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Rejects calls whose argument count differs from the operator's arity.
pub fn check_arity(alias: &str, args: &[Value], expected: usize) -> Result<(), RuntimeFailure> {
    if args.len() != expected {
        return Err(RuntimeFailure::ArityMismatch {
            operator: alias.to_string(),
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

pub fn expect_bool(alias: &str, value: &Value) -> Result<bool, RuntimeFailure> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(RuntimeFailure::TypeMismatch {
            operator: alias.to_string(),
            expected: TypeTag::boolean(),
            actual: other.type_tag(),
        }),
    }
}
