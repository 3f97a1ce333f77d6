use crate::config::function::FunctionSpec;
use crate::engines::evaluation::interpreter::{compile, CompiledProgram, ExecContext};
use crate::error::{Result, RuntimeFailure, SynthesisError};
use crate::functions::registry::OperatorCatalog;
use crate::functions::traits::{check_arity, Operator};
use crate::types::{TypeTag, Value};

/// A user function exported by a module record, backed by its `best` body.
pub struct DefinedFunction {
    name: String,
    params: Vec<TypeTag>,
    returns: TypeTag,
    body: CompiledProgram,
}

impl DefinedFunction {
    /// Compile `spec.best` against the operators of the modules the record
    /// itself imports.
    pub fn from_spec(spec: &FunctionSpec, catalog: &OperatorCatalog) -> Result<Self> {
        let best = spec.best.as_ref().ok_or_else(|| {
            SynthesisError::Configuration(format!(
                "function {} has no best implementation to export",
                spec.name
            ))
        })?;
        let body = compile(best, &spec.formal_args(), catalog)?;

        Ok(Self {
            name: spec.name.clone(),
            params: spec.proto.iter().map(|p| p.ty.clone()).collect(),
            returns: spec.return_type.clone(),
            body,
        })
    }
}

impl Operator for DefinedFunction {
    fn alias(&self) -> &str {
        &self.name
    }

    fn input_types(&self) -> Vec<TypeTag> {
        self.params.clone()
    }

    fn output_type(&self) -> TypeTag {
        self.returns.clone()
    }

    fn execute(
        &self,
        args: &[Value],
        ctx: &mut ExecContext,
    ) -> std::result::Result<Value, RuntimeFailure> {
        check_arity(&self.name, args, self.params.len())?;
        self.body.apply(args, ctx)
    }
}
