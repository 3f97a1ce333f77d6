use crate::config::function::FunctionSpec;
use crate::error::{Result, SynthesisError};
use crate::functions::{
    defined::DefinedFunction,
    primitives::{And, ArithOp, Arithmetic, CompareOp, Comparison, If, Not, Or},
    traits::{FunctionDescriptor, Operator},
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Operators visible to one function, keyed by alias.
#[derive(Clone, Default)]
pub struct OperatorCatalog {
    operators: BTreeMap<String, Arc<dyn Operator>>,
}

impl OperatorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an operator. Returns false, leaving the catalog untouched, if the
    /// alias is already taken.
    pub fn insert(&mut self, operator: Arc<dyn Operator>) -> bool {
        let alias = operator.alias().to_string();
        if self.operators.contains_key(&alias) {
            return false;
        }
        self.operators.insert(alias, operator);
        true
    }

    pub fn get(&self, alias: &str) -> Option<Arc<dyn Operator>> {
        self.operators.get(alias).cloned()
    }

    /// Descriptors in alias order.
    pub fn descriptors(&self) -> Vec<FunctionDescriptor> {
        self.operators.values().map(|op| op.descriptor()).collect()
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

/// Module identifier → exported operators.
pub struct ModuleRegistry {
    modules: BTreeMap<String, Vec<Arc<dyn Operator>>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            modules: BTreeMap::new(),
        };
        registry.register_builtins();
        registry
    }

    /// Registry without the built-in modules.
    pub fn empty() -> Self {
        Self {
            modules: BTreeMap::new(),
        }
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn module_names(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    pub fn register_module(&mut self, name: impl Into<String>, operators: Vec<Arc<dyn Operator>>) {
        self.modules.insert(name.into(), operators);
    }

    /// Export a function record as a module of the same name. The record's
    /// `best` body may only use operators from the modules it imports, which
    /// must already be registered.
    pub fn register_record(&mut self, spec: &FunctionSpec) -> Result<()> {
        let catalog = self.catalog_for(&spec.modules)?;
        let function = DefinedFunction::from_spec(spec, &catalog)?;
        log::debug!("Registered module {} ({} imports)", spec.name, spec.modules.len());
        self.register_module(spec.name.clone(), vec![Arc::new(function)]);
        Ok(())
    }

    /// Union the operators exported by `modules`. The first module to export
    /// an alias wins.
    pub fn catalog_for(&self, modules: &[String]) -> Result<OperatorCatalog> {
        let mut catalog = OperatorCatalog::new();
        for name in modules {
            let exported = self.modules.get(name).ok_or_else(|| {
                SynthesisError::Configuration(format!("unknown module {}", name))
            })?;
            for operator in exported {
                if !catalog.insert(Arc::clone(operator)) {
                    log::warn!(
                        "Module {} re-exports {}; keeping the earlier definition",
                        name,
                        operator.alias()
                    );
                }
            }
        }
        Ok(catalog)
    }

    fn register_builtins(&mut self) {
        let arith: Vec<Arc<dyn Operator>> = vec![
            Arc::new(Arithmetic::new(ArithOp::Add)),
            Arc::new(Arithmetic::new(ArithOp::Subtract)),
            Arc::new(Arithmetic::new(ArithOp::Multiply)),
            Arc::new(Arithmetic::new(ArithOp::Divide)),
            Arc::new(Arithmetic::new(ArithOp::Modulo)),
        ];
        let compare: Vec<Arc<dyn Operator>> = vec![
            Arc::new(Comparison::new(CompareOp::Less)),
            Arc::new(Comparison::new(CompareOp::Greater)),
            Arc::new(Comparison::new(CompareOp::Equal)),
        ];
        let logic: Vec<Arc<dyn Operator>> = vec![Arc::new(And), Arc::new(Or), Arc::new(Not)];
        let control: Vec<Arc<dyn Operator>> = vec![Arc::new(If)];

        self.register_module("arith", arith);
        self.register_module("compare", compare);
        self.register_module("logic", logic);
        self.register_module("control", control);
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::function::{FunctionRecord, Parameter};
    use crate::engines::evaluation::interpreter::{compile, ExecLimits};
    use crate::types::{ProgramNode, TestCase, TypeTag, Value};

    #[test]
    fn test_builtin_modules_present() {
        let registry = ModuleRegistry::new();
        for name in ["arith", "compare", "logic", "control"] {
            assert!(registry.has_module(name));
        }
    }

    #[test]
    fn test_catalog_unions_modules() {
        let registry = ModuleRegistry::new();
        let catalog = registry
            .catalog_for(&["arith".to_string(), "logic".to_string()])
            .unwrap();
        assert_eq!(catalog.len(), 8);
        assert!(catalog.get("+").is_some());
        assert!(catalog.get("not").is_some());
        assert!(catalog.get("<").is_none());
    }

    #[test]
    fn test_unknown_module_is_configuration_error() {
        let registry = ModuleRegistry::new();
        let result = registry.catalog_for(&["nonexistent".to_string()]);
        assert!(matches!(result, Err(SynthesisError::Configuration(_))));
    }

    #[test]
    fn test_registered_record_is_callable() {
        let record = FunctionRecord {
            name: "double".to_string(),
            return_type: Some(TypeTag::num()),
            proto: Some(vec![Parameter::new(TypeTag::num(), "n")]),
            tests: Some(vec![TestCase::new(vec![Value::Integer(2)], Value::Integer(4))]),
            modules: vec!["arith".to_string()],
            best: Some(ProgramNode::call(
                "+",
                vec![ProgramNode::argument("n"), ProgramNode::argument("n")],
            )),
            ..Default::default()
        };
        let spec = record.validate().unwrap();

        let mut registry = ModuleRegistry::new();
        registry.register_record(&spec).unwrap();
        let catalog = registry
            .catalog_for(&["arith".to_string(), "double".to_string()])
            .unwrap();

        let descriptor = catalog.get("double").unwrap().descriptor();
        assert_eq!(descriptor.params, vec![TypeTag::num()]);

        let node = ProgramNode::call("double", vec![ProgramNode::argument("x")]);
        let program = compile(&node, &["x".to_string()], &catalog).unwrap();
        let value = program.run(&[Value::Integer(21)], ExecLimits::default()).unwrap();
        assert_eq!(value, Value::Integer(42));
    }

    #[test]
    fn test_record_without_best_cannot_be_exported() {
        let record = FunctionRecord {
            name: "empty".to_string(),
            return_type: Some(TypeTag::num()),
            proto: Some(vec![]),
            tests: Some(vec![TestCase::new(vec![], Value::Integer(0))]),
            ..Default::default()
        };
        let spec = record.validate().unwrap();
        let mut registry = ModuleRegistry::new();
        assert!(matches!(
            registry.register_record(&spec),
            Err(SynthesisError::Configuration(_))
        ));
    }
}
