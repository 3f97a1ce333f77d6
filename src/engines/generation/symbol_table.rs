use crate::config::function::Parameter;
use crate::error::{Result, SynthesisError};
use crate::functions::traits::FunctionDescriptor;
use crate::types::{ProgramNode, Terminal, TypeTag, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Anything that can be filed under a sort.
pub trait Typed {
    fn type_tag(&self) -> TypeTag;
}

impl Typed for FunctionDescriptor {
    fn type_tag(&self) -> TypeTag {
        self.returns.clone()
    }
}

/// A terminal together with the sort it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedTerminal {
    pub tag: TypeTag,
    pub terminal: Terminal,
}

impl TypedTerminal {
    pub fn to_node(&self) -> ProgramNode {
        ProgramNode::Terminal(self.terminal.clone())
    }
}

impl Typed for TypedTerminal {
    fn type_tag(&self) -> TypeTag {
        self.tag.clone()
    }
}

/// Entries grouped by sort. Fixed once built.
#[derive(Debug, Clone)]
pub struct SortedTypeTable<T> {
    entries: BTreeMap<TypeTag, Vec<T>>,
}

impl<T: Typed> SortedTypeTable<T> {
    pub fn build(items: impl IntoIterator<Item = T>) -> Self {
        let mut entries: BTreeMap<TypeTag, Vec<T>> = BTreeMap::new();
        for item in items {
            entries.entry(item.type_tag()).or_default().push(item);
        }
        Self { entries }
    }

    /// Entries for `tag`; every entry when `tag` is the wildcard.
    pub fn lookup(&self, tag: &TypeTag) -> Result<Vec<&T>> {
        if tag.is_wildcard() {
            return Ok(self.entries.values().flatten().collect());
        }
        self.entries
            .get(tag)
            .map(|items| items.iter().collect())
            .ok_or_else(|| SynthesisError::Lookup(tag.clone()))
    }

    pub fn contains(&self, tag: &TypeTag) -> bool {
        if tag.is_wildcard() {
            !self.entries.is_empty()
        } else {
            self.entries.contains_key(tag)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The three tables a generator draws from for one function.
#[derive(Debug, Clone)]
pub struct SymbolTables {
    pub functions: SortedTypeTable<FunctionDescriptor>,
    pub arguments: SortedTypeTable<TypedTerminal>,
    pub literals: SortedTypeTable<TypedTerminal>,
    by_alias: HashMap<String, FunctionDescriptor>,
}

impl SymbolTables {
    pub fn build(
        literals: &BTreeMap<TypeTag, Vec<Value>>,
        proto: &[Parameter],
        descriptors: Vec<FunctionDescriptor>,
    ) -> Self {
        let literal_entries = literals.iter().flat_map(|(tag, values)| {
            values.iter().map(move |value| TypedTerminal {
                tag: tag.clone(),
                terminal: Terminal::Literal(value.clone()),
            })
        });
        let argument_entries = proto.iter().map(|param| TypedTerminal {
            tag: param.ty.clone(),
            terminal: Terminal::Argument(param.name.clone()),
        });
        let by_alias = descriptors
            .iter()
            .map(|d| (d.alias.clone(), d.clone()))
            .collect();

        Self {
            functions: SortedTypeTable::build(descriptors),
            arguments: SortedTypeTable::build(argument_entries),
            literals: SortedTypeTable::build(literal_entries),
            by_alias,
        }
    }

    pub fn has_terminal(&self, tag: &TypeTag) -> bool {
        self.arguments.contains(tag) || self.literals.contains(tag)
    }

    /// Every sort the generator may be asked for must bottom out in a
    /// terminal: the function's own return sort and every parameter sort of
    /// every available function.
    pub fn check_coverage(&self, return_type: &TypeTag) -> Result<()> {
        let mut required: BTreeSet<&TypeTag> = BTreeSet::new();
        required.insert(return_type);
        for descriptor in self.by_alias.values() {
            required.extend(descriptor.params.iter());
        }

        let missing: Vec<String> = required
            .into_iter()
            .filter(|tag| !self.has_terminal(tag))
            .map(ToString::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SynthesisError::Configuration(format!(
                "no terminals available for sorts: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn descriptor(&self, alias: &str) -> Option<&FunctionDescriptor> {
        self.by_alias.get(alias)
    }

    /// Sort produced by `node`.
    pub fn type_of(&self, node: &ProgramNode) -> Result<TypeTag> {
        match node {
            ProgramNode::Terminal(Terminal::Literal(value)) => Ok(value.type_tag()),
            ProgramNode::Terminal(Terminal::Argument(name)) => self
                .arguments
                .lookup(&TypeTag::Wildcard)?
                .into_iter()
                .find(|entry| matches!(&entry.terminal, Terminal::Argument(n) if n == name))
                .map(|entry| entry.tag.clone())
                .ok_or_else(|| SynthesisError::Compile(format!("unbound argument {}", name))),
            ProgramNode::Call { operator, .. } => self
                .descriptor(operator)
                .map(|d| d.returns.clone())
                .ok_or_else(|| SynthesisError::Compile(format!("unknown operator {}", operator))),
        }
    }

    /// Verify that `node` produces `required` and that every call has the
    /// declared arity with correctly sorted children.
    pub fn check_well_typed(&self, node: &ProgramNode, required: &TypeTag) -> Result<()> {
        let actual = self.type_of(node)?;
        if !actual.satisfies(required) {
            return Err(SynthesisError::Compile(format!(
                "{} produces {}, expected {}",
                node, actual, required
            )));
        }
        if let ProgramNode::Call { operator, args } = node {
            let descriptor = self
                .descriptor(operator)
                .ok_or_else(|| SynthesisError::Compile(format!("unknown operator {}", operator)))?;
            if descriptor.arity() != args.len() {
                return Err(SynthesisError::Compile(format!(
                    "{} expects {} args, got {}",
                    operator,
                    descriptor.arity(),
                    args.len()
                )));
            }
            for (arg, param) in args.iter().zip(&descriptor.params) {
                self.check_well_typed(arg, param)?;
            }
        }
        Ok(())
    }
}
