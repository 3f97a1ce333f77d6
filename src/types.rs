use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Symbolic sort label used to guide typed generation.
///
/// `*` is the wildcard and selects across every sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeTag {
    Wildcard,
    Sort(String),
}

impl TypeTag {
    pub const WILDCARD: &'static str = "*";

    pub fn sort(name: impl Into<String>) -> Self {
        let name = name.into();
        if name == Self::WILDCARD {
            TypeTag::Wildcard
        } else {
            TypeTag::Sort(name)
        }
    }

    pub fn num() -> Self {
        TypeTag::Sort("num".to_string())
    }

    pub fn boolean() -> Self {
        TypeTag::Sort("bool".to_string())
    }

    pub fn sym() -> Self {
        TypeTag::Sort("sym".to_string())
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, TypeTag::Wildcard)
    }

    /// True when a value of sort `self` may fill a slot requiring `required`.
    pub fn satisfies(&self, required: &TypeTag) -> bool {
        required.is_wildcard() || self == required
    }
}

impl From<String> for TypeTag {
    fn from(value: String) -> Self {
        TypeTag::sort(value)
    }
}

impl From<&str> for TypeTag {
    fn from(value: &str) -> Self {
        TypeTag::sort(value)
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        match tag {
            TypeTag::Wildcard => TypeTag::WILDCARD.to_string(),
            TypeTag::Sort(name) => name,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Wildcard => f.write_str(Self::WILDCARD),
            TypeTag::Sort(name) => f.write_str(name),
        }
    }
}

/// Runtime value flowing through an interpreted program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Symbol(String),
}

impl Value {
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Integer(_) | Value::Float(_) => TypeTag::num(),
            Value::Bool(_) => TypeTag::boolean(),
            Value::Symbol(_) => TypeTag::sym(),
        }
    }

    /// Equality used to compare an actual output against an expected one.
    /// Integers and floats compare numerically.
    pub fn matches(&self, expected: &Value) -> bool {
        match (self, expected) {
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                (*a as f64) == *b
            }
            _ => self == expected,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Symbol(s) => write!(f, "'{}", s),
        }
    }
}

/// Leaf of a program tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminal {
    Literal(Value),
    Argument(String),
}

/// Node of a candidate expression tree. Trees are never edited in place;
/// a pool replaces a whole member when a better candidate arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramNode {
    Terminal(Terminal),
    Call {
        operator: String,
        args: Vec<ProgramNode>,
    },
}

impl ProgramNode {
    pub fn literal(value: Value) -> Self {
        ProgramNode::Terminal(Terminal::Literal(value))
    }

    pub fn argument(name: impl Into<String>) -> Self {
        ProgramNode::Terminal(Terminal::Argument(name.into()))
    }

    pub fn call(operator: impl Into<String>, args: Vec<ProgramNode>) -> Self {
        ProgramNode::Call {
            operator: operator.into(),
            args,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgramNode::Terminal(_))
    }

    /// Total node count.
    pub fn size(&self) -> usize {
        match self {
            ProgramNode::Terminal(_) => 1,
            ProgramNode::Call { args, .. } => 1 + args.iter().map(ProgramNode::size).sum::<usize>(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            ProgramNode::Terminal(_) => 1,
            ProgramNode::Call { args, .. } => {
                1 + args.iter().map(ProgramNode::depth).max().unwrap_or(0)
            }
        }
    }

    /// Render as an s-expression, truncated to `max_len` characters.
    pub fn to_formula_short(&self, max_len: usize) -> String {
        let full = self.to_string();
        if full.chars().count() <= max_len {
            full
        } else {
            let head: String = full.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", head)
        }
    }
}

impl fmt::Display for ProgramNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramNode::Terminal(Terminal::Literal(value)) => write!(f, "{}", value),
            ProgramNode::Terminal(Terminal::Argument(name)) => f.write_str(name),
            ProgramNode::Call { operator, args } => {
                write!(f, "({}", operator)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// One input/output example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: Vec<Value>,
    pub expected: Value,
}

impl TestCase {
    pub fn new(input: Vec<Value>, expected: Value) -> Self {
        Self { input, expected }
    }
}

/// Summary of one candidate's run over the test set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessResult {
    /// Fraction of tests matched, in `[0, 1]`.
    pub correctness: f64,
    /// Wall-clock time summed over matched tests only.
    pub latency: Duration,
    /// Node count of the tree.
    pub size: usize,
}

impl FitnessResult {
    pub fn new(correctness: f64, latency: Duration, size: usize) -> Self {
        Self {
            correctness,
            latency,
            size,
        }
    }

    /// Result of a candidate that matched nothing.
    pub fn failed(size: usize) -> Self {
        Self::new(0.0, Duration::ZERO, size)
    }

    pub fn is_perfect(&self) -> bool {
        self.correctness >= 1.0
    }
}
