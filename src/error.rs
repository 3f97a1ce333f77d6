use thiserror::Error;

use crate::types::TypeTag;

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Lookup error: no entries for type {0}")]
    Lookup(TypeTag),

    #[error("No candidate for type {0}")]
    NoCandidate(TypeTag),

    #[error("Compile error: {0}")]
    Compile(String),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] ::config::ConfigError),
}

/// Failure of a single candidate invocation. Recovered by the evaluator as a
/// non-match; never surfaces through [`SynthesisError`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeFailure {
    #[error("{operator} expects {expected} args, got {actual}")]
    ArityMismatch {
        operator: String,
        expected: usize,
        actual: usize,
    },

    #[error("{operator}: expected {expected}, got {actual}")]
    TypeMismatch {
        operator: String,
        expected: TypeTag,
        actual: TypeTag,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow in {0}")]
    Overflow(String),

    #[error("unbound argument {0}")]
    UnboundArgument(String),

    #[error("step limit of {0} exceeded")]
    StepLimitExceeded(usize),

    #[error("call depth limit of {0} exceeded")]
    DepthLimitExceeded(usize),
}

pub type Result<T> = std::result::Result<T, SynthesisError>;
