use crate::engines::generation::gene_pool::GenePool;
use crate::error::{Result, SynthesisError};
use crate::types::{ProgramNode, TestCase, TypeTag};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Formal argument of a function: sort and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub ty: TypeTag,
    pub name: String,
}

impl Parameter {
    pub fn new(ty: TypeTag, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

/// Function record as stored on disk. Required tags are optional here so
/// that their absence is reported as a configuration error rather than a
/// parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionRecord {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto: Option<Vec<Parameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<TestCase>>,
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default)]
    pub gene_pool: Vec<GenePool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best: Option<ProgramNode>,
}

/// A function record that passed validation.
#[derive(Debug, Clone)]
pub struct FunctionSpec {
    pub name: String,
    pub return_type: TypeTag,
    pub proto: Vec<Parameter>,
    pub tests: Vec<TestCase>,
    pub modules: Vec<String>,
    pub gene_pool: Vec<GenePool>,
    pub best: Option<ProgramNode>,
}

impl FunctionRecord {
    /// Read a record from `.toml` or `.json`. An empty `name` is filled from
    /// the file stem.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut record: FunctionRecord = match extension(path)? {
            RecordFormat::Toml => toml::from_str(&contents)?,
            RecordFormat::Json => serde_json::from_str(&contents)?,
        };
        if record.name.is_empty() {
            record.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(record)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = match extension(path)? {
            RecordFormat::Toml => toml::to_string_pretty(self)?,
            RecordFormat::Json => serde_json::to_string_pretty(self)?,
        };
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(self) -> Result<FunctionSpec> {
        let name = self.name;
        let missing = |tag: &str| {
            SynthesisError::Configuration(format!(
                "function {}: missing required tag `{}`",
                name, tag
            ))
        };

        let return_type = self.return_type.ok_or_else(|| missing("type"))?;
        let proto = self.proto.ok_or_else(|| missing("proto"))?;
        let tests = self.tests.ok_or_else(|| missing("tests"))?;

        if return_type.is_wildcard() {
            return Err(SynthesisError::Configuration(format!(
                "function {}: return type must be a concrete sort",
                name
            )));
        }

        let mut seen = HashSet::new();
        for param in &proto {
            if param.ty.is_wildcard() {
                return Err(SynthesisError::Configuration(format!(
                    "function {}: argument {} must have a concrete sort",
                    name, param.name
                )));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(SynthesisError::Configuration(format!(
                    "function {}: duplicate argument {}",
                    name, param.name
                )));
            }
        }

        if tests.is_empty() {
            return Err(SynthesisError::Configuration(format!(
                "function {}: `tests` must contain at least one case",
                name
            )));
        }
        for (i, case) in tests.iter().enumerate() {
            if case.input.len() != proto.len() {
                return Err(SynthesisError::Configuration(format!(
                    "function {}: test {} has {} inputs, proto declares {}",
                    name,
                    i,
                    case.input.len(),
                    proto.len()
                )));
            }
        }

        for (i, pool) in self.gene_pool.iter().enumerate() {
            pool.validate().map_err(|e| {
                SynthesisError::Configuration(format!("function {}: gene pool {}: {}", name, i, e))
            })?;
        }

        Ok(FunctionSpec {
            name,
            return_type,
            proto,
            tests,
            modules: self.modules,
            gene_pool: self.gene_pool,
            best: self.best,
        })
    }
}

impl FunctionSpec {
    pub fn formal_args(&self) -> Vec<String> {
        self.proto.iter().map(|p| p.name.clone()).collect()
    }

    pub fn into_record(self) -> FunctionRecord {
        FunctionRecord {
            name: self.name,
            return_type: Some(self.return_type),
            proto: Some(self.proto),
            tests: Some(self.tests),
            modules: self.modules,
            gene_pool: self.gene_pool,
            best: self.best,
        }
    }
}

enum RecordFormat {
    Toml,
    Json,
}

fn extension(path: &Path) -> Result<RecordFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Ok(RecordFormat::Toml),
        Some("json") => Ok(RecordFormat::Json),
        _ => Err(SynthesisError::Configuration(format!(
            "unsupported record format: {}",
            path.display()
        ))),
    }
}
