//! Operator definitions
//!
//! An [`Operator`] is a plain record: a `$`-prefixed name, the kind of operand
//! it parses, arity bounds for array operands, whether it is right-handed, and
//! the function that evaluates it. Built-in and user-supplied operators are
//! constructed the same way and collected in an [`OperatorRegistry`].

use crate::error::{DefinitionError, EvalError};
use crate::filter::Operand;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

mod builtins;
pub mod pattern;
mod registry;
pub mod values;

pub use registry::{OperatorRegistry, default_registry};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$\w+$").expect("valid operator name regex"));

/// Result of evaluating an operator: a value, or `None` when the result is absent
pub type EvalResult = Result<Option<Value>, EvalError>;

/// Evaluation function shared by every operator.
///
/// Arguments are `(context, operand, document, registry)`.
pub type EvalFn =
    Arc<dyn Fn(Option<&Value>, &Operand, &Value, &OperatorRegistry) -> EvalResult + Send + Sync>;

/// How an operator's operand is parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperandKind {
    /// A sequence, each element compiled recursively; arity is checked
    Array,
    /// A regular expression, optionally written as `/body/flags`
    Pattern,
    /// A nested operator the current value is handed on to
    Operator,
    /// A literal selector string
    Context,
    /// Anything; compiled recursively without special handling
    Value,
}

impl OperandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperandKind::Array => "array",
            OperandKind::Pattern => "pattern",
            OperandKind::Operator => "operator",
            OperandKind::Context => "context",
            OperandKind::Value => "value",
        }
    }
}

impl FromStr for OperandKind {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "array" => Ok(OperandKind::Array),
            "pattern" | "regex" => Ok(OperandKind::Pattern),
            "operator" => Ok(OperandKind::Operator),
            "context" => Ok(OperandKind::Context),
            "value" => Ok(OperandKind::Value),
            _ => Err(DefinitionError::UnknownOperandKind(s.to_string())),
        }
    }
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of an operator, as it would be stored alongside
/// filter definitions. The evaluation function is supplied separately.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorSpec {
    pub name: String,
    #[serde(default)]
    pub operand_kind: Option<String>,
    #[serde(default)]
    pub operand_count_min: Option<usize>,
    #[serde(default)]
    pub operand_count_max: Option<usize>,
    #[serde(default)]
    pub right_handed: bool,
}

/// A named operator of the query language
#[derive(Clone)]
pub struct Operator {
    name: String,
    kind: OperandKind,
    min: usize,
    max: usize,
    right_handed: bool,
    evaluate: EvalFn,
}

impl Operator {
    /// Create an operator, validating its name.
    pub fn new<F>(name: &str, kind: OperandKind, evaluate: F) -> Result<Self, DefinitionError>
    where
        F: Fn(Option<&Value>, &Operand, &Value, &OperatorRegistry) -> EvalResult
            + Send
            + Sync
            + 'static,
    {
        validate_name(name)?;
        Ok(Self::unchecked(name, kind, Arc::new(evaluate)))
    }

    /// Build an operator from a stored spec and an evaluation function.
    ///
    /// A missing operand kind defaults to `value`.
    pub fn create<F>(spec: &OperatorSpec, evaluate: F) -> Result<Self, DefinitionError>
    where
        F: Fn(Option<&Value>, &Operand, &Value, &OperatorRegistry) -> EvalResult
            + Send
            + Sync
            + 'static,
    {
        let kind = match spec.operand_kind.as_deref() {
            Some(kind) => kind.parse()?,
            None => OperandKind::Value,
        };

        let operator = Operator::new(&spec.name, kind, evaluate)?.with_arity(
            spec.operand_count_min.unwrap_or(0),
            spec.operand_count_max.unwrap_or(0),
        )?;

        Ok(if spec.right_handed {
            operator.right_handed()
        } else {
            operator
        })
    }

    pub(crate) fn unchecked(name: &str, kind: OperandKind, evaluate: EvalFn) -> Self {
        Operator {
            name: name.to_string(),
            kind,
            min: 0,
            max: 0,
            right_handed: false,
            evaluate,
        }
    }

    /// Set array arity bounds. Zero means "no bound".
    pub fn with_arity(mut self, min: usize, max: usize) -> Result<Self, DefinitionError> {
        if max > 0 && min > max {
            return Err(DefinitionError::InvalidArity {
                name: self.name,
                min,
                max,
            });
        }
        self.min = min;
        self.max = max;
        Ok(self)
    }

    /// Mark the operator right-handed: its result is a value fed to the
    /// enclosing operator rather than a condition.
    pub fn right_handed(mut self) -> Self {
        self.right_handed = true;
        self
    }

    /// Copy of this operator registered under another name
    pub fn renamed(&self, name: &str) -> Result<Self, DefinitionError> {
        validate_name(name)?;
        Ok(Operator {
            name: name.to_string(),
            ..self.clone()
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OperandKind {
        self.kind
    }

    pub fn min_operands(&self) -> usize {
        self.min
    }

    pub fn max_operands(&self) -> Option<usize> {
        (self.max > 0).then_some(self.max)
    }

    pub fn is_right_handed(&self) -> bool {
        self.right_handed
    }

    /// Declarative description of this operator
    pub fn spec(&self) -> OperatorSpec {
        OperatorSpec {
            name: self.name.clone(),
            operand_kind: Some(self.kind.as_str().to_string()),
            operand_count_min: (self.min > 0).then_some(self.min),
            operand_count_max: self.max_operands(),
            right_handed: self.right_handed,
        }
    }

    pub fn evaluate(
        &self,
        context: Option<&Value>,
        operand: &Operand,
        document: &Value,
        registry: &OperatorRegistry,
    ) -> EvalResult {
        (self.evaluate)(context, operand, document, registry)
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("right_handed", &self.right_handed)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn validate_name(name: &str) -> Result<(), DefinitionError> {
    if NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(DefinitionError::InvalidName(name.to_string()))
    }
}
