use serde_json::Value;
use thiserror::Error;

/// Errors raised while building an operator definition or registry
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Invalid operator name '{0}': names must begin with '$' followed by word characters")]
    InvalidName(String),

    #[error("Unknown operand kind '{0}'. Valid kinds are: array, pattern, operator, context, value")]
    UnknownOperandKind(String),

    #[error("Operator {name} declares min {min} operands but max {max}")]
    InvalidArity { name: String, min: usize, max: usize },

    #[error("Alias {alias} points at unknown operator {target}")]
    UnknownAliasTarget { alias: String, target: String },
}

/// Errors raised while compiling a query into a filter tree
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid query text: {0}")]
    InvalidText(String),

    #[error("Unsupported query input: {0}")]
    UnsupportedInput(&'static str),

    #[error("No such operator: '{key}'")]
    UnknownOperator { key: String },

    #[error("Selector '{key}' is not allowed here: the context is already selected")]
    ContextDisabled { key: String },

    #[error("Query has no conditions")]
    NoConditions,

    #[error("{operator} expects an array operand")]
    ExpectedArray { operator: String },

    #[error("{operator} expects minimum {min} operands, got {got}")]
    TooFewOperands {
        operator: String,
        min: usize,
        got: usize,
    },

    #[error("{operator} expects maximum {max} operands, got {got}")]
    TooManyOperands {
        operator: String,
        max: usize,
        got: usize,
    },

    #[error("{operator} expects a selector string operand")]
    ExpectedSelector { operator: String },

    #[error("{operator} has an invalid pattern: {source}")]
    InvalidPattern {
        operator: String,
        #[source]
        source: PatternError,
    },

    #[error("Implicit operator {0} is missing from the registry")]
    MissingOperator(&'static str),
}

/// A `$regex` pattern could not be compiled
#[derive(Debug, Error)]
pub enum PatternError {
    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error("unsupported flag '{0}'")]
    Flag(char),
}

/// Failures raised from inside an operator's evaluation function
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("{operator} expects {expected}")]
    UnexpectedOperand {
        operator: &'static str,
        expected: &'static str,
    },

    #[error("Operator {0} is missing from the registry")]
    MissingOperator(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] PatternError),

    #[error("{0}")]
    Custom(String),

    #[error(transparent)]
    Nested(#[from] Box<MatchError>),
}

impl EvalError {
    pub fn custom(message: impl Into<String>) -> Self {
        EvalError::Custom(message.into())
    }
}

impl From<MatchError> for EvalError {
    fn from(err: MatchError) -> Self {
        EvalError::Nested(Box::new(err))
    }
}

/// An operator failed while a filter was being matched against a document.
///
/// Carries the failing operator, its operand and the context value at the
/// innermost node where evaluation broke down.
#[derive(Debug, Error)]
#[error("{operator} failed (operand: {operand}, context: {}): {source}", render_context(.context))]
pub struct MatchError {
    pub operator: String,
    pub operand: String,
    pub context: Option<Value>,
    #[source]
    pub source: EvalError,
}

fn render_context(context: &Option<Value>) -> String {
    match context {
        Some(value) => value.to_string(),
        None => "<absent>".to_string(),
    }
}

/// Top-level error used by the command line front-end
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Documents(#[from] crate::documents::DocumentError),

    #[error("{0}")]
    Usage(String),
}
