use super::node::FilterNode;
use super::parser::{decode_text, parse_node};
use crate::error::{MatchError, ParseError};
use crate::operator::{OperatorRegistry, default_registry};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A compiled filter together with the registry it was compiled against.
///
/// Matching never mutates the tree, so a `Filter` can be shared between
/// threads and reused for any number of documents.
#[derive(Debug, Clone)]
pub struct Filter {
    root: FilterNode,
    registry: Arc<OperatorRegistry>,
}

impl Filter {
    /// Compile query text using the default operators.
    pub fn create(text: &str) -> Result<Self, ParseError> {
        Self::create_with(text, default_registry())
    }

    /// Compile query text using a custom registry.
    pub fn create_with(text: &str, registry: Arc<OperatorRegistry>) -> Result<Self, ParseError> {
        let raw = decode_text(text)?;
        Self::from_value_with(&raw, registry)
    }

    /// Compile an already decoded query using the default operators.
    pub fn from_value(raw: &Value) -> Result<Self, ParseError> {
        Self::from_value_with(raw, default_registry())
    }

    pub fn from_value_with(raw: &Value, registry: Arc<OperatorRegistry>) -> Result<Self, ParseError> {
        let root = parse_node(raw, &registry, false)?;
        Ok(Filter { root, registry })
    }

    /// Match a document, starting with no selected context.
    pub fn matches(&self, document: &Value) -> Result<bool, MatchError> {
        self.root.matches(None, document, &self.registry)
    }

    /// Match a document, starting from an already selected context value.
    pub fn matches_in(&self, context: &Value, document: &Value) -> Result<bool, MatchError> {
        self.root.matches(Some(context), document, &self.registry)
    }

    /// Raw evaluation result of the root node
    pub fn evaluate(
        &self,
        context: Option<&Value>,
        document: &Value,
    ) -> Result<Option<Value>, MatchError> {
        self.root.evaluate(context, document, &self.registry)
    }

    pub fn root(&self) -> &FilterNode {
        &self.root
    }

    pub fn registry(&self) -> &Arc<OperatorRegistry> {
        &self.registry
    }
}

impl FromStr for Filter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::create(s)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
