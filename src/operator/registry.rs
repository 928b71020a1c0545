use super::{EvalResult, Operator, builtins};
use crate::error::{DefinitionError, EvalError};
use crate::filter::Operand;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

static DEFAULT_REGISTRY: LazyLock<Arc<OperatorRegistry>> =
    LazyLock::new(|| Arc::new(OperatorRegistry::create_defaults()));

/// The process-wide registry of built-in operators.
///
/// Initialized on first use and never mutated afterwards; extend a clone of
/// it instead.
pub fn default_registry() -> Arc<OperatorRegistry> {
    Arc::clone(&DEFAULT_REGISTRY)
}

/// Operators by name
#[derive(Debug, Clone, Default)]
pub struct OperatorRegistry {
    operators: HashMap<String, Arc<Operator>>,
}

impl OperatorRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in operator set
    pub fn create_defaults() -> Self {
        let mut registry = Self::new();
        for operator in builtins::catalogue() {
            registry.insert(operator);
        }
        registry
    }

    /// Add or replace an operator, returning the one it replaced.
    pub fn insert(&mut self, operator: Operator) -> Option<Arc<Operator>> {
        self.operators
            .insert(operator.name().to_string(), Arc::new(operator))
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, operator: Operator) -> Self {
        self.insert(operator);
        self
    }

    /// Register `alias` as another name for the existing operator `target`.
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<(), DefinitionError> {
        let operator = self
            .get(target)
            .ok_or_else(|| DefinitionError::UnknownAliasTarget {
                alias: alias.to_string(),
                target: target.to_string(),
            })?
            .renamed(alias)?;
        self.insert(operator);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Operator>> {
        self.operators.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operators.contains_key(name)
    }

    /// Evaluate the operator registered as `name`.
    ///
    /// This is how operator bodies delegate to each other, so overriding
    /// `$eq` also changes `$ne`, `$in`, `$nin` and `$all`.
    pub fn call(
        &self,
        name: &str,
        context: Option<&Value>,
        operand: &Operand,
        document: &Value,
    ) -> EvalResult {
        let operator = self
            .get(name)
            .ok_or_else(|| EvalError::MissingOperator(name.to_string()))?;
        operator.evaluate(context, operand, document, self)
    }

    /// Operator names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Operators sorted by name
    pub fn operators(&self) -> Vec<&Arc<Operator>> {
        let mut operators: Vec<&Arc<Operator>> = self.operators.values().collect();
        operators.sort_by(|a, b| a.name().cmp(b.name()));
        operators
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}
