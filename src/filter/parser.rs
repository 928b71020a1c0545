use super::node::{FilterNode, Operand};
use crate::context::Selector;
use crate::error::ParseError;
use crate::operator::pattern::compile_pattern;
use crate::operator::{OperandKind, Operator, OperatorRegistry};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;

/// Decode query text into a JSON value.
///
/// The text is trimmed and wrapped in braces unless it already starts with
/// `{` or `[`, so `"a": 1` reads as `{"a": 1}`. Strict JSON is tried first,
/// then JSON5, which also accepts unquoted `$operator` keys.
pub fn decode_text(text: &str) -> Result<Value, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::UnsupportedInput("empty query text"));
    }

    let source: Cow<'_, str> = if trimmed.starts_with(['{', '[']) {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(format!("{{{trimmed}}}"))
    };

    serde_json::from_str(&source).or_else(|strict| {
        json5::from_str::<Value>(&source).map_err(|_| ParseError::InvalidText(strict.to_string()))
    })
}

/// Compile a raw query value into a filter tree.
///
/// Objects and arrays become nodes; every other value passes through as a
/// literal operand. `context_disabled` forbids field selectors at this level.
pub fn parse(
    raw: &Value,
    registry: &OperatorRegistry,
    context_disabled: bool,
) -> Result<Operand, ParseError> {
    match raw {
        Value::Object(_) | Value::Array(_) => {
            Ok(parse_node(raw, registry, context_disabled)?.into())
        }
        other => Ok(Operand::Value(other.clone())),
    }
}

/// Compile an object or array into a single node.
pub fn parse_node(
    raw: &Value,
    registry: &OperatorRegistry,
    context_disabled: bool,
) -> Result<FilterNode, ParseError> {
    let map = match raw {
        Value::Object(map) => map,
        // a bare sequence is an implicit $or
        Value::Array(_) => {
            let or = implicit(registry, "$or")?;
            let operand = parse_operand(&or, raw, registry, context_disabled)?;
            return Ok(FilterNode::new(or, operand));
        }
        _ => return Err(ParseError::UnsupportedInput("query must be an object or an array")),
    };

    let mut parts = Vec::with_capacity(map.len());
    for (key, value) in map {
        if let Some(operator) = registry.get(key) {
            let operand = parse_operand(operator, value, registry, context_disabled)?;
            parts.push(FilterNode::new(Arc::clone(operator), operand));
        } else if context_disabled {
            return Err(ParseError::ContextDisabled { key: key.clone() });
        } else {
            parts.push(parse_selector(key, value, registry)?);
        }
    }

    group(parts, registry, None)
}

/// Compile the conditions listed under a field selector.
fn parse_selector(
    key: &str,
    inner: &Value,
    registry: &OperatorRegistry,
) -> Result<FilterNode, ParseError> {
    let conditions: Vec<(Arc<Operator>, &Value)> = match inner {
        Value::Array(items) => vec![(implicit(registry, implicit_list_operator(items))?, inner)],
        Value::Object(map) => map
            .iter()
            .map(|(name, value)| {
                let operator = registry
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ParseError::UnknownOperator { key: name.clone() })?;
                Ok::<_, ParseError>((operator, value))
            })
            .collect::<Result<_, _>>()?,
        _ => vec![(implicit(registry, "$eq")?, inner)],
    };

    let mut parts = Vec::with_capacity(conditions.len());
    for (operator, value) in conditions {
        let operand = parse_operand(&operator, value, registry, true)?;
        let is_value_reference =
            operator.is_right_handed() && operator.kind() == OperandKind::Context;
        let node = FilterNode::new(operator, operand);

        // {field: {$val: "other"}} compares the field with the other one
        if is_value_reference {
            parts.push(FilterNode::new(implicit(registry, "$eq")?, node.into()));
        } else {
            parts.push(node);
        }
    }

    group(parts, registry, Some(Selector::parse(key)))
}

/// Combine sibling conditions: one stays as is and takes the selector,
/// several share it through an implicit `$ctxAnd`.
fn group(
    mut parts: Vec<FilterNode>,
    registry: &OperatorRegistry,
    selector: Option<Selector>,
) -> Result<FilterNode, ParseError> {
    let mut node = match parts.len() {
        0 => return Err(ParseError::NoConditions),
        1 => parts.remove(0),
        _ => FilterNode::new(
            implicit(registry, "$ctxAnd")?,
            Operand::List(parts.into_iter().map(Operand::from).collect()),
        ),
    };

    if selector.is_some() {
        node.selector = selector;
    }
    Ok(node)
}

/// Parse an operand the way `operator` declares.
///
/// `selected` is true beneath a field selector, where an operator-kind operand
/// may not pick a new field.
pub fn parse_operand(
    operator: &Operator,
    raw: &Value,
    registry: &OperatorRegistry,
    selected: bool,
) -> Result<Operand, ParseError> {
    match operator.kind() {
        OperandKind::Array => parse_array(operator, raw, registry),
        OperandKind::Pattern => match raw {
            Value::Object(_) | Value::Array(_) => parse(raw, registry, selected),
            Value::String(text) => pattern(operator, text),
            other => pattern(operator, &other.to_string()),
        },
        OperandKind::Operator => parse_chained(operator, raw, registry, selected),
        OperandKind::Context => match raw {
            Value::String(text) => Ok(Operand::Selector(Selector::parse(text))),
            _ => Err(ParseError::ExpectedSelector {
                operator: operator.name().to_string(),
            }),
        },
        OperandKind::Value => parse(raw, registry, false),
    }
}

fn parse_array(
    operator: &Operator,
    raw: &Value,
    registry: &OperatorRegistry,
) -> Result<Operand, ParseError> {
    let Value::Array(items) = raw else {
        return Err(ParseError::ExpectedArray {
            operator: operator.name().to_string(),
        });
    };

    let min = operator.min_operands();
    if min > 0 && items.len() < min {
        return Err(ParseError::TooFewOperands {
            operator: operator.name().to_string(),
            min,
            got: items.len(),
        });
    }
    if let Some(max) = operator.max_operands()
        && items.len() > max
    {
        return Err(ParseError::TooManyOperands {
            operator: operator.name().to_string(),
            max,
            got: items.len(),
        });
    }

    let parts = items
        .iter()
        .map(|item| parse(item, registry, false))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Operand::List(parts))
}

fn pattern(operator: &Operator, text: &str) -> Result<Operand, ParseError> {
    compile_pattern(text)
        .map(Operand::Pattern)
        .map_err(|source| ParseError::InvalidPattern {
            operator: operator.name().to_string(),
            source,
        })
}

/// Operand of an operator-kind operator: always a node the current value is
/// handed on to.
fn parse_chained(
    operator: &Operator,
    raw: &Value,
    registry: &OperatorRegistry,
    selected: bool,
) -> Result<Operand, ParseError> {
    let mut node = match raw {
        Value::Object(_) => parse_node(raw, registry, selected)?,
        Value::Array(items) => {
            let implied = implicit(registry, implicit_list_operator(items))?;
            let operand = parse_operand(&implied, raw, registry, selected)?;
            FilterNode::new(implied, operand)
        }
        scalar => FilterNode::new(implicit(registry, "$eq")?, Operand::Value(scalar.clone())),
    };

    // a right-handed operand must not escape evaluation order
    if node.operator.is_right_handed() && !operator.is_right_handed() {
        node = FilterNode::new(implicit(registry, "$eq")?, node.into());
    }

    Ok(node.into())
}

/// `[{...}, {...}]` means any of the conditions, `[a, b]` any of the values.
fn implicit_list_operator(items: &[Value]) -> &'static str {
    match items.first() {
        Some(Value::Object(_) | Value::Array(_)) => "$ctxOr",
        _ => "$in",
    }
}

fn implicit(registry: &OperatorRegistry, name: &'static str) -> Result<Arc<Operator>, ParseError> {
    registry
        .get(name)
        .cloned()
        .ok_or(ParseError::MissingOperator(name))
}
