//! The built-in operator catalogue

use super::values::{compare, is_empty, loose_eq, number_value, round_half_up, to_number, truthy};
use super::{EvalResult, OperandKind, Operator, OperatorRegistry};
use crate::error::EvalError;
use crate::filter::{FilterNode, Operand};
use crate::operator::pattern::compile_pattern;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

type Builtin = fn(Option<&Value>, &Operand, &Value, &OperatorRegistry) -> EvalResult;

fn op(name: &'static str, kind: OperandKind, evaluate: Builtin) -> Operator {
    Operator::unchecked(name, kind, Arc::new(evaluate))
}

fn array_op(name: &'static str, min: usize, max: usize, evaluate: Builtin) -> Operator {
    let mut operator = op(name, OperandKind::Array, evaluate);
    operator.min = min;
    operator.max = max;
    operator
}

/// Every built-in operator, ready to be registered
pub(super) fn catalogue() -> Vec<Operator> {
    vec![
        op("$eq", OperandKind::Value, eq),
        op("$ne", OperandKind::Value, ne),
        op("$gt", OperandKind::Value, gt),
        op("$gte", OperandKind::Value, gte),
        op("$lt", OperandKind::Value, lt),
        op("$lte", OperandKind::Value, lte),
        array_op("$mod", 2, 2, modulo),
        op("$regex", OperandKind::Pattern, regex),
        op("$exists", OperandKind::Value, exists),
        op("$empty", OperandKind::Value, empty),
        array_op("$in", 2, 0, any_in),
        array_op("$nin", 2, 0, none_in),
        array_op("$all", 2, 0, all_in),
        op("$val", OperandKind::Context, val).right_handed(),
        op("$round", OperandKind::Operator, |ctx, _, _, _| {
            Ok(rounded(ctx, round_half_up))
        }),
        op("$floor", OperandKind::Operator, |ctx, _, _, _| {
            Ok(rounded(ctx, f64::floor))
        }),
        op("$ceil", OperandKind::Operator, |ctx, _, _, _| {
            Ok(rounded(ctx, f64::ceil))
        }),
        op("$roundRH", OperandKind::Context, |_, operand, doc, _| {
            Ok(rounded(selected(operand, doc, "$roundRH")?, round_half_up))
        })
        .right_handed(),
        op("$floorRH", OperandKind::Context, |_, operand, doc, _| {
            Ok(rounded(selected(operand, doc, "$floorRH")?, f64::floor))
        })
        .right_handed(),
        op("$ceilRH", OperandKind::Context, |_, operand, doc, _| {
            Ok(rounded(selected(operand, doc, "$ceilRH")?, f64::ceil))
        })
        .right_handed(),
        op("$not", OperandKind::Operator, not).right_handed(),
        array_op("$and", 2, 0, and),
        array_op("$or", 2, 0, or),
        array_op("$nor", 2, 0, nor),
        array_op("$ctxAnd", 2, 0, ctx_and),
        array_op("$ctxOr", 2, 0, ctx_or),
        op("$sub", OperandKind::Value, sub),
    ]
}

fn boolean(b: bool) -> EvalResult {
    Ok(Some(Value::Bool(b)))
}

/// The literal operand. `None` when a right-handed operand produced nothing.
fn literal<'a>(
    operand: &'a Operand,
    operator: &'static str,
) -> Result<Option<&'a Value>, EvalError> {
    match operand {
        Operand::Value(value) => Ok(Some(value)),
        Operand::Absent => Ok(None),
        _ => Err(EvalError::UnexpectedOperand {
            operator,
            expected: "a literal operand",
        }),
    }
}

fn list<'a>(operand: &'a Operand, operator: &'static str) -> Result<&'a [Operand], EvalError> {
    operand.as_list().ok_or(EvalError::UnexpectedOperand {
        operator,
        expected: "an array operand",
    })
}

fn node<'a>(operand: &'a Operand, operator: &'static str) -> Result<&'a FilterNode, EvalError> {
    operand.as_node().ok_or(EvalError::UnexpectedOperand {
        operator,
        expected: "filter operands",
    })
}

fn selected<'a>(
    operand: &Operand,
    document: &'a Value,
    operator: &'static str,
) -> Result<Option<&'a Value>, EvalError> {
    match operand {
        Operand::Selector(selector) => Ok(selector.resolve(document)),
        _ => Err(EvalError::UnexpectedOperand {
            operator,
            expected: "a selector operand",
        }),
    }
}

fn rounded(value: Option<&Value>, round: fn(f64) -> f64) -> Option<Value> {
    to_number(value).and_then(|n| number_value(round(n)))
}

/// Structural equality: arrays pairwise, objects with identical key sets,
/// scalars loosely.
pub(crate) fn deep_eq(context: Option<&Value>, operand: &Value) -> bool {
    match operand {
        Value::Array(expected) => match context {
            Some(Value::Array(actual)) => {
                actual.len() == expected.len()
                    && actual
                        .iter()
                        .zip(expected)
                        .all(|(a, e)| deep_eq(Some(a), e))
            }
            _ => false,
        },
        Value::Object(expected) => match context {
            Some(Value::Object(actual)) => {
                actual.keys().all(|key| expected.contains_key(key))
                    && expected
                        .iter()
                        .all(|(key, e)| actual.get(key).is_some_and(|a| deep_eq(Some(a), e)))
            }
            _ => false,
        },
        scalar => loose_eq(context, Some(scalar)),
    }
}

fn eq(ctx: Option<&Value>, operand: &Operand, _: &Value, _: &OperatorRegistry) -> EvalResult {
    boolean(match literal(operand, "$eq")? {
        Some(expected) => deep_eq(ctx, expected),
        None => loose_eq(ctx, None),
    })
}

fn ne(ctx: Option<&Value>, operand: &Operand, doc: &Value, reg: &OperatorRegistry) -> EvalResult {
    let equal = reg.call("$eq", ctx, operand, doc)?;
    boolean(!truthy(equal.as_ref()))
}

fn ordered(
    ctx: Option<&Value>,
    operand: &Operand,
    operator: &'static str,
    accept: fn(Ordering) -> bool,
) -> EvalResult {
    let operand = literal(operand, operator)?;
    boolean(compare(ctx, operand).is_some_and(accept))
}

fn gt(ctx: Option<&Value>, operand: &Operand, _: &Value, _: &OperatorRegistry) -> EvalResult {
    ordered(ctx, operand, "$gt", Ordering::is_gt)
}

fn gte(ctx: Option<&Value>, operand: &Operand, _: &Value, _: &OperatorRegistry) -> EvalResult {
    ordered(ctx, operand, "$gte", Ordering::is_ge)
}

fn lt(ctx: Option<&Value>, operand: &Operand, _: &Value, _: &OperatorRegistry) -> EvalResult {
    ordered(ctx, operand, "$lt", Ordering::is_lt)
}

fn lte(ctx: Option<&Value>, operand: &Operand, _: &Value, _: &OperatorRegistry) -> EvalResult {
    ordered(ctx, operand, "$lte", Ordering::is_le)
}

fn modulo(ctx: Option<&Value>, operand: &Operand, _: &Value, _: &OperatorRegistry) -> EvalResult {
    let operands = list(operand, "$mod")?;
    let [divisor, remainder] = operands else {
        return Err(EvalError::UnexpectedOperand {
            operator: "$mod",
            expected: "exactly 2 operands",
        });
    };
    let divisor = to_number(literal(divisor, "$mod")?);
    let remainder = literal(remainder, "$mod")?;

    let result = match (to_number(ctx), divisor) {
        (Some(n), Some(d)) => n % d,
        _ => return boolean(false),
    };
    boolean(remainder.and_then(Value::as_f64).is_some_and(|r| r == result))
}

fn regex(ctx: Option<&Value>, operand: &Operand, _: &Value, _: &OperatorRegistry) -> EvalResult {
    let Some(Value::String(text)) = ctx else {
        return boolean(false);
    };

    match operand {
        Operand::Pattern(re) => boolean(re.is_match(text)),
        Operand::Value(Value::String(source)) => boolean(compile_pattern(source)?.is_match(text)),
        // a missing pattern matches any string
        Operand::Absent => boolean(true),
        _ => Err(EvalError::UnexpectedOperand {
            operator: "$regex",
            expected: "a pattern operand",
        }),
    }
}

fn exists(ctx: Option<&Value>, operand: &Operand, _: &Value, _: &OperatorRegistry) -> EvalResult {
    let present = Value::Bool(ctx.is_some());
    boolean(loose_eq(Some(&present), literal(operand, "$exists")?))
}

fn empty(ctx: Option<&Value>, operand: &Operand, _: &Value, _: &OperatorRegistry) -> EvalResult {
    let wanted = truthy(literal(operand, "$empty")?);
    boolean(is_empty(ctx) == wanted)
}

/// The context as a list of candidates: arrays as-is, anything else as one element.
fn candidates(ctx: Option<&Value>) -> Vec<Option<&Value>> {
    match ctx {
        Some(Value::Array(items)) => items.iter().map(Some).collect(),
        other => vec![other],
    }
}

fn equals(
    reg: &OperatorRegistry,
    ctx: Option<&Value>,
    operand: &Operand,
    doc: &Value,
) -> Result<bool, EvalError> {
    Ok(truthy(reg.call("$eq", ctx, operand, doc)?.as_ref()))
}

fn any_in(ctx: Option<&Value>, operand: &Operand, doc: &Value, reg: &OperatorRegistry) -> EvalResult {
    let operands = list(operand, "$in")?;
    let values = candidates(ctx);
    for expected in operands {
        for value in &values {
            if equals(reg, *value, expected, doc)? {
                return boolean(true);
            }
        }
    }
    boolean(false)
}

fn none_in(ctx: Option<&Value>, operand: &Operand, doc: &Value, reg: &OperatorRegistry) -> EvalResult {
    let found = any_in(ctx, operand, doc, reg)?;
    boolean(!truthy(found.as_ref()))
}

fn all_in(ctx: Option<&Value>, operand: &Operand, doc: &Value, reg: &OperatorRegistry) -> EvalResult {
    let operands = list(operand, "$all")?;
    for value in candidates(ctx) {
        let mut found = false;
        for expected in operands {
            if equals(reg, value, expected, doc)? {
                found = true;
                break;
            }
        }
        if !found {
            return boolean(false);
        }
    }
    boolean(true)
}

fn val(_: Option<&Value>, operand: &Operand, doc: &Value, _: &OperatorRegistry) -> EvalResult {
    Ok(selected(operand, doc, "$val")?.cloned())
}

fn not(_: Option<&Value>, operand: &Operand, _: &Value, _: &OperatorRegistry) -> EvalResult {
    boolean(!truthy(literal(operand, "$not")?))
}

fn and(_: Option<&Value>, operand: &Operand, doc: &Value, reg: &OperatorRegistry) -> EvalResult {
    for child in list(operand, "$and")? {
        if !node(child, "$and")?.matches(None, doc, reg)? {
            return boolean(false);
        }
    }
    boolean(true)
}

/// True when any child filter matches the document.
fn any_child(
    operand: &Operand,
    doc: &Value,
    reg: &OperatorRegistry,
    operator: &'static str,
) -> Result<bool, EvalError> {
    for child in list(operand, operator)? {
        if node(child, operator)?.matches(None, doc, reg)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn or(_: Option<&Value>, operand: &Operand, doc: &Value, reg: &OperatorRegistry) -> EvalResult {
    boolean(any_child(operand, doc, reg, "$or")?)
}

fn nor(_: Option<&Value>, operand: &Operand, doc: &Value, reg: &OperatorRegistry) -> EvalResult {
    boolean(!any_child(operand, doc, reg, "$nor")?)
}

fn ctx_and(ctx: Option<&Value>, operand: &Operand, doc: &Value, reg: &OperatorRegistry) -> EvalResult {
    for child in list(operand, "$ctxAnd")? {
        if !node(child, "$ctxAnd")?.matches(ctx, doc, reg)? {
            return boolean(false);
        }
    }
    boolean(true)
}

fn ctx_or(ctx: Option<&Value>, operand: &Operand, doc: &Value, reg: &OperatorRegistry) -> EvalResult {
    for child in list(operand, "$ctxOr")? {
        if node(child, "$ctxOr")?.matches(ctx, doc, reg)? {
            return boolean(true);
        }
    }
    boolean(false)
}

fn sub(ctx: Option<&Value>, operand: &Operand, doc: &Value, _: &OperatorRegistry) -> EvalResult {
    let inner = node(operand, "$sub")?;
    let subtrahend = inner.selector().and_then(|selector| selector.resolve(doc));

    Ok(match (to_number(ctx), to_number(subtrahend)) {
        (Some(a), Some(b)) => number_value(a - b),
        _ => None,
    })
}
