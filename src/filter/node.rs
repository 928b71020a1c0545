use crate::context::Selector;
use crate::operator::Operator;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A compiled operand
#[derive(Debug, Clone)]
pub enum Operand {
    /// A literal, or a value already produced by a right-handed operand
    Value(Value),
    /// A right-handed operand that produced nothing, e.g. `$val` on a missing field
    Absent,
    /// A single nested condition
    Node(Box<FilterNode>),
    /// Array operands; each element is a literal or a nested condition
    List(Vec<Operand>),
    /// A compiled `$regex` pattern
    Pattern(Regex),
    /// A selector resolved against the document at match time
    Selector(Selector),
}

impl Operand {
    /// The literal value; `None` for [`Operand::Absent`] and structured operands.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Operand::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&FilterNode> {
        match self {
            Operand::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Operand]> {
        match self {
            Operand::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_selector(&self) -> Option<&Selector> {
        match self {
            Operand::Selector(selector) => Some(selector),
            _ => None,
        }
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Value(value)
    }
}

impl From<FilterNode> for Operand {
    fn from(node: FilterNode) -> Self {
        Operand::Node(Box::new(node))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Value(value) => write!(f, "{value}"),
            Operand::Absent => f.write_str("absent"),
            Operand::Node(node) => write!(f, "{node}"),
            Operand::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Operand::Pattern(re) => write!(f, "/{}/", re.as_str()),
            Operand::Selector(selector) => write!(f, "{:?}", selector.as_str()),
        }
    }
}

/// One node of a compiled filter tree: an optional selector, the operator
/// and its parsed operand.
///
/// Nodes are built by the parser and are immutable once the parser hands
/// them out.
#[derive(Debug, Clone)]
pub struct FilterNode {
    pub(super) selector: Option<Selector>,
    pub(super) operator: Arc<Operator>,
    pub(super) operand: Operand,
}

impl FilterNode {
    pub(super) fn new(operator: Arc<Operator>, operand: Operand) -> Self {
        FilterNode {
            selector: None,
            operator,
            operand,
        }
    }

    pub fn selector(&self) -> Option<&Selector> {
        self.selector.as_ref()
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// Number of nodes in this subtree
    pub fn size(&self) -> usize {
        1 + operand_size(&self.operand)
    }
}

fn operand_size(operand: &Operand) -> usize {
    match operand {
        Operand::Node(node) => node.size(),
        Operand::List(items) => items.iter().map(operand_size).sum(),
        _ => 0,
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(selector) = &self.selector {
            write!(f, "{selector}: ")?;
        }
        write!(f, "{}({})", self.operator.name(), self.operand)
    }
}
