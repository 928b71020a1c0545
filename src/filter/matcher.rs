use super::node::{FilterNode, Operand};
use crate::error::{EvalError, MatchError};
use crate::operator::OperatorRegistry;
use crate::operator::values::truthy;
use serde_json::Value;

impl FilterNode {
    /// Evaluate this node against `document`.
    ///
    /// `context` is the value selected so far. When it is `None` and the node
    /// carries a selector, the selector is resolved against the document.
    ///
    /// The result is whatever the operator produced: a boolean for
    /// conditions, a value for right-handed and chaining operators.
    pub fn evaluate(
        &self,
        context: Option<&Value>,
        document: &Value,
        registry: &OperatorRegistry,
    ) -> Result<Option<Value>, MatchError> {
        let context = match (context, &self.selector) {
            (None, Some(selector)) => selector.resolve(document),
            (context, _) => context,
        };

        match &self.operand {
            Operand::Node(inner)
                if self.operator.is_right_handed() || inner.operator.is_right_handed() =>
            {
                // right-handed operand: resolve it to a value first
                let value = inner.evaluate(context, document, registry)?;
                let operand = value.map_or(Operand::Absent, Operand::Value);
                self.operator
                    .evaluate(context, &operand, document, registry)
                    .map_err(|err| self.failure(context, err))
            }
            Operand::Node(inner) => {
                // chaining: this operator produces the context of the next one
                let next = self
                    .operator
                    .evaluate(context, &self.operand, document, registry)
                    .map_err(|err| self.failure(context, err))?;
                inner.evaluate(next.as_ref(), document, registry)
            }
            operand => self
                .operator
                .evaluate(context, operand, document, registry)
                .map_err(|err| self.failure(context, err)),
        }
    }

    /// Evaluate and reduce the result to a yes/no answer.
    pub fn matches(
        &self,
        context: Option<&Value>,
        document: &Value,
        registry: &OperatorRegistry,
    ) -> Result<bool, MatchError> {
        Ok(truthy(self.evaluate(context, document, registry)?.as_ref()))
    }

    fn failure(&self, context: Option<&Value>, source: EvalError) -> MatchError {
        match source {
            EvalError::Nested(inner) => *inner,
            source => MatchError {
                operator: self.operator.name().to_string(),
                operand: self.operand.to_string(),
                context: context.cloned(),
                source,
            },
        }
    }
}
