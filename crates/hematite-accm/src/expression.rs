//! AND/OR composition of predicates and sub-expressions.
//!
//! Expressions are compiled fresh per session from a tree, so recursion depth
//! is bounded by the compiler and there is no cycle risk. Evaluation computes
//! every child before folding — each sub-result is traced for auditing, so no
//! short-circuiting.

use crate::argument::Argument;
use hematite_types::ClassificationScale;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;
use uuid::Uuid;

/// Boolean combinator for an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpressionOperator {
    And,
    Or,
}

fn new_expression_id() -> String {
    Uuid::new_v4().to_string()
}

/// A boolean tree over [`Argument`]s.
///
/// An `AND` over an empty predicate and child set is vacuously `true` ("no
/// further restriction"); an empty `OR` is `false`. The `id` is an opaque
/// stable token for logging, with no semantic meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    #[serde(default = "new_expression_id")]
    pub id: String,
    pub operator: ExpressionOperator,
    #[serde(default)]
    pub expressions: Vec<Expression>,
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

impl Expression {
    pub fn new(operator: ExpressionOperator) -> Self {
        Self {
            id: new_expression_id(),
            operator,
            expressions: Vec::new(),
            arguments: Vec::new(),
        }
    }

    /// An empty `AND` node (vacuously true).
    pub fn and() -> Self {
        Self::new(ExpressionOperator::And)
    }

    /// An empty `OR` node (vacuously false).
    pub fn or() -> Self {
        Self::new(ExpressionOperator::Or)
    }

    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expressions.push(expression);
        self
    }

    /// Evaluates the tree against a document.
    ///
    /// Every child expression and argument is evaluated; the fold happens
    /// over the collected results.
    pub fn evaluate(&self, doc: &Value, scale: &ClassificationScale) -> bool {
        let mut results = Vec::with_capacity(self.expressions.len() + self.arguments.len());
        for expression in &self.expressions {
            results.push(expression.evaluate(doc, scale));
        }
        for argument in &self.arguments {
            results.push(argument.evaluate(doc, scale));
        }
        let result = match self.operator {
            ExpressionOperator::And => results.iter().all(|r| *r),
            ExpressionOperator::Or => results.iter().any(|r| *r),
        };
        trace!(
            id = %self.id,
            operator = ?self.operator,
            children = results.len(),
            result,
            "expression evaluated"
        );
        result
    }
}
