//! Per-type bundles of create/read/update/delete rule lists.
//!
//! A [`TypeRestriction`] is scoped to a document type by a [`TypeMatch`]:
//! an exact name, the wildcard `*`, or a regular expression. Patterns are
//! compiled once at construction; the scan path never touches the regex
//! compiler.

use crate::argument::Argument;
use crate::error::AccmError;
use crate::expression::Expression;
use hematite_types::{ClassificationScale, GraphKind, RecordAction};
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::trace;

// ============================================================================
// TypeMatch
// ============================================================================

/// How a restriction is scoped to document type names.
#[derive(Debug, Clone)]
pub enum TypeMatch {
    /// Matches one type name exactly.
    Exact(String),
    /// Matches every type name. Exact and pattern matches take priority.
    Wildcard,
    /// Matches type names against an anchored regular expression.
    Pattern { source: String, regex: Regex },
}

impl TypeMatch {
    /// Parses a matcher from its string form.
    ///
    /// `*` is the wildcard; a plain identifier is an exact match; anything
    /// else is compiled as an anchored regular expression.
    pub fn parse(pattern: &str) -> Result<Self, AccmError> {
        if pattern == "*" {
            return Ok(TypeMatch::Wildcard);
        }
        let plain = pattern
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if plain && !pattern.is_empty() {
            return Ok(TypeMatch::Exact(pattern.to_string()));
        }
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            AccmError::MalformedPattern {
                pattern: pattern.to_string(),
                source: Box::new(e),
            }
        })?;
        Ok(TypeMatch::Pattern {
            source: pattern.to_string(),
            regex,
        })
    }

    /// An exact matcher for `name`.
    pub fn exact(name: impl Into<String>) -> Self {
        TypeMatch::Exact(name.into())
    }

    /// Whether this matcher covers `type_name`.
    pub fn matches(&self, type_name: &str) -> bool {
        match self {
            TypeMatch::Exact(name) => name == type_name,
            TypeMatch::Wildcard => true,
            TypeMatch::Pattern { regex, .. } => regex.is_match(type_name),
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, TypeMatch::Exact(_))
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, TypeMatch::Wildcard)
    }

    /// The string form this matcher was parsed from.
    pub fn as_str(&self) -> &str {
        match self {
            TypeMatch::Exact(name) => name,
            TypeMatch::Wildcard => "*",
            TypeMatch::Pattern { source, .. } => source,
        }
    }
}

impl PartialEq for TypeMatch {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeMatch::Exact(a), TypeMatch::Exact(b)) => a == b,
            (TypeMatch::Wildcard, TypeMatch::Wildcard) => true,
            (TypeMatch::Pattern { source: a, .. }, TypeMatch::Pattern { source: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Serialize for TypeMatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TypeMatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pattern = String::deserialize(deserializer)?;
        TypeMatch::parse(&pattern).map_err(D::Error::custom)
    }
}

// ============================================================================
// TypeRestriction
// ============================================================================

/// The rule lists applied to one document type (or type pattern).
///
/// Each action's list is AND-folded: every expression must independently
/// pass. An empty list is unrestricted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRestriction {
    #[serde(rename = "name")]
    pub type_match: TypeMatch,
    #[serde(rename = "type")]
    pub graph_kind: GraphKind,
    #[serde(default)]
    pub create: Vec<Expression>,
    #[serde(default)]
    pub read: Vec<Expression>,
    #[serde(default)]
    pub update: Vec<Expression>,
    #[serde(default)]
    pub delete: Vec<Expression>,
}

impl TypeRestriction {
    pub fn new(type_match: TypeMatch, graph_kind: GraphKind) -> Self {
        Self {
            type_match,
            graph_kind,
            create: Vec::new(),
            read: Vec::new(),
            update: Vec::new(),
            delete: Vec::new(),
        }
    }

    /// Appends an expression to one action's list.
    pub fn with_expression(mut self, action: RecordAction, expression: Expression) -> Self {
        self.expressions_for_mut(action).push(expression);
        self
    }

    /// Appends the same expression to all four action lists.
    pub fn with_expression_for_all(mut self, expression: Expression) -> Self {
        for action in [
            RecordAction::Create,
            RecordAction::Read,
            RecordAction::Update,
            RecordAction::Delete,
        ] {
            self.expressions_for_mut(action).push(expression.clone());
        }
        self
    }

    /// The rule list for `action`.
    pub fn expressions_for(&self, action: RecordAction) -> &[Expression] {
        match action {
            RecordAction::Create => &self.create,
            RecordAction::Read => &self.read,
            RecordAction::Update => &self.update,
            RecordAction::Delete => &self.delete,
        }
    }

    fn expressions_for_mut(&mut self, action: RecordAction) -> &mut Vec<Expression> {
        match action {
            RecordAction::Create => &mut self.create,
            RecordAction::Read => &mut self.read,
            RecordAction::Update => &mut self.update,
            RecordAction::Delete => &mut self.delete,
        }
    }

    /// Evaluates the rule list for `action` against a document's
    /// classification block.
    pub fn authorize(&self, action: RecordAction, doc: &Value, scale: &ClassificationScale) -> bool {
        let expressions = self.expressions_for(action);
        let mut results = Vec::with_capacity(expressions.len());
        for expression in expressions {
            results.push(expression.evaluate(doc, scale));
        }
        let granted = results.iter().all(|r| *r);
        trace!(
            type_match = %self.type_match.as_str(),
            %action,
            rules = results.len(),
            granted,
            "type restriction evaluated"
        );
        granted
    }

    /// Collects every argument in this restriction, for diagnostics.
    pub fn arguments(&self) -> Vec<&Argument> {
        fn walk<'a>(expression: &'a Expression, out: &mut Vec<&'a Argument>) {
            out.extend(expression.arguments.iter());
            for child in &expression.expressions {
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        for list in [&self.create, &self.read, &self.update, &self.delete] {
            for expression in list {
                walk(expression, &mut out);
            }
        }
        out
    }
}
