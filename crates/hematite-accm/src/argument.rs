//! Single-field predicates over a document's JSON view.
//!
//! An [`Argument`] compares one dot-separated field path against a normalized
//! operand. Operands are shaped at construction time (string-encoded lists
//! are split and trimmed exactly once), so evaluation never sniffs formats.
//!
//! Evaluation is total: an operand that does not fit its operator evaluates
//! to `false` (fail closed) with a warning, rather than surfacing an error
//! into a scan.

use hematite_types::ClassificationScale;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display};
use tracing::{trace, warn};

// ============================================================================
// Scalar
// ============================================================================

/// A normalized scalar value: the only leaf type operands and document
/// fields are compared as.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Converts a JSON leaf into a scalar. Arrays, objects, and `null` have
    /// no scalar form.
    pub fn from_json(value: &Value) -> Option<Scalar> {
        match value {
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Scalar::Int(i))
                } else {
                    n.as_f64().map(Scalar::Float)
                }
            }
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// The numeric value, if this scalar is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Bool(_) | Scalar::Text(_) => None,
        }
    }

    /// The text value, if this scalar is a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Scalar {
    /// Structural equality on the normalized value. Integer and float
    /// scalars compare numerically.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Float(a), Scalar::Float(b)) => a == b,
            (Scalar::Int(a), Scalar::Float(b)) | (Scalar::Float(b), Scalar::Int(a)) => {
                (*a as f64) == *b
            }
            (Scalar::Text(a), Scalar::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

// ============================================================================
// Operand
// ============================================================================

/// A predicate operand: a single scalar or an ordered list of scalars,
/// shape-matched to the operator at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl Operand {
    /// Creates a scalar operand.
    pub fn scalar(value: impl Into<Scalar>) -> Self {
        Operand::Scalar(value.into())
    }

    /// Creates a list operand.
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        Operand::List(values.into_iter().map(Into::into).collect())
    }

    /// Normalizes a string-encoded list (`"[a, b]"` or `"a,b"`) into a list
    /// operand, splitting on commas and trimming quotes and whitespace.
    ///
    /// Legacy rule sources deliver list operands as delimited strings; doing
    /// the split here keeps evaluation free of format sniffing.
    pub fn parse_list(encoded: &str) -> Self {
        let inner = encoded
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']');
        let values: Vec<Scalar> = inner
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim())
            .filter(|part| !part.is_empty())
            .map(Scalar::from)
            .collect();
        Operand::List(values)
    }

    fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Operand::Scalar(s) => Some(s),
            Operand::List(_) => None,
        }
    }

    fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            Operand::List(l) => Some(l),
            Operand::Scalar(_) => None,
        }
    }
}

impl<S: Into<Scalar>> From<S> for Operand {
    fn from(value: S) -> Self {
        Operand::Scalar(value.into())
    }
}

// ============================================================================
// ArgumentOperator
// ============================================================================

/// Comparison operators available to predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArgumentOperator {
    Eq,
    Neq,
    AnyOf,
    Contains,
    NotContains,
    FieldNotPresent,
    Gt,
    GtEq,
    Lt,
    LtEq,
    AnyIn,
    AllIn,
    NoneIn,
}

impl Display for ArgumentOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Eq => "EQ",
            Self::Neq => "NEQ",
            Self::AnyOf => "ANY_OF",
            Self::Contains => "CONTAINS",
            Self::NotContains => "NOT_CONTAINS",
            Self::FieldNotPresent => "FIELD_NOT_PRESENT",
            Self::Gt => "GT",
            Self::GtEq => "GT_EQ",
            Self::Lt => "LT",
            Self::LtEq => "LT_EQ",
            Self::AnyIn => "ANY_IN",
            Self::AllIn => "ALL_IN",
            Self::NoneIn => "NONE_IN",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Argument
// ============================================================================

fn default_null_grants() -> bool {
    true
}

/// A single comparison against one field path of a document.
///
/// `null_grants` controls what an unresolved field evaluates to; it defaults
/// to grant so that legacy documents lacking newer classification sub-fields
/// stay readable. `negate` flips the result, but only when the field actually
/// resolved — the null policy is never negated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    /// Dot-separated path into the document's JSON view.
    pub field: String,
    pub operator: ArgumentOperator,
    pub operand: Operand,
    #[serde(default)]
    pub negate: bool,
    #[serde(default = "default_null_grants")]
    pub null_grants: bool,
}

impl Argument {
    pub fn new(
        field: impl Into<String>,
        operator: ArgumentOperator,
        operand: impl Into<Operand>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            operand: operand.into(),
            negate: false,
            null_grants: true,
        }
    }

    /// Creates an argument whose result is flipped when the field resolves.
    pub fn negated(
        field: impl Into<String>,
        operator: ArgumentOperator,
        operand: impl Into<Operand>,
    ) -> Self {
        let mut arg = Self::new(field, operator, operand);
        arg.negate = true;
        arg
    }

    /// Sets what an unresolved field evaluates to.
    pub fn with_null_policy(mut self, null_grants: bool) -> Self {
        self.null_grants = null_grants;
        self
    }

    /// Evaluates this argument against a document.
    ///
    /// The scale is consulted only by the ordering operators when the operand
    /// is a classification label.
    pub fn evaluate(&self, doc: &Value, scale: &ClassificationScale) -> bool {
        let result = match resolve_path(doc, &self.field) {
            None => {
                // Negation is not applied to an absent field: the null
                // policy (or FIELD_NOT_PRESENT) decides outright.
                return if self.operator == ArgumentOperator::FieldNotPresent {
                    true
                } else {
                    self.null_grants
                };
            }
            Some(value) => {
                if self.operator == ArgumentOperator::FieldNotPresent {
                    // Present field fails the presence test; negate flips it.
                    self.negate
                } else {
                    match self.apply(value, scale) {
                        // A malformed rule is false outright; neither negate
                        // nor NEQ-style inversion may turn it into a grant.
                        None => false,
                        Some(raw) => {
                            if self.negate {
                                !raw
                            } else {
                                raw
                            }
                        }
                    }
                }
            }
        };
        trace!(
            field = %self.field,
            operator = %self.operator,
            result,
            "argument evaluated"
        );
        result
    }

    /// Operator dispatch for a resolved field value. `None` means the
    /// operand's shape does not fit the operator.
    fn apply(&self, value: &Value, scale: &ClassificationScale) -> Option<bool> {
        match self.operator {
            ArgumentOperator::Eq => self.equals(value),
            ArgumentOperator::Neq => self.equals(value).map(|r| !r),
            ArgumentOperator::AnyOf => {
                let allowed = self.require_list("ANY_OF")?;
                Some(match Scalar::from_json(value) {
                    Some(doc_value) => allowed.contains(&doc_value),
                    None => false,
                })
            }
            ArgumentOperator::Contains => self.contains(value),
            ArgumentOperator::NotContains => self.contains(value).map(|r| !r),
            ArgumentOperator::Gt | ArgumentOperator::GtEq | ArgumentOperator::Lt
            | ArgumentOperator::LtEq => self.compare(value, scale),
            ArgumentOperator::AnyIn => {
                let allowed = self.require_list("ANY_IN")?;
                Some(match element_values(value) {
                    Some(doc_values) => doc_values.iter().any(|v| allowed.contains(v)),
                    None => false,
                })
            }
            ArgumentOperator::AllIn => {
                let allowed = self.require_list("ALL_IN")?;
                Some(match element_values(value) {
                    Some(doc_values) => doc_values.iter().all(|v| allowed.contains(v)),
                    None => false,
                })
            }
            ArgumentOperator::NoneIn => {
                let blocked = self.require_list("NONE_IN")?;
                Some(match element_values(value) {
                    Some(doc_values) => !doc_values.iter().any(|v| blocked.contains(v)),
                    None => false,
                })
            }
            // Handled before dispatch.
            ArgumentOperator::FieldNotPresent => Some(false),
        }
    }

    fn equals(&self, value: &Value) -> Option<bool> {
        let expected = self.require_scalar("EQ/NEQ")?;
        Some(match Scalar::from_json(value) {
            Some(doc_value) => doc_value == *expected,
            None => false,
        })
    }

    /// List membership: any element of the document list equals any operand
    /// element. A non-list document value never contains anything.
    fn contains(&self, value: &Value) -> Option<bool> {
        let allowed = self.require_list("CONTAINS/NOT_CONTAINS")?;
        let Value::Array(items) = value else {
            return Some(false);
        };
        Some(
            items
                .iter()
                .filter_map(Scalar::from_json)
                .any(|item| allowed.contains(&item)),
        )
    }

    /// Ordering comparison. A numeric operand compares numerically; a text
    /// operand is a classification label compared by scale rank, not
    /// lexically.
    fn compare(&self, value: &Value, scale: &ClassificationScale) -> Option<bool> {
        let expected = self.require_scalar("ordering operators")?;
        match expected {
            Scalar::Text(label) => {
                let Some(doc_label) = value.as_str() else {
                    return Some(false);
                };
                match (scale.rank_from_marking(doc_label), scale.rank(label)) {
                    (Ok(d), Ok(o)) => Some(self.ordered(f64::from(d), f64::from(o))),
                    _ => self.malformed("classification label not on the configured scale"),
                }
            }
            Scalar::Int(_) | Scalar::Float(_) => {
                let expected_n = expected.as_f64()?;
                Some(match Scalar::from_json(value).and_then(|s| s.as_f64()) {
                    Some(doc_n) => self.ordered(doc_n, expected_n),
                    None => false,
                })
            }
            Scalar::Bool(_) => self.malformed("ordering operators cannot compare booleans"),
        }
    }

    fn ordered(&self, doc: f64, operand: f64) -> bool {
        match self.operator {
            ArgumentOperator::Gt => doc > operand,
            ArgumentOperator::GtEq => doc >= operand,
            ArgumentOperator::Lt => doc < operand,
            ArgumentOperator::LtEq => doc <= operand,
            _ => false,
        }
    }

    fn require_scalar(&self, context: &str) -> Option<&Scalar> {
        match self.operand.as_scalar() {
            Some(scalar) => Some(scalar),
            None => {
                self.warn_malformed(context, "requires a scalar operand");
                None
            }
        }
    }

    fn require_list(&self, context: &str) -> Option<&[Scalar]> {
        match self.operand.as_list() {
            Some(list) => Some(list),
            None => {
                self.warn_malformed(context, "requires a list operand");
                None
            }
        }
    }

    /// A configuration error in the rule itself: deny this predicate rather
    /// than abort the caller's scan.
    fn malformed(&self, reason: &str) -> Option<bool> {
        self.warn_malformed("operand", reason);
        None
    }

    fn warn_malformed(&self, context: &str, reason: &str) {
        warn!(
            field = %self.field,
            operator = %self.operator,
            context,
            reason,
            "malformed argument evaluates to false"
        );
    }
}

impl Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Argument[field={}, operator={}, negate={}]",
            self.field, self.operator, self.negate
        )
    }
}

// ============================================================================
// Path resolution
// ============================================================================

/// Walks a dot-separated path through nested objects. A missing intermediate
/// object, a non-object intermediate, or a JSON `null` leaf all count as
/// unresolved.
fn resolve_path<'a>(doc: &'a Value, field: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in field.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    if current.is_null() { None } else { Some(current) }
}

/// The document-side values for set operators: an array yields its scalar
/// elements, a scalar yields itself as a singleton.
fn element_values(value: &Value) -> Option<Vec<Scalar>> {
    match value {
        Value::Array(items) => Some(items.iter().filter_map(Scalar::from_json).collect()),
        other => Scalar::from_json(other).map(|s| vec![s]),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn scale() -> ClassificationScale {
        ClassificationScale::default()
    }

    #[test]
    fn test_eq_operator() {
        let arg = Argument::new("field", ArgumentOperator::Eq, "value");
        assert!(arg.evaluate(&json!({"field": "value"}), &scale()));
        assert!(!arg.evaluate(&json!({"field": "other"}), &scale()));
    }

    #[test]
    fn test_neq_operator() {
        let arg = Argument::new("field", ArgumentOperator::Neq, "value");
        assert!(!arg.evaluate(&json!({"field": "value"}), &scale()));
        assert!(arg.evaluate(&json!({"field": "other"}), &scale()));
    }

    #[test]
    fn test_eq_numeric_normalization() {
        let arg = Argument::new("n", ArgumentOperator::Eq, 3i64);
        assert!(arg.evaluate(&json!({"n": 3}), &scale()));
        assert!(arg.evaluate(&json!({"n": 3.0}), &scale()));
        assert!(!arg.evaluate(&json!({"n": 4}), &scale()));
    }

    #[test]
    fn test_any_of_operator() {
        let arg = Argument::new(
            "classification",
            ArgumentOperator::AnyOf,
            Operand::list(["U", "C"]),
        );
        assert!(arg.evaluate(&json!({"classification": "C"}), &scale()));
        assert!(!arg.evaluate(&json!({"classification": "TS"}), &scale()));
    }

    #[test]
    fn test_nested_path_resolution() {
        let arg = Argument::new(
            "components.classification",
            ArgumentOperator::Eq,
            "S",
        );
        let doc = json!({"components": {"classification": "S"}});
        assert!(arg.evaluate(&doc, &scale()));
    }

    #[test]
    fn test_missing_field_uses_null_policy() {
        let grant = Argument::new("absent", ArgumentOperator::Eq, "x");
        assert!(grant.evaluate(&json!({}), &scale()));

        let deny = Argument::new("absent", ArgumentOperator::Eq, "x").with_null_policy(false);
        assert!(!deny.evaluate(&json!({}), &scale()));
    }

    #[test]
    fn test_null_leaf_counts_as_absent() {
        let arg = Argument::new("field", ArgumentOperator::Eq, "x").with_null_policy(false);
        assert!(!arg.evaluate(&json!({"field": null}), &scale()));
    }

    #[test]
    fn test_negate_not_applied_when_field_absent() {
        // negate flips resolved results only; the null policy wins outright.
        let arg = Argument::negated("absent", ArgumentOperator::Eq, "x").with_null_policy(true);
        assert!(arg.evaluate(&json!({}), &scale()));

        let arg = Argument::negated("absent", ArgumentOperator::Eq, "x").with_null_policy(false);
        assert!(!arg.evaluate(&json!({}), &scale()));
    }

    #[test]
    fn test_negate_applied_when_field_present() {
        let arg = Argument::negated("field", ArgumentOperator::Eq, "x");
        assert!(!arg.evaluate(&json!({"field": "x"}), &scale()));
        assert!(arg.evaluate(&json!({"field": "y"}), &scale()));
    }

    #[test]
    fn test_field_not_present_operator() {
        let arg = Argument::new("gone", ArgumentOperator::FieldNotPresent, Operand::list::<_, &str>([]));
        assert!(arg.evaluate(&json!({}), &scale()));
        assert!(!arg.evaluate(&json!({"gone": 1}), &scale()));
    }

    #[test]
    fn test_contains_operator() {
        let arg = Argument::new(
            "disseminationControls",
            ArgumentOperator::Contains,
            Operand::list(["NOFORN"]),
        );
        assert!(arg.evaluate(&json!({"disseminationControls": ["NOFORN", "ORCON"]}), &scale()));
        assert!(!arg.evaluate(&json!({"disseminationControls": ["ORCON"]}), &scale()));
        // A scalar field never "contains" anything.
        assert!(!arg.evaluate(&json!({"disseminationControls": "NOFORN"}), &scale()));
    }

    #[test]
    fn test_not_contains_with_negate_rejects_marked_documents() {
        // The compiler's NOFORN rule: CONTAINS "NOFORN", negated.
        let arg = Argument::negated(
            "disseminationControls",
            ArgumentOperator::Contains,
            Operand::list(["NOFORN"]),
        );
        assert!(!arg.evaluate(&json!({"disseminationControls": ["NOFORN"]}), &scale()));
        assert!(arg.evaluate(&json!({"disseminationControls": ["ORCON"]}), &scale()));
        // No controls at all: null policy grants.
        assert!(arg.evaluate(&json!({}), &scale()));
    }

    #[test]
    fn test_string_encoded_list_normalized_at_construction() {
        let operand = Operand::parse_list("[\"USA\", \"AUS\", FVEY]");
        assert_eq!(operand, Operand::list(["USA", "AUS", "FVEY"]));

        let arg = Argument::new("releasableTo", ArgumentOperator::AnyIn, operand);
        assert!(arg.evaluate(&json!({"releasableTo": ["AUS"]}), &scale()));
    }

    // The four ordering operators are distinct comparisons; 5 vs 5 separates
    // the strict and inclusive forms.
    #[test_case(ArgumentOperator::Gt, 7, true)]
    #[test_case(ArgumentOperator::Gt, 5, false)]
    #[test_case(ArgumentOperator::GtEq, 5, true)]
    #[test_case(ArgumentOperator::GtEq, 3, false)]
    #[test_case(ArgumentOperator::Lt, 3, true)]
    #[test_case(ArgumentOperator::Lt, 5, false)]
    #[test_case(ArgumentOperator::LtEq, 5, true)]
    #[test_case(ArgumentOperator::LtEq, 7, false)]
    fn test_numeric_ordering_is_distinct(op: ArgumentOperator, doc: i64, expected: bool) {
        let arg = Argument::new("n", op, 5i64);
        assert_eq!(arg.evaluate(&json!({"n": doc}), &scale()), expected);
    }

    #[test]
    fn test_classification_ordering_uses_rank_not_lexical() {
        // Lexically "C" < "S" < "TS" is accidental; "CUI" > "C" lexically but
        // ranks between U and C. Rank comparison must win.
        let arg = Argument::new("classification", ArgumentOperator::LtEq, "S");
        assert!(arg.evaluate(&json!({"classification": "CUI"}), &scale()));
        assert!(arg.evaluate(&json!({"classification": "S"}), &scale()));
        assert!(!arg.evaluate(&json!({"classification": "TS"}), &scale()));

        let arg = Argument::new("classification", ArgumentOperator::Gt, "C");
        assert!(arg.evaluate(&json!({"classification": "TS"}), &scale()));
        assert!(!arg.evaluate(&json!({"classification": "CUI"}), &scale()));
    }

    #[test]
    fn test_classification_ordering_accepts_banner_markings() {
        let arg = Argument::new("classification", ArgumentOperator::LtEq, "S");
        assert!(arg.evaluate(&json!({"classification": "(C//NOFORN)"}), &scale()));
    }

    #[test]
    fn test_unknown_label_fails_closed() {
        let arg = Argument::new("classification", ArgumentOperator::LtEq, "S");
        assert!(!arg.evaluate(&json!({"classification": "SBU"}), &scale()));
    }

    #[test]
    fn test_any_in_operator() {
        let arg = Argument::new(
            "releasableTo",
            ArgumentOperator::AnyIn,
            Operand::list(["USA", "FVEY"]),
        );
        assert!(arg.evaluate(&json!({"releasableTo": ["GBR", "USA"]}), &scale()));
        assert!(!arg.evaluate(&json!({"releasableTo": ["GBR", "FRA"]}), &scale()));
        // Scalar document value is treated as a singleton list.
        assert!(arg.evaluate(&json!({"releasableTo": "USA"}), &scale()));
    }

    #[test]
    fn test_all_in_is_the_subset_check() {
        let arg = Argument::new(
            "programNicknames",
            ArgumentOperator::AllIn,
            Operand::list(["ALPHA", "BRAVO"]),
        );
        assert!(arg.evaluate(&json!({"programNicknames": ["ALPHA"]}), &scale()));
        assert!(arg.evaluate(&json!({"programNicknames": ["ALPHA", "BRAVO"]}), &scale()));
        assert!(!arg.evaluate(&json!({"programNicknames": ["ALPHA", "CHARLIE"]}), &scale()));
        // Empty document list is vacuously a subset.
        assert!(arg.evaluate(&json!({"programNicknames": []}), &scale()));
    }

    #[test]
    fn test_all_in_empty_operand_matches_only_empty_requirements() {
        let arg = Argument::new(
            "programNicknames",
            ArgumentOperator::AllIn,
            Operand::list::<_, &str>([]),
        );
        assert!(arg.evaluate(&json!({"programNicknames": []}), &scale()));
        assert!(!arg.evaluate(&json!({"programNicknames": ["ALPHA"]}), &scale()));
        // Absent list: null policy grants by default.
        assert!(arg.evaluate(&json!({}), &scale()));
    }

    #[test]
    fn test_none_in_operator() {
        let arg = Argument::new(
            "nonICmarkings",
            ArgumentOperator::NoneIn,
            Operand::list(["ACCM"]),
        );
        assert!(arg.evaluate(&json!({"nonICmarkings": ["SBU"]}), &scale()));
        assert!(!arg.evaluate(&json!({"nonICmarkings": ["SBU", "ACCM"]}), &scale()));
    }

    #[test]
    fn test_malformed_operand_fails_closed() {
        // List operand where a scalar is required.
        let arg = Argument::new("field", ArgumentOperator::Eq, Operand::list(["a", "b"]));
        assert!(!arg.evaluate(&json!({"field": "a"}), &scale()));

        // Scalar operand where a list is required.
        let arg = Argument::new("field", ArgumentOperator::AnyIn, "a");
        assert!(!arg.evaluate(&json!({"field": ["a"]}), &scale()));

        // Boolean operand on an ordering operator.
        let arg = Argument::new("field", ArgumentOperator::Gt, true);
        assert!(!arg.evaluate(&json!({"field": 1}), &scale()));
    }

    #[test]
    fn test_malformed_operand_never_inverts_into_a_grant() {
        let arg = Argument::new("field", ArgumentOperator::Neq, Operand::list(["a"]));
        assert!(!arg.evaluate(&json!({"field": "b"}), &scale()));

        let arg = Argument::new("field", ArgumentOperator::NotContains, "a");
        assert!(!arg.evaluate(&json!({"field": ["b"]}), &scale()));
    }

    #[test]
    fn test_argument_serde_round_trip() {
        let arg = Argument::negated(
            "components.disseminationControls",
            ArgumentOperator::Contains,
            Operand::list(["NOFORN"]),
        );
        let json = serde_json::to_string(&arg).unwrap();
        assert!(json.contains("CONTAINS"));
        let back: Argument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, arg);
    }

    #[test]
    fn test_null_grants_defaults_to_true_on_deserialize() {
        let arg: Argument = serde_json::from_str(
            r#"{"field": "f", "operator": "EQ", "operand": "x"}"#,
        )
        .unwrap();
        assert!(arg.null_grants);
        assert!(!arg.negate);
    }

    proptest::proptest! {
        /// When the field resolves, negation is an exact complement.
        #[test]
        fn negation_is_complement_when_field_present(
            value in "[a-z]{1,8}",
            operand in "[a-z]{1,8}",
        ) {
            let doc = json!({"field": value});
            let plain = Argument::new("field", ArgumentOperator::Eq, operand.as_str());
            let negated = Argument::negated("field", ArgumentOperator::Eq, operand.as_str());
            proptest::prop_assert_ne!(
                plain.evaluate(&doc, &scale()),
                negated.evaluate(&doc, &scale())
            );
        }

        /// The null policy decides absent fields for every non-presence
        /// operator, negated or not.
        #[test]
        fn null_policy_decides_absent_fields(null_grants: bool, negate: bool) {
            let mut arg = Argument::new("absent", ArgumentOperator::Eq, "x")
                .with_null_policy(null_grants);
            arg.negate = negate;
            proptest::prop_assert_eq!(arg.evaluate(&json!({}), &scale()), null_grants);
        }
    }
}
