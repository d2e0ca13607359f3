//! Kani proofs for classification rule evaluation
//!
//! These proofs verify correctness properties of the ACCM rule engine using
//! bounded model checking.
//!
//! Run with: `cargo kani --harness verify_*`

#[cfg(kani)]
use crate::argument::{Argument, ArgumentOperator, Operand};
#[cfg(kani)]
use crate::expression::Expression;
#[cfg(kani)]
use hematite_types::ClassificationScale;
#[cfg(kani)]
use serde_json::json;

/// Proof: Evaluation determinism
///
/// **Property**: Same rule and same document always produce the same decision
///
/// **Verification**:
/// - Evaluate a compiled expression against a fixed document twice
/// - Both results must be identical
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(10)]
fn verify_evaluation_determinism() {
    let scale = ClassificationScale::default();
    let rule = Expression::and()
        .with_argument(Argument::new(
            "classification",
            ArgumentOperator::AnyOf,
            Operand::list(["U", "C", "S"]),
        ))
        .with_argument(Argument::negated(
            "disseminationControls",
            ArgumentOperator::Contains,
            Operand::list(["NOFORN"]),
        ));
    let doc = json!({"classification": "C", "disseminationControls": ["ORCON"]});

    let first = rule.evaluate(&doc, &scale);
    let second = rule.evaluate(&doc, &scale);

    // Postcondition: identical decisions
    assert_eq!(first, second);
    assert!(first);
}

/// Proof: Vacuous fold results
///
/// **Property**: An empty AND is `true` (no further restriction); an empty
/// OR is `false`
///
/// **Verification**:
/// - Evaluate empty AND and OR nodes against an arbitrary document
/// - AND must grant, OR must deny
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(5)]
fn verify_vacuous_fold_results() {
    let scale = ClassificationScale::default();
    let doc = json!({"anything": "at all"});

    assert!(Expression::and().evaluate(&doc, &scale));
    assert!(!Expression::or().evaluate(&doc, &scale));
}

/// Proof: Malformed operands fail closed
///
/// **Property**: An operand whose shape does not fit its operator evaluates
/// to `false`, and no inversion (NEQ, negate) can turn it into a grant
///
/// **Verification**:
/// - EQ with a list operand denies on a matching document
/// - NEQ with a list operand denies as well (no inversion of the failure)
/// - Negating the malformed predicate still denies
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(10)]
fn verify_malformed_operand_fails_closed() {
    let scale = ClassificationScale::default();
    let doc = json!({"field": "a"});

    let eq = Argument::new("field", ArgumentOperator::Eq, Operand::list(["a"]));
    assert!(!eq.evaluate(&doc, &scale));

    let neq = Argument::new("field", ArgumentOperator::Neq, Operand::list(["a"]));
    assert!(!neq.evaluate(&doc, &scale));

    let negated = Argument::negated("field", ArgumentOperator::Eq, Operand::list(["a"]));
    assert!(!negated.evaluate(&doc, &scale));
}

/// Proof: Negation respects field presence
///
/// **Property**: When the field resolves, negation is an exact complement;
/// when it does not, the null policy decides and negation is never applied
///
/// **Verification**:
/// - Present field: plain and negated evaluations are complements
/// - Absent field: plain and negated evaluations both equal the null policy
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(10)]
fn verify_negation_respects_presence() {
    let scale = ClassificationScale::default();

    let plain = Argument::new("field", ArgumentOperator::Eq, "x");
    let negated = Argument::negated("field", ArgumentOperator::Eq, "x");

    let present = json!({"field": "x"});
    assert_ne!(
        plain.evaluate(&present, &scale),
        negated.evaluate(&present, &scale)
    );

    let absent = json!({});
    assert!(plain.evaluate(&absent, &scale));
    assert!(negated.evaluate(&absent, &scale));

    let deny_plain = plain.clone().with_null_policy(false);
    let deny_negated = negated.with_null_policy(false);
    assert!(!deny_plain.evaluate(&absent, &scale));
    assert!(!deny_negated.evaluate(&absent, &scale));
}
