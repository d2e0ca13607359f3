//! Compiles an attribute-authority response into per-database policies.
//!
//! Compilation happens once per authenticated session, outside any storage
//! lock; the resulting [`PolicySet`] is immutable and shared by every
//! evaluation on that session's scan path.

use crate::argument::{Argument, ArgumentOperator, Operand};
use crate::error::AccmError;
use crate::expression::Expression;
use crate::policy::Policy;
use crate::response::AttributeResponse;
use crate::restriction::{TypeMatch, TypeRestriction};
use hematite_types::{DeploymentPolicy, GraphKind, payload};
use tracing::{info, warn};

/// Dissemination-control marking rejected for users without
/// no-foreign-release authorization.
const NOFORN: &str = "NOFORN";

/// Non-IC marking flagging a document as compartmented.
const ACCM: &str = "ACCM";

/// Above this many compartments the powerset of read-on combinations gets
/// large enough to warrant operator attention (2^12 = 4096 predicates).
const COMPARTMENT_WARN_THRESHOLD: usize = 12;

/// Field path of a marking component inside a document's classification
/// block.
fn component(field: &str) -> String {
    format!("{}.{}", payload::COMPONENTS, field)
}

/// Turns attribute-authority responses into compiled [`Policy`] values.
///
/// The deployment configuration (scale, clamp, home nation) is injected at
/// construction; nothing here reads ambient process state.
#[derive(Debug, Clone)]
pub struct PolicyCompiler {
    deployment: DeploymentPolicy,
}

impl PolicyCompiler {
    pub fn new(deployment: DeploymentPolicy) -> Self {
        Self { deployment }
    }

    pub fn deployment(&self) -> &DeploymentPolicy {
        &self.deployment
    }

    /// Compiles one [`Policy`] per known database.
    ///
    /// Restrictions are currently database-agnostic wildcards, but the
    /// per-database output leaves room for tailoring without an API change.
    pub fn compile(
        &self,
        response: &AttributeResponse,
        known_databases: &[String],
    ) -> Result<Vec<Policy>, AccmError> {
        let rule = self.build_rule(response)?;

        let vertex = TypeRestriction::new(TypeMatch::Wildcard, GraphKind::Vertex)
            .with_expression_for_all(rule.clone());
        let edge = TypeRestriction::new(TypeMatch::Wildcard, GraphKind::Edge)
            .with_expression_for_all(rule);

        let policies: Vec<Policy> = known_databases
            .iter()
            .map(|database| {
                Policy::new(database)
                    .with_roles(response.role_mappings.clone())
                    .with_attributes(response.user_attributes.clone())
                    .with_restriction(vertex.clone())
                    .with_restriction(edge.clone())
            })
            .collect();

        info!(
            clearance = %response.clearance,
            nationality = %response.nationality,
            databases = policies.len(),
            "compiled session policy"
        );
        Ok(policies)
    }

    /// Builds the outer rule applied identically to every action list:
    /// `AND(classification, dissemination controls..., OR(compartments))`.
    fn build_rule(&self, response: &AttributeResponse) -> Result<Expression, AccmError> {
        let scale = &self.deployment.scale;

        // Clearance prefix, capped by the deployment clamp: an over-cleared
        // user in a low-side deployment reads nothing above the clamp.
        let user_rank = scale.rank(&response.clearance)?;
        let ceiling = user_rank.min(self.deployment.clamp_rank());
        let allowed_levels = scale.prefix(ceiling);

        let mut rule = Expression::and().with_argument(Argument::new(
            component(payload::LEVEL),
            ArgumentOperator::AnyOf,
            Operand::list(allowed_levels),
        ));

        let tags = response.releasability_tags();

        if !response.noforn_access || tags.is_empty() {
            rule = rule.with_argument(Argument::negated(
                component(payload::DISSEMINATION_CONTROLS),
                ArgumentOperator::Contains,
                Operand::list([NOFORN]),
            ));
        }

        // Documents without a releasability list default to visible for
        // home-nation users only.
        let home = response.nationality.trim() == self.deployment.home_nation;
        rule = rule.with_argument(
            Argument::new(
                component(payload::RELEASABLE_TO),
                ArgumentOperator::AnyIn,
                Operand::list(tags),
            )
            .with_null_policy(home),
        );

        if response.accm_access {
            rule = rule.with_expression(self.compartment_rule(&response.compartments()));
        } else {
            rule = rule.with_argument(Argument::negated(
                component(payload::NON_IC_MARKINGS),
                ArgumentOperator::Contains,
                Operand::list([ACCM]),
            ));
        }

        Ok(rule)
    }

    /// OR of `ALL_IN` predicates, one per sub-combination of the user's
    /// compartments. A document passes when its required compartments are a
    /// subset of some combination the user holds, without requiring the
    /// exact full set.
    fn compartment_rule(&self, compartments: &[String]) -> Expression {
        if compartments.len() > COMPARTMENT_WARN_THRESHOLD {
            warn!(
                compartments = compartments.len(),
                combinations = 1usize << compartments.len(),
                "large compartment set expands to many read-on combinations"
            );
        }
        let mut rule = Expression::or();
        for combination in powerset(compartments) {
            rule = rule.with_argument(Argument::new(
                component(payload::PROGRAM_NICKNAMES),
                ArgumentOperator::AllIn,
                Operand::list(combination),
            ));
        }
        rule
    }
}

/// Every subset of `items`, including the empty set, in stable order.
///
/// # Panics
///
/// Panics above 31 items; the bitmask enumeration (and any conceivable
/// read-on assignment) ends well before that.
fn powerset(items: &[String]) -> Vec<Vec<String>> {
    assert!(items.len() < 32, "compartment powerset limited to 31 read-ons");
    let mut subsets = Vec::with_capacity(1 << items.len());
    for mask in 0u32..(1u32 << items.len()) {
        let subset: Vec<String> = items
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, item)| item.clone())
            .collect();
        subsets.push(subset);
    }
    subsets
}
