//! Write-path classification validation.
//!
//! Runs once per write, before commit: checks the classification payload's
//! shape, the deployment and database ceilings, the writing user's own
//! access, and the per-attribute classification tags. The enforcer's `mark`
//! wraps this and stamps the `classificationMarked` flag consumed by the
//! read path as a fast pre-check.

use crate::context::UserSecurityContext;
use crate::enforcer::{AccessEnforcer, EnforcementError, Result};
use hematite_types::{DatabaseProfile, DeploymentPolicy, RecordAction, payload};
use serde_json::{Map, Value};
use tracing::debug;

/// Document metadata keys carried on the JSON view by the record layer.
const CATEGORY_KEY: &str = "@cat";
const IDENTITY_KEY: &str = "@rid";

/// Whether this document is a graph element that has not been persisted yet.
///
/// Edges are created in multiple steps; the classification payload is applied
/// on the last one. Validation skips the intermediate shapes.
pub fn is_under_construction(doc: &Value) -> bool {
    let is_graph_element = matches!(
        doc.get(CATEGORY_KEY).and_then(Value::as_str),
        Some("e" | "v")
    );
    is_graph_element && doc.get(IDENTITY_KEY).is_none()
}

/// Validates the classification markings on a document being written.
///
/// Checks, in order: payload shape, the document level against the
/// deployment clamp and database ceiling, the user's authorization to set
/// these markings (can't create higher than what you can access), and the
/// per-attribute classification tags when present.
pub fn validate_classification_markings(
    enforcer: &AccessEnforcer,
    database: &DatabaseProfile,
    doc: &Value,
    type_name: &str,
    user: &UserSecurityContext,
    action: RecordAction,
) -> Result<()> {
    if !database.classification_enabled {
        debug!(database = %database.name, "classification validation disabled; skipping");
        return Ok(());
    }
    if is_under_construction(doc) {
        debug!(type_name, "graph element under construction; skipping validation");
        return Ok(());
    }

    let block = doc
        .get(payload::CLASSIFICATION)
        .and_then(Value::as_object)
        .ok_or(EnforcementError::ClassificationMissing)?;
    let components = block
        .get(payload::COMPONENTS)
        .and_then(Value::as_object)
        .ok_or(EnforcementError::ClassificationMissing)?;
    let level = components
        .get(payload::LEVEL)
        .and_then(Value::as_str)
        .filter(|l| !l.trim().is_empty())
        .ok_or(EnforcementError::ClassificationMissing)?;

    verify_level_within_ceilings(enforcer.deployment(), database, level)?;

    if !enforcer.authorize(database, doc, type_name, user, action)? {
        return Err(EnforcementError::NotAuthorized {
            user: user.username().to_string(),
            action,
        });
    }

    if let Some(attributes) = block.get(payload::ATTRIBUTES).and_then(Value::as_object) {
        validate_attribute_tags(enforcer.deployment(), doc, attributes, user)?;
    }

    Ok(())
}

/// Checks a level against the deployment clamp and the database ceiling.
pub fn verify_level_within_ceilings(
    deployment: &DeploymentPolicy,
    database: &DatabaseProfile,
    level: &str,
) -> Result<()> {
    let rank = deployment.scale.rank_from_marking(level)?;

    if rank > deployment.clamp_rank() {
        return Err(EnforcementError::AboveDeploymentClamp {
            level: level.to_string(),
            clamp: deployment.clamp.clone(),
        });
    }

    if let Some(ceiling) = &database.ceiling {
        if rank > deployment.scale.rank(ceiling)? {
            return Err(EnforcementError::AboveDatabaseCeiling {
                level: level.to_string(),
                database: database.name.clone(),
                ceiling: ceiling.clone(),
            });
        }
    }

    Ok(())
}

/// Validates the per-attribute classification tag map.
///
/// Every tag must name an existing property and carry a level within the
/// deployment clamp and the writer's clearance; every non-system property
/// must be tagged.
fn validate_attribute_tags(
    deployment: &DeploymentPolicy,
    doc: &Value,
    attributes: &Map<String, Value>,
    user: &UserSecurityContext,
) -> Result<()> {
    for (attribute, tag) in attributes {
        if doc.get(attribute).is_none() {
            return Err(EnforcementError::UnknownTaggedAttribute {
                attribute: attribute.clone(),
            });
        }

        let level = tag
            .as_str()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .ok_or_else(|| EnforcementError::EmptyAttributeTag {
                attribute: attribute.clone(),
            })?;

        let rank = deployment.scale.rank_from_marking(level)?;
        if rank > deployment.clamp_rank() {
            return Err(EnforcementError::AboveDeploymentClamp {
                level: level.to_string(),
                clamp: deployment.clamp.clone(),
            });
        }
        if rank > user.clearance_rank() {
            return Err(EnforcementError::AttributeAboveClearance {
                attribute: attribute.clone(),
                level: level.to_string(),
            });
        }
    }

    let expected = doc
        .as_object()
        .map(|map| {
            map.keys()
                .filter(|key| !key.starts_with('@'))
                .filter(|key| !payload::SYSTEM_PROPERTIES.contains(&key.as_str()))
                .count()
        })
        .unwrap_or(0);

    if attributes.len() < expected {
        return Err(EnforcementError::UntaggedProperties {
            tagged: attributes.len(),
            expected,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hematite_accm::{AttributeResponse, PolicyCompiler, PolicySet};
    use hematite_types::ClassificationScale;
    use serde_json::json;

    fn deployment() -> DeploymentPolicy {
        DeploymentPolicy::new(ClassificationScale::default(), "S", "USA").unwrap()
    }

    fn enforcer() -> AccessEnforcer {
        AccessEnforcer::new(deployment())
    }

    fn database() -> DatabaseProfile {
        DatabaseProfile::new("intel")
    }

    fn user(clearance: &str) -> UserSecurityContext {
        let response = AttributeResponse::new(clearance, "USA");
        let user = UserSecurityContext::from_response(
            "alice",
            &response,
            &ClassificationScale::default(),
        )
        .unwrap();
        let policies = PolicyCompiler::new(deployment())
            .compile(&response, &["intel".to_string()])
            .unwrap();
        user.install_policies(PolicySet::new(policies));
        user
    }

    fn validate(doc: &Value, user: &UserSecurityContext) -> Result<()> {
        validate_classification_markings(
            &enforcer(),
            &database(),
            doc,
            "Report",
            user,
            RecordAction::Create,
        )
    }

    #[test]
    fn test_valid_document_passes() {
        let doc = json!({
            "title": "report",
            "classification": {
                "components": {"classification": "C"},
                "attributes": {"title": "U"}
            }
        });
        assert!(validate(&doc, &user("S")).is_ok());
    }

    #[test]
    fn test_missing_payload_shapes() {
        let user = user("S");

        let no_block = json!({"title": "x"});
        let no_components = json!({"title": "x", "classification": {}});
        let no_level = json!({"title": "x", "classification": {"components": {}}});
        let empty_level =
            json!({"title": "x", "classification": {"components": {"classification": "  "}}});

        for doc in [no_block, no_components, no_level, empty_level] {
            let err = validate(&doc, &user).unwrap_err();
            assert!(matches!(err, EnforcementError::ClassificationMissing), "{doc}");
        }
    }

    #[test]
    fn test_level_above_deployment_clamp_rejected() {
        // Deployment clamp is S; TS documents are rejected even for a
        // (hypothetically) TS-cleared writer.
        let doc = json!({
            "classification": {"components": {"classification": "TS"}}
        });
        let err = validate(&doc, &user("S")).unwrap_err();
        assert!(matches!(err, EnforcementError::AboveDeploymentClamp { .. }));
    }

    #[test]
    fn test_level_above_database_ceiling_rejected() {
        let db = DatabaseProfile::new("intel").with_ceiling("C");
        let doc = json!({
            "classification": {"components": {"classification": "S"}}
        });
        let err = validate_classification_markings(
            &enforcer(),
            &db,
            &doc,
            "Report",
            &user("S"),
            RecordAction::Create,
        )
        .unwrap_err();
        assert!(matches!(err, EnforcementError::AboveDatabaseCeiling { .. }));
    }

    #[test]
    fn test_unknown_level_rejected() {
        let doc = json!({
            "classification": {"components": {"classification": "SBU"}}
        });
        let err = validate(&doc, &user("S")).unwrap_err();
        assert!(matches!(err, EnforcementError::InvalidClassification(_)));
    }

    #[test]
    fn test_writer_cannot_mark_above_own_access() {
        let doc = json!({
            "classification": {"components": {"classification": "S"}}
        });
        let err = validate(&doc, &user("C")).unwrap_err();
        assert!(matches!(err, EnforcementError::NotAuthorized { .. }));
    }

    #[test]
    fn test_disabled_database_skips_validation() {
        let db = DatabaseProfile::new("scratch").with_validation_disabled();
        let doc = json!({"no": "markings"});
        assert!(
            validate_classification_markings(
                &enforcer(),
                &db,
                &doc,
                "Report",
                &user("S"),
                RecordAction::Create,
            )
            .is_ok()
        );
    }

    #[test]
    fn test_edge_under_construction_skipped() {
        let doc = json!({"@cat": "e"});
        assert!(validate(&doc, &user("S")).is_ok());

        // Persisted edges validate normally.
        let persisted = json!({"@cat": "e", "@rid": "#12:0"});
        assert!(matches!(
            validate(&persisted, &user("S")).unwrap_err(),
            EnforcementError::ClassificationMissing
        ));
    }

    #[test]
    fn test_attribute_tag_must_name_a_property() {
        let doc = json!({
            "title": "x",
            "classification": {
                "components": {"classification": "U"},
                "attributes": {"summary": "U"}
            }
        });
        let err = validate(&doc, &user("S")).unwrap_err();
        assert!(matches!(err, EnforcementError::UnknownTaggedAttribute { .. }));
    }

    #[test]
    fn test_attribute_tag_above_writer_clearance_rejected() {
        let doc = json!({
            "title": "x",
            "classification": {
                "components": {"classification": "U"},
                "attributes": {"title": "S"}
            }
        });
        let err = validate(&doc, &user("C")).unwrap_err();
        assert!(matches!(err, EnforcementError::AttributeAboveClearance { .. }));
    }

    #[test]
    fn test_empty_attribute_tag_rejected() {
        let doc = json!({
            "title": "x",
            "classification": {
                "components": {"classification": "U"},
                "attributes": {"title": ""}
            }
        });
        let err = validate(&doc, &user("S")).unwrap_err();
        assert!(matches!(err, EnforcementError::EmptyAttributeTag { .. }));
    }

    #[test]
    fn test_every_property_must_be_tagged() {
        let doc = json!({
            "title": "x",
            "summary": "y",
            "classificationMarked": false,
            "classification": {
                "components": {"classification": "U"},
                "attributes": {"title": "U"}
            }
        });
        let err = validate(&doc, &user("S")).unwrap_err();
        match err {
            EnforcementError::UntaggedProperties { tagged, expected } => {
                assert_eq!(tagged, 1);
                assert_eq!(expected, 2);
            }
            other => panic!("expected UntaggedProperties, got {other}"),
        }
    }

    #[test]
    fn test_banner_marking_passes_ceiling_check() {
        // Ceiling checks normalize banner strings before rank lookup.
        assert!(verify_level_within_ceilings(&deployment(), &database(), "(C//NOFORN)").is_ok());
        assert!(
            verify_level_within_ceilings(&deployment(), &database(), "(TS//NOFORN)").is_err()
        );
    }
}
