//! Kani bounded model checking proofs for enforcement correctness.
//!
//! These proofs verify critical enforcement properties using bounded model
//! checking:
//! - Root bypass - HA syncing is never blocked by classification checks
//! - Fail closed on unmarked reads - a document must pass marking before
//!   it can be read or deleted
//! - Missing policy never grants - absent session policies are a hard error
//! - Service-account soft fail - failed validation stamps `false` instead of
//!   aborting the write

use crate::context::UserSecurityContext;
use crate::enforcer::{AccessEnforcer, EnforcementError};
use hematite_types::{ClassificationScale, DatabaseProfile, DeploymentPolicy, RecordAction};
use serde_json::json;

fn deployment() -> DeploymentPolicy {
    DeploymentPolicy::new(ClassificationScale::default(), "TS", "USA").unwrap()
}

//=============================================================================
// Proof: Root Bypass
//=============================================================================

/// Verifies that the root user is never blocked by classification checks.
///
/// **Property**: Root reads and deletes any document, marked or not.
///
/// **Proof Strategy**:
/// - Authorize an unmarked document for root across every action
/// - Every decision must be a grant, never an error
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(10)]
fn verify_root_bypass() {
    let enforcer = AccessEnforcer::new(deployment());
    let database = DatabaseProfile::new("intel");
    let root = UserSecurityContext::new("root", 0);
    let unmarked = json!({"title": "x"});

    for action in [
        RecordAction::Create,
        RecordAction::Read,
        RecordAction::Update,
        RecordAction::Delete,
    ] {
        let granted = enforcer
            .authorize(&database, &unmarked, "Report", &root, action)
            .unwrap();
        assert!(granted);
    }
}

//=============================================================================
// Proof: Fail Closed on Unmarked Reads
//=============================================================================

/// Verifies that unmarked documents cannot be read or deleted.
///
/// **Property**: READ and DELETE on a document without the
/// `classificationMarked=true` flag raise `ClassificationMissing`.
///
/// **Proof Strategy**:
/// - Build an interactive user with installed policies
/// - Authorize an unmarked document for READ and DELETE
/// - Both must fail closed with `ClassificationMissing`
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(10)]
fn verify_unmarked_read_fails_closed() {
    use hematite_accm::{AttributeResponse, PolicyCompiler, PolicySet};

    let enforcer = AccessEnforcer::new(deployment());
    let database = DatabaseProfile::new("intel");

    let response = AttributeResponse::new("TS", "USA");
    let user =
        UserSecurityContext::from_response("alice", &response, &ClassificationScale::default())
            .unwrap();
    let policies = PolicyCompiler::new(deployment())
        .compile(&response, &["intel".to_string()])
        .unwrap();
    user.install_policies(PolicySet::new(policies));

    let unmarked = json!({"classification": {"components": {"classification": "U"}}});

    for action in [RecordAction::Read, RecordAction::Delete] {
        let result = enforcer.authorize(&database, &unmarked, "Report", &user, action);
        assert!(matches!(
            result,
            Err(EnforcementError::ClassificationMissing)
        ));
    }
}

//=============================================================================
// Proof: Missing Policy Never Grants
//=============================================================================

/// Verifies that a session without compiled policies cannot read anything.
///
/// **Property**: Absent policies are a hard `PolicyMissing` error, never an
/// implicit grant.
///
/// **Proof Strategy**:
/// - Build an interactive user with no installed policy set
/// - Authorize a fully marked document
/// - The decision must be an error, not `Ok(true)`
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(10)]
fn verify_missing_policy_never_grants() {
    let enforcer = AccessEnforcer::new(deployment());
    let database = DatabaseProfile::new("intel");
    let user = UserSecurityContext::new("alice", 4);

    let marked = json!({
        "classificationMarked": true,
        "classification": {"components": {"classification": "U"}}
    });

    let result = enforcer.authorize(&database, &marked, "Report", &user, RecordAction::Read);
    assert!(result.is_err());
}

//=============================================================================
// Proof: Service-Account Soft Fail
//=============================================================================

/// Verifies the service-account write contract.
///
/// **Property**: A service-account write that fails validation succeeds with
/// `classificationMarked=false`; it never aborts.
///
/// **Proof Strategy**:
/// - Mark a document with no classification payload as a service account
/// - The call must return `Ok(false)` and stamp the flag `false`
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(10)]
fn verify_service_account_soft_fail() {
    let enforcer = AccessEnforcer::new(deployment());
    let database = DatabaseProfile::new("intel");
    let svc = UserSecurityContext::new("ingest", 0).as_service_account();

    let mut doc = json!({"payload": "unreviewable"});
    let marked = enforcer
        .mark(&database, &mut doc, "Report", &svc, RecordAction::Create)
        .unwrap();

    assert!(!marked);
    assert!(!AccessEnforcer::is_marked(&doc));
}
