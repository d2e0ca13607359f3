//! Per-record authorization and write-time marking.
//!
//! The enforcer is the contract between the policy model and the storage /
//! document-mutation code. It holds no per-call state: every decision is a
//! pure function of the deployment configuration, the database profile, the
//! session context, and the document's JSON view.

use crate::context::UserSecurityContext;
use crate::validator;
use hematite_accm::AccmError;
use hematite_types::{
    DatabaseProfile, DeploymentPolicy, InvalidClassification, RecordAction, payload,
};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// EnforcementError
// ============================================================================

/// Errors raised on the enforcement path.
#[derive(Debug, Error)]
pub enum EnforcementError {
    /// The document lacks classification markings required for this
    /// operation.
    #[error("classification markings are missing on document")]
    ClassificationMissing,

    /// The document's level exceeds what this deployment may hold.
    #[error("classification '{level}' is not allowed in this deployment (maximum '{clamp}')")]
    AboveDeploymentClamp { level: String, clamp: String },

    /// The document's level exceeds what this database may hold.
    #[error("classification '{level}' is not allowed in database '{database}' (maximum '{ceiling}')")]
    AboveDatabaseCeiling {
        level: String,
        database: String,
        ceiling: String,
    },

    /// The user may not perform this action on the document.
    #[error("user '{user}' cannot {action} documents outside their current access")]
    NotAuthorized { user: String, action: RecordAction },

    /// An attribute tag names a property that is not on the document.
    #[error("attribute classification tag '{attribute}' does not match any document property")]
    UnknownTaggedAttribute { attribute: String },

    /// An attribute tag carries no level.
    #[error("attribute '{attribute}' has an empty classification tag")]
    EmptyAttributeTag { attribute: String },

    /// An attribute is tagged above the writing user's clearance.
    #[error("attribute '{attribute}' is tagged '{level}', above the user's clearance")]
    AttributeAboveClearance { attribute: String, level: String },

    /// The attribute tag map does not cover every document property.
    #[error("attribute classification tags cover {tagged} of {expected} document properties")]
    UntaggedProperties { tagged: usize, expected: usize },

    /// A classification token outside the configured scale.
    #[error(transparent)]
    InvalidClassification(#[from] InvalidClassification),

    /// Policy lookup or rule-model failure.
    #[error(transparent)]
    Accm(#[from] AccmError),
}

/// Result alias for enforcement operations.
pub type Result<T> = std::result::Result<T, EnforcementError>;

// ============================================================================
// AccessEnforcer
// ============================================================================

/// Stateless authorization functions invoked by document mutation and
/// storage iteration code.
#[derive(Debug, Clone)]
pub struct AccessEnforcer {
    deployment: DeploymentPolicy,
}

impl AccessEnforcer {
    pub fn new(deployment: DeploymentPolicy) -> Self {
        Self { deployment }
    }

    pub fn deployment(&self) -> &DeploymentPolicy {
        &self.deployment
    }

    /// Whether a document carries the `classificationMarked=true` flag.
    pub fn is_marked(doc: &Value) -> bool {
        doc.get(payload::CLASSIFICATION_MARKED)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn authorize_create(
        &self,
        database: &DatabaseProfile,
        doc: &Value,
        type_name: &str,
        user: &UserSecurityContext,
    ) -> Result<bool> {
        self.authorize(database, doc, type_name, user, RecordAction::Create)
    }

    pub fn authorize_read(
        &self,
        database: &DatabaseProfile,
        doc: &Value,
        type_name: &str,
        user: &UserSecurityContext,
    ) -> Result<bool> {
        self.authorize(database, doc, type_name, user, RecordAction::Read)
    }

    pub fn authorize_update(
        &self,
        database: &DatabaseProfile,
        doc: &Value,
        type_name: &str,
        user: &UserSecurityContext,
    ) -> Result<bool> {
        self.authorize(database, doc, type_name, user, RecordAction::Update)
    }

    pub fn authorize_delete(
        &self,
        database: &DatabaseProfile,
        doc: &Value,
        type_name: &str,
        user: &UserSecurityContext,
    ) -> Result<bool> {
        self.authorize(database, doc, type_name, user, RecordAction::Delete)
    }

    /// Decides whether `user` may perform `action` on the document.
    ///
    /// Root (HA syncing), service accounts, and data stewards bypass the
    /// check, as do databases with classification validation disabled. A
    /// document must have passed marking before it can be read or deleted;
    /// this guards against records created by paths that bypass marking.
    pub fn authorize(
        &self,
        database: &DatabaseProfile,
        doc: &Value,
        type_name: &str,
        user: &UserSecurityContext,
        action: RecordAction,
    ) -> Result<bool> {
        if user.is_root() {
            return Ok(true);
        }
        if user.is_service_account() || user.is_data_steward(type_name) {
            return Ok(true);
        }
        if !database.classification_enabled {
            return Ok(true);
        }

        if matches!(action, RecordAction::Read | RecordAction::Delete) && !Self::is_marked(doc) {
            return Err(EnforcementError::ClassificationMissing);
        }

        let policies = user
            .policies()
            .ok_or_else(|| AccmError::policy_missing(&database.name))?;
        let restriction = policies.resolve(&database.name, type_name)?;

        // A marked document without a classification block evaluates against
        // an empty object; each predicate's null policy decides.
        let empty = Value::Object(Map::new());
        let block = doc.get(payload::CLASSIFICATION).unwrap_or(&empty);
        let granted = restriction.authorize(action, block, &self.deployment.scale);

        debug!(
            user = %user.username(),
            database = %database.name,
            type_name,
            %action,
            granted,
            "document authorization"
        );
        Ok(granted)
    }

    /// Write-time marking: validates the document's classification markings
    /// and stamps the `classificationMarked` flag. Returns the stamped value.
    ///
    /// Service accounts may write documents that fail validation; the flag is
    /// stamped `false` and the error suppressed, hiding the record from
    /// ordinary users until a data steward corrects it. For interactive users
    /// the error is re-raised and the write aborts.
    pub fn mark(
        &self,
        database: &DatabaseProfile,
        doc: &mut Value,
        type_name: &str,
        user: &UserSecurityContext,
        action: RecordAction,
    ) -> Result<bool> {
        if user.is_root() {
            return Ok(true);
        }

        match validator::validate_classification_markings(
            self, database, doc, type_name, user, action,
        ) {
            Ok(()) => {
                set_marked(doc, true);
                info!(
                    user = %user.username(),
                    type_name,
                    %action,
                    "document classification marked"
                );
                Ok(true)
            }
            Err(error) if user.is_service_account() => {
                warn!(
                    user = %user.username(),
                    type_name,
                    %error,
                    "service-account write failed classification validation; marking false"
                );
                set_marked(doc, false);
                Ok(false)
            }
            Err(error) => Err(error),
        }
    }
}

/// Stamps the marked flag onto the document's JSON view.
fn set_marked(doc: &mut Value, marked: bool) {
    if let Some(map) = doc.as_object_mut() {
        map.insert(payload::CLASSIFICATION_MARKED.to_string(), Value::Bool(marked));
    }
}
