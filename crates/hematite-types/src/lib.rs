//! # hematite-types: Shared classification and record types
//!
//! Leaf types used across the Hematite access-control stack:
//! - Ordered sensitivity levels ([`ClassificationScale`])
//! - Record operations ([`RecordAction`]) and graph element kinds ([`GraphKind`])
//! - Deployment-wide enforcement configuration ([`DeploymentPolicy`])
//! - Per-database enforcement profile ([`DatabaseProfile`])
//! - The JSON field names of the classification payload ([`payload`])

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

pub mod scale;

pub use scale::{ClassificationScale, InvalidClassification, level_from_marking};

// ============================================================================
// RecordAction
// ============================================================================

/// A CRUD operation on a record, as seen by the enforcement layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordAction {
    Create,
    Read,
    Update,
    Delete,
}

impl RecordAction {
    /// Whether this action mutates the record.
    pub fn is_write(self) -> bool {
        matches!(self, Self::Create | Self::Update | Self::Delete)
    }
}

impl Display for RecordAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// GraphKind
// ============================================================================

/// The kind of graph element a type restriction applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GraphKind {
    Vertex,
    Edge,
    Document,
    Any,
}

impl GraphKind {
    /// Whether a restriction declared for `self` covers an element of `other`.
    pub fn covers(self, other: GraphKind) -> bool {
        self == GraphKind::Any || other == GraphKind::Any || self == other
    }
}

// ============================================================================
// DeploymentPolicy
// ============================================================================

/// Process-wide enforcement configuration.
///
/// Threaded explicitly through the policy compiler and the enforcer; nothing
/// in the enforcement path reads ambient process state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPolicy {
    /// The ordered classification scale for this deployment.
    pub scale: ClassificationScale,
    /// The highest level this deployment may hold. Documents and predicates
    /// above this level are rejected regardless of user clearance.
    pub clamp: String,
    /// The nation operating this deployment. Documents without a
    /// releasability list default to visible for home-nation users.
    pub home_nation: String,
}

impl DeploymentPolicy {
    /// Creates a deployment policy, validating that the clamp resolves on
    /// the scale.
    pub fn new(
        scale: ClassificationScale,
        clamp: impl Into<String>,
        home_nation: impl Into<String>,
    ) -> Result<Self, InvalidClassification> {
        let clamp = clamp.into();
        scale.rank(&clamp)?;
        Ok(Self {
            scale,
            clamp,
            home_nation: home_nation.into(),
        })
    }

    /// The rank of the deployment clamp on the scale.
    pub fn clamp_rank(&self) -> u8 {
        // The constructor verified the clamp resolves; a failure here means
        // the struct was built by hand with an off-scale clamp.
        self.scale.rank(&self.clamp).unwrap_or(0)
    }
}

// ============================================================================
// DatabaseProfile
// ============================================================================

/// Per-database enforcement settings supplied by the schema layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseProfile {
    /// The database name, used for policy selection.
    pub name: String,
    /// Whether classification validation is enabled for this database.
    pub classification_enabled: bool,
    /// The highest level this database may hold, if stricter than the
    /// deployment clamp.
    pub ceiling: Option<String>,
}

impl DatabaseProfile {
    /// Creates a profile with classification validation enabled and no
    /// database-level ceiling.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classification_enabled: true,
            ceiling: None,
        }
    }

    /// Sets the database-level classification ceiling.
    pub fn with_ceiling(mut self, ceiling: impl Into<String>) -> Self {
        self.ceiling = Some(ceiling.into());
        self
    }

    /// Disables classification validation for this database.
    pub fn with_validation_disabled(mut self) -> Self {
        self.classification_enabled = false;
        self
    }
}

// ============================================================================
// Classification payload field names
// ============================================================================

/// JSON field names of the persisted classification payload.
///
/// The payload lives on each document as
/// `{"classification": {"components": {...}}}` plus a top-level
/// `classificationMarked` flag stamped by the enforcer.
pub mod payload {
    /// Top-level classification object on a document.
    pub const CLASSIFICATION: &str = "classification";
    /// Marking components object inside the classification payload.
    pub const COMPONENTS: &str = "components";
    /// The bare level inside `components`.
    pub const LEVEL: &str = "classification";
    /// Nations and alliances the document may be disclosed to.
    pub const RELEASABLE_TO: &str = "releasableTo";
    /// Dissemination-control markings such as `NOFORN`.
    pub const DISSEMINATION_CONTROLS: &str = "disseminationControls";
    /// Compartment/program markings required to read the document.
    pub const PROGRAM_NICKNAMES: &str = "programNicknames";
    /// Non-IC markings; contains `ACCM` on compartmented documents.
    pub const NON_IC_MARKINGS: &str = "nonICmarkings";
    /// Optional per-attribute level map inside the classification payload.
    pub const ATTRIBUTES: &str = "attributes";
    /// Flag stamped by the enforcer once a document passed marking.
    pub const CLASSIFICATION_MARKED: &str = "classificationMarked";

    /// Audit fields maintained by the document layer.
    pub const CREATED_BY: &str = "createdBy";
    pub const CREATED_DATE: &str = "createdDate";
    pub const LAST_MODIFIED_BY: &str = "lastModifiedBy";
    pub const LAST_MODIFIED_DATE: &str = "lastModifiedDate";

    /// Properties exempt from attribute-level classification tagging.
    pub const SYSTEM_PROPERTIES: &[&str] = &[
        CLASSIFICATION,
        CLASSIFICATION_MARKED,
        CREATED_BY,
        CREATED_DATE,
        LAST_MODIFIED_BY,
        LAST_MODIFIED_DATE,
    ];
}
