//! Per-database policies and fail-closed resolution.
//!
//! A [`Policy`] bundles the type restrictions, role names, and raw identity
//! attributes for one database (or the `*` fallback). [`PolicySet`] selects
//! the applicable restriction for a (database, type) pair; when nothing
//! applies the lookup is a hard error, never an implicit "allow".

use crate::error::AccmError;
use crate::restriction::TypeRestriction;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Database selector: an exact name or the `*` fallback.
pub const ANY_DATABASE: &str = "*";

// ============================================================================
// Policy
// ============================================================================

/// The compiled access policy for one database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Exact database name, or [`ANY_DATABASE`].
    pub database: String,
    /// Role names carried over from the identity provider.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Raw identity attributes, kept for diagnostics and downstream
    /// consumers.
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// Type restrictions in resolution order.
    #[serde(default)]
    pub restrictions: Vec<TypeRestriction>,
}

impl Policy {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            roles: Vec::new(),
            attributes: Map::new(),
            restrictions: Vec::new(),
        }
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_restriction(mut self, restriction: TypeRestriction) -> Self {
        self.restrictions.push(restriction);
        self
    }

    /// Selects the restriction for `type_name`: exact match first, then the
    /// first matching pattern, then the wildcard.
    pub fn restriction_for(&self, type_name: &str) -> Option<&TypeRestriction> {
        self.restrictions
            .iter()
            .find(|r| r.type_match.is_exact() && r.type_match.matches(type_name))
            .or_else(|| {
                self.restrictions
                    .iter()
                    .find(|r| !r.type_match.is_wildcard() && r.type_match.matches(type_name))
            })
            .or_else(|| self.restrictions.iter().find(|r| r.type_match.is_wildcard()))
    }
}

// ============================================================================
// PolicySet
// ============================================================================

/// The full set of per-database policies compiled for one session.
///
/// Immutable after compilation; concurrent readers share it without locking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicySet {
    policies: Vec<Policy>,
}

impl PolicySet {
    pub fn new(policies: Vec<Policy>) -> Self {
        Self { policies }
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Policy> {
        self.policies.iter()
    }

    /// Selects the policy for `database`: exact name first, then the `*`
    /// policy, else [`AccmError::PolicyMissing`].
    pub fn policy_for(&self, database: &str) -> Result<&Policy, AccmError> {
        self.policies
            .iter()
            .find(|p| p.database == database)
            .or_else(|| self.policies.iter().find(|p| p.database == ANY_DATABASE))
            .ok_or_else(|| AccmError::policy_missing(database))
    }

    /// Resolves the type restriction for a (database, type) pair, failing
    /// closed when either lookup comes up empty.
    pub fn resolve(&self, database: &str, type_name: &str) -> Result<&TypeRestriction, AccmError> {
        let policy = self.policy_for(database)?;
        policy
            .restriction_for(type_name)
            .ok_or_else(|| AccmError::type_restriction_missing(database, type_name))
    }
}

impl From<Vec<Policy>> for PolicySet {
    fn from(policies: Vec<Policy>) -> Self {
        Self::new(policies)
    }
}
