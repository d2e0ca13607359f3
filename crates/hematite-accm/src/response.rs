//! The attribute authority's response, as consumed by the policy compiler.
//!
//! The identity provider answers one question per session: who is this user,
//! in classification terms. The network client that fetches the response is
//! an external collaborator; only its shape is modeled here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Releasability tag granted with Five-Eyes access.
pub const FVEY: &str = "FVEY";
/// Releasability tag granted with ACGU access.
pub const ACGU: &str = "ACGU";

/// One user's classification attributes, as returned by the attribute
/// authority.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeResponse {
    /// The user's clearance level on the deployment scale.
    pub clearance: String,
    /// ISO trigraph nationality, e.g. `USA`.
    pub nationality: String,
    /// Whether the user holds Five-Eyes releasability.
    #[serde(rename = "fveyAccess")]
    pub fvey_access: bool,
    /// Whether the user holds ACGU releasability.
    #[serde(rename = "acguAccess")]
    pub acgu_access: bool,
    /// Whether the user may read NOFORN-marked documents.
    #[serde(rename = "nofornAccess")]
    pub noforn_access: bool,
    /// Whether the user holds any compartment access at all.
    #[serde(rename = "accmAccess")]
    pub accm_access: bool,
    /// Comma-separated compartment/program read-ons.
    #[serde(rename = "programReadons")]
    pub program_readons: String,
    /// Role names assigned by the identity provider.
    pub role_mappings: Vec<String>,
    /// Free-form identity attributes, passed through to the policy.
    pub user_attributes: Map<String, Value>,
}

impl AttributeResponse {
    pub fn new(clearance: impl Into<String>, nationality: impl Into<String>) -> Self {
        Self {
            clearance: clearance.into(),
            nationality: nationality.into(),
            ..Self::default()
        }
    }

    pub fn with_fvey_access(mut self) -> Self {
        self.fvey_access = true;
        self
    }

    pub fn with_acgu_access(mut self) -> Self {
        self.acgu_access = true;
        self
    }

    pub fn with_noforn_access(mut self) -> Self {
        self.noforn_access = true;
        self
    }

    /// Grants compartment access with the given read-ons.
    pub fn with_readons<I, S>(mut self, readons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accm_access = true;
        self.program_readons = readons
            .into_iter()
            .map(Into::into)
            .collect::<Vec<_>>()
            .join(",");
        self
    }

    /// The compartment read-ons, split and trimmed.
    pub fn compartments(&self) -> Vec<String> {
        self.program_readons
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// The user's releasability tags: nationality plus any alliance tags.
    pub fn releasability_tags(&self) -> Vec<String> {
        let mut tags = Vec::with_capacity(3);
        if !self.nationality.trim().is_empty() {
            tags.push(self.nationality.trim().to_string());
        }
        if self.fvey_access {
            tags.push(FVEY.to_string());
        }
        if self.acgu_access {
            tags.push(ACGU.to_string());
        }
        tags
    }
}
