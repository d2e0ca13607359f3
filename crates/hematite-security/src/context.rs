//! Per-session user security context.
//!
//! Built once per authenticated session from the attribute authority's
//! response. The compiled policy set is installed into a `OnceLock` slot:
//! compilation (a blocking external call) happens outside any storage lock,
//! and every later read on the scan path is lock-free.

use hematite_accm::{AccmError, AttributeResponse, PolicySet};
use hematite_types::{ClassificationScale, InvalidClassification};
use std::sync::OnceLock;

/// The reserved superuser name; bypasses enforcement for HA syncing.
pub const ROOT_USER: &str = "root";

/// Everything the enforcement layer needs to know about one session's user.
#[derive(Debug, Clone, Default)]
pub struct UserSecurityContext {
    username: String,
    clearance_rank: u8,
    nationality: String,
    releasability_tags: Vec<String>,
    noforn_access: bool,
    compartment_access: bool,
    compartment_readons: Vec<String>,
    service_account: bool,
    /// Type names this user stewards; `*` covers every type.
    steward_types: Vec<String>,
    policies: OnceLock<PolicySet>,
}

impl UserSecurityContext {
    pub fn new(username: impl Into<String>, clearance_rank: u8) -> Self {
        Self {
            username: username.into(),
            clearance_rank,
            ..Self::default()
        }
    }

    /// Builds a context from the attribute authority's response.
    pub fn from_response(
        username: impl Into<String>,
        response: &AttributeResponse,
        scale: &ClassificationScale,
    ) -> Result<Self, InvalidClassification> {
        let clearance_rank = scale.rank(&response.clearance)?;
        Ok(Self {
            username: username.into(),
            clearance_rank,
            nationality: response.nationality.trim().to_string(),
            releasability_tags: response.releasability_tags(),
            noforn_access: response.noforn_access,
            compartment_access: response.accm_access,
            compartment_readons: response.compartments(),
            service_account: false,
            steward_types: Vec::new(),
            policies: OnceLock::new(),
        })
    }

    pub fn with_nationality(mut self, nationality: impl Into<String>) -> Self {
        self.nationality = nationality.into();
        self
    }

    pub fn with_releasability_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.releasability_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_noforn_access(mut self) -> Self {
        self.noforn_access = true;
        self
    }

    pub fn with_compartments<I, S>(mut self, readons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compartment_access = true;
        self.compartment_readons = readons.into_iter().map(Into::into).collect();
        self
    }

    pub fn as_service_account(mut self) -> Self {
        self.service_account = true;
        self
    }

    /// Grants data-steward rights over the given type names (`*` for all).
    pub fn with_steward_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steward_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn clearance_rank(&self) -> u8 {
        self.clearance_rank
    }

    pub fn nationality(&self) -> &str {
        &self.nationality
    }

    pub fn releasability_tags(&self) -> &[String] {
        &self.releasability_tags
    }

    pub fn has_noforn_access(&self) -> bool {
        self.noforn_access
    }

    pub fn has_compartment_access(&self) -> bool {
        self.compartment_access
    }

    pub fn compartment_readons(&self) -> &[String] {
        &self.compartment_readons
    }

    pub fn is_root(&self) -> bool {
        self.username == ROOT_USER
    }

    pub fn is_service_account(&self) -> bool {
        self.service_account
    }

    /// Whether the user stewards documents of `type_name`.
    pub fn is_data_steward(&self, type_name: &str) -> bool {
        self.steward_types
            .iter()
            .any(|t| t == "*" || t == type_name)
    }

    /// Installs the compiled policy set. Returns `false` if a set was
    /// already installed (the existing one is kept).
    pub fn install_policies(&self, policies: PolicySet) -> bool {
        self.policies.set(policies).is_ok()
    }

    /// The session's compiled policies, if installed.
    pub fn policies(&self) -> Option<&PolicySet> {
        self.policies.get()
    }

    /// The session's policies, compiling them on first access.
    ///
    /// The compile closure performs the blocking attribute-authority call;
    /// invoke this outside any storage-engine lock. If two threads race,
    /// one compilation wins and the other result is dropped.
    pub fn policies_or_compile<F>(&self, compile: F) -> Result<&PolicySet, AccmError>
    where
        F: FnOnce() -> Result<PolicySet, AccmError>,
    {
        if let Some(policies) = self.policies.get() {
            return Ok(policies);
        }
        let compiled = compile()?;
        // If another thread raced us here, its result wins and ours drops.
        Ok(self.policies.get_or_init(|| compiled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hematite_accm::Policy;

    #[test]
    fn test_root_detection() {
        assert!(UserSecurityContext::new(ROOT_USER, 0).is_root());
        assert!(!UserSecurityContext::new("alice", 3).is_root());
    }

    #[test]
    fn test_steward_types() {
        let user = UserSecurityContext::new("carol", 2).with_steward_types(["Report"]);
        assert!(user.is_data_steward("Report"));
        assert!(!user.is_data_steward("Person"));

        let global = UserSecurityContext::new("dave", 2).with_steward_types(["*"]);
        assert!(global.is_data_steward("anything"));
    }

    #[test]
    fn test_from_response() {
        let response = AttributeResponse::new("S", "USA")
            .with_noforn_access()
            .with_readons(["ALPHA"]);
        let user = UserSecurityContext::from_response(
            "alice",
            &response,
            &ClassificationScale::default(),
        )
        .unwrap();

        assert_eq!(user.clearance_rank(), 3);
        assert_eq!(user.nationality(), "USA");
        assert!(user.has_noforn_access());
        assert!(user.has_compartment_access());
        assert_eq!(user.compartment_readons(), ["ALPHA"]);
    }

    #[test]
    fn test_from_response_rejects_unknown_clearance() {
        let response = AttributeResponse::new("ULTRA", "USA");
        assert!(
            UserSecurityContext::from_response(
                "alice",
                &response,
                &ClassificationScale::default()
            )
            .is_err()
        );
    }

    #[test]
    fn test_policies_installed_once() {
        let user = UserSecurityContext::new("alice", 3);
        assert!(user.policies().is_none());

        let first = PolicySet::new(vec![Policy::new("intel")]);
        assert!(user.install_policies(first));
        assert!(!user.install_policies(PolicySet::new(vec![])));
        assert_eq!(user.policies().map(PolicySet::len), Some(1));
    }

    #[test]
    fn test_policies_or_compile_runs_once() {
        let user = UserSecurityContext::new("alice", 3);
        let mut calls = 0;
        let set = user
            .policies_or_compile(|| {
                calls += 1;
                Ok(PolicySet::new(vec![Policy::new("intel")]))
            })
            .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(calls, 1);

        // Cached thereafter.
        let set = user
            .policies_or_compile(|| panic!("must not recompile"))
            .unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_policies_or_compile_propagates_failure() {
        let user = UserSecurityContext::new("alice", 3);
        let result =
            user.policies_or_compile(|| Err(hematite_accm::AccmError::policy_missing("intel")));
        assert!(result.is_err());
        assert!(user.policies().is_none());
    }
}
