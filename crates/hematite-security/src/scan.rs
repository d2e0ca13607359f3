//! Read-side filtering for the bucket-scan iterator.
//!
//! The storage engine's scan yields candidate records one page at a time;
//! [`ClassifiedScan`] wraps that iterator and forwards only records the
//! current user may read. This check runs once per candidate record on every
//! table scan, so the bypass decision for type-independent privileged users
//! is taken once at construction.
//!
//! Records that fail authorization are skipped silently: filtered records
//! simply do not appear, so a scan never leaks their existence, and a
//! per-record failure never aborts the whole scan.

use crate::context::UserSecurityContext;
use crate::enforcer::AccessEnforcer;
use hematite_types::{DatabaseProfile, RecordAction};
use serde_json::Value;
use tracing::trace;

/// One candidate record produced by a bucket scan: the document's type name
/// and its materialized, read-only JSON view.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRecord {
    pub type_name: String,
    pub document: Value,
}

impl ScanRecord {
    pub fn new(type_name: impl Into<String>, document: Value) -> Self {
        Self {
            type_name: type_name.into(),
            document,
        }
    }
}

/// Lazy iterator adapter that yields only readable records.
///
/// Holds no resources across calls; abandoning the scan between records is
/// always safe.
pub struct ClassifiedScan<'a, I> {
    inner: I,
    enforcer: &'a AccessEnforcer,
    database: &'a DatabaseProfile,
    user: &'a UserSecurityContext,
    /// Root and service accounts skip the per-record check entirely.
    /// Data-steward rights are per-type, so they short-circuit inside the
    /// per-record decision instead.
    bypass: bool,
    skipped: u64,
}

impl<'a, I> ClassifiedScan<'a, I>
where
    I: Iterator<Item = ScanRecord>,
{
    pub fn new(
        inner: I,
        enforcer: &'a AccessEnforcer,
        database: &'a DatabaseProfile,
        user: &'a UserSecurityContext,
    ) -> Self {
        let bypass =
            user.is_root() || user.is_service_account() || !database.classification_enabled;
        Self {
            inner,
            enforcer,
            database,
            user,
            bypass,
            skipped: 0,
        }
    }

    /// How many candidate records this scan has filtered out so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl<I> Iterator for ClassifiedScan<'_, I>
where
    I: Iterator<Item = ScanRecord>,
{
    type Item = ScanRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = self.inner.next()?;
            if self.bypass {
                return Some(record);
            }
            match self.enforcer.authorize(
                self.database,
                &record.document,
                &record.type_name,
                self.user,
                RecordAction::Read,
            ) {
                Ok(true) => return Some(record),
                Ok(false) => {
                    self.skipped += 1;
                    trace!(
                        type_name = %record.type_name,
                        user = %self.user.username(),
                        "record filtered from scan"
                    );
                }
                Err(error) => {
                    // One bad record must not fail the scan; hide it and
                    // move on.
                    self.skipped += 1;
                    trace!(
                        type_name = %record.type_name,
                        user = %self.user.username(),
                        %error,
                        "record failed authorization; filtered from scan"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hematite_accm::{AttributeResponse, PolicyCompiler, PolicySet};
    use hematite_types::{ClassificationScale, DeploymentPolicy};
    use serde_json::json;

    fn deployment() -> DeploymentPolicy {
        DeploymentPolicy::new(ClassificationScale::default(), "TS", "USA").unwrap()
    }

    fn user_with_policies(clearance: &str) -> UserSecurityContext {
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

    fn record(level: &str) -> ScanRecord {
        ScanRecord::new(
            "Report",
            json!({
                "classificationMarked": true,
                "classification": {"components": {"classification": level}}
            }),
        )
    }

    fn unmarked_record() -> ScanRecord {
        ScanRecord::new("Report", json!({"title": "unreviewed"}))
    }

    #[test]
    fn test_scan_filters_above_clearance() {
        let enforcer = AccessEnforcer::new(deployment());
        let database = DatabaseProfile::new("intel");
        let user = user_with_policies("S");

        let records = vec![record("U"), record("TS"), record("C")];
        let mut scan = ClassifiedScan::new(records.into_iter(), &enforcer, &database, &user);

        let yielded: Vec<ScanRecord> = scan.by_ref().collect();
        assert_eq!(yielded.len(), 2);
        assert_eq!(scan.skipped(), 1);
    }

    #[test]
    fn test_unmarked_records_are_hidden_not_errors() {
        let enforcer = AccessEnforcer::new(deployment());
        let database = DatabaseProfile::new("intel");
        let user = user_with_policies("TS");

        let records = vec![unmarked_record(), record("U")];
        let mut scan = ClassifiedScan::new(records.into_iter(), &enforcer, &database, &user);

        // The unmarked record raises ClassificationMissing internally; the
        // scan swallows it and continues.
        let yielded: Vec<ScanRecord> = scan.by_ref().collect();
        assert_eq!(yielded.len(), 1);
        assert_eq!(scan.skipped(), 1);
    }

    #[test]
    fn test_service_account_bypasses_per_record_checks() {
        let enforcer = AccessEnforcer::new(deployment());
        let database = DatabaseProfile::new("intel");
        let svc = UserSecurityContext::new("ingest", 0).as_service_account();

        let records = vec![unmarked_record(), record("TS")];
        let scan = ClassifiedScan::new(records.into_iter(), &enforcer, &database, &svc);
        assert_eq!(scan.count(), 2);
    }

    #[test]
    fn test_steward_sees_only_stewarded_types() {
        let enforcer = AccessEnforcer::new(deployment());
        let database = DatabaseProfile::new("intel");
        let steward = UserSecurityContext::new("carol", 0).with_steward_types(["Report"]);

        let records = vec![
            unmarked_record(),
            ScanRecord::new("Person", json!({"name": "x"})),
        ];
        let mut scan = ClassifiedScan::new(records.into_iter(), &enforcer, &database, &steward);

        let yielded: Vec<ScanRecord> = scan.by_ref().collect();
        assert_eq!(yielded.len(), 1);
        assert_eq!(yielded[0].type_name, "Report");
        assert_eq!(scan.skipped(), 1);
    }

    #[test]
    fn test_empty_scan() {
        let enforcer = AccessEnforcer::new(deployment());
        let database = DatabaseProfile::new("intel");
        let user = user_with_policies("S");

        let scan = ClassifiedScan::new(std::iter::empty(), &enforcer, &database, &user);
        assert_eq!(scan.count(), 0);
    }

    #[test]
    fn test_scan_is_lazy() {
        let enforcer = AccessEnforcer::new(deployment());
        let database = DatabaseProfile::new("intel");
        let user = user_with_policies("TS");

        // An iterator that panics past the second record: taking one result
        // must not exhaust the source.
        let records = vec![record("U"), record("C")]
            .into_iter()
            .chain(std::iter::from_fn(|| panic!("scan read past the limit")));
        let mut scan = ClassifiedScan::new(records, &enforcer, &database, &user);
        assert!(scan.next().is_some());
    }
}
