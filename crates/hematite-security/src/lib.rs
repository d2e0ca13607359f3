//! # hematite-security: Classification enforcement
//!
//! Wires the ACCM rule engine into the document write path and the storage
//! engine's bucket-scan read path.
//!
//! ## Architecture
//!
//! ```text
//! write path                         read path (per candidate record)
//! ──────────                         ─────────────────────────────────
//! document layer                     bucket scan
//!       │                                 │
//!       ▼                                 ▼
//! AccessEnforcer::mark              ClassifiedScan
//!   ├─ validator: payload shape,      ├─ bypass for root/service
//!   │  ceilings, attribute tags       └─ AccessEnforcer::authorize(READ)
//!   ├─ AccessEnforcer::authorize           ├─ classificationMarked pre-check
//!   └─ stamp classificationMarked          └─ PolicySet::resolve + evaluate
//! ```
//!
//! A [`UserSecurityContext`] is built once per authenticated session and
//! carries the compiled, immutable [`hematite_accm::PolicySet`]; the scan
//! path reads it lock-free.

pub mod context;
pub mod enforcer;
pub mod scan;
pub mod validator;

#[cfg(kani)]
mod kani_proofs;

pub use context::{ROOT_USER, UserSecurityContext};
pub use enforcer::{AccessEnforcer, EnforcementError};
pub use scan::{ClassifiedScan, ScanRecord};
pub use validator::validate_classification_markings;
