//! # hematite-accm: Access Control for Classified Markings
//!
//! The rule-evaluation engine behind Hematite's mandatory per-record
//! classification enforcement, and the compiler that builds each session's
//! rules from the attribute authority's response.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │  AttributeResponse                             │
//! │  (clearance, nationality, alliances, read-ons) │
//! └─────────────────┬─────────────────────────────┘
//!                   │ PolicyCompiler::compile (once per session)
//!                   ▼
//! ┌───────────────────────────────────────────────┐
//! │  PolicySet                                     │
//! │  └─ Policy per database                        │
//! │      └─ TypeRestriction per type match         │
//! │          └─ Expression (AND/OR tree)           │
//! │              └─ Argument (field comparison)    │
//! └─────────────────┬─────────────────────────────┘
//!                   │ resolve + authorize (per record)
//!                   ▼
//!     allow / deny against the document's
//!     classification block
//! ```
//!
//! Everything below the response model is immutable after compilation, so
//! concurrent evaluation against one compiled [`PolicySet`] needs no locking.
//!
//! ## Examples
//!
//! ```
//! use hematite_accm::{AttributeResponse, PolicyCompiler, PolicySet};
//! use hematite_types::{ClassificationScale, DeploymentPolicy, RecordAction};
//! use serde_json::json;
//!
//! let deployment =
//!     DeploymentPolicy::new(ClassificationScale::default(), "TS", "USA").unwrap();
//! let compiler = PolicyCompiler::new(deployment);
//!
//! let response = AttributeResponse::new("S", "USA");
//! let policies = compiler
//!     .compile(&response, &["intel".to_string()])
//!     .unwrap();
//!
//! let set = PolicySet::new(policies);
//! let restriction = set.resolve("intel", "Report").unwrap();
//! let block = json!({"components": {"classification": "C"}});
//! assert!(restriction.authorize(
//!     RecordAction::Read,
//!     &block,
//!     &ClassificationScale::default()
//! ));
//! ```

pub mod argument;
pub mod compiler;
pub mod error;
pub mod expression;
pub mod policy;
pub mod response;
pub mod restriction;

#[cfg(any(test, kani))]
mod kani_proofs;

pub use argument::{Argument, ArgumentOperator, Operand, Scalar};
pub use compiler::PolicyCompiler;
pub use error::AccmError;
pub use expression::{Expression, ExpressionOperator};
pub use policy::{ANY_DATABASE, Policy, PolicySet};
pub use response::AttributeResponse;
pub use restriction::{TypeMatch, TypeRestriction};
