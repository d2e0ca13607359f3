//! Rule-engine and policy-resolution errors.
//!
//! Policy lookups fail closed: a missing policy or type restriction is a
//! hard error, never an implicit "allow". Operand shape mismatches are NOT
//! errors — a malformed predicate evaluates to `false` so one bad rule
//! cannot crash an entire scan.

use hematite_types::InvalidClassification;
use thiserror::Error;

/// Errors raised by the policy model and compiler.
#[derive(Debug, Error)]
pub enum AccmError {
    /// A classification token outside the configured scale.
    #[error(transparent)]
    InvalidClassification(#[from] InvalidClassification),

    /// No policy applies to the database.
    #[error("no policy applies to database '{database}'")]
    PolicyMissing { database: String },

    /// A policy applies to the database but none of its type restrictions
    /// match the document type.
    #[error("no type restriction applies to type '{type_name}' in database '{database}'")]
    TypeRestrictionMissing {
        database: String,
        type_name: String,
    },

    /// A type-restriction pattern that fails to compile.
    #[error("invalid type pattern '{pattern}': {source}")]
    MalformedPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },
}

impl AccmError {
    /// Creates a [`AccmError::PolicyMissing`] for `database`.
    pub fn policy_missing(database: impl Into<String>) -> Self {
        Self::PolicyMissing {
            database: database.into(),
        }
    }

    /// Creates a [`AccmError::TypeRestrictionMissing`].
    pub fn type_restriction_missing(
        database: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self::TypeRestrictionMissing {
            database: database.into(),
            type_name: type_name.into(),
        }
    }

}

/// Result alias for policy operations.
pub type Result<T> = std::result::Result<T, AccmError>;
