//! Error types for descriptor validation.
//!
//! Error codes:
//! - STRATA_VALIDATION_FAILED (REJECT)
//! - STRATA_UNKNOWN_TAG (REJECT)
//! - STRATA_IDENTITY_INVALID (REJECT)
//!
//! Every error rejects exactly one construction. Errors are never retried or
//! swallowed, and no partial instance escapes a failed constructor call.

use std::fmt;
use thiserror::Error;

/// Result type for schema and construction operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Validation failure details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Field path (e.g. "address.city" or "tags[1]")
    pub field: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl ValidationDetails {
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected: "field to be present".into(),
            actual: "missing".into(),
        }
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn null_value(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected: "non-null value".into(),
            actual: "null".into(),
        }
    }

    pub fn refinement_failed(rule: impl Into<String>) -> Self {
        Self {
            field: "$root".into(),
            expected: format!("refinement '{}' to hold", rule.into()),
            actual: "violated".into(),
        }
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field '{}': expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Errors raised by validation and construction
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// Input violates the composed descriptor
    #[error("validation failed: {details}")]
    ValidationFailed {
        /// What failed, where
        details: ValidationDetails,
    },

    /// Discriminator value absent or not one of the known tags
    #[error("unknown variant tag: discriminator '{discriminator}' {found}")]
    UnknownTag {
        /// The discriminator field name
        discriminator: String,
        /// What was found in its place
        found: String,
    },

    /// `id` missing or empty at an entity layer
    #[error("invalid identity: {reason}")]
    IdentityInvalid {
        /// Why the identity was rejected
        reason: String,
    },
}

impl SchemaError {
    /// Returns the stable string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::ValidationFailed { .. } => "STRATA_VALIDATION_FAILED",
            SchemaError::UnknownTag { .. } => "STRATA_UNKNOWN_TAG",
            SchemaError::IdentityInvalid { .. } => "STRATA_IDENTITY_INVALID",
        }
    }

    /// Create a validation failed error from details
    pub fn validation_failed(details: ValidationDetails) -> Self {
        SchemaError::ValidationFailed { details }
    }

    /// Create a missing required field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::validation_failed(ValidationDetails::missing_field(field))
    }

    /// Create a type mismatch error
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::validation_failed(ValidationDetails::type_mismatch(field, expected, actual))
    }

    /// Create a null value error
    pub fn null_value(field: impl Into<String>) -> Self {
        Self::validation_failed(ValidationDetails::null_value(field))
    }

    /// Create a failed refinement error
    pub fn refinement_failed(rule: impl Into<String>) -> Self {
        Self::validation_failed(ValidationDetails::refinement_failed(rule))
    }

    /// Create an unknown tag error; `found` is `None` when the discriminator
    /// field is absent from the input
    pub fn unknown_tag(discriminator: impl Into<String>, found: Option<&str>) -> Self {
        SchemaError::UnknownTag {
            discriminator: discriminator.into(),
            found: match found {
                Some(value) => format!("got '{}'", value),
                None => "is missing".into(),
            },
        }
    }

    /// Create an identity error
    pub fn identity(reason: impl Into<String>) -> Self {
        SchemaError::IdentityInvalid {
            reason: reason.into(),
        }
    }

    /// Returns validation details if applicable
    pub fn details(&self) -> Option<&ValidationDetails> {
        match self {
            SchemaError::ValidationFailed { details } => Some(details),
            _ => None,
        }
    }
}
