//! Mapping errors

use crate::value::ValueKind;
use dtokit_types::{DeclarationError, TypeName};
use thiserror::Error;

/// Errors raised while building descriptors or constructing instances
///
/// Construction is all-or-nothing: the first failing field aborts the
/// instance, and a nested instance's failure is returned unchanged as the
/// failure of the enclosing construction.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MapError {
    /// A field's type declaration could not be parsed or resolved
    #[error("Invalid declaration of `{type_name}::{field}`: {source}")]
    InvalidDeclaration {
        /// Type whose descriptors were being built
        type_name: TypeName,
        /// Offending field
        field: String,
        /// Underlying declaration error
        #[source]
        source: DeclarationError,
    },

    /// Input lacks the key of a required field
    #[error("Non-nullable property `{type_name}::{field}` has not been initialized.")]
    MissingRequiredField {
        /// Type being constructed
        type_name: TypeName,
        /// Field that could not be filled
        field: String,
        /// Input key that was looked up
        source_key: String,
    },

    /// The cast value matches none of the field's allowed types
    #[error(
        "Invalid type: expected `{type_name}::{field}` to be of type `{}`, instead got value `{actual}`, which is {actual_kind}.",
        .expected.join(", ")
    )]
    InvalidType {
        /// Type being constructed
        type_name: TypeName,
        /// Rejected field
        field: String,
        /// Canonical allowed types, in declaration order
        expected: Vec<String>,
        /// Kind of the rejected value
        actual_kind: ValueKind,
        /// Summary of the rejected value
        actual: String,
    },

    /// The type (or one of its ancestors) has no registered schema
    #[error("Type `{type_name}` is not registered")]
    UnknownType {
        /// Unregistered type
        type_name: TypeName,
    },

    /// A type's ancestry loops back onto itself
    #[error("Type `{type_name}` inherits from itself")]
    CyclicInheritance {
        /// Type whose ancestry contains the cycle
        type_name: TypeName,
    },

    /// Nested construction went deeper than the configured ceiling
    #[error("Maximum nesting depth of {limit} exceeded while constructing `{type_name}`")]
    DepthExceeded {
        /// Type whose construction would exceed the limit
        type_name: TypeName,
        /// Configured ceiling
        limit: usize,
    },

    /// A mapped field holds a value of the wrong shape for a Rust type
    #[error("Cannot read `{type_name}::{field}` as {expected}: value is {actual_kind}")]
    Conversion {
        /// Type of the mapped instance
        type_name: TypeName,
        /// Field being read
        field: String,
        /// Rust-side expectation
        expected: &'static str,
        /// Kind actually stored
        actual_kind: ValueKind,
    },

    /// A mapped instance has no field with the requested name
    #[error("Type `{type_name}` has no field `{field}`")]
    UnknownField {
        /// Type of the mapped instance
        type_name: TypeName,
        /// Requested field
        field: String,
    },
}

impl MapError {
    /// Field the error is about, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            MapError::InvalidDeclaration { field, .. }
            | MapError::MissingRequiredField { field, .. }
            | MapError::InvalidType { field, .. }
            | MapError::Conversion { field, .. }
            | MapError::UnknownField { field, .. } => Some(field),
            MapError::UnknownType { .. } | MapError::CyclicInheritance { .. } | MapError::DepthExceeded { .. } => {
                None
            }
        }
    }

    /// Type the error is about
    pub fn type_name(&self) -> &TypeName {
        match self {
            MapError::InvalidDeclaration { type_name, .. }
            | MapError::MissingRequiredField { type_name, .. }
            | MapError::InvalidType { type_name, .. }
            | MapError::UnknownType { type_name }
            | MapError::CyclicInheritance { type_name }
            | MapError::DepthExceeded { type_name, .. }
            | MapError::Conversion { type_name, .. }
            | MapError::UnknownField { type_name, .. } => type_name,
        }
    }
}

/// Result type for mapping operations
pub type MapResult<T> = Result<T, MapError>;
