//! Shared error types for field metadata lookups.
//!
//! Schema-definition-time errors live with the schema crate; this module
//! only carries the runtime lookup failures that every layer of the
//! workspace reports: positional and by-name slot lookups.

use std::error::Error;
use std::fmt;

/// Errors from slot metadata lookups on a schema or record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// A positional lookup past the end of the slot list.
    OutOfRange {
        /// The requested position.
        position: usize,
        /// Number of slots in the schema.
        count: usize,
    },
    /// A by-name lookup for a name no slot declares.
    ///
    /// Duplicate names are rejected when the schema is built, so a name
    /// that resolves at all resolves unambiguously.
    UnknownName {
        /// The unrecognised slot name.
        name: String,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { position, count } => {
                write!(f, "slot position {position} out of range (schema has {count} slots)")
            }
            Self::UnknownName { name } => {
                write!(f, "no slot named '{name}'")
            }
        }
    }
}

impl Error for FieldError {}
