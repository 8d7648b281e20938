//! Record and arena error types.

use std::error::Error;
use std::fmt;

use strata_core::FieldError;

/// Errors from record construction, access, and arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordError {
    /// A slot metadata lookup failed.
    Field(FieldError),
    /// A `RecordHandle` whose arena entry has been removed or reused.
    StaleHandle {
        /// The index encoded in the handle.
        index: u32,
        /// The generation encoded in the handle.
        generation: u32,
    },
    /// A value whose kind does not match the slot's declared type.
    TypeMismatch {
        /// Name of the slot being assigned.
        slot: String,
        /// The declared type name.
        expected: String,
        /// The kind of the rejected value.
        found: String,
    },
    /// A positional initializer list whose length does not match the
    /// schema's slot count.
    ArityMismatch {
        /// Number of slots the schema declares.
        expected: usize,
        /// Number of values supplied.
        found: usize,
    },
    /// Attempted to observe a slot that is not declared observable.
    NotObservable {
        /// Name of the slot.
        slot: String,
    },
    /// Attempted to descend into a scalar slot.
    NotNested {
        /// Name of the slot.
        slot: String,
    },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(e) => write!(f, "{e}"),
            Self::StaleHandle { index, generation } => {
                write!(f, "stale record handle (index {index}, generation {generation})")
            }
            Self::TypeMismatch {
                slot,
                expected,
                found,
            } => {
                write!(f, "slot '{slot}' expects {expected}, got {found}")
            }
            Self::ArityMismatch { expected, found } => {
                write!(f, "schema declares {expected} slots, {found} initializers supplied")
            }
            Self::NotObservable { slot } => {
                write!(f, "slot '{slot}' is not observable")
            }
            Self::NotNested { slot } => {
                write!(f, "slot '{slot}' is not a nested record")
            }
        }
    }
}

impl Error for RecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Field(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FieldError> for RecordError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_wraps_and_sources() {
        let e: RecordError = FieldError::UnknownName { name: "z".into() }.into();
        assert_eq!(e.to_string(), "no slot named 'z'");
        assert!(Error::source(&e).is_some());
    }

    #[test]
    fn mismatch_messages() {
        let e = RecordError::TypeMismatch {
            slot: "x".into(),
            expected: "i32".into(),
            found: "bool".into(),
        };
        assert_eq!(e.to_string(), "slot 'x' expects i32, got bool");

        let e = RecordError::ArityMismatch { expected: 3, found: 1 };
        assert_eq!(e.to_string(), "schema declares 3 slots, 1 initializers supplied");
    }
}
