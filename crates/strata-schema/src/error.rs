//! Schema-definition-time error types.
//!
//! Everything here is an authoring mistake: these errors are raised
//! while a schema is being built, before any record instance can exist.
//! Runtime lookup failures use [`strata_core::FieldError`] instead.

use std::error::Error;
use std::fmt;

/// Errors from the layout offset walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// A slot declared a zero byte size.
    ZeroSizedSlot {
        /// Declaration index of the offending slot.
        index: usize,
    },
    /// A slot declared an alignment that is not a power of two.
    AlignmentNotPowerOfTwo {
        /// Declaration index of the offending slot.
        index: usize,
        /// The rejected alignment.
        align: usize,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSizedSlot { index } => {
                write!(f, "slot {index} has zero size")
            }
            Self::AlignmentNotPowerOfTwo { index, align } => {
                write!(f, "slot {index} alignment {align} is not a power of two")
            }
        }
    }
}

impl Error for LayoutError {}

/// Errors from schema construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaError {
    /// Two slots declared the same name. Rejected at build time so that
    /// by-name lookup can never be ambiguous.
    DuplicateSlotName {
        /// The name declared twice.
        name: String,
    },
    /// The slot extents do not admit a valid layout.
    Layout(LayoutError),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSlotName { name } => {
                write!(f, "duplicate slot name '{name}'")
            }
            Self::Layout(e) => write!(f, "layout: {e}"),
        }
    }
}

impl Error for SchemaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Layout(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LayoutError> for SchemaError {
    fn from(e: LayoutError) -> Self {
        Self::Layout(e)
    }
}
