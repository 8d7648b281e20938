//! Core types and traits for the Strata record framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Strata workspace:
//! slot values and their storage extents, flat observable indices, the
//! listener trait, and shared error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod listener;
pub mod value;

pub use error::FieldError;
pub use id::{FlatIndex, SlotPath};
pub use listener::{listener, ChangePolicy, Listener, ListenerRef};
pub use value::{Value, ValueKind};
