//! Strata: schema-driven records with computed layouts and observable
//! slots.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Strata sub-crates. For most users, adding `strata` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use strata::prelude::*;
//!
//! // Describe a record type once; the schema owns the byte layout and
//! // the observable-slot index space.
//! let point = SchemaBuilder::new("point")
//!     .observable("x", ValueKind::I32)
//!     .observable("y", ValueKind::I32)
//!     .build()
//!     .unwrap();
//!
//! // Instantiate it and watch a slot. Assigning an equal value is a
//! // no-op; only actual changes reach the listener.
//! let mut rec = Record::new(point);
//! let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
//! let sink = std::rc::Rc::clone(&seen);
//! let watch = listener(move |v: &Value| sink.borrow_mut().push(v.clone()));
//! rec.observe(0, &watch).unwrap();
//!
//! rec.set(0, Value::I32(42)).unwrap();
//! rec.set(0, Value::I32(42)).unwrap();
//! rec.set(0, Value::I32(137)).unwrap();
//! assert_eq!(*seen.borrow(), vec![Value::I32(42), Value::I32(137)]);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strata-core` | Values, kinds, flat indices, the listener trait |
//! | [`schema`] | `strata-schema` | Schema builder and the layout engine |
//! | [`observe`] | `strata-observe` | Observer registry and scoped bindings |
//! | [`record`] | `strata-record` | Record instances, nested views, the arena |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Values, kinds, flat indices, and the listener trait (`strata-core`).
pub use strata_core as types;

/// Schema builder and the layout engine (`strata-schema`).
///
/// Build [`schema::Schema`]s with [`schema::SchemaBuilder`]; pick a
/// [`schema::LayoutStrategy`] to keep declaration-order offsets or pack
/// by descending alignment.
pub use strata_schema as schema;

/// Observer registry and scoped bindings (`strata-observe`).
///
/// One [`observe::ObserverRegistry`] per outermost record; use
/// [`observe::Binding`] to tie a registration to a scope.
pub use strata_observe as observe;

/// Record instances, nested views, and the arena (`strata-record`).
///
/// [`record::Record`] is one instance of a schema;
/// [`record::RecordArena`] stores records under generational handles so
/// slot back-references ([`record::SlotRef`]) resolve by lookup.
pub use strata_record as record;

/// Common imports for typical Strata usage.
///
/// ```rust
/// use strata::prelude::*;
/// ```
pub mod prelude {
    // Values and listeners
    pub use strata_core::{listener, ChangePolicy, FlatIndex, Listener, ListenerRef, Value, ValueKind};

    // Schema definition
    pub use strata_schema::{LayoutStrategy, Schema, SchemaBuilder, SlotType};

    // Errors
    pub use strata_core::FieldError;
    pub use strata_record::RecordError;
    pub use strata_schema::{LayoutError, SchemaError};

    // Observation
    pub use strata_observe::Binding;

    // Records
    pub use strata_record::{Record, RecordArena, RecordHandle, RecordMut, RecordRef, SlotRef};
}
