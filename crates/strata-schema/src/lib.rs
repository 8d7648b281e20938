//! Layout engine and schema metadata registry for Strata records.
//!
//! This crate turns an ordered list of named, typed slot declarations
//! into an immutable [`Schema`]: a deterministic byte layout for the
//! aggregate plus a queryable metadata table.
//!
//! # Architecture
//!
//! ```text
//! SchemaBuilder (declaration order, names, observability)
//! ├── order      placement ordering for the packed strategy
//! ├── layout     offset walk → Layout { Placement[], permutation }
//! └── Schema     immutable metadata: name/offset/type per slot,
//!                flat-index bases for observable routing,
//!                string-pool bases for string slots
//! ```
//!
//! Schemas are built once, validated eagerly (duplicate names and
//! degenerate extents are rejected before any record exists), and shared
//! as `Arc<Schema>` with every record instance. There is no per-type
//! global state.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod layout;
mod order;
pub mod schema;

pub use error::{LayoutError, SchemaError};
pub use layout::{compute_layout, Layout, LayoutStrategy, Placement, SlotExtent};
pub use schema::{FieldInfo, Schema, SchemaBuilder, SlotDef, SlotType};
