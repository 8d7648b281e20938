//! Arena-allocated record instances with observable slots.
//!
//! A [`Record`] is one instance of a schema: a contiguous byte block
//! laid out by the schema's layout engine, a string pool for string
//! slots, and one observer registry shared by every nesting level.
//!
//! # Architecture
//!
//! ```text
//! RecordArena (stable indices + generations)
//! ├── RecordHandle        generational handle to one record
//! ├── SlotRef             (handle, path) — the back-reference: a slot
//! │                       locates its owner by table lookup, never by
//! │                       address arithmetic
//! └── Record
//!     ├── bytes           one block per the schema's Layout
//!     ├── strings         pool for string slot payloads
//!     ├── registry        the single ObserverRegistry for the whole tree
//!     └── RecordRef / RecordMut   nested views accumulating byte,
//!                                 flat-index, and string-pool bases
//! ```
//!
//! Views are how nesting works: descending into a nested slot adds the
//! slot's byte offset, flat-index base, and string-pool base to the
//! view's own, so an observable leaf at any depth fires into the root
//! registry at its schema-wide flat index.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod error;
pub mod handle;
pub mod record;
pub mod view;

pub use arena::{RecordArena, SlotRef};
pub use error::RecordError;
pub use handle::RecordHandle;
pub use record::Record;
pub use view::{RecordMut, RecordRef};
