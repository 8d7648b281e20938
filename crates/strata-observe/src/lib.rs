//! Observer registry and scoped listener bindings for Strata records.
//!
//! One [`ObserverRegistry`] exists per outermost record instance,
//! however deep its schema nests. Listeners bind to flat indices;
//! change events are dispatched synchronously, in registration order,
//! keyed by flat index. Everything here is single-threaded by contract:
//! shared ownership is `Rc<RefCell<..>>`, and there is no locking or
//! deferred dispatch.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod binding;
pub mod registry;

pub use binding::Binding;
pub use registry::{fire, ObserverRegistry, SharedRegistry};
