//! Strongly-typed indices and the [`SlotPath`] type alias.

use smallvec::SmallVec;
use std::fmt;

/// Flat, schema-wide position of an observable slot.
///
/// Every observable leaf in a (possibly nested) schema tree is assigned
/// one flat index at schema build time: the cumulative count of all
/// observable leaves declared before it, across all nesting levels.
/// The index is stable for a given schema and independent of any record
/// instance. Event routing uses it as the key into the single observer
/// registry of the outermost record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlatIndex(pub u32);

impl fmt::Display for FlatIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FlatIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// A path of declaration positions addressing a slot in a schema tree.
///
/// An empty path addresses the record itself; each element descends one
/// nesting level. Uses `SmallVec<[u32; 4]>` to avoid heap allocation for
/// records up to 4 levels deep, which covers realistic schema trees.
/// Deeper paths spill to the heap transparently.
pub type SlotPath = SmallVec<[u32; 4]>;
