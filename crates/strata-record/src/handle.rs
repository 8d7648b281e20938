//! Generational record handles.

use std::fmt;

/// Stable handle to a record stored in a [`RecordArena`].
///
/// The generation allows O(1) staleness checks: removing a record bumps
/// its arena entry's generation, so handles into reused entries are
/// detected on every access instead of silently resolving to an
/// unrelated record.
///
/// [`RecordArena`]: crate::arena::RecordArena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct RecordHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl RecordHandle {
    /// The arena entry index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The arena generation this handle was issued for.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for RecordHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordHandle(index={}, gen={})", self.index, self.generation)
    }
}
