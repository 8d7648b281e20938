//! The record arena: stable, generation-checked record storage.
//!
//! Records live in arena entries addressed by [`RecordHandle`]. A slot
//! inside a record is named by a [`SlotRef`] — the handle plus a
//! declaration-position path — so "which record owns this slot" is a
//! table lookup, never an address computation. Removing a record bumps
//! its entry's generation, turning every outstanding handle to it into
//! a detectable [`RecordError::StaleHandle`].

use strata_core::{SlotPath, Value};

use crate::error::RecordError;
use crate::handle::RecordHandle;
use crate::record::Record;
use crate::view::RecordRef;

/// A slot address: the owning record's handle plus the declaration
/// positions walked from the root to the slot.
///
/// An empty path names the record itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SlotRef {
    /// Handle of the record the path starts from.
    pub record: RecordHandle,
    /// Declaration positions from the root, outermost first.
    pub path: SlotPath,
}

impl SlotRef {
    /// A reference through an explicit path.
    pub fn new(record: RecordHandle, path: impl IntoIterator<Item = u32>) -> Self {
        Self {
            record,
            path: path.into_iter().collect(),
        }
    }

    /// A reference to a top-level slot.
    pub fn slot(record: RecordHandle, position: u32) -> Self {
        Self::new(record, [position])
    }
}

struct Entry {
    generation: u32,
    record: Option<Record>,
}

/// Arena of records with stable indices and generational handles.
#[derive(Default)]
pub struct RecordArena {
    entries: Vec<Entry>,
    free: Vec<u32>,
    live: usize,
}

impl RecordArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the arena holds no live records.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Store a record and return its handle. Freed entries are reused,
    /// at a higher generation.
    pub fn insert(&mut self, record: Record) -> RecordHandle {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.record = Some(record);
            return RecordHandle {
                index,
                generation: entry.generation,
            };
        }
        let index = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 0,
            record: Some(record),
        });
        RecordHandle { index, generation: 0 }
    }

    /// Resolve a handle to its record.
    pub fn get(&self, handle: RecordHandle) -> Result<&Record, RecordError> {
        let stale = RecordError::StaleHandle {
            index: handle.index,
            generation: handle.generation,
        };
        let entry = self.entries.get(handle.index as usize).ok_or(stale.clone())?;
        if entry.generation != handle.generation {
            return Err(stale);
        }
        entry.record.as_ref().ok_or(stale)
    }

    /// Resolve a handle to its record, mutably.
    pub fn get_mut(&mut self, handle: RecordHandle) -> Result<&mut Record, RecordError> {
        let stale = RecordError::StaleHandle {
            index: handle.index,
            generation: handle.generation,
        };
        let entry = self
            .entries
            .get_mut(handle.index as usize)
            .ok_or(stale.clone())?;
        if entry.generation != handle.generation {
            return Err(stale);
        }
        entry.record.as_mut().ok_or(stale)
    }

    /// Whether `handle` still resolves to a live record.
    pub fn contains(&self, handle: RecordHandle) -> bool {
        self.get(handle).is_ok()
    }

    /// Remove a record, invalidating every outstanding handle to it.
    pub fn remove(&mut self, handle: RecordHandle) -> Result<Record, RecordError> {
        // Validate through get_mut so staleness reporting is uniform.
        self.get_mut(handle)?;
        let entry = &mut self.entries[handle.index as usize];
        let record = match entry.record.take() {
            Some(record) => record,
            None => unreachable!("entry was validated live above"),
        };
        entry.generation += 1;
        self.free.push(handle.index);
        self.live -= 1;
        Ok(record)
    }

    /// Store a value-copy of an existing record under a new handle. The
    /// copy starts with an empty observer registry.
    pub fn duplicate(&mut self, handle: RecordHandle) -> Result<RecordHandle, RecordError> {
        let copy = self.get(handle)?.clone();
        Ok(self.insert(copy))
    }

    /// Resolve the record that owns the slot `slot` names: validate the
    /// handle and walk the path, then report the owning handle.
    pub fn owner_of(&self, slot: &SlotRef) -> Result<RecordHandle, RecordError> {
        self.walk(slot)?;
        Ok(slot.record)
    }

    /// Read the value the slot reference names. An empty path reads the
    /// whole record as a [`Value::Record`].
    pub fn slot_value(&self, slot: &SlotRef) -> Result<Value, RecordError> {
        let (view, last) = self.walk(slot)?;
        match last {
            Some(position) => view.get(position),
            None => Ok(Value::Record(view.values())),
        }
    }

    /// Walk all but the last path step through nested views. Returns the
    /// view holding the final step and the final position, if any.
    fn walk(&self, slot: &SlotRef) -> Result<(RecordRef<'_>, Option<usize>), RecordError> {
        let record = self.get(slot.record)?;
        let mut view = record.view();
        let Some((&last, steps)) = slot.path.split_last() else {
            return Ok((view, None));
        };
        for &step in steps {
            view = view.nested(step as usize)?;
        }
        // The last step must exist, but may be scalar or nested.
        let position = last as usize;
        if view.schema().slot(position).is_none() {
            return Err(RecordError::Field(strata_core::FieldError::OutOfRange {
                position,
                count: view.schema().field_count(),
            }));
        }
        Ok((view, Some(position)))
    }
}

impl std::fmt::Debug for RecordArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordArena")
            .field("live", &self.live)
            .field("capacity", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use strata_core::ValueKind;
    use strata_schema::{Schema, SchemaBuilder};

    fn point() -> Arc<Schema> {
        SchemaBuilder::new("point")
            .observable("x", ValueKind::I32)
            .observable("y", ValueKind::I32)
            .build()
            .unwrap()
    }

    #[test]
    fn insert_get_remove_round_trip() {
        let mut arena = RecordArena::new();
        let schema = point();
        let h = arena.insert(
            Record::with_values(schema, vec![Value::I32(1), Value::I32(2)]).unwrap(),
        );
        assert_eq!(arena.len(), 1);
        assert!(arena.contains(h));
        assert_eq!(arena.get(h).unwrap().get(1).unwrap(), Value::I32(2));

        let removed = arena.remove(h).unwrap();
        assert_eq!(removed.get(0).unwrap(), Value::I32(1));
        assert!(arena.is_empty());
        assert!(!arena.contains(h));
    }

    #[test]
    fn stale_handles_are_detected_after_reuse() {
        let mut arena = RecordArena::new();
        let schema = point();
        let old = arena.insert(Record::new(schema.clone()));
        arena.remove(old).unwrap();

        // The entry is reused at a higher generation.
        let new = arena.insert(Record::new(schema));
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());

        assert_eq!(
            arena.get(old).unwrap_err(),
            RecordError::StaleHandle {
                index: old.index(),
                generation: old.generation()
            }
        );
        assert!(arena.get(new).is_ok());
    }

    #[test]
    fn duplicate_copies_values_not_listeners() {
        let mut arena = RecordArena::new();
        let schema = point();
        let src = arena.insert(
            Record::with_values(schema, vec![Value::I32(3), Value::I32(4)]).unwrap(),
        );
        let copy = arena.duplicate(src).unwrap();

        assert_ne!(src, copy);
        assert_eq!(arena.get(src).unwrap(), arena.get(copy).unwrap());
        assert!(arena.get(copy).unwrap().registry().borrow().is_empty());
    }

    #[test]
    fn owner_of_resolves_by_table_lookup() {
        let mut arena = RecordArena::new();
        let inner = point();
        let schema = SchemaBuilder::new("line")
            .nested("from", inner.clone())
            .nested("to", inner)
            .build()
            .unwrap();
        let h = arena.insert(Record::new(schema));

        let slot = SlotRef::new(h, [1, 0]); // to.x
        assert_eq!(arena.owner_of(&slot).unwrap(), h);
        assert_eq!(arena.slot_value(&slot).unwrap(), Value::I32(0));

        // The whole record through an empty path.
        let whole = SlotRef::new(h, []);
        assert_eq!(arena.owner_of(&whole).unwrap(), h);
        assert!(matches!(
            arena.slot_value(&whole).unwrap(),
            Value::Record(vs) if vs.len() == 2
        ));
    }

    #[test]
    fn slot_walk_reports_bad_paths() {
        let mut arena = RecordArena::new();
        let h = arena.insert(Record::new(point()));

        // Descending through a scalar.
        assert_eq!(
            arena.slot_value(&SlotRef::new(h, [0, 0])).unwrap_err(),
            RecordError::NotNested { slot: "x".into() }
        );
        // Final step out of range.
        assert!(matches!(
            arena.slot_value(&SlotRef::slot(h, 9)).unwrap_err(),
            RecordError::Field(_)
        ));

        arena.remove(h).unwrap();
        assert!(matches!(
            arena.owner_of(&SlotRef::slot(h, 0)).unwrap_err(),
            RecordError::StaleHandle { .. }
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum Op {
            Insert(i32),
            RemoveLive(usize),
            RemoveDead(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                any::<i32>().prop_map(Op::Insert),
                (0..64usize).prop_map(Op::RemoveLive),
                (0..64usize).prop_map(Op::RemoveDead),
            ]
        }

        proptest! {
            // Handles resolve to exactly the record they were issued
            // for, through any interleaving of inserts and removes, and
            // removed handles stay dead forever.
            #[test]
            fn handles_track_their_records(ops in proptest::collection::vec(op(), 0..60)) {
                let schema = point();
                let mut arena = RecordArena::new();
                let mut live: Vec<(RecordHandle, i32)> = Vec::new();
                let mut dead: Vec<RecordHandle> = Vec::new();

                for op in ops {
                    match op {
                        Op::Insert(n) => {
                            let record = Record::with_values(
                                schema.clone(),
                                vec![Value::I32(n), Value::I32(0)],
                            )
                            .unwrap();
                            live.push((arena.insert(record), n));
                        }
                        Op::RemoveLive(pick) if !live.is_empty() => {
                            let (handle, _) = live.remove(pick % live.len());
                            prop_assert!(arena.remove(handle).is_ok());
                            dead.push(handle);
                        }
                        Op::RemoveDead(pick) if !dead.is_empty() => {
                            let handle = dead[pick % dead.len()];
                            prop_assert!(arena.remove(handle).is_err());
                        }
                        Op::RemoveLive(_) | Op::RemoveDead(_) => {}
                    }
                }

                prop_assert_eq!(arena.len(), live.len());
                for (handle, n) in &live {
                    prop_assert_eq!(
                        arena.get(*handle).unwrap().get(0).unwrap(),
                        Value::I32(*n)
                    );
                }
                for handle in &dead {
                    prop_assert!(!arena.contains(*handle));
                }
            }
        }
    }
}
