//! Nested views over a record's storage.
//!
//! A view pairs a record with a schema level and three accumulated
//! bases: a byte offset into the block, a flat-index base for observable
//! leaves, and a string-pool base. Descending into a nested slot adds
//! that slot's offsets to the view's own, which is all the machinery
//! nesting needs — there is no per-level relay object, and every
//! observable leaf fires into the root record's registry at its
//! schema-wide flat index.

use std::rc::Rc;
use std::sync::Arc;

use strata_core::{ChangePolicy, FieldError, FlatIndex, ListenerRef, Value, ValueKind};
use strata_observe::{fire, Binding};
use strata_schema::{Schema, SlotDef, SlotType};

use crate::error::RecordError;
use crate::record::{decode_scalar, encode_scalar, Record};

/// Read-only view of one schema level of a record.
#[derive(Clone, Copy)]
pub struct RecordRef<'a> {
    rec: &'a Record,
    schema: &'a Schema,
    byte_base: usize,
    flat_base: u32,
    string_base: u32,
}

impl std::fmt::Debug for RecordRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordRef")
            .field("byte_base", &self.byte_base)
            .field("flat_base", &self.flat_base)
            .field("string_base", &self.string_base)
            .finish_non_exhaustive()
    }
}

impl<'a> RecordRef<'a> {
    pub(crate) fn root(rec: &'a Record) -> Self {
        Self {
            rec,
            schema: rec.schema.as_ref(),
            byte_base: 0,
            flat_base: 0,
            string_base: 0,
        }
    }

    /// The schema for this view's level.
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    fn slot(&self, position: usize) -> Result<&'a SlotDef, RecordError> {
        self.schema
            .slot(position)
            .ok_or(RecordError::Field(FieldError::OutOfRange {
                position,
                count: self.schema.field_count(),
            }))
    }

    /// Read the slot at `position` as a [`Value`]. Nested slots read as
    /// [`Value::Record`].
    pub fn get(&self, position: usize) -> Result<Value, RecordError> {
        let slot = self.slot(position)?;
        let offset = self.byte_base + self.schema.layout().placement_for_decl(position).offset;
        match &slot.ty {
            SlotType::Scalar(ValueKind::Str) => {
                let index = (self.string_base + self.schema.string_base(position)) as usize;
                Ok(Value::Str(self.rec.strings[index].clone()))
            }
            SlotType::Scalar(kind) => Ok(decode_scalar(&self.rec.bytes, offset, *kind)),
            SlotType::Record(_) => Ok(Value::Record(self.nested(position)?.values())),
        }
    }

    /// Read the slot named `name`.
    pub fn get_by_name(&self, name: &str) -> Result<Value, RecordError> {
        let position = self.schema.field_by_name(name)?;
        self.get(position)
    }

    /// Descend into the nested slot at `position`.
    pub fn nested(&self, position: usize) -> Result<RecordRef<'a>, RecordError> {
        let slot = self.slot(position)?;
        match &slot.ty {
            SlotType::Record(inner) => Ok(RecordRef {
                rec: self.rec,
                schema: inner.as_ref(),
                byte_base: self.byte_base
                    + self.schema.layout().placement_for_decl(position).offset,
                flat_base: self.flat_base + self.schema.flat_base(position),
                string_base: self.string_base + self.schema.string_base(position),
            }),
            SlotType::Scalar(_) => Err(RecordError::NotNested {
                slot: slot.name.clone(),
            }),
        }
    }

    /// Snapshot every slot at this level, in declaration order.
    pub fn values(&self) -> Vec<Value> {
        (0..self.schema.field_count())
            .map(|position| match self.get(position) {
                Ok(value) => value,
                // get only fails on out-of-range positions.
                Err(_) => unreachable!("positions 0..field_count are always valid"),
            })
            .collect()
    }

    /// The schema-wide flat index of the observable slot at `position`.
    pub fn flat_index(&self, position: usize) -> Result<FlatIndex, RecordError> {
        let slot = self.slot(position)?;
        match &slot.ty {
            SlotType::Scalar(_) if slot.observable => {
                Ok(FlatIndex(self.flat_base + self.schema.flat_base(position)))
            }
            _ => Err(RecordError::NotObservable {
                slot: slot.name.clone(),
            }),
        }
    }

    /// Register a listener on the observable slot at `position` in the
    /// root record's registry. Returns the slot's flat index, which
    /// [`unobserve`] needs to remove the registration again.
    ///
    /// [`unobserve`]: RecordRef::unobserve
    pub fn observe(
        &self,
        position: usize,
        listener: &ListenerRef,
    ) -> Result<FlatIndex, RecordError> {
        let index = self.flat_index(position)?;
        self.rec.registry.borrow_mut().observe(listener, index);
        Ok(index)
    }

    /// Remove a listener registration from the slot at `position`.
    pub fn unobserve(&self, position: usize, listener: &ListenerRef) -> Result<(), RecordError> {
        let index = self.flat_index(position)?;
        self.rec.registry.borrow_mut().unobserve(listener, index);
        Ok(())
    }

    /// Register a listener on the slot at `position`, scoped to the
    /// returned guard.
    pub fn bind(&self, position: usize, listener: ListenerRef) -> Result<Binding, RecordError> {
        let index = self.flat_index(position)?;
        Ok(Binding::new(Rc::clone(&self.rec.registry), listener, index))
    }

    /// Register a listener on the slot named `name`, scoped to the
    /// returned guard.
    pub fn bind_by_name(&self, name: &str, listener: ListenerRef) -> Result<Binding, RecordError> {
        let position = self.schema.field_by_name(name)?;
        self.bind(position, listener)
    }
}

/// Mutable view of one schema level of a record.
///
/// Holds its own `Arc` to the level's schema so that schema lookups and
/// record mutation borrow disjoint fields.
pub struct RecordMut<'a> {
    rec: &'a mut Record,
    schema: Arc<Schema>,
    byte_base: usize,
    flat_base: u32,
    string_base: u32,
}

impl std::fmt::Debug for RecordMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordMut")
            .field("byte_base", &self.byte_base)
            .field("flat_base", &self.flat_base)
            .field("string_base", &self.string_base)
            .finish_non_exhaustive()
    }
}

impl<'a> RecordMut<'a> {
    pub(crate) fn root(rec: &'a mut Record) -> Self {
        let schema = Arc::clone(&rec.schema);
        Self {
            rec,
            schema,
            byte_base: 0,
            flat_base: 0,
            string_base: 0,
        }
    }

    /// A read-only view of the same level.
    pub fn as_ref(&self) -> RecordRef<'_> {
        RecordRef {
            rec: self.rec,
            schema: self.schema.as_ref(),
            byte_base: self.byte_base,
            flat_base: self.flat_base,
            string_base: self.string_base,
        }
    }

    /// Read the slot at `position`.
    pub fn get(&self, position: usize) -> Result<Value, RecordError> {
        self.as_ref().get(position)
    }

    /// Assign the slot at `position`.
    ///
    /// Scalar slots check the value's kind against the declaration and
    /// fire a change event when the slot is observable and its policy
    /// says so: on an actual value change for
    /// [`ChangePolicy::OnChange`], on every assignment for
    /// [`ChangePolicy::Always`]. Nested slots take a [`Value::Record`]
    /// and assign element-wise, firing per inner leaf.
    ///
    /// Returns whether at least one event fired.
    pub fn set(&mut self, position: usize, value: Value) -> Result<bool, RecordError> {
        let slot = self
            .schema
            .slot(position)
            .ok_or(RecordError::Field(FieldError::OutOfRange {
                position,
                count: self.schema.field_count(),
            }))?;
        let offset = self.byte_base + self.schema.layout().placement_for_decl(position).offset;

        match &slot.ty {
            SlotType::Scalar(kind) => {
                if value.kind() != Some(*kind) {
                    return Err(RecordError::TypeMismatch {
                        slot: slot.name.clone(),
                        expected: kind.name().to_string(),
                        found: value.kind_name().to_string(),
                    });
                }
                let current = match self.as_ref().get(position) {
                    Ok(v) => v,
                    Err(_) => unreachable!("position was validated above"),
                };
                let differs = value != current;
                if differs {
                    match &value {
                        Value::Str(s) => {
                            let index =
                                (self.string_base + self.schema.string_base(position)) as usize;
                            self.rec.strings[index] = s.clone();
                        }
                        _ => encode_scalar(&mut self.rec.bytes, offset, &value),
                    }
                }
                let fires =
                    slot.observable && (differs || slot.policy == ChangePolicy::Always);
                if fires {
                    let registry = Rc::clone(&self.rec.registry);
                    let index = FlatIndex(self.flat_base + self.schema.flat_base(position));
                    fire(&registry, index, &value);
                }
                Ok(fires)
            }
            SlotType::Record(inner) => {
                let values = match value {
                    Value::Record(values) => values,
                    other => {
                        return Err(RecordError::TypeMismatch {
                            slot: slot.name.clone(),
                            expected: inner.name().to_string(),
                            found: other.kind_name().to_string(),
                        })
                    }
                };
                if values.len() != inner.field_count() {
                    return Err(RecordError::ArityMismatch {
                        expected: inner.field_count(),
                        found: values.len(),
                    });
                }
                let mut sub = RecordMut {
                    schema: Arc::clone(inner),
                    byte_base: offset,
                    flat_base: self.flat_base + self.schema.flat_base(position),
                    string_base: self.string_base + self.schema.string_base(position),
                    rec: self.rec,
                };
                let mut fired = false;
                for (i, v) in values.into_iter().enumerate() {
                    fired |= sub.set(i, v)?;
                }
                Ok(fired)
            }
        }
    }

    /// Assign the slot named `name`.
    pub fn set_by_name(&mut self, name: &str, value: Value) -> Result<bool, RecordError> {
        let position = self.schema.field_by_name(name)?;
        self.set(position, value)
    }

    /// Descend mutably into the nested slot at `position`.
    pub fn nested_mut(&mut self, position: usize) -> Result<RecordMut<'_>, RecordError> {
        let slot = self
            .schema
            .slot(position)
            .ok_or(RecordError::Field(FieldError::OutOfRange {
                position,
                count: self.schema.field_count(),
            }))?;
        match &slot.ty {
            SlotType::Record(inner) => Ok(RecordMut {
                schema: Arc::clone(inner),
                byte_base: self.byte_base
                    + self.schema.layout().placement_for_decl(position).offset,
                flat_base: self.flat_base + self.schema.flat_base(position),
                string_base: self.string_base + self.schema.string_base(position),
                rec: self.rec,
            }),
            SlotType::Scalar(_) => Err(RecordError::NotNested {
                slot: slot.name.clone(),
            }),
        }
    }
}
