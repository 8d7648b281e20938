//! The record: one instance of a schema.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use strata_core::{FlatIndex, ListenerRef, Value, ValueKind};
use strata_observe::{Binding, ObserverRegistry, SharedRegistry};
use strata_schema::{Schema, SlotType};

use crate::error::RecordError;
use crate::view::{RecordMut, RecordRef};

/// One instance of a schema: a contiguous byte block holding every slot
/// value at its layout-assigned offset, a string pool for string slots,
/// and the single observer registry for the whole (possibly nested)
/// tree.
///
/// The schema is injected at construction and shared; a record never
/// relocates its storage, so slot offsets stay valid for its lifetime.
pub struct Record {
    pub(crate) schema: Arc<Schema>,
    pub(crate) bytes: Vec<u8>,
    pub(crate) strings: Vec<String>,
    pub(crate) registry: SharedRegistry,
}

impl Record {
    /// Create a record with every slot default-initialized: zero for
    /// numerics, `false` for booleans, empty for strings, and defaults
    /// recursively for nested records.
    pub fn new(schema: Arc<Schema>) -> Self {
        let mut bytes = vec![0u8; schema.layout().size()];
        let strings = vec![String::new(); schema.string_count() as usize];
        init_string_cells(&schema, 0, 0, &mut bytes);
        Self {
            schema,
            bytes,
            strings,
            registry: Rc::new(RefCell::new(ObserverRegistry::new())),
        }
    }

    /// Create a record from one positional initializer per slot.
    ///
    /// Nested slots take [`Value::Record`] initializers. Fails with
    /// [`RecordError::ArityMismatch`] or [`RecordError::TypeMismatch`]
    /// without firing anything (no listener can be bound yet).
    pub fn with_values(schema: Arc<Schema>, values: Vec<Value>) -> Result<Self, RecordError> {
        if values.len() != schema.field_count() {
            return Err(RecordError::ArityMismatch {
                expected: schema.field_count(),
                found: values.len(),
            });
        }
        let mut record = Self::new(schema);
        {
            let mut view = record.view_mut();
            for (position, value) in values.into_iter().enumerate() {
                view.set(position, value)?;
            }
        }
        Ok(record)
    }

    /// The schema this record was built from.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The record's observer registry. Nested views at every depth
    /// share this one registry.
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// The raw byte block, for layout inspection. Scalar cells are
    /// little-endian; string cells hold `u32` pool indices.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A read-only view of the root level.
    pub fn view(&self) -> RecordRef<'_> {
        RecordRef::root(self)
    }

    /// A mutable view of the root level.
    pub fn view_mut(&mut self) -> RecordMut<'_> {
        RecordMut::root(self)
    }

    /// Read the slot at `position` as a [`Value`].
    pub fn get(&self, position: usize) -> Result<Value, RecordError> {
        self.view().get(position)
    }

    /// Read the slot named `name`.
    pub fn get_by_name(&self, name: &str) -> Result<Value, RecordError> {
        self.view().get_by_name(name)
    }

    /// Assign the slot at `position`. Returns whether a change event
    /// fired (observable slots only, per the slot's policy).
    pub fn set(&mut self, position: usize, value: Value) -> Result<bool, RecordError> {
        self.view_mut().set(position, value)
    }

    /// Assign the slot named `name`.
    pub fn set_by_name(&mut self, name: &str, value: Value) -> Result<bool, RecordError> {
        self.view_mut().set_by_name(name, value)
    }

    /// Register a listener on the observable slot at `position`.
    /// Returns the slot's flat index.
    pub fn observe(
        &self,
        position: usize,
        listener: &ListenerRef,
    ) -> Result<FlatIndex, RecordError> {
        self.view().observe(position, listener)
    }

    /// Remove a listener registration from the slot at `position`.
    pub fn unobserve(
        &self,
        position: usize,
        listener: &ListenerRef,
    ) -> Result<(), RecordError> {
        self.view().unobserve(position, listener)
    }

    /// Register a listener on the slot at `position`, scoped to the
    /// returned guard.
    pub fn bind(&self, position: usize, listener: ListenerRef) -> Result<Binding, RecordError> {
        self.view().bind(position, listener)
    }

    /// Register a listener on the slot named `name`, scoped to the
    /// returned guard.
    pub fn bind_by_name(
        &self,
        name: &str,
        listener: ListenerRef,
    ) -> Result<Binding, RecordError> {
        self.view().bind_by_name(name, listener)
    }

    /// Snapshot every slot as a [`Value`], nested records as
    /// [`Value::Record`].
    pub fn values(&self) -> Vec<Value> {
        self.view().values()
    }
}

/// Cloning copies values only: the clone starts with a fresh, empty
/// observer registry, because listeners are bound to an instance, not
/// to a value.
impl Clone for Record {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            bytes: self.bytes.clone(),
            strings: self.strings.clone(),
            registry: Rc::new(RefCell::new(ObserverRegistry::new())),
        }
    }
}

/// Records are equal when they share a schema and every slot compares
/// equal. Registries and listener state never participate.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) && self.values() == other.values()
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("schema", &self.schema.name())
            .field("values", &self.values())
            .finish()
    }
}

/// Write each string slot's pool index into its in-block cell,
/// recursively through nested schemas. Pool indices are schema-derived
/// and never change after construction.
fn init_string_cells(schema: &Schema, byte_base: usize, string_base: u32, bytes: &mut [u8]) {
    for (position, slot) in schema.slots().iter().enumerate() {
        let offset = byte_base + schema.layout().placement_for_decl(position).offset;
        match &slot.ty {
            SlotType::Scalar(ValueKind::Str) => {
                let index = string_base + schema.string_base(position);
                bytes[offset..offset + 4].copy_from_slice(&index.to_le_bytes());
            }
            SlotType::Scalar(_) => {}
            SlotType::Record(inner) => {
                init_string_cells(inner, offset, string_base + schema.string_base(position), bytes);
            }
        }
    }
}

/// Encode a non-string scalar into its little-endian cell.
pub(crate) fn encode_scalar(buf: &mut [u8], offset: usize, value: &Value) {
    match value {
        Value::Bool(v) => buf[offset] = u8::from(*v),
        Value::I8(v) => buf[offset] = *v as u8,
        Value::U8(v) => buf[offset] = *v,
        Value::I16(v) => buf[offset..offset + 2].copy_from_slice(&v.to_le_bytes()),
        Value::U16(v) => buf[offset..offset + 2].copy_from_slice(&v.to_le_bytes()),
        Value::I32(v) => buf[offset..offset + 4].copy_from_slice(&v.to_le_bytes()),
        Value::U32(v) => buf[offset..offset + 4].copy_from_slice(&v.to_le_bytes()),
        Value::F32(v) => buf[offset..offset + 4].copy_from_slice(&v.to_le_bytes()),
        Value::I64(v) => buf[offset..offset + 8].copy_from_slice(&v.to_le_bytes()),
        Value::U64(v) => buf[offset..offset + 8].copy_from_slice(&v.to_le_bytes()),
        Value::F64(v) => buf[offset..offset + 8].copy_from_slice(&v.to_le_bytes()),
        Value::Str(_) | Value::Record(_) => {
            unreachable!("string and nested cells are written through their own paths")
        }
    }
}

/// Decode a non-string scalar from its little-endian cell.
pub(crate) fn decode_scalar(buf: &[u8], offset: usize, kind: ValueKind) -> Value {
    match kind {
        ValueKind::Bool => Value::Bool(buf[offset] != 0),
        ValueKind::I8 => Value::I8(buf[offset] as i8),
        ValueKind::U8 => Value::U8(buf[offset]),
        ValueKind::I16 => {
            let mut cell = [0u8; 2];
            cell.copy_from_slice(&buf[offset..offset + 2]);
            Value::I16(i16::from_le_bytes(cell))
        }
        ValueKind::U16 => {
            let mut cell = [0u8; 2];
            cell.copy_from_slice(&buf[offset..offset + 2]);
            Value::U16(u16::from_le_bytes(cell))
        }
        ValueKind::I32 => {
            let mut cell = [0u8; 4];
            cell.copy_from_slice(&buf[offset..offset + 4]);
            Value::I32(i32::from_le_bytes(cell))
        }
        ValueKind::U32 => {
            let mut cell = [0u8; 4];
            cell.copy_from_slice(&buf[offset..offset + 4]);
            Value::U32(u32::from_le_bytes(cell))
        }
        ValueKind::F32 => {
            let mut cell = [0u8; 4];
            cell.copy_from_slice(&buf[offset..offset + 4]);
            Value::F32(f32::from_le_bytes(cell))
        }
        ValueKind::I64 => {
            let mut cell = [0u8; 8];
            cell.copy_from_slice(&buf[offset..offset + 8]);
            Value::I64(i64::from_le_bytes(cell))
        }
        ValueKind::U64 => {
            let mut cell = [0u8; 8];
            cell.copy_from_slice(&buf[offset..offset + 8]);
            Value::U64(u64::from_le_bytes(cell))
        }
        ValueKind::F64 => {
            let mut cell = [0u8; 8];
            cell.copy_from_slice(&buf[offset..offset + 8]);
            Value::F64(f64::from_le_bytes(cell))
        }
        ValueKind::Str => unreachable!("string cells are decoded through the pool"),
    }
}
