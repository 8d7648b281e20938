//! The schema: an immutable, queryable metadata table for one record
//! type.
//!
//! A [`Schema`] is built once through [`SchemaBuilder`], validated
//! eagerly, and shared as `Arc<Schema>` by every record instance of that
//! type. It owns the computed [`Layout`], the name → position table, and
//! the flat-index bases that route observable change events through
//! nested schemas.

use std::sync::Arc;

use indexmap::IndexMap;
use strata_core::{ChangePolicy, FieldError, ValueKind};

use crate::error::SchemaError;
use crate::layout::{compute_layout, Layout, LayoutStrategy, SlotExtent};

/// The declared type of one slot.
#[derive(Clone, Debug)]
pub enum SlotType {
    /// A scalar value of the given kind.
    Scalar(ValueKind),
    /// A nested record laid out inline at the slot's offset.
    Record(Arc<Schema>),
}

impl SlotType {
    /// Byte size of this slot's cell: the scalar cell size, or the
    /// nested schema's total block size.
    pub fn size(&self) -> usize {
        match self {
            Self::Scalar(kind) => kind.size(),
            Self::Record(schema) => schema.layout().size(),
        }
    }

    /// Alignment of this slot's cell.
    pub fn align(&self) -> usize {
        match self {
            Self::Scalar(kind) => kind.align(),
            Self::Record(schema) => schema.layout().align(),
        }
    }

    /// Type name for diagnostics: the scalar kind name, or the nested
    /// schema's name.
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(kind) => kind.name(),
            Self::Record(schema) => schema.name(),
        }
    }
}

/// One named, typed slot declaration.
#[derive(Clone, Debug)]
pub struct SlotDef {
    /// Declared slot name, unique within the schema.
    pub name: String,
    /// Declared slot type.
    pub ty: SlotType,
    /// Whether assignments to this slot fire change events. Only scalar
    /// slots can be observable; a nested record slot contributes its
    /// inner observable leaves instead.
    pub observable: bool,
    /// When an observable assignment fires. Ignored for non-observable
    /// slots.
    pub policy: ChangePolicy,
}

/// Per-slot metadata returned by [`Schema::field_at`].
#[derive(Clone, Copy, Debug)]
pub struct FieldInfo<'a> {
    /// Declared slot name.
    pub name: &'a str,
    /// Byte offset of the slot's cell within the record block.
    pub offset: usize,
    /// Declared slot type.
    pub ty: &'a SlotType,
}

/// Builder for a [`Schema`].
///
/// Slots are declared in order; validation happens in [`build`]
/// (duplicate names, degenerate extents). The builder is consumed by
/// value so schema definitions read as one chained expression.
///
/// # Examples
///
/// ```
/// use strata_schema::{SchemaBuilder, LayoutStrategy};
/// use strata_core::ValueKind;
///
/// let point = SchemaBuilder::new("point")
///     .observable("x", ValueKind::I32)
///     .observable("y", ValueKind::I32)
///     .build()
///     .unwrap();
///
/// let line = SchemaBuilder::new("line")
///     .strategy(LayoutStrategy::Packed)
///     .nested("from", point.clone())
///     .nested("to", point.clone())
///     .slot("width", ValueKind::U8)
///     .build()
///     .unwrap();
///
/// assert_eq!(line.field_count(), 3);
/// assert_eq!(line.observable_count(), 4);
/// ```
///
/// [`build`]: SchemaBuilder::build
#[derive(Clone, Debug)]
pub struct SchemaBuilder {
    name: String,
    strategy: LayoutStrategy,
    slots: Vec<SlotDef>,
}

impl SchemaBuilder {
    /// Start a schema with the given type name, using the original
    /// (declaration-order) layout strategy.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategy: LayoutStrategy::Original,
            slots: Vec::new(),
        }
    }

    /// Select the layout strategy.
    pub fn strategy(mut self, strategy: LayoutStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Declare a plain (non-observable) scalar slot.
    pub fn slot(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.slots.push(SlotDef {
            name: name.into(),
            ty: SlotType::Scalar(kind),
            observable: false,
            policy: ChangePolicy::OnChange,
        });
        self
    }

    /// Declare an observable scalar slot with the default fire-on-change
    /// policy.
    pub fn observable(self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.observable_with(name, kind, ChangePolicy::OnChange)
    }

    /// Declare an observable scalar slot with an explicit policy.
    pub fn observable_with(
        mut self,
        name: impl Into<String>,
        kind: ValueKind,
        policy: ChangePolicy,
    ) -> Self {
        self.slots.push(SlotDef {
            name: name.into(),
            ty: SlotType::Scalar(kind),
            observable: true,
            policy,
        });
        self
    }

    /// Declare a nested record slot. The inner schema's observable
    /// leaves join the outer schema's flat index space.
    pub fn nested(mut self, name: impl Into<String>, schema: Arc<Schema>) -> Self {
        self.slots.push(SlotDef {
            name: name.into(),
            ty: SlotType::Record(schema),
            observable: false,
            policy: ChangePolicy::OnChange,
        });
        self
    }

    /// Validate the declarations and build the immutable schema.
    pub fn build(self) -> Result<Arc<Schema>, SchemaError> {
        let mut names = IndexMap::with_capacity(self.slots.len());
        for (position, slot) in self.slots.iter().enumerate() {
            if names.insert(slot.name.clone(), position as u32).is_some() {
                return Err(SchemaError::DuplicateSlotName {
                    name: slot.name.clone(),
                });
            }
        }

        let extents: Vec<SlotExtent> = self
            .slots
            .iter()
            .map(|slot| SlotExtent {
                size: slot.ty.size(),
                align: slot.ty.align(),
            })
            .collect();
        let layout = compute_layout(&extents, self.strategy)?;

        let mut flat_base = Vec::with_capacity(self.slots.len());
        let mut observable_count = 0u32;
        let mut string_base = Vec::with_capacity(self.slots.len());
        let mut string_count = 0u32;
        for slot in &self.slots {
            flat_base.push(observable_count);
            observable_count += observable_leaves(slot);
            string_base.push(string_count);
            string_count += string_cells(slot);
        }

        Ok(Arc::new(Schema {
            name: self.name,
            strategy: self.strategy,
            slots: self.slots,
            layout,
            names,
            flat_base,
            observable_count,
            string_base,
            string_count,
        }))
    }
}

/// How many observable leaves a slot contributes to the flat index
/// space.
fn observable_leaves(slot: &SlotDef) -> u32 {
    match &slot.ty {
        SlotType::Scalar(_) if slot.observable => 1,
        SlotType::Scalar(_) => 0,
        SlotType::Record(schema) => schema.observable_count(),
    }
}

/// How many string-pool cells a slot contributes.
fn string_cells(slot: &SlotDef) -> u32 {
    match &slot.ty {
        SlotType::Scalar(ValueKind::Str) => 1,
        SlotType::Scalar(_) => 0,
        SlotType::Record(schema) => schema.string_count(),
    }
}

/// Immutable metadata for one record type.
///
/// The schema is the "phone book" of a record: every read, write, and
/// observe starts with a schema lookup. It is built once and injected
/// into each record instance; nothing here is global or per-type static.
#[derive(Clone, Debug)]
pub struct Schema {
    name: String,
    strategy: LayoutStrategy,
    slots: Vec<SlotDef>,
    layout: Layout,
    names: IndexMap<String, u32>,
    flat_base: Vec<u32>,
    observable_count: u32,
    string_base: Vec<u32>,
    string_count: u32,
}

impl Schema {
    /// The declared record type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The layout strategy the schema was built with.
    pub fn strategy(&self) -> LayoutStrategy {
        self.strategy
    }

    /// Number of declared slots.
    pub fn field_count(&self) -> usize {
        self.slots.len()
    }

    /// Metadata for the slot declared at `position`.
    pub fn field_at(&self, position: usize) -> Result<FieldInfo<'_>, FieldError> {
        let slot = self.slots.get(position).ok_or(FieldError::OutOfRange {
            position,
            count: self.slots.len(),
        })?;
        Ok(FieldInfo {
            name: &slot.name,
            offset: self.layout.placement_for_decl(position).offset,
            ty: &slot.ty,
        })
    }

    /// The declaration position of the slot named `name`.
    pub fn field_by_name(&self, name: &str) -> Result<usize, FieldError> {
        self.names
            .get(name)
            .map(|&p| p as usize)
            .ok_or_else(|| FieldError::UnknownName { name: name.to_string() })
    }

    /// The computed byte layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// All slot declarations, in declaration order.
    pub fn slots(&self) -> &[SlotDef] {
        &self.slots
    }

    /// The slot declared at `position`, if any.
    pub fn slot(&self, position: usize) -> Option<&SlotDef> {
        self.slots.get(position)
    }

    /// Flat-index base of the slot at `position`: the number of
    /// observable leaves declared before it in this schema.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of range; callers validate positions
    /// first.
    pub fn flat_base(&self, position: usize) -> u32 {
        self.flat_base[position]
    }

    /// Total observable leaves in this schema, including nested ones.
    pub fn observable_count(&self) -> u32 {
        self.observable_count
    }

    /// String-pool base of the slot at `position`: the number of string
    /// cells declared before it in this schema.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of range; callers validate positions
    /// first.
    pub fn string_base(&self, position: usize) -> u32 {
        self.string_base[position]
    }

    /// Total string-pool cells in this schema, including nested ones.
    pub fn string_count(&self) -> u32 {
        self.string_count
    }
}
