//! The layout engine: slot extents in, byte placements out.
//!
//! [`compute_layout`] is a pure function from an ordered list of
//! `(size, align)` extents and a strategy to a [`Layout`]: per-slot byte
//! offsets inside one contiguous block, plus the permutation between
//! declaration order and placement order. Calling it twice on the same
//! input yields identical output.

use crate::error::LayoutError;
use crate::order;

/// Size and alignment of one slot, in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotExtent {
    /// Size in bytes. Must be non-zero.
    pub size: usize,
    /// Alignment in bytes. Must be a power of two.
    pub align: usize,
}

/// Placement strategy for a layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutStrategy {
    /// Slots are placed in declaration order.
    #[default]
    Original,
    /// Slots are placed by descending alignment (ties keep declaration
    /// order) to minimise padding.
    Packed,
}

/// Byte placement of one slot within the record block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Byte offset from the start of the block. Always a multiple of
    /// `align`.
    pub offset: usize,
    /// Size in bytes.
    pub size: usize,
    /// Alignment in bytes.
    pub align: usize,
}

/// A computed record layout.
///
/// Placements are indexed by *placement index*; the permutation maps
/// declaration index ↔ placement index both ways. For the `Original`
/// strategy the permutation is the identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    placements: Vec<Placement>,
    decl_to_place: Vec<usize>,
    place_to_decl: Vec<usize>,
    size: usize,
    align: usize,
}

impl Layout {
    /// Number of slots in the layout.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether the layout has no slots.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Total block size: last placement's end, rounded up to the block
    /// alignment. Zero for an empty layout.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Block alignment: the maximum slot alignment. One for an empty
    /// layout.
    pub fn align(&self) -> usize {
        self.align
    }

    /// Placements in placement order.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// The placement of the slot declared at `decl`.
    ///
    /// # Panics
    ///
    /// Panics if `decl` is out of range; callers validate positions
    /// against the schema first.
    pub fn placement_for_decl(&self, decl: usize) -> &Placement {
        &self.placements[self.decl_to_place[decl]]
    }

    /// Declaration index → placement index mapping.
    pub fn decl_to_place(&self) -> &[usize] {
        &self.decl_to_place
    }

    /// Placement index → declaration index mapping.
    pub fn place_to_decl(&self) -> &[usize] {
        &self.place_to_decl
    }
}

fn align_up(offset: usize, align: usize) -> usize {
    (offset + align - 1) & !(align - 1)
}

/// Compute a layout for `extents` under `strategy`.
///
/// Deterministic and pure. Degenerate extents (zero size, non-power-of-
/// two alignment) are authoring mistakes and are rejected up front; a
/// layout that builds at all is fully valid.
pub fn compute_layout(
    extents: &[SlotExtent],
    strategy: LayoutStrategy,
) -> Result<Layout, LayoutError> {
    for (index, extent) in extents.iter().enumerate() {
        if extent.size == 0 {
            return Err(LayoutError::ZeroSizedSlot { index });
        }
        if !extent.align.is_power_of_two() {
            return Err(LayoutError::AlignmentNotPowerOfTwo {
                index,
                align: extent.align,
            });
        }
    }

    let place_to_decl = match strategy {
        LayoutStrategy::Original => (0..extents.len()).collect::<Vec<_>>(),
        LayoutStrategy::Packed => order::descending_alignment(extents),
    };

    let mut decl_to_place = vec![0usize; extents.len()];
    for (place, &decl) in place_to_decl.iter().enumerate() {
        decl_to_place[decl] = place;
    }

    let mut placements = Vec::with_capacity(extents.len());
    let mut end = 0usize;
    let mut max_align = 1usize;
    for &decl in &place_to_decl {
        let extent = extents[decl];
        let offset = align_up(end, extent.align);
        placements.push(Placement {
            offset,
            size: extent.size,
            align: extent.align,
        });
        end = offset + extent.size;
        max_align = max_align.max(extent.align);
    }

    Ok(Layout {
        placements,
        decl_to_place,
        place_to_decl,
        size: align_up(end, max_align),
        align: max_align,
    })
}
