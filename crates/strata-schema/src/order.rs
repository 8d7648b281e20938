//! Placement ordering for the packed layout strategy.

use crate::layout::SlotExtent;

/// Placement order for the packed strategy: alignment descending, ties
/// broken by ascending declaration index. Returns, for each placement
/// index, the declaration index placed there.
///
/// The sort is stable by construction (the tie-break is the declaration
/// index itself), so equal-alignment slots keep declaration order.
pub(crate) fn descending_alignment(extents: &[SlotExtent]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..extents.len()).collect();
    order.sort_by(|&a, &b| {
        extents[b]
            .align
            .cmp(&extents[a].align)
            .then(a.cmp(&b))
    });
    order
}
