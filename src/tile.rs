//! Tiles: one oriented rotation of a piece or of a fused block of pieces.

use crate::layout::EdgeLayout;
use crate::mask::PieceMask;

/// A single tile rotation.
///
/// The four edge values are kept pre-packed in two words: `lo` holds the right
/// and bottom edges in exactly the bit positions the lookup key uses for left
/// and top, so placing a tile updates its neighbours' keys with two mask
/// operations and no shifting. `hi` holds the left and top edges and is the
/// tile's literal lookup key before the border flags.
#[derive(Clone, Copy, Debug)]
pub struct Tile<const W: usize> {
    pub(crate) lo: u64,
    pub(crate) hi: u64,
    /// Which original pieces make up this tile.
    pub mask: PieceMask<W>,
    /// Sort key assigned by `RotationTable::randomize`.
    pub(crate) random: u64,
}

impl<const W: usize> Tile<W> {
    pub fn new(
        layout: EdgeLayout,
        left: u64,
        top: u64,
        right: u64,
        bottom: u64,
        mask: PieceMask<W>,
    ) -> Self {
        debug_assert!(left <= layout.mask_left() && right <= layout.mask_left());
        debug_assert!(top <= layout.any_top() && bottom <= layout.any_top());
        Self {
            lo: right | (bottom << layout.left_bits),
            hi: left | (top << layout.left_bits),
            mask,
            random: 0,
        }
    }

    pub fn left(&self, layout: EdgeLayout) -> u64 {
        self.hi & layout.mask_left()
    }

    pub fn top(&self, layout: EdgeLayout) -> u64 {
        (self.hi & layout.mask_top()) >> layout.left_bits
    }

    pub fn right(&self, layout: EdgeLayout) -> u64 {
        self.lo & layout.mask_left()
    }

    pub fn bottom(&self, layout: EdgeLayout) -> u64 {
        (self.lo & layout.mask_top()) >> layout.left_bits
    }

    /// The packed (right, bottom) word, field-aligned with a key's (left, top).
    /// This is the word a placement writes into its neighbours.
    #[inline(always)]
    pub fn exit_key(&self) -> u64 {
        self.lo
    }

    /// The literal lookup key this tile satisfies: its (left, top) word plus
    /// the open-side flags derived from its right and bottom edges, where an
    /// edge value of zero marks a board border.
    pub fn entry_key(&self, layout: EdgeLayout) -> u64 {
        self.hi
            | (((self.right(layout) != 0) as u64) << layout.border_shift())
            | (((self.bottom(layout) != 0) as u64) << (layout.border_shift() + 1))
    }
}

/// Fuse two tiles stacked on top of each other into a tile twice as tall.
///
/// The left and right edges concatenate (lower tile in the high sub-field);
/// the top edge comes from the upper tile and the bottom from the lower.
pub fn fuse_vertical<const W: usize>(
    child: EdgeLayout,
    upper: &Tile<W>,
    lower: &Tile<W>,
) -> Tile<W> {
    Tile::new(
        child.taller(),
        (lower.left(child) << child.left_bits) | upper.left(child),
        upper.top(child),
        (lower.right(child) << child.left_bits) | upper.right(child),
        lower.bottom(child),
        PieceMask::union_of(&upper.mask, &lower.mask),
    )
}

/// Fuse two tiles placed side by side into a tile twice as wide.
pub fn fuse_horizontal<const W: usize>(
    child: EdgeLayout,
    left: &Tile<W>,
    right: &Tile<W>,
) -> Tile<W> {
    Tile::new(
        child.wider(),
        left.left(child),
        (right.top(child) << child.top_bits) | left.top(child),
        right.right(child),
        (right.bottom(child) << child.top_bits) | left.bottom(child),
        PieceMask::union_of(&left.mask, &right.mask),
    )
}
