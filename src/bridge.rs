//! The bridge builder: fuses a size's rotations into the next size up.
//!
//! A two-cell micro board wired to the smaller table enumerates every legal
//! pairing of two child tiles under each of the nine bordered contexts (four
//! corners, four edges, middle). Each completed micro board synthesizes one
//! larger tile whose edges concatenate the children's sub-edges.

use std::thread;

use crate::board::{Board, BoardType};
use crate::index::TileIndex;
use crate::table::{RotationTable, TableSink};
use crate::tile::{fuse_horizontal, fuse_vertical, Tile};

const BUILDER_TYPES: [BoardType; 9] = [
    BoardType::TOP_LEFT_CORNER,
    BoardType::TOP_EDGE,
    BoardType::TOP_RIGHT_CORNER,
    BoardType::LEFT_EDGE,
    BoardType::MIDDLE,
    BoardType::RIGHT_EDGE,
    BoardType::BOTTOM_LEFT_CORNER,
    BoardType::BOTTOM_EDGE,
    BoardType::BOTTOM_RIGHT_CORNER,
];

/// Build the table of vertically fused pairs (tiles twice as tall).
pub fn build_vertical<In, Out, const W: usize>(
    input: &RotationTable<In, W>,
    threaded: bool,
) -> RotationTable<Out, W>
where
    In: TileIndex,
    Out: TileIndex,
{
    let child = input.layout();
    let sink = TableSink::new(RotationTable::new(child.taller()));
    run_builder(input, 1, 2, threaded, &|upper: &Tile<W>, lower: &Tile<W>| {
        sink.insert(fuse_vertical(child, upper, lower));
    });
    sink.into_table()
}

/// Build the table of horizontally fused pairs (tiles twice as wide).
pub fn build_horizontal<In, Out, const W: usize>(
    input: &RotationTable<In, W>,
    threaded: bool,
) -> RotationTable<Out, W>
where
    In: TileIndex,
    Out: TileIndex,
{
    let child = input.layout();
    let sink = TableSink::new(RotationTable::new(child.wider()));
    run_builder(input, 2, 1, threaded, &|left: &Tile<W>, right: &Tile<W>| {
        sink.insert(fuse_horizontal(child, left, right));
    });
    sink.into_table()
}

/// Solve the micro board once per border type, feeding every completed pair
/// to `fuse`. When threaded, the nine types run on their own threads and the
/// sink's mutex serializes the inserts.
fn run_builder<I, const W: usize>(
    input: &RotationTable<I, W>,
    width: usize,
    height: usize,
    threaded: bool,
    fuse: &(dyn Fn(&Tile<W>, &Tile<W>) + Sync),
) where
    I: TileIndex,
{
    let run_one = |ty: BoardType| {
        let mut board = Board::new(width, height, input);
        board.set_type(ty);
        board.set_on_complete(fuse);
        board.solve();
    };

    if threaded {
        let run_one = &run_one;
        thread::scope(|scope| {
            for ty in BUILDER_TYPES {
                scope.spawn(move || run_one(ty));
            }
        });
    } else {
        for ty in BUILDER_TYPES {
            run_one(ty);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{DenseIndex, HashedIndex};
    use crate::layout::{EdgeClass, EdgeLayout};
    use crate::pieces::{Piece, PieceSet};

    fn rotations(pieces: &PieceSet) -> RotationTable<DenseIndex, 1> {
        let mut table = RotationTable::new(EdgeLayout::base(EdgeClass::E8));
        pieces.generate_rotations(&mut table);
        table
    }

    /// An 8 piece bag assembling a 2 wide, 4 tall board: color 1 across the
    /// seam between columns, color 2 between rows.
    fn two_by_four_pieces() -> PieceSet {
        let mut pieces = Vec::new();
        for x in 0..2u64 {
            for y in 0..4u64 {
                pieces.push(Piece::new(
                    if x == 0 { 0 } else { 1 },
                    if y == 0 { 0 } else { 2 },
                    if x == 1 { 0 } else { 1 },
                    if y == 3 { 0 } else { 2 },
                ));
            }
        }
        PieceSet::from_pieces(pieces)
    }

    #[test]
    fn fused_table_solves_like_the_child_table() {
        let ones = rotations(&two_by_four_pieces());
        let twos: RotationTable<HashedIndex, 1> = build_vertical(&ones, false);
        assert!(!twos.is_empty());

        // every fused tile covers exactly two pieces
        for id in 0..twos.len() as u32 {
            assert_eq!(twos.tile(id).mask.count_ones(), 2);
        }

        // 2x4 board of single pieces vs 2x2 board of stacked pairs
        let mut direct = Board::new(2, 4, &ones);
        direct.solve();
        let mut fused = Board::new(2, 2, &twos);
        fused.solve();
        assert!(direct.solutions() > 0);
        assert_eq!(direct.solutions(), fused.solutions());
    }

    #[test]
    fn threaded_build_matches_single_threaded() {
        let ones = rotations(&two_by_four_pieces());
        let single: RotationTable<HashedIndex, 1> = build_vertical(&ones, false);
        let threaded: RotationTable<HashedIndex, 1> = build_vertical(&ones, true);
        assert_eq!(single.len(), threaded.len());
    }

    #[test]
    fn horizontal_builder_mirrors_vertical_on_the_transposed_bag() {
        let tall_bag = rotations(&two_by_four_pieces());
        let wide_bag = rotations(&PieceSet::from_pieces(
            two_by_four_pieces()
                .iter()
                .map(|p| Piece::new(p.top, p.left, p.bottom, p.right))
                .collect(),
        ));

        let tall: RotationTable<HashedIndex, 1> = build_vertical(&tall_bag, false);
        let wide: RotationTable<HashedIndex, 1> = build_horizontal(&wide_bag, false);
        assert_eq!(tall.len(), wide.len());
    }
}
