//! Pieces and their canonical 1x1 rotations.

use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::index::TileIndex;
use crate::mask::PieceMask;
use crate::table::RotationTable;
use crate::tile::Tile;

/// One physical puzzle piece: four edge colors, 0 meaning board border.
/// A piece is identified by its position in the bag.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Piece {
    pub left: u64,
    pub top: u64,
    pub right: u64,
    pub bottom: u64,
}

impl Piece {
    pub fn new(left: u64, top: u64, right: u64, bottom: u64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// The bag of pieces loaded from a pieces file.
#[derive(Clone, Default)]
pub struct PieceSet {
    pieces: Vec<Piece>,
}

impl PieceSet {
    pub fn from_pieces(pieces: Vec<Piece>) -> Self {
        Self { pieces }
    }

    /// Load pieces from a text file: one piece per line, four whitespace
    /// separated edge values ordered left, top, right, bottom. Lines opening
    /// with `/` are comments; lines shorter than seven characters are skipped.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)?;
        let mut pieces = Vec::new();

        for line in contents.lines() {
            if line.len() < 7 || line.starts_with('/') {
                continue;
            }
            let values: Vec<u64> = line
                .split_whitespace()
                .map_while(|word| word.parse().ok())
                .collect();
            if let [left, top, right, bottom, ..] = values[..] {
                pieces.push(Piece::new(left, top, right, bottom));
            }
        }

        if pieces.is_empty() {
            return Err(Error::NoPieces);
        }
        Ok(Self { pieces })
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    /// Number of distinct edge values in use, i.e. the highest color plus one.
    pub fn edge_count(&self) -> u64 {
        self.pieces
            .iter()
            .flat_map(|p| [p.left, p.top, p.right, p.bottom])
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Generate the deduplicated 1x1 rotations of every piece into `table`.
    ///
    /// Each piece spawns up to four rotations, sorted by their (top, left)
    /// concatenation. The very first corner piece is pinned to its single
    /// top-left orientation, which fixes the board's global orientation and
    /// divides the solution count by four; later corner pieces contribute the
    /// other three rotations. Pieces whose opposite edges match collapse to
    /// two rotations, or one when all four edges match.
    pub fn generate_rotations<I: TileIndex, const W: usize>(
        &self,
        table: &mut RotationTable<I, W>,
    ) {
        let layout = table.layout();
        let mut corners = 0u64;

        for (number, p) in self.pieces.iter().enumerate() {
            let mut mask = PieceMask::zero();
            mask.set_bit(number);

            let mut rotations = [
                Tile::new(layout, p.left, p.top, p.right, p.bottom, mask),
                Tile::new(layout, p.top, p.right, p.bottom, p.left, mask),
                Tile::new(layout, p.right, p.bottom, p.left, p.top, mask),
                Tile::new(layout, p.bottom, p.left, p.top, p.right, mask),
            ];
            rotations.sort_unstable_by_key(|t| (t.hi, t.lo));

            let first = rotations[0];
            if first.left(layout) == 0 && first.top(layout) == 0 {
                // corner piece; only the first one keeps its pinned rotation
                if corners == 0 {
                    table.insert(first);
                } else {
                    for t in &rotations[1..] {
                        table.insert(*t);
                    }
                }
                corners += 1;
            } else if first.left(layout) == first.right(layout)
                && first.top(layout) == first.bottom(layout)
            {
                let distinct = if first.left(layout) == first.top(layout) {
                    1
                } else {
                    2
                };
                for t in &rotations[..distinct] {
                    table.insert(*t);
                }
            } else {
                for t in &rotations {
                    table.insert(*t);
                }
            }
        }
    }
}
