//! Exhaustive solver for edge matching puzzles.
//!
//! A puzzle is a rectangular board and a bag of square pieces, each labeled
//! with four edge colors (0 marks the outer border). The solver enumerates
//! every way to fill the board so that touching edges share a color and the
//! rim carries the border color, rotating pieces as needed but never
//! reflecting or reusing them.
//!
//! The search works from precomputed rotation tables: every rotation of every
//! piece is indexed by the (left, top) edge pair it would need at a cell, so
//! the depth-first placement loop is a table lookup, a piece-mask test and
//! two word writes per step. For larger boards a bridge-building pass fuses
//! rotations into 1x2, 2x2 and bigger macro tiles, trading memory for search
//! depth. See `solver::solve` for the entry point.

pub mod board;
pub mod bridge;
pub mod error;
pub mod index;
pub mod layout;
pub mod mask;
pub mod pieces;
pub mod solver;
pub mod table;
pub mod tile;
pub mod validate;

pub use board::{Board, BoardType};
pub use error::Error;
pub use index::{DenseIndex, HashedIndex, OrderedIndex, TileIndex};
pub use layout::{EdgeClass, EdgeLayout};
pub use mask::PieceMask;
pub use pieces::{Piece, PieceSet};
pub use solver::{solve, Options};
pub use table::RotationTable;
pub use tile::Tile;
