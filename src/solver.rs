//! Orchestration: capacity checks, representation choices, the builder
//! cascade, and the boards that finally run.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use log::info;
use thousands::Separable;

use crate::board::{Board, BoardType};
use crate::bridge;
use crate::error::Error;
use crate::index::{DenseIndex, HashedIndex, OrderedIndex, TileIndex};
use crate::layout::{EdgeClass, EdgeLayout};
use crate::pieces::PieceSet;
use crate::table::RotationTable;

/// Maximum piece count the widest mask supports.
pub const MAX_PIECES: usize = 512;

/// What to solve and how.
#[derive(Clone, Debug)]
pub struct Options {
    pub width: usize,
    pub height: usize,
    /// Largest macro tile to cascade up to, as pieces per tile (1, 2, 4, 8,
    /// 16 or 32).
    pub max_tile_area: usize,
    pub board_type: BoardType,
    pub print: bool,
    pub quit: bool,
    pub randomize: bool,
    pub threaded: bool,
}

impl Options {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            max_tile_area: 1,
            board_type: BoardType::NORMAL,
            print: false,
            quit: false,
            randomize: false,
            threaded: false,
        }
    }
}

/// Bucket storage choice per tile size. The dense array only pays off while
/// the key domain is small, so the wider edge classes hand over to hashed
/// buckets and then ordered maps earlier in the cascade.
pub trait StrategySet {
    type T1x1: TileIndex;
    type T1x2: TileIndex;
    type T2x1: TileIndex;
    type T2x2: TileIndex;
    type T2x4: TileIndex;
    type T4x2: TileIndex;
    type T4x4: TileIndex;
    type T4x8: TileIndex;
    type T8x4: TileIndex;
}

/// Strategies for the 8-edge class.
pub struct NarrowStrategies;

impl StrategySet for NarrowStrategies {
    type T1x1 = DenseIndex;
    type T1x2 = DenseIndex;
    type T2x1 = DenseIndex;
    type T2x2 = HashedIndex;
    type T2x4 = HashedIndex;
    type T4x2 = HashedIndex;
    type T4x4 = OrderedIndex;
    type T4x8 = OrderedIndex;
    type T8x4 = OrderedIndex;
}

/// Strategies for the 16- and 32-edge classes.
pub struct WideStrategies;

impl StrategySet for WideStrategies {
    type T1x1 = DenseIndex;
    type T1x2 = HashedIndex;
    type T2x1 = HashedIndex;
    type T2x2 = HashedIndex;
    type T2x4 = OrderedIndex;
    type T4x2 = OrderedIndex;
    type T4x4 = OrderedIndex;
    type T4x8 = OrderedIndex;
    type T8x4 = OrderedIndex;
}

/// Solve the puzzle described by `opts` over `pieces`, returning the total
/// solution count.
pub fn solve(pieces: &PieceSet, opts: &Options) -> Result<u64, Error> {
    if pieces.is_empty() {
        return Err(Error::NoPieces);
    }

    let edge_count = pieces.edge_count();
    let class = EdgeClass::for_edge_count(edge_count).ok_or(Error::TooManyColors {
        max_color: edge_count.saturating_sub(1),
        limit: EdgeClass::E32.max_color(),
    })?;

    // smallest piece mask that holds the bag
    match pieces.len() {
        n if n <= 64 => dispatch_class::<1>(pieces, class, opts),
        n if n <= 128 => dispatch_class::<2>(pieces, class, opts),
        n if n <= 256 => dispatch_class::<4>(pieces, class, opts),
        n if n <= MAX_PIECES => dispatch_class::<8>(pieces, class, opts),
        n => Err(Error::TooManyPieces {
            count: n,
            max: MAX_PIECES,
        }),
    }
}

fn dispatch_class<const W: usize>(
    pieces: &PieceSet,
    class: EdgeClass,
    opts: &Options,
) -> Result<u64, Error> {
    match class {
        EdgeClass::E8 => Ok(run_cascade::<NarrowStrategies, W>(pieces, class, opts)),
        EdgeClass::E16 | EdgeClass::E32 => {
            Ok(run_cascade::<WideStrategies, W>(pieces, class, opts))
        }
    }
}

fn built<I: TileIndex, const W: usize>(
    name: &str,
    table: RotationTable<I, W>,
) -> RotationTable<I, W> {
    info!("{name}: {} rotations", table.len().separate_with_commas());
    table
}

fn run_cascade<P: StrategySet, const W: usize>(
    pieces: &PieceSet,
    class: EdgeClass,
    opts: &Options,
) -> u64 {
    let len_max = opts.width.max(opts.height);
    let len_min = opts.width.min(opts.height);
    let square = len_max == len_min;

    // a size is enabled only when it divides the board and was asked for
    let need_2 = len_max >= 4 && len_max % 2 == 0 && opts.max_tile_area >= 2;
    let need_4 = need_2 && len_min >= 4 && len_min % 2 == 0 && opts.max_tile_area >= 4;
    let need_8 = need_4 && len_max >= 8 && len_max % 4 == 0 && opts.max_tile_area >= 8;
    let need_16 = need_8 && len_min >= 8 && len_min % 4 == 0 && opts.max_tile_area >= 16;
    let need_32 = need_16 && len_max >= 16 && len_max % 8 == 0 && opts.max_tile_area >= 32;

    let threaded = opts.threaded;

    // ------------------------------
    // generate rotations and lookups
    // ------------------------------

    let mut t_1x1: RotationTable<P::T1x1, W> = RotationTable::new(EdgeLayout::base(class));
    pieces.generate_rotations(&mut t_1x1);
    info!("1x1: {} rotations", t_1x1.len().separate_with_commas());

    let mut t_1x2: Option<RotationTable<P::T1x2, W>> = if need_2 {
        Some(built("1x2", bridge::build_vertical(&t_1x1, threaded)))
    } else {
        None
    };

    let mut t_2x1: Option<RotationTable<P::T2x1, W>> = if need_2 && !need_4 && !square {
        Some(built("2x1", bridge::build_horizontal(&t_1x1, threaded)))
    } else {
        None
    };

    let mut t_2x2: Option<RotationTable<P::T2x2, W>> = match &t_1x2 {
        Some(t) if need_4 => Some(built("2x2", bridge::build_horizontal(t, threaded))),
        _ => None,
    };

    let mut t_2x4: Option<RotationTable<P::T2x4, W>> = match &t_2x2 {
        Some(t) if need_8 => Some(built("2x4", bridge::build_vertical(t, threaded))),
        _ => None,
    };

    let mut t_4x2: Option<RotationTable<P::T4x2, W>> = match &t_2x2 {
        Some(t) if need_8 && !need_16 && !square => {
            Some(built("4x2", bridge::build_horizontal(t, threaded)))
        }
        _ => None,
    };

    let mut t_4x4: Option<RotationTable<P::T4x4, W>> = match &t_2x4 {
        Some(t) if need_16 => Some(built("4x4", bridge::build_horizontal(t, threaded))),
        _ => None,
    };

    let mut t_4x8: Option<RotationTable<P::T4x8, W>> = match &t_4x4 {
        Some(t) if need_32 => Some(built("4x8", bridge::build_vertical(t, threaded))),
        _ => None,
    };

    let mut t_8x4: Option<RotationTable<P::T8x4, W>> = match &t_4x4 {
        Some(t) if need_32 && !square => {
            Some(built("8x4", bridge::build_horizontal(t, threaded)))
        }
        _ => None,
    };

    // -------------------
    // randomize rotations
    // -------------------

    if opts.randomize {
        info!("randomizing...");

        if let Some(t) = t_4x8.as_mut().filter(|t| !t.is_empty()) {
            t.randomize();
            if let Some(h) = t_8x4.as_mut() {
                h.randomize();
            }
        } else if let Some(t) = t_4x4.as_mut().filter(|t| !t.is_empty()) {
            t.randomize();
        } else if let Some(t) = t_2x4.as_mut().filter(|t| !t.is_empty()) {
            t.randomize();
            if let Some(h) = t_4x2.as_mut() {
                h.randomize();
            }
        } else if let Some(t) = t_2x2.as_mut().filter(|t| !t.is_empty()) {
            t.randomize();
        } else if let Some(t) = t_1x2.as_mut().filter(|t| !t.is_empty()) {
            t.randomize();
            if let Some(h) = t_2x1.as_mut() {
                h.randomize();
            }
        } else {
            t_1x1.randomize();
        }
    }

    // -----
    // solve
    // -----

    info!("solving...");
    let stopwatch = Instant::now();
    let cancel = Arc::new(AtomicBool::new(false));
    let mut solutions = 0u64;

    // run the largest usable size; a non-square board solves both canonical
    // orientations
    if let Some(t) = t_4x8.as_ref().filter(|t| !t.is_empty()) {
        solutions += run_board(t, len_min / 4, len_max / 8, opts, &cancel);
        if let Some(h) = t_8x4.as_ref().filter(|_| !square) {
            solutions += run_board(h, len_max / 8, len_min / 4, opts, &cancel);
        }
    } else if let Some(t) = t_4x4.as_ref().filter(|t| !t.is_empty()) {
        solutions += run_board(t, len_min / 4, len_max / 4, opts, &cancel);
        if !square {
            solutions += run_board(t, len_max / 4, len_min / 4, opts, &cancel);
        }
    } else if let Some(t) = t_2x4.as_ref().filter(|t| !t.is_empty()) {
        solutions += run_board(t, len_min / 2, len_max / 4, opts, &cancel);
        if let Some(h) = t_4x2.as_ref().filter(|_| !square) {
            solutions += run_board(h, len_max / 4, len_min / 2, opts, &cancel);
        }
    } else if let Some(t) = t_2x2.as_ref().filter(|t| !t.is_empty()) {
        solutions += run_board(t, len_min / 2, len_max / 2, opts, &cancel);
        if !square {
            solutions += run_board(t, len_max / 2, len_min / 2, opts, &cancel);
        }
    } else if let Some(t) = t_1x2.as_ref().filter(|t| !t.is_empty()) {
        solutions += run_board(t, len_min, len_max / 2, opts, &cancel);
        if let Some(h) = t_2x1.as_ref().filter(|_| !square) {
            solutions += run_board(h, len_max / 2, len_min, opts, &cancel);
        }
    } else {
        solutions += run_board(&t_1x1, len_min, len_max, opts, &cancel);
        if !square {
            solutions += run_board(&t_1x1, len_max, len_min, opts, &cancel);
        }
    }

    info!(
        "found {} solutions in {} ms",
        solutions.separate_with_commas(),
        stopwatch.elapsed().as_millis().separate_with_commas()
    );
    solutions
}

fn run_board<I: TileIndex, const W: usize>(
    table: &RotationTable<I, W>,
    width: usize,
    height: usize,
    opts: &Options,
    cancel: &Arc<AtomicBool>,
) -> u64 {
    use std::sync::atomic::Ordering;

    if cancel.load(Ordering::Relaxed) {
        return 0;
    }

    let mut board = Board::new(width, height, table);
    board.set_type(opts.board_type);
    board.set_print(opts.print);
    board.set_quit(opts.quit);
    board.set_threaded(opts.threaded);
    board.share_cancel(Arc::clone(cancel));
    board.solve();
    board.solutions()
}
