//! The placement grid and the depth-first placement engine.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crate::index::TileIndex;
use crate::mask::PieceMask;
use crate::table::RotationTable;
use crate::tile::Tile;

/// Index link that points nowhere (end of the traversal chain).
pub(crate) const NO_CELL: u32 = u32::MAX;

/// Border configuration of a board, one bit per side that is a border.
///
/// The ten named values cover a normal board, the four corners, the four
/// edges, and the borderless middle; they describe where a board sits inside
/// a larger region, which is how the bridge builder enumerates every context
/// a fused tile can appear in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BoardType(u8);

impl BoardType {
    pub const LEFT_BORDER: u8 = 0x01;
    pub const TOP_BORDER: u8 = 0x02;
    pub const RIGHT_BORDER: u8 = 0x04;
    pub const BOTTOM_BORDER: u8 = 0x08;

    pub const NORMAL: BoardType =
        BoardType(Self::LEFT_BORDER | Self::TOP_BORDER | Self::RIGHT_BORDER | Self::BOTTOM_BORDER);
    pub const TOP_LEFT_CORNER: BoardType = BoardType(Self::TOP_BORDER | Self::LEFT_BORDER);
    pub const TOP_EDGE: BoardType = BoardType(Self::TOP_BORDER);
    pub const TOP_RIGHT_CORNER: BoardType = BoardType(Self::TOP_BORDER | Self::RIGHT_BORDER);
    pub const LEFT_EDGE: BoardType = BoardType(Self::LEFT_BORDER);
    pub const MIDDLE: BoardType = BoardType(0);
    pub const RIGHT_EDGE: BoardType = BoardType(Self::RIGHT_BORDER);
    pub const BOTTOM_LEFT_CORNER: BoardType = BoardType(Self::BOTTOM_BORDER | Self::LEFT_BORDER);
    pub const BOTTOM_EDGE: BoardType = BoardType(Self::BOTTOM_BORDER);
    pub const BOTTOM_RIGHT_CORNER: BoardType = BoardType(Self::BOTTOM_BORDER | Self::RIGHT_BORDER);

    pub fn has_left(self) -> bool {
        self.0 & Self::LEFT_BORDER != 0
    }

    pub fn has_top(self) -> bool {
        self.0 & Self::TOP_BORDER != 0
    }

    pub fn has_right(self) -> bool {
        self.0 & Self::RIGHT_BORDER != 0
    }

    pub fn has_bottom(self) -> bool {
        self.0 & Self::BOTTOM_BORDER != 0
    }
}

/// One grid position: the key describing what can be placed here, the tile
/// currently placed, and index links into the cell arena.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cell {
    pub key: u64,
    pub tile: u32,
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub prev: u32,
    pub next: u32,
}

impl Cell {
    fn empty() -> Self {
        Self {
            key: 0,
            tile: NO_CELL,
            left: NO_CELL,
            top: NO_CELL,
            right: NO_CELL,
            bottom: NO_CELL,
            prev: NO_CELL,
            next: NO_CELL,
        }
    }
}

/// A W×H grid of placements wired to one rotation table.
///
/// Cells live in a single arena in column-major order (y varies fastest) with
/// a trailing junk cell; every off-board neighbour link points at the junk
/// cell so that placing a tile can write both neighbour keys unconditionally.
pub struct Board<'a, I, const W: usize> {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    table: &'a RotationTable<I, W>,
    mask_left: u64,
    mask_top: u64,
    solutions: u64,
    print: bool,
    quit: bool,
    threaded: bool,
    cancel: Arc<AtomicBool>,
    on_complete: Option<&'a (dyn Fn(&Tile<W>, &Tile<W>) + Sync)>,
}

impl<'a, I: TileIndex, const W: usize> Board<'a, I, W> {
    pub fn new(width: usize, height: usize, table: &'a RotationTable<I, W>) -> Self {
        assert!(width >= 1 && height >= 1);
        let count = width * height;
        let junk = count as u32;
        let mut cells = vec![Cell::empty(); count + 1];

        let at = |x: usize, y: usize| (x * height + y) as u32;
        for x in 0..width {
            for y in 0..height {
                let cell = &mut cells[at(x, y) as usize];
                cell.left = if x > 0 { at(x - 1, y) } else { junk };
                cell.top = if y > 0 { at(x, y - 1) } else { junk };
                cell.right = if x + 1 < width { at(x + 1, y) } else { junk };
                cell.bottom = if y + 1 < height { at(x, y + 1) } else { junk };
            }
        }
        for i in 0..count {
            cells[i].prev = if i > 0 { (i - 1) as u32 } else { NO_CELL };
            cells[i].next = if i + 1 < count { (i + 1) as u32 } else { NO_CELL };
        }

        let layout = table.layout();
        let mut board = Self {
            width,
            height,
            cells,
            table,
            mask_left: layout.mask_left(),
            mask_top: layout.mask_top(),
            solutions: 0,
            print: false,
            quit: false,
            threaded: false,
            cancel: Arc::new(AtomicBool::new(false)),
            on_complete: None,
        };
        board.set_type(BoardType::NORMAL);
        board
    }

    /// Reset every cell's key for the given border configuration. Bordered
    /// sides demand color 0 on the outer ring; open sides accept any
    /// non-border color there.
    pub fn set_type(&mut self, ty: BoardType) {
        let layout = self.table.layout();
        for x in 0..self.width {
            for y in 0..self.height {
                let left = if x == 0 && ty.has_left() {
                    0
                } else {
                    layout.any_left()
                };
                let top = if y == 0 && ty.has_top() {
                    0
                } else {
                    layout.any_top()
                };
                let right_open = !(x == self.width - 1 && ty.has_right());
                let bottom_open = !(y == self.height - 1 && ty.has_bottom());
                self.cells[x * self.height + y].key = layout.key(left, top, right_open, bottom_open);
            }
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set_print(&mut self, value: bool) {
        self.print = value;
    }

    pub fn set_quit(&mut self, value: bool) {
        self.quit = value;
    }

    pub fn set_threaded(&mut self, value: bool) {
        self.threaded = value;
    }

    /// Share one cancellation flag across the boards of a solve session.
    pub fn share_cancel(&mut self, flag: Arc<AtomicBool>) {
        self.cancel = flag;
    }

    pub fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Number of solutions found so far.
    pub fn solutions(&self) -> u64 {
        self.solutions
    }

    /// Divert completed grids to `hook` instead of counting them. The bridge
    /// builder uses this on its two-cell boards; the hook receives the tiles
    /// at cell 0 and cell 1.
    pub(crate) fn set_on_complete(&mut self, hook: &'a (dyn Fn(&Tile<W>, &Tile<W>) + Sync)) {
        self.on_complete = Some(hook);
    }

    /// Exhaust the board, counting (and optionally printing) every solution.
    pub fn solve(&mut self) {
        if self.threaded {
            self.solve_threaded();
        } else {
            self.solve_from(0, PieceMask::zero());
        }
    }

    /// Put a tile down and push its right and bottom edges into the
    /// neighbouring keys. Off-board writes land in the junk cell. Returns the
    /// next cell in traversal order.
    pub(crate) fn place(&mut self, at: u32, id: u32) -> u32 {
        let exit = self.table.tile(id).exit_key();
        let cell = self.cells[at as usize];
        self.cells[at as usize].tile = id;

        let right = &mut self.cells[cell.right as usize].key;
        *right = (*right & !self.mask_left) | (exit & self.mask_left);
        let bottom = &mut self.cells[cell.bottom as usize].key;
        *bottom = (*bottom & !self.mask_top) | (exit & self.mask_top);

        cell.next
    }

    /// Recursive placement over the cells from `at` onward. `mask` holds the
    /// pieces consumed by earlier placements. Returns true when the search
    /// should unwind because a quit was requested.
    fn solve_from(&mut self, at: u32, mask: PieceMask<W>) -> bool {
        let table = self.table;
        let cell = self.cells[at as usize];
        let saved_tile = cell.tile;

        for &id in table.bucket(cell.key) {
            let tile = table.tile(id);
            if mask.intersects(&tile.mask) {
                continue;
            }

            let saved_right = self.cells[cell.right as usize].key;
            let saved_bottom = self.cells[cell.bottom as usize].key;
            let next = self.place(at, id);

            let done = if next == NO_CELL {
                self.emit()
            } else {
                self.solve_from(next, PieceMask::union_of(&mask, &tile.mask)) || self.cancelled()
            };

            self.cells[cell.right as usize].key = saved_right;
            self.cells[cell.bottom as usize].key = saved_bottom;

            if done {
                self.cells[at as usize].tile = saved_tile;
                return true;
            }
        }

        self.cells[at as usize].tile = saved_tile;
        false
    }

    /// First-cell fan-out: one worker board per candidate tile of cell 0,
    /// with crude flow control that waits on the oldest worker whenever the
    /// in-flight count reaches four per core and drains it down to two.
    fn solve_threaded(&mut self) {
        let table = self.table;
        let first = self.cells[0];
        let cores = num_cpus::get().max(1);
        let min_active = 2 * cores;
        let max_active = 4 * cores;

        let mut total = 0u64;
        thread::scope(|scope| {
            let mut active: VecDeque<thread::ScopedJoinHandle<'_, u64>> = VecDeque::new();

            for &id in table.bucket(first.key) {
                if self.cancelled() {
                    break;
                }
                let mask = table.tile(id).mask;
                let mut worker = self.worker_clone();
                active.push_back(scope.spawn(move || {
                    let next = worker.place(0, id);
                    if next == NO_CELL {
                        worker.emit();
                    } else {
                        worker.solve_from(next, mask);
                    }
                    worker.solutions
                }));

                if active.len() >= max_active {
                    while active.len() > min_active {
                        total += active.pop_front().unwrap().join().unwrap();
                    }
                }
            }

            for handle in active {
                total += handle.join().unwrap();
            }
        });
        self.solutions += total;
    }

    /// A full solution is on the grid.
    fn emit(&mut self) -> bool {
        if let Some(hook) = self.on_complete {
            hook(
                self.table.tile(self.cells[0].tile),
                self.table.tile(self.cells[1].tile),
            );
            return false;
        }

        self.solutions += 1;
        if self.print {
            self.print_solution();
        }
        if self.quit {
            self.cancel.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }

    /// Stream the solution on the grid: one line per cell holding the
    /// 1-based indices of the pieces fused into that cell's tile. The stdout
    /// lock keeps solutions from different workers whole.
    fn print_solution(&self) {
        let mut out = io::stdout().lock();
        for cell in &self.cells[..self.width * self.height] {
            let tile = self.table.tile(cell.tile);
            let _ = write!(out, "[ ");
            for piece in tile.mask.ones() {
                let _ = write!(out, "{} ", piece + 1);
            }
            let _ = writeln!(out, "]");
        }
        let _ = writeln!(out);
    }

    /// Clone the grid for a worker thread: same table and options, fresh
    /// counter, shared cancellation flag, no nested threading.
    fn worker_clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            cells: self.cells.clone(),
            table: self.table,
            mask_left: self.mask_left,
            mask_top: self.mask_top,
            solutions: 0,
            print: self.print,
            quit: self.quit,
            threaded: false,
            cancel: Arc::clone(&self.cancel),
            on_complete: self.on_complete,
        }
    }

    /// Structural self-check used by the validation suite: neighbour links,
    /// the prev/next chain, and the junk sentinel must be wired exactly as
    /// construction promises.
    pub fn verify_links(&self) -> bool {
        let count = self.width * self.height;
        let junk = count as u32;
        let at = |x: usize, y: usize| (x * self.height + y) as u32;

        for x in 0..self.width {
            for y in 0..self.height {
                let cell = &self.cells[at(x, y) as usize];
                let expect_left = if x > 0 { at(x - 1, y) } else { junk };
                let expect_top = if y > 0 { at(x, y - 1) } else { junk };
                let expect_right = if x + 1 < self.width { at(x + 1, y) } else { junk };
                let expect_bottom = if y + 1 < self.height { at(x, y + 1) } else { junk };
                if cell.left != expect_left
                    || cell.top != expect_top
                    || cell.right != expect_right
                    || cell.bottom != expect_bottom
                {
                    return false;
                }
            }
        }
        for i in 0..count {
            let cell = &self.cells[i];
            let expect_prev = if i > 0 { (i - 1) as u32 } else { NO_CELL };
            let expect_next = if i + 1 < count { (i + 1) as u32 } else { NO_CELL };
            if cell.prev != expect_prev || cell.next != expect_next {
                return false;
            }
        }
        true
    }

    /// Current lookup key of the cell at (x, y).
    pub(crate) fn key_at(&self, x: usize, y: usize) -> u64 {
        self.cells[x * self.height + y].key
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> Vec<(u64, u32)> {
        self.cells.iter().map(|c| (c.key, c.tile)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DenseIndex;
    use crate::layout::{EdgeClass, EdgeLayout};
    use crate::pieces::{Piece, PieceSet};

    /// Four distinct corner pieces that assemble a 2x2 board exactly one way
    /// once the first corner is pinned.
    fn corner_pieces() -> PieceSet {
        PieceSet::from_pieces(vec![
            Piece::new(0, 0, 1, 2),
            Piece::new(1, 0, 0, 3),
            Piece::new(0, 2, 4, 0),
            Piece::new(4, 3, 0, 0),
        ])
    }

    fn table_for(pieces: &PieceSet) -> RotationTable<DenseIndex, 1> {
        let mut table = RotationTable::new(EdgeLayout::base(EdgeClass::E8));
        pieces.generate_rotations(&mut table);
        table
    }

    #[test]
    fn links_are_wired_column_major() {
        let table = table_for(&corner_pieces());
        let board = Board::new(3, 2, &table);
        assert!(board.verify_links());
    }

    #[test]
    fn set_type_writes_border_and_any_fields() {
        let table = table_for(&corner_pieces());
        let layout = table.layout();
        let mut board = Board::new(3, 3, &table);

        // normal board: corner cell demands borders on its outer sides
        assert_eq!(board.key_at(0, 0), layout.key(0, 0, true, true));
        assert_eq!(
            board.key_at(2, 2),
            layout.key(layout.any_left(), layout.any_top(), false, false)
        );
        assert_eq!(
            board.key_at(1, 1),
            layout.key(layout.any_left(), layout.any_top(), true, true)
        );

        // middle board: nothing is a border
        board.set_type(BoardType::MIDDLE);
        assert_eq!(
            board.key_at(0, 0),
            layout.key(layout.any_left(), layout.any_top(), true, true)
        );
    }

    #[test]
    fn smallest_puzzle_has_one_pinned_solution() {
        let table = table_for(&corner_pieces());
        let mut board = Board::new(2, 2, &table);
        board.solve();
        assert_eq!(board.solutions(), 1);
    }

    #[test]
    fn threaded_solve_matches_single_threaded() {
        let table = table_for(&corner_pieces());
        let mut board = Board::new(2, 2, &table);
        board.set_threaded(true);
        board.solve();
        assert_eq!(board.solutions(), 1);
    }

    #[test]
    fn grid_is_restored_after_solve() {
        let table = table_for(&corner_pieces());
        let mut board = Board::new(2, 2, &table);
        let before = board.snapshot();
        board.solve();
        assert_eq!(board.snapshot(), before);
        assert_eq!(board.solutions(), 1);
    }

    #[test]
    fn placement_updates_only_right_and_bottom_neighbours() {
        let mut table: RotationTable<DenseIndex, 1> =
            RotationTable::new(EdgeLayout::base(EdgeClass::E8));
        let layout = table.layout();
        table.insert(crate::tile::Tile::new(
            layout,
            1,
            2,
            3,
            4,
            crate::mask::PieceMask::zero(),
        ));

        let mut board = Board::new(2, 2, &table);
        board.set_type(BoardType::MIDDLE);
        board.place(0, 0);

        // right neighbour of (0,0) is (1,0); below it is (0,1)
        assert_eq!(board.key_at(1, 0) & layout.mask_left(), 3);
        assert_eq!(
            (board.key_at(0, 1) & layout.mask_top()) >> layout.left_bits,
            4
        );
        // the far corner is untouched
        assert_eq!(
            board.key_at(1, 1),
            layout.key(layout.any_left(), layout.any_top(), true, true)
        );
        assert_eq!(board.cells[0].tile, 0);

        // placing in the far corner writes only into the junk sentinel
        let on_board: Vec<u64> = (0..4).map(|i| board.cells[i].key).collect();
        board.place(3, 0);
        assert_eq!(
            (0..4).map(|i| board.cells[i].key).collect::<Vec<u64>>(),
            on_board
        );
    }

    #[test]
    fn quit_stops_after_first_solution() {
        // two interchangeable middle pieces give 2 solutions normally
        let pieces = PieceSet::from_pieces(vec![Piece::new(1, 1, 1, 1), Piece::new(1, 1, 1, 1)]);
        let table = table_for(&pieces);
        let mut board = Board::new(2, 1, &table);
        board.set_type(BoardType::MIDDLE);
        board.solve();
        assert_eq!(board.solutions(), 2);

        let mut board = Board::new(2, 1, &table);
        board.set_type(BoardType::MIDDLE);
        board.set_quit(true);
        board.solve();
        assert_eq!(board.solutions(), 1);
        assert!(board.cancelled());
    }
}
