//! Rotation tables: the keyed candidate lists driving the placement search.

use std::sync::Mutex;

use rand::Rng;

use crate::index::TileIndex;
use crate::layout::EdgeLayout;
use crate::tile::Tile;

/// All rotations of one tile size, indexed by lookup key.
///
/// The table owns its tiles; buckets hold indices into the arena, so a tile
/// can sit in several buckets without duplication.
pub struct RotationTable<I, const W: usize> {
    layout: EdgeLayout,
    tiles: Vec<Tile<W>>,
    index: I,
}

impl<I: TileIndex, const W: usize> RotationTable<I, W> {
    pub fn new(layout: EdgeLayout) -> Self {
        Self {
            layout,
            tiles: Vec::new(),
            index: I::new(layout),
        }
    }

    pub fn layout(&self) -> EdgeLayout {
        self.layout
    }

    /// Number of stored tiles (not buckets).
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Insert a tile under its literal key, plus the variants with the left
    /// and/or top field replaced by the "any non-border" pattern when that
    /// side is not a border. One tile lands in up to four buckets.
    pub fn insert(&mut self, tile: Tile<W>) {
        let id = self.tiles.len() as u32;
        let layout = self.layout;
        let key = tile.entry_key(layout);
        self.tiles.push(tile);

        self.index.push(key, id);

        let left = key & layout.mask_left() != 0;
        let top = key & layout.mask_top() != 0;
        if left {
            self.index.push(key | layout.mask_left(), id);
        }
        if top {
            self.index.push(key | layout.mask_top(), id);
        }
        if left && top {
            self.index.push(key | layout.mask_left() | layout.mask_top(), id);
        }
    }

    /// Candidate tiles for a lookup key, in bucket order.
    #[inline(always)]
    pub fn bucket(&self, key: u64) -> &[u32] {
        self.index.bucket(key)
    }

    #[inline(always)]
    pub fn tile(&self, id: u32) -> &Tile<W> {
        &self.tiles[id as usize]
    }

    /// Give every tile a fresh random sort key and re-sort each bucket by it.
    pub fn randomize(&mut self) {
        let mut rng = rand::rng();
        for tile in &mut self.tiles {
            tile.random = rng.random();
        }
        let tiles = &self.tiles;
        self.index
            .for_each_bucket(|bucket| bucket.sort_by_key(|&id| tiles[id as usize].random));
    }
}

/// Shared write handle for a table under construction.
///
/// Bridge workers on several threads funnel fused tiles through this; the
/// mutex serializes writers, and `into_table` hands the finished table back
/// for lock-free reading.
pub struct TableSink<I, const W: usize> {
    inner: Mutex<RotationTable<I, W>>,
}

impl<I: TileIndex, const W: usize> TableSink<I, W> {
    pub fn new(table: RotationTable<I, W>) -> Self {
        Self {
            inner: Mutex::new(table),
        }
    }

    pub fn insert(&self, tile: Tile<W>) {
        self.inner.lock().unwrap().insert(tile);
    }

    pub fn into_table(self) -> RotationTable<I, W> {
        self.inner.into_inner().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DenseIndex;
    use crate::layout::EdgeClass;
    use crate::mask::PieceMask;

    fn table() -> RotationTable<DenseIndex, 1> {
        RotationTable::new(EdgeLayout::base(EdgeClass::E8))
    }

    fn single_bit(bit: usize) -> PieceMask<1> {
        let mut m = PieceMask::zero();
        m.set_bit(bit);
        m
    }

    /// Scan the whole key domain and collect every key whose bucket holds `id`.
    fn keys_containing(t: &RotationTable<DenseIndex, 1>, id: u32) -> Vec<u64> {
        (0..t.layout().key_count() as u64)
            .filter(|&k| t.bucket(k).contains(&id))
            .collect()
    }

    #[test]
    fn interior_tile_lands_in_four_buckets() {
        let mut t = table();
        let layout = t.layout();
        t.insert(Tile::new(layout, 1, 2, 3, 4, single_bit(0)));
        assert_eq!(t.len(), 1);

        let literal = layout.key(1, 2, true, true);
        let keys = keys_containing(&t, 0);
        assert_eq!(
            keys,
            {
                let mut expected = vec![
                    literal,
                    literal | layout.mask_left(),
                    literal | layout.mask_top(),
                    literal | layout.mask_left() | layout.mask_top(),
                ];
                expected.sort_unstable();
                expected
            }
        );
    }

    #[test]
    fn corner_tile_lands_only_under_its_literal_key() {
        let mut t = table();
        let layout = t.layout();
        // a top-left corner: left and top are borders, right and bottom open
        t.insert(Tile::new(layout, 0, 0, 3, 4, single_bit(0)));
        let keys = keys_containing(&t, 0);
        assert_eq!(keys, vec![layout.key(0, 0, true, true)]);
    }

    #[test]
    fn edge_tile_gets_one_variant() {
        let mut t = table();
        let layout = t.layout();
        // top border only
        t.insert(Tile::new(layout, 2, 0, 3, 4, single_bit(0)));
        let literal = layout.key(2, 0, true, true);
        assert_eq!(
            keys_containing(&t, 0),
            vec![literal, literal | layout.mask_left()]
        );
    }

    #[test]
    fn missing_key_yields_empty_bucket() {
        let t = table();
        assert!(t.bucket(17).is_empty());
    }

    #[test]
    fn randomize_keeps_bucket_membership() {
        let mut t = table();
        let layout = t.layout();
        for i in 0..20 {
            t.insert(Tile::new(layout, 1, 2, 3, 4, single_bit(i)));
        }
        let key = layout.key(1, 2, true, true);
        let before: Vec<u32> = {
            let mut v = t.bucket(key).to_vec();
            v.sort_unstable();
            v
        };
        t.randomize();
        let mut after = t.bucket(key).to_vec();
        after.sort_unstable();
        assert_eq!(before, after);
        assert_eq!(t.len(), 20);
    }
}
