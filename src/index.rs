//! Bucket storage strategies behind a rotation table.
//!
//! The solver only ever asks for the candidate slice of a key; which structure
//! answers that query is a per-table choice the orchestrator makes from the
//! tile size and edge class.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::layout::EdgeLayout;

/// Keyed multi-map from lookup key to tile ids.
pub trait TileIndex: Send + Sync {
    fn new(layout: EdgeLayout) -> Self;

    /// Append `id` to the bucket for `key`.
    fn push(&mut self, key: u64, id: u32);

    /// The bucket for `key`; empty when the key was never inserted.
    fn bucket(&self, key: u64) -> &[u32];

    /// Visit every bucket mutably (used to re-sort after randomizing).
    fn for_each_bucket(&mut self, f: impl FnMut(&mut Vec<u32>));
}

/// Plain array over the whole key domain. Only viable while
/// `EdgeLayout::key_count` stays small.
pub struct DenseIndex {
    buckets: Vec<Vec<u32>>,
}

impl TileIndex for DenseIndex {
    fn new(layout: EdgeLayout) -> Self {
        Self {
            buckets: vec![Vec::new(); layout.key_count()],
        }
    }

    #[inline(always)]
    fn push(&mut self, key: u64, id: u32) {
        self.buckets[key as usize].push(id);
    }

    #[inline(always)]
    fn bucket(&self, key: u64) -> &[u32] {
        &self.buckets[key as usize]
    }

    fn for_each_bucket(&mut self, mut f: impl FnMut(&mut Vec<u32>)) {
        for bucket in &mut self.buckets {
            f(bucket);
        }
    }
}

/// Ordered map, for the largest key domains.
pub struct OrderedIndex {
    buckets: BTreeMap<u64, Vec<u32>>,
}

impl TileIndex for OrderedIndex {
    fn new(_layout: EdgeLayout) -> Self {
        Self {
            buckets: BTreeMap::new(),
        }
    }

    fn push(&mut self, key: u64, id: u32) {
        self.buckets.entry(key).or_default().push(id);
    }

    #[inline(always)]
    fn bucket(&self, key: u64) -> &[u32] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn for_each_bucket(&mut self, mut f: impl FnMut(&mut Vec<u32>)) {
        for bucket in self.buckets.values_mut() {
            f(bucket);
        }
    }
}

/// Fx-hashed buckets, for mid-sized key domains where a dense array would
/// waste memory but lookups still dominate.
pub struct HashedIndex {
    buckets: FxHashMap<u64, Vec<u32>>,
}

impl TileIndex for HashedIndex {
    fn new(_layout: EdgeLayout) -> Self {
        Self {
            buckets: FxHashMap::default(),
        }
    }

    fn push(&mut self, key: u64, id: u32) {
        self.buckets.entry(key).or_default().push(id);
    }

    #[inline(always)]
    fn bucket(&self, key: u64) -> &[u32] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn for_each_bucket(&mut self, mut f: impl FnMut(&mut Vec<u32>)) {
        for bucket in self.buckets.values_mut() {
            f(bucket);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::EdgeClass;

    fn exercise<I: TileIndex>() {
        let mut index = I::new(EdgeLayout::base(EdgeClass::E8));
        assert!(index.bucket(5).is_empty());
        index.push(5, 1);
        index.push(5, 2);
        index.push(9, 3);
        assert_eq!(index.bucket(5), &[1, 2]);
        assert_eq!(index.bucket(9), &[3]);
        assert!(index.bucket(0).is_empty());

        let mut seen = 0;
        index.for_each_bucket(|b| seen += b.len());
        // dense indexes also visit their empty buckets
        assert_eq!(seen, 3);
    }

    #[test]
    fn all_strategies_share_the_contract() {
        exercise::<DenseIndex>();
        exercise::<OrderedIndex>();
        exercise::<HashedIndex>();
    }
}
