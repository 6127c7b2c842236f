use alloc::vec::Vec;

use crate::ItemKey;
use crate::fenwick::PrefixSums;
use crate::key::{KeyCacheKey, KeySizeMap};

#[derive(Clone, Debug)]
enum Sizing {
    /// Every item has the same size; offsets are closed-form.
    Fixed(u32),
    /// Per-index sizes (estimate until measured) over a prefix-sum table.
    Dynamic {
        sizes: Vec<u32>,
        measured: Vec<bool>,
        sums: PrefixSums,
    },
}

/// Item sizes along the scroll axis.
///
/// Fixed mode answers every query in `O(1)` from the configured size. Dynamic mode keeps the
/// per-index sizes in a Fenwick tree and a key → size cache of measured items, so measured sizes
/// follow their items across reorders and data replacement.
#[derive(Clone, Debug)]
pub struct SizeTracker<K = ItemKey> {
    sizing: Sizing,
    count: usize,
    key_sizes: KeySizeMap<K>,
}

impl<K: KeyCacheKey> SizeTracker<K> {
    pub fn fixed(item_size: u32, count: usize) -> Self {
        Self {
            sizing: Sizing::Fixed(item_size),
            count,
            key_sizes: KeySizeMap::<K>::new(),
        }
    }

    /// Creates a dynamic tracker: item `i` starts at `estimate(i)` until measured.
    pub fn dynamic(
        count: usize,
        key_for: impl FnMut(usize) -> K,
        estimate: impl FnMut(usize) -> u32,
    ) -> Self {
        let mut tracker = Self {
            sizing: Sizing::Dynamic {
                sizes: Vec::new(),
                measured: Vec::new(),
                sums: PrefixSums::default(),
            },
            count: 0,
            key_sizes: KeySizeMap::<K>::new(),
        };
        tracker.rebuild_dynamic(count, key_for, estimate);
        tracker
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.sizing, Sizing::Fixed(_))
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Switches to fixed mode. The measurement cache is kept for a later switch back.
    pub(crate) fn set_fixed(&mut self, item_size: u32, count: usize) {
        self.sizing = Sizing::Fixed(item_size);
        self.count = count;
    }

    /// Rebuilds per-index sizes from the measurement cache, falling back to `estimate`.
    pub(crate) fn rebuild_dynamic(
        &mut self,
        count: usize,
        mut key_for: impl FnMut(usize) -> K,
        mut estimate: impl FnMut(usize) -> u32,
    ) {
        let mut sizes = Vec::with_capacity(count);
        let mut measured = Vec::with_capacity(count);
        for i in 0..count {
            match self.key_sizes.get(&key_for(i)) {
                Some(&size) => {
                    sizes.push(size);
                    measured.push(true);
                }
                None => {
                    sizes.push(estimate(i));
                    measured.push(false);
                }
            }
        }
        vdebug!(
            count,
            cached = self.key_sizes.len(),
            "SizeTracker::rebuild_dynamic"
        );
        let sums = PrefixSums::from_sizes(&sizes);
        self.sizing = Sizing::Dynamic {
            sizes,
            measured,
            sums,
        };
        self.count = count;
    }

    pub fn size_of(&self, index: usize) -> Option<u32> {
        if index >= self.count {
            return None;
        }
        match &self.sizing {
            Sizing::Fixed(size) => Some(*size),
            Sizing::Dynamic { sizes, .. } => sizes.get(index).copied(),
        }
    }

    /// Offset of item `index` from the first item. `start_of(count)` is the total size.
    pub fn start_of(&self, index: usize) -> u64 {
        let index = index.min(self.count);
        match &self.sizing {
            Sizing::Fixed(size) => index as u64 * *size as u64,
            Sizing::Dynamic { sums, .. } => sums.prefix_sum(index),
        }
    }

    pub fn total(&self) -> u64 {
        match &self.sizing {
            Sizing::Fixed(size) => self.count as u64 * *size as u64,
            Sizing::Dynamic { sums, .. } => sums.total(),
        }
    }

    /// Index of the item containing `offset`, clamped to the last item.
    pub fn index_at(&self, offset: u64) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        let last = self.count - 1;
        let index = match &self.sizing {
            Sizing::Fixed(0) => last,
            Sizing::Fixed(size) => usize::try_from(offset / *size as u64).unwrap_or(usize::MAX),
            Sizing::Dynamic { sums, .. } => sums.lower_bound(offset),
        };
        Some(index.min(last))
    }

    pub fn is_measured(&self, index: usize) -> bool {
        match &self.sizing {
            Sizing::Fixed(_) => index < self.count,
            Sizing::Dynamic { measured, .. } => measured.get(index).copied().unwrap_or(false),
        }
    }

    /// Records a measured size and returns the size delta applied at `index`.
    ///
    /// Fixed mode ignores measurements and returns `0`.
    pub fn measure(&mut self, index: usize, key: K, size: u32) -> i64 {
        let Sizing::Dynamic {
            sizes,
            measured,
            sums,
        } = &mut self.sizing
        else {
            vtrace!(index, size, "SizeTracker::measure ignored in fixed mode");
            return 0;
        };
        if index >= sizes.len() {
            return 0;
        }
        self.key_sizes.insert(key, size);
        measured[index] = true;
        let cur = sizes[index];
        if cur == size {
            return 0;
        }
        sizes[index] = size;
        let delta = size as i64 - cur as i64;
        sums.add(index, delta);
        delta
    }

    /// Stores a size for a key without touching per-index sizes (the item is not rendered or no
    /// longer at the reported index).
    pub fn remember(&mut self, key: K, size: u32) {
        self.key_sizes.insert(key, size);
    }

    pub fn cached_size(&self, key: &K) -> Option<u32> {
        self.key_sizes.get(key).copied()
    }

    pub fn cache_len(&self) -> usize {
        self.key_sizes.len()
    }

    pub fn for_each_cached_size(&self, mut f: impl FnMut(&K, u32)) {
        for (k, v) in self.key_sizes.iter() {
            f(k, *v);
        }
    }

    pub fn export_cache(&self) -> Vec<(K, u32)>
    where
        K: Clone,
    {
        let mut out = Vec::with_capacity(self.key_sizes.len());
        self.for_each_cached_size(|k, v| out.push((k.clone(), v)));
        out
    }

    /// Replaces the measurement cache. Per-index sizes are refreshed on the next rebuild.
    pub(crate) fn import_cache(&mut self, entries: impl IntoIterator<Item = (K, u32)>) {
        self.key_sizes.clear();
        self.key_sizes.extend(entries);
    }

    pub(crate) fn clear_cache(&mut self) {
        self.key_sizes.clear();
    }
}
