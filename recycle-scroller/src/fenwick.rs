use alloc::vec;
use alloc::vec::Vec;

/// Fenwick (binary indexed) tree over per-item sizes.
///
/// `prefix_sum(i)` is the start offset of item `i`; a point update shifts every later offset in
/// `O(log n)`.
#[derive(Clone, Debug, Default)]
pub(crate) struct PrefixSums {
    tree: Vec<u64>, // 1-indexed
    total: u64,
    top_bit: usize,
}

impl PrefixSums {
    pub(crate) fn from_sizes(sizes: &[u32]) -> Self {
        let n = sizes.len();
        let mut tree = vec![0u64; n + 1];
        let mut total = 0u64;
        for i in 1..=n {
            let size = sizes[i - 1] as u64;
            total = total.saturating_add(size);
            tree[i] = tree[i].saturating_add(size);
            let parent = i + lowest_bit(i);
            if parent <= n {
                tree[parent] = tree[parent].saturating_add(tree[i]);
            }
        }
        Self {
            tree,
            total,
            top_bit: top_bit(n),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.tree.len().saturating_sub(1)
    }

    pub(crate) fn total(&self) -> u64 {
        self.total
    }

    pub(crate) fn add(&mut self, index: usize, delta: i64) {
        let n = self.len();
        if index >= n || delta == 0 {
            return;
        }
        self.total = apply_delta(self.total, delta);
        let mut i = index + 1;
        while i <= n {
            self.tree[i] = apply_delta(self.tree[i], delta);
            i += lowest_bit(i);
        }
    }

    /// Sum of the first `count` sizes.
    pub(crate) fn prefix_sum(&self, count: usize) -> u64 {
        let mut i = count.min(self.len());
        let mut sum = 0u64;
        while i > 0 {
            sum = sum.saturating_add(self.tree[i]);
            i &= i - 1;
        }
        sum
    }

    /// Largest `count` such that `prefix_sum(count) <= target`.
    ///
    /// For an offset inside the list this is the index of the item containing it.
    pub(crate) fn lower_bound(&self, mut target: u64) -> usize {
        let n = self.len();
        let mut pos = 0usize;
        let mut bit = self.top_bit;
        while bit != 0 {
            let next = pos + bit;
            if next <= n && self.tree[next] <= target {
                target -= self.tree[next];
                pos = next;
            }
            bit >>= 1;
        }
        pos
    }
}

fn apply_delta(value: u64, delta: i64) -> u64 {
    if delta >= 0 {
        value.saturating_add(delta as u64)
    } else {
        value.saturating_sub(delta.unsigned_abs())
    }
}

fn lowest_bit(i: usize) -> usize {
    i & i.wrapping_neg()
}

fn top_bit(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        1usize << (usize::BITS - 1 - n.leading_zeros())
    }
}
