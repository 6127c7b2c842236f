use core::cmp;

use crate::key::KeyCacheKey;
use crate::{ItemLayout, SizeTracker, VirtualRange};

/// Maps scroll offsets to index ranges over a [`SizeTracker`].
///
/// All offsets are along the scroll axis and include `padding_start`.
#[derive(Clone, Copy, Debug)]
pub struct RangeCalculator<'a, K> {
    sizes: &'a SizeTracker<K>,
    padding_start: u32,
    padding_end: u32,
}

impl<'a, K: KeyCacheKey> RangeCalculator<'a, K> {
    pub fn new(sizes: &'a SizeTracker<K>) -> Self {
        Self {
            sizes,
            padding_start: 0,
            padding_end: 0,
        }
    }

    pub fn with_padding(mut self, padding_start: u32, padding_end: u32) -> Self {
        self.padding_start = padding_start;
        self.padding_end = padding_end;
        self
    }

    pub fn count(&self) -> usize {
        self.sizes.count()
    }

    pub fn total_size(&self) -> u64 {
        self.padding_start as u64 + self.sizes.total() + self.padding_end as u64
    }

    pub fn max_scroll_offset(&self, viewport_size: u32) -> u64 {
        self.total_size().saturating_sub(viewport_size as u64)
    }

    pub fn item_start(&self, index: usize) -> u64 {
        self.padding_start as u64 + self.sizes.start_of(index)
    }

    pub fn item_layout(&self, index: usize) -> Option<ItemLayout> {
        let size = self.sizes.size_of(index)?;
        Some(ItemLayout {
            index,
            start: self.item_start(index),
            size,
        })
    }

    /// Index of the item at `offset`. Offsets inside the leading padding map to the first item,
    /// offsets past the end to the last one.
    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        let ps = self.padding_start as u64;
        if self.count() == 0 {
            return None;
        }
        if offset < ps {
            return Some(0);
        }
        self.sizes.index_at(offset - ps)
    }

    /// Items intersecting `[scroll_offset, scroll_offset + viewport_size)`.
    pub fn visible(&self, scroll_offset: u64, viewport_size: u32) -> VirtualRange {
        let count = self.count();
        if count == 0 || viewport_size == 0 {
            return VirtualRange::EMPTY;
        }

        let total = self.total_size();
        let view = viewport_size as u64;
        let start_offset = scroll_offset.min(total.saturating_sub(view));
        if start_offset >= total {
            return VirtualRange::new(count, count);
        }
        let end_inclusive = start_offset.saturating_add(view).saturating_sub(1);

        let start = self.index_at_offset(start_offset).unwrap_or(count);
        let end = self
            .index_at_offset(cmp::max(end_inclusive, start_offset))
            .map(|i| i + 1)
            .unwrap_or(count);

        VirtualRange::new(start.min(count), end.min(count))
    }

    /// Visible items widened by `buffer` items on each side, clamped to the list.
    pub fn compute(&self, scroll_offset: u64, viewport_size: u32, buffer: usize) -> VirtualRange {
        let mut range = self.visible(scroll_offset, viewport_size);
        if range.is_empty() {
            return range;
        }
        range.start_index = range.start_index.saturating_sub(buffer);
        range.end_index = cmp::min(self.count(), range.end_index.saturating_add(buffer));
        range
    }
}
