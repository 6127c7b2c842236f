use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp;

use crate::debounce::Debouncer;
use crate::key::KeyCacheKey;
use crate::{
    Align, Debounce, Direction, FrameState, ItemKey, ItemLayout, ItemSize, NodeRecord, Pool,
    PoolDiff, PoolItem, RangeCalculator, RangeUpdate, Rect, ScrollDirection, ScrollerOptions,
    SizeTracker, TypeKey, VirtualRange,
};

/// Where a scroller is in its update cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    /// Computing the range from scroll offset, viewport and sizes.
    Recomputing,
    /// Reconciling the pool against the new range.
    Diffing,
}

/// The event that caused the latest recomputation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Scroll,
    Resize,
    Data,
    Measure,
    Options,
}

/// A headless recycling scroller.
///
/// Owns the items, their sizes, the slot pool and the current range. Your binding layer drives
/// it with viewport geometry, scroll offsets and measured sizes, then renders the used slots
/// (`for_each_pool_item`) at their positions.
///
/// Every trigger recomputes the range and reconciles the pool right away, except inside
/// [`Self::batch_update`], where only the final state is computed.
#[derive(Clone, Debug)]
pub struct RecycleScroller<T, K = ItemKey> {
    options: ScrollerOptions<T, K>,
    items: Vec<T>,
    sizes: SizeTracker<K>,
    pool: Pool<K>,
    pending: Debouncer<K>,

    scroll_rect: Rect,
    scroll_offset: u64,
    scroll_direction: Option<ScrollDirection>,

    range: VirtualRange,
    visible: VirtualRange,
    last_diff: PoolDiff,

    phase: Phase,
    last_trigger: Option<Trigger>,
    batch_depth: usize,
    dirty: bool,
    recomputes: u64,
    destroyed: bool,
}

impl<T, K: KeyCacheKey + Clone> RecycleScroller<T, K> {
    pub fn new(items: Vec<T>, options: ScrollerOptions<T, K>) -> Self {
        vdebug!(
            count = items.len(),
            direction = options.direction.as_str(),
            buffer = options.buffer,
            items_limit = options.items_limit,
            "RecycleScroller::new"
        );
        let mut s = Self {
            sizes: SizeTracker::fixed(0, 0),
            pool: Pool::new(options.items_limit, options.capacity_policy),
            pending: Debouncer::new(options.debounce),
            scroll_rect: options.initial_rect.unwrap_or_default(),
            scroll_offset: options.initial_offset,
            scroll_direction: None,
            range: VirtualRange::EMPTY,
            visible: VirtualRange::EMPTY,
            last_diff: PoolDiff::default(),
            phase: Phase::Idle,
            last_trigger: None,
            batch_depth: 0,
            dirty: false,
            recomputes: 0,
            destroyed: false,
            options,
            items,
        };
        s.rebuild_sizes();
        s.request(Trigger::Data);
        s
    }

    pub fn options(&self) -> &ScrollerOptions<T, K> {
        &self.options
    }

    pub fn set_options(&mut self, options: ScrollerOptions<T, K>) {
        let sizes_changed = !self.options.item_size.same_as(&options.item_size)
            || !Arc::ptr_eq(&self.options.get_item_key, &options.get_item_key);
        self.options = options;
        vtrace!(
            buffer = self.options.buffer,
            items_limit = self.options.items_limit,
            sizes_changed,
            "RecycleScroller::set_options"
        );
        self.pool
            .set_limit(self.options.items_limit, self.options.capacity_policy);
        self.pending.set_delay(self.options.debounce);
        if sizes_changed {
            self.rebuild_sizes();
        }
        self.request(Trigger::Options);
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut ScrollerOptions<T, K>)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_buffer(&mut self, buffer: usize) {
        if self.options.buffer == buffer {
            return;
        }
        self.options.buffer = buffer;
        self.request(Trigger::Options);
    }

    pub fn set_debounce(&mut self, debounce: impl Into<Debounce>) {
        self.options.debounce = debounce.into();
        self.pending.set_delay(self.options.debounce);
    }

    pub fn direction(&self) -> Direction {
        self.options.direction
    }

    /// Coalesces every trigger raised inside `f` into a single recomputation.
    ///
    /// Intermediate ranges are never computed: the last scroll offset, viewport and data win.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        self.batch_depth = self.batch_depth.saturating_add(1);
        f(self);
        debug_assert!(self.batch_depth > 0, "batch_depth underflow");
        self.batch_depth = self.batch_depth.saturating_sub(1);

        if self.batch_depth == 0 && core::mem::take(&mut self.dirty) {
            self.recompute();
        }
    }

    fn request(&mut self, trigger: Trigger) {
        if self.destroyed {
            return;
        }
        self.last_trigger = Some(trigger);
        if self.batch_depth > 0 {
            self.dirty = true;
            return;
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        if self.destroyed {
            return;
        }
        self.dirty = false;
        self.phase = Phase::Recomputing;
        vtrace!(phase = ?self.phase, "RecycleScroller::recompute");
        let calc = self.calculator();
        let viewport = self.scroll_rect.main;
        let visible = calc.visible(self.scroll_offset, viewport);
        let range = calc.compute(self.scroll_offset, viewport, self.options.buffer);

        self.phase = Phase::Diffing;
        vtrace!(phase = ?self.phase, "RecycleScroller::recompute");
        let items = &self.items;
        let key_fn = &self.options.get_item_key;
        let type_fn = self.options.get_item_type.as_ref();
        let diff = self.pool.reconcile(range.indexes().map(|i| {
            let item = &items[i];
            let ty = type_fn.map_or(TypeKey::NoType, |f| f(item, i));
            (i, key_fn(item, i), ty)
        }));

        self.phase = Phase::Idle;
        self.recomputes = self.recomputes.saturating_add(1);
        vtrace!(
            trigger = ?self.last_trigger,
            start = range.start_index,
            end = range.end_index,
            freed = diff.freed.len(),
            assigned = diff.assigned.len(),
            "RecycleScroller::recompute"
        );

        let changed = range != self.range || visible != self.visible;
        self.range = range;
        self.visible = visible;
        self.last_diff = diff;
        if changed {
            if let Some(cb) = &self.options.on_update {
                cb(RangeUpdate { range, visible });
            }
        }
    }

    fn rebuild_sizes(&mut self) {
        let count = self.items.len();
        match &self.options.item_size {
            ItemSize::Fixed(size) => self.sizes.set_fixed(*size, count),
            ItemSize::Dynamic { estimate } => {
                let items = &self.items;
                let key_fn = &self.options.get_item_key;
                self.sizes.rebuild_dynamic(
                    count,
                    |i| key_fn(&items[i], i),
                    |i| estimate(&items[i], i),
                );
            }
        }
    }

    pub fn calculator(&self) -> RangeCalculator<'_, K> {
        RangeCalculator::new(&self.sizes)
            .with_padding(self.options.padding_start, self.options.padding_end)
    }

    /// The current step of the update cycle.
    ///
    /// A pass runs to completion inside the call that triggered it, so between calls this is
    /// always [`Phase::Idle`]; the other phases only show up in the pass's trace events.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_trigger(&self) -> Option<Trigger> {
        self.last_trigger
    }

    /// Number of range recomputations performed so far.
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    // Data.

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replaces the items.
    ///
    /// Every slot assignment is re-derived from the new data by key: slots whose key is still in
    /// range keep rendering it, the rest are recycled. Measured sizes follow their keys.
    pub fn set_items(&mut self, items: Vec<T>) {
        vdebug!(
            prev = self.items.len(),
            next = items.len(),
            "RecycleScroller::set_items"
        );
        self.items = items;
        self.rebuild_sizes();
        self.request(Trigger::Data);
    }

    pub fn update_items(&mut self, f: impl FnOnce(&mut Vec<T>)) {
        let mut items = core::mem::take(&mut self.items);
        f(&mut items);
        self.set_items(items);
    }

    pub fn key_for(&self, index: usize) -> Option<K> {
        self.items
            .get(index)
            .map(|item| (self.options.get_item_key)(item, index))
    }

    pub fn type_for(&self, index: usize) -> TypeKey {
        match (self.items.get(index), &self.options.get_item_type) {
            (Some(item), Some(f)) => f(item, index),
            _ => TypeKey::NoType,
        }
    }

    /// Current index of the item with `key`.
    ///
    /// Rendered items are found through the pool; others need a linear scan.
    pub fn index_of_key(&self, key: &K) -> Option<usize> {
        if let Some(nr) = self.pool.slot_for_key(key) {
            if self.key_for(nr.index).as_ref() == Some(key) {
                return Some(nr.index);
            }
        }
        let key_fn = &self.options.get_item_key;
        self.items
            .iter()
            .enumerate()
            .position(|(i, item)| key_fn(item, i) == *key)
    }

    // Geometry.

    pub fn viewport_size(&self) -> u32 {
        self.scroll_rect.main
    }

    pub fn scroll_rect(&self) -> Rect {
        self.scroll_rect
    }

    pub fn set_scroll_rect(&mut self, rect: Rect) {
        if self.scroll_rect == rect {
            return;
        }
        self.scroll_rect = rect;
        self.request(Trigger::Resize);
    }

    pub fn set_viewport_size(&mut self, size: u32) {
        if self.scroll_rect.main == size {
            return;
        }
        self.scroll_rect.main = size;
        self.request(Trigger::Resize);
    }

    /// Applies a viewport resize reported in screen axes.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        let rect = self.options.direction.rect(width, height);
        self.set_scroll_rect(rect);
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll_direction
    }

    pub fn set_scroll_offset(&mut self, offset: u64) {
        if self.scroll_offset == offset {
            return;
        }
        let prev = self.scroll_offset;
        self.scroll_offset = offset;
        self.scroll_direction = match offset.cmp(&prev) {
            cmp::Ordering::Greater => Some(ScrollDirection::Forward),
            cmp::Ordering::Less => Some(ScrollDirection::Backward),
            cmp::Ordering::Equal => self.scroll_direction,
        };
        self.request(Trigger::Scroll);
    }

    pub fn set_scroll_offset_clamped(&mut self, offset: u64) {
        let clamped = self.clamp_scroll_offset(offset);
        self.set_scroll_offset(clamped);
    }

    /// Applies a scroll event reported in screen axes (`scrollLeft`, `scrollTop`).
    pub fn on_scroll(&mut self, x: u64, y: u64) {
        let offset = self.options.direction.scroll_axis(x, y);
        self.set_scroll_offset(offset);
    }

    pub fn set_viewport_and_scroll(&mut self, viewport_size: u32, scroll_offset: u64) {
        self.batch_update(|s| {
            s.set_viewport_size(viewport_size);
            s.set_scroll_offset(scroll_offset);
        });
    }

    pub fn set_viewport_and_scroll_clamped(&mut self, viewport_size: u32, scroll_offset: u64) {
        self.batch_update(|s| {
            s.set_viewport_size(viewport_size);
            s.set_scroll_offset_clamped(scroll_offset);
        });
    }

    pub fn total_size(&self) -> u64 {
        self.calculator().total_size()
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.calculator().max_scroll_offset(self.scroll_rect.main)
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            viewport: self.scroll_rect,
            scroll_offset: self.scroll_offset,
        }
    }

    pub fn restore_frame_state(&mut self, frame: FrameState) {
        self.batch_update(|s| {
            s.set_scroll_rect(frame.viewport);
            s.set_scroll_offset_clamped(frame.scroll_offset);
        });
    }

    // Navigation.

    /// Scroll offset that brings `index` into view with `align`, clamped.
    pub fn scroll_to_item_offset(&self, index: usize, align: Align) -> u64 {
        let count = self.items.len();
        if count == 0 {
            return 0;
        }
        let Some(item) = self.item_layout(index.min(count - 1)) else {
            return 0;
        };
        let view = self.scroll_rect.main as u64;

        let target = match align {
            Align::Start => item.start,
            Align::End => item.end().saturating_sub(view),
            Align::Center => {
                let center = item.start.saturating_add(item.size as u64 / 2);
                center.saturating_sub(view / 2)
            }
            Align::Auto => {
                let cur = self.scroll_offset;
                let cur_end = cur.saturating_add(view);
                if item.start >= cur && item.end() <= cur_end {
                    cur
                } else if item.start < cur {
                    item.start
                } else {
                    item.end().saturating_sub(view)
                }
            }
        };

        self.clamp_scroll_offset(target)
    }

    /// Scrolls `index` into view. Returns the applied (clamped) offset.
    pub fn scroll_to_item(&mut self, index: usize, align: Align) -> u64 {
        let offset = self.scroll_to_item_offset(index, align);
        self.set_scroll_offset(offset);
        offset
    }

    pub fn scroll_to_bottom(&mut self) -> u64 {
        let offset = self.max_scroll_offset();
        self.set_scroll_offset(offset);
        offset
    }

    // Measurement.

    /// Reports the measured size of the item at `index`.
    ///
    /// The size is committed by [`Self::tick`] once the debounce delay has elapsed since the
    /// latest report; with no debounce it is committed immediately. Fixed-size scrollers ignore
    /// measurements.
    pub fn measure(&mut self, index: usize, size: u32, now_ms: u64) {
        if self.destroyed || self.sizes.is_fixed() {
            return;
        }
        let Some(key) = self.key_for(index) else {
            return;
        };
        vtrace!(index, size, now_ms, "RecycleScroller::measure");
        self.pending.push(key, index, size, now_ms);
        if self.pending.delay().is_immediate() {
            self.tick(now_ms);
        }
    }

    /// Commits due measurements with a single recomputation.
    ///
    /// Returns `true` when the range was recomputed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.destroyed {
            return false;
        }
        let Some(due) = self.pending.take_due(now_ms) else {
            return false;
        };

        let mut recompute = false;
        for (key, pending) in due {
            let index = if self.key_for(pending.index).as_ref() == Some(&key) {
                Some(pending.index)
            } else {
                self.index_of_key(&key)
            };
            match index {
                Some(index) => {
                    let applied = self.apply_size(index, key, pending.size);
                    // Offsets inside the range only move when the item is in or before it.
                    recompute |= index < self.range.end_index || applied != 0;
                }
                None => self.sizes.remember(key, pending.size),
            }
        }

        if recompute {
            self.request(Trigger::Measure);
        }
        recompute
    }

    /// Applies a size change immediately (no debounce).
    ///
    /// Returns the scroll offset adjustment that was applied to keep the viewport stable.
    pub fn resize_item(&mut self, index: usize, size: u32) -> i64 {
        if self.destroyed || self.sizes.is_fixed() {
            return 0;
        }
        let Some(key) = self.key_for(index) else {
            return 0;
        };
        let applied = self.apply_size(index, key, size);
        if index < self.range.end_index || applied != 0 {
            self.request(Trigger::Measure);
        }
        applied
    }

    fn apply_size(&mut self, index: usize, key: K, size: u32) -> i64 {
        let Some(item) = self.item_layout(index) else {
            return 0;
        };
        let delta = self.sizes.measure(index, key, size);
        if delta == 0 {
            return 0;
        }

        let should_adjust = match &self.options.should_adjust_scroll_on_item_size_change {
            Some(f) => f(item, delta, self.scroll_offset),
            None => item.start < self.scroll_offset,
        };
        if !should_adjust {
            return 0;
        }
        if delta > 0 {
            self.scroll_offset = self.scroll_offset.saturating_add(delta as u64);
        } else {
            self.scroll_offset = self.scroll_offset.saturating_sub(delta.unsigned_abs());
        }
        delta
    }

    pub fn has_pending_measurements(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn pending_measurements(&self) -> usize {
        self.pending.len()
    }

    /// When the pending measurements become due, if any.
    pub fn next_measurement_deadline(&self) -> Option<u64> {
        self.pending.deadline_ms()
    }

    /// Drops pending measurements without applying them.
    pub fn cancel_pending(&mut self) {
        self.pending.cancel();
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.sizes.is_measured(index)
    }

    pub fn sizes(&self) -> &SizeTracker<K> {
        &self.sizes
    }

    pub fn measurement_cache_len(&self) -> usize {
        self.sizes.cache_len()
    }

    pub fn export_measurement_cache(&self) -> Vec<(K, u32)> {
        self.sizes.export_cache()
    }

    /// Replaces the measured sizes (e.g. restored from a previous session).
    pub fn import_measurement_cache(&mut self, entries: impl IntoIterator<Item = (K, u32)>) {
        self.sizes.import_cache(entries);
        vdebug!(
            entries = self.sizes.cache_len(),
            "RecycleScroller::import_measurement_cache"
        );
        self.rebuild_sizes();
        self.request(Trigger::Measure);
    }

    pub fn reset_measurements(&mut self) {
        self.sizes.clear_cache();
        self.rebuild_sizes();
        self.request(Trigger::Measure);
    }

    // Output.

    /// Rendered range (visible + buffer).
    pub fn range(&self) -> VirtualRange {
        self.range
    }

    pub fn visible_range(&self) -> VirtualRange {
        self.visible
    }

    /// Slot changes made by the latest recomputation.
    pub fn last_diff(&self) -> &PoolDiff {
        &self.last_diff
    }

    pub fn pool(&self) -> &Pool<K> {
        &self.pool
    }

    /// The used slot rendering `index`.
    pub fn slot_for_index(&self, index: usize) -> Option<&NodeRecord<K>> {
        let key = self.key_for(index)?;
        self.pool
            .slot_for_key(&key)
            .filter(|nr| nr.index == index)
            .or_else(|| self.pool.used().find(|nr| nr.index == index))
    }

    /// Visits used slots in pool order (stable node order).
    pub fn for_each_pool_item<'a>(&'a self, mut f: impl FnMut(PoolItem<'a, T, K>)) {
        let calc = self.calculator();
        for nr in self.pool.used() {
            let Some(item) = self.items.get(nr.index) else {
                continue;
            };
            f(PoolItem {
                nr,
                item,
                position: calc.item_start(nr.index),
                size: self.sizes.size_of(nr.index).unwrap_or(0),
            });
        }
    }

    /// Collects used slots into `out` in ascending index order (clears `out` first).
    pub fn collect_pool_items<'a>(&'a self, out: &mut Vec<PoolItem<'a, T, K>>) {
        out.clear();
        self.for_each_pool_item(|it| out.push(it));
        out.sort_by_key(|it| it.nr.index);
    }

    pub fn item_layout(&self, index: usize) -> Option<ItemLayout> {
        self.calculator().item_layout(index)
    }

    pub fn item_start(&self, index: usize) -> Option<u64> {
        self.item_layout(index).map(|it| it.start)
    }

    pub fn item_size(&self, index: usize) -> Option<u32> {
        self.sizes.size_of(index)
    }

    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        self.calculator().index_at_offset(offset)
    }

    /// Tears the scroller down: pending measurements are dropped, the pool is released and
    /// later events are ignored.
    pub fn destroy(&mut self) {
        vdebug!(slots = self.pool.len(), "RecycleScroller::destroy");
        self.pending.cancel();
        self.pool.clear();
        self.range = VirtualRange::EMPTY;
        self.visible = VirtualRange::EMPTY;
        self.last_diff = PoolDiff::default();
        self.phase = Phase::Idle;
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
