use alloc::vec::Vec;

use recycle_scroller::{
    Align, IdState, IdStateBinding, ItemKey, KeyCacheKey, RecycleScroller, Result,
    ScrollerOptions, SlotId, StateRef, SyncReport,
};

use crate::{NoopObserver, ResizeEntry, ResizeObserver, ScrollAnchor, apply_anchor};

/// A framework-neutral controller that wraps a `RecycleScroller` and runs the work a binding
/// layer has to do after every assignment pass.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_scroll` / `on_viewport_resize` when UI events occur
/// - `on_resize_entries` when the resize observer reports slot sizes
/// - `tick(now_ms)` each frame/timer tick (to commit debounced measurements)
///
/// After each pass the controller observes newly assigned slots (dynamic mode), stops observing
/// freed ones, and re-syncs per-item state when an [`IdState`] is attached.
#[derive(Debug)]
pub struct Controller<T, K = ItemKey, S = (), O = NoopObserver> {
    s: RecycleScroller<T, K>,
    observer: O,
    /// Per slot: the key it is observed for.
    observed: Vec<Option<K>>,
    state: Option<IdStateBinding<T, K, S>>,
    seen_pass: u64,
}

impl<T, K: KeyCacheKey + Clone, O: ResizeObserver> Controller<T, K, (), O> {
    pub fn new(items: Vec<T>, options: ScrollerOptions<T, K>, observer: O) -> Self {
        Self::from_scroller(RecycleScroller::new(items, options), observer)
    }

    pub fn from_scroller(s: RecycleScroller<T, K>, observer: O) -> Self {
        let mut c = Self {
            s,
            observer,
            observed: Vec::new(),
            state: None,
            seen_pass: 0,
        };
        c.observe_pass();
        c
    }
}

impl<T, K: KeyCacheKey + Clone, S, O: ResizeObserver> Controller<T, K, S, O> {
    /// Attaches per-item state and resolves it for the slots rendered right now.
    pub fn with_id_state<S2>(self, mixin: IdState<T, K, S2>) -> Result<Controller<T, K, S2, O>> {
        let mut binding = IdStateBinding::new(mixin);
        binding.sync(&self.s)?;
        Ok(Controller {
            s: self.s,
            observer: self.observer,
            observed: self.observed,
            state: Some(binding),
            seen_pass: self.seen_pass,
        })
    }

    pub fn scroller(&self) -> &RecycleScroller<T, K> {
        &self.s
    }

    pub fn into_scroller(self) -> RecycleScroller<T, K> {
        self.s
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn id_state(&self) -> Option<&IdStateBinding<T, K, S>> {
        self.state.as_ref()
    }

    /// Runs `f` against the scroller, then the post-pass hooks.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut RecycleScroller<T, K>) -> R) -> Result<R> {
        let out = f(&mut self.s);
        self.after_pass()?;
        Ok(out)
    }

    /// Call this when the UI reports a scroll event (screen axes).
    pub fn on_scroll(&mut self, x: u64, y: u64) -> Result<()> {
        self.s.on_scroll(x, y);
        self.after_pass().map(|_| ())
    }

    pub fn on_viewport_resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.s.on_resize(width, height);
        self.after_pass().map(|_| ())
    }

    /// Feeds observed slot sizes back as measurements.
    ///
    /// Entries for free or unknown slots are ignored.
    pub fn on_resize_entries(
        &mut self,
        entries: impl IntoIterator<Item = ResizeEntry>,
        now_ms: u64,
    ) -> Result<()> {
        let direction = self.s.direction();
        for entry in entries {
            let Some(index) = self
                .s
                .pool()
                .get(entry.slot)
                .filter(|nr| nr.used)
                .map(|nr| nr.index)
            else {
                vtrace!(slot = %entry.slot, "Controller::on_resize_entries: slot not in use");
                continue;
            };
            let size = direction.main_axis(entry.width, entry.height);
            self.s.measure(index, size, now_ms);
        }
        self.after_pass().map(|_| ())
    }

    /// Commits due measurements. Returns `true` when the range was recomputed.
    pub fn tick(&mut self, now_ms: u64) -> Result<bool> {
        let recomputed = self.s.tick(now_ms);
        self.after_pass()?;
        Ok(recomputed)
    }

    /// Replaces the items, drops per-item state of removed items and re-syncs the slots.
    pub fn set_items(&mut self, items: Vec<T>) -> Result<()> {
        self.s.set_items(items);
        if let Some(binding) = &mut self.state {
            binding.prune_absent(&self.s);
        }
        self.after_pass().map(|_| ())
    }

    /// Like [`Self::set_items`], keeping the first visible item at the same place on screen.
    ///
    /// Returns `true` when the anchor item survived the replacement.
    pub fn replace_items_anchored(&mut self, items: Vec<T>) -> Result<bool> {
        let anchor: Option<ScrollAnchor<K>> = crate::capture_first_visible_anchor(&self.s);
        let mut applied = false;
        self.s.batch_update(|s| {
            s.set_items(items);
            if let Some(anchor) = &anchor {
                applied = apply_anchor(s, anchor);
            }
        });
        if let Some(binding) = &mut self.state {
            binding.prune_absent(&self.s);
        }
        self.after_pass()?;
        Ok(applied)
    }

    /// Scrolls `index` into view. Returns the applied (clamped) offset.
    pub fn scroll_to_item(&mut self, index: usize, align: Align) -> Result<u64> {
        let offset = self.s.scroll_to_item(index, align);
        self.after_pass()?;
        Ok(offset)
    }

    pub fn state_for(&self, index: usize) -> Option<StateRef<S>> {
        self.state.as_ref()?.state_for(&self.s, index)
    }

    pub fn state_for_slot(&self, slot: SlotId) -> Option<StateRef<S>> {
        self.state.as_ref()?.state_for_slot(slot)
    }

    pub fn is_observed(&self, slot: SlotId) -> bool {
        self.observed
            .get(slot.get() as usize)
            .is_some_and(Option::is_some)
    }

    /// Disconnects the observer and tears the scroller down.
    pub fn destroy(&mut self) {
        self.observer.disconnect();
        self.observed.clear();
        self.s.destroy();
        if let Some(binding) = &mut self.state {
            binding.clear_slots();
        }
        vdebug!("Controller::destroy");
    }

    /// Post-pass hooks. Does nothing if no pass ran since the last call.
    fn after_pass(&mut self) -> Result<Option<SyncReport>> {
        if self.s.recompute_count() == self.seen_pass {
            return Ok(None);
        }
        self.observe_pass();
        match &mut self.state {
            Some(binding) => binding.sync(&self.s).map(Some),
            None => Ok(None),
        }
    }

    /// Matches the observed set to the pool as it is now, so any number of passes since the last
    /// call is covered. A slot that switched items is observed afresh for the new one.
    fn observe_pass(&mut self) {
        self.seen_pass = self.s.recompute_count();
        if self.s.is_destroyed() || self.s.sizes().is_fixed() {
            return;
        }
        let pool = self.s.pool();
        if self.observed.len() < pool.len() {
            self.observed.resize_with(pool.len(), || None);
        }

        for (nr, seen) in pool.slots().zip(self.observed.iter_mut()) {
            let current = if nr.used { nr.key.as_ref() } else { None };
            if seen.is_some() && seen.as_ref() != current {
                self.observer.unobserve(nr.id);
                *seen = None;
            }
        }
        for (nr, seen) in pool.slots().zip(self.observed.iter_mut()) {
            if nr.used && seen.is_none() {
                if let Some(key) = &nr.key {
                    self.observer.observe(nr.id);
                    *seen = Some(key.clone());
                }
            }
        }
    }
}
