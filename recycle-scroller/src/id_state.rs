//! Per-item state that survives slot recycling.
//!
//! A recycled slot renders many items over its lifetime, so state that belongs to an item (an
//! expanded flag, a text draft) cannot live in the slot. [`IdState`] keeps it in a store keyed by
//! item id; each slot tracks the id it last saw through an [`IdStateSlot`] and switches to the
//! matching entry when its item changes.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::key::{KeyCacheKey, KeyMap};
use crate::{Error, ItemKey, RecycleScroller, Result, SlotId};

/// Shared handle to one item's state.
pub type StateRef<S> = Rc<RefCell<S>>;

/// Builds the initial state of an item.
pub type StateFactory<T, S> = Rc<dyn Fn(&T) -> S>;

/// Id → state map shared by every instance of one [`IdState`].
pub struct IdStateStore<K, S> {
    map: Rc<RefCell<KeyMap<K, StateRef<S>>>>,
}

impl<K, S> Clone for IdStateStore<K, S> {
    fn clone(&self) -> Self {
        Self {
            map: Rc::clone(&self.map),
        }
    }
}

impl<K, S> fmt::Debug for IdStateStore<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdStateStore")
            .field("len", &self.map.borrow().len())
            .finish()
    }
}

impl<K: KeyCacheKey, S> IdStateStore<K, S> {
    fn new() -> Self {
        Self {
            map: Rc::new(RefCell::new(KeyMap::new())),
        }
    }

    pub fn get(&self, id: &K) -> Option<StateRef<S>> {
        self.map.borrow().get(id).cloned()
    }

    pub fn contains(&self, id: &K) -> bool {
        self.map.borrow().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.map.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.borrow().is_empty()
    }

    fn insert(&self, id: K, state: StateRef<S>) {
        self.map.borrow_mut().insert(id, state);
    }

    pub fn remove(&self, id: &K) -> Option<StateRef<S>> {
        self.map.borrow_mut().remove(id)
    }

    /// Keeps only the ids for which `keep` returns `true`. Returns how many were dropped.
    pub fn retain(&self, mut keep: impl FnMut(&K) -> bool) -> usize {
        let mut map = self.map.borrow_mut();
        let before = map.len();
        map.retain(|id, _| keep(id));
        before - map.len()
    }

    pub fn clear(&self) {
        self.map.borrow_mut().clear();
    }

    /// Whether both handles point at the same map.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.map, &other.map)
    }
}

/// Where an item's id comes from.
pub enum IdProp<T, K> {
    /// The scroller's key field.
    ItemKey,
    /// A custom accessor; `None` means the item has no id.
    Custom(Rc<dyn Fn(&T) -> Option<K>>),
}

impl<T, K> IdProp<T, K> {
    pub fn custom(f: impl Fn(&T) -> Option<K> + 'static) -> Self {
        Self::Custom(Rc::new(f))
    }
}

impl<T, K> Clone for IdProp<T, K> {
    fn clone(&self) -> Self {
        match self {
            Self::ItemKey => Self::ItemKey,
            Self::Custom(f) => Self::Custom(Rc::clone(f)),
        }
    }
}

impl<T, K> Default for IdProp<T, K> {
    fn default() -> Self {
        Self::ItemKey
    }
}

impl<T, K> fmt::Debug for IdProp<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ItemKey => f.write_str("ItemKey"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Per-item state definition, shared by every instance created from it.
///
/// Two `IdState::new` calls never share state; [`IdState::instance`] does.
pub struct IdState<T, K = ItemKey, S = ()> {
    store: IdStateStore<K, S>,
    id_prop: IdProp<T, K>,
    factory: Option<StateFactory<T, S>>,
}

impl<T, K, S> Clone for IdState<T, K, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            id_prop: self.id_prop.clone(),
            factory: self.factory.clone(),
        }
    }
}

impl<T, K, S> fmt::Debug for IdState<T, K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdState")
            .field("store", &self.store)
            .field("id_prop", &self.id_prop)
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

impl<T, K: KeyCacheKey + Clone, S> IdState<T, K, S> {
    /// Creates a definition with its own, empty store.
    ///
    /// No factory is required here; a missing one is only reported when state is first needed.
    pub fn new(id_prop: IdProp<T, K>) -> Self {
        Self {
            store: IdStateStore::new(),
            id_prop,
            factory: None,
        }
    }

    pub fn with_factory(mut self, factory: impl Fn(&T) -> S + 'static) -> Self {
        self.factory = Some(Rc::new(factory));
        self
    }

    /// A new component instance backed by this definition's store.
    pub fn instance(&self) -> Self {
        self.clone()
    }

    pub fn store(&self) -> &IdStateStore<K, S> {
        &self.store
    }

    pub fn id_prop(&self) -> &IdProp<T, K> {
        &self.id_prop
    }

    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Id of `item`; `key` is the item's scroller key.
    pub fn resolve_id(&self, item: &T, key: Option<&K>) -> Option<K> {
        match &self.id_prop {
            IdProp::ItemKey => key.cloned(),
            IdProp::Custom(f) => f(item),
        }
    }

    pub fn get(&self, id: &K) -> Option<StateRef<S>> {
        self.store.get(id)
    }

    /// State of `id`, running the factory if the id has none yet.
    pub fn init(&self, id: &K, item: &T) -> Result<StateRef<S>> {
        if let Some(state) = self.store.get(id) {
            return Ok(state);
        }
        let factory = self.factory.as_ref().ok_or(Error::MissingStateFactory)?;
        let state = Rc::new(RefCell::new(factory(item)));
        self.store.insert(id.clone(), Rc::clone(&state));
        vtrace!(entries = self.store.len(), "IdState::init");
        Ok(state)
    }
}

/// Outcome of [`IdStateSlot::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdStateUpdate {
    /// Same id as before.
    Unchanged,
    /// Switched to the existing state of another id.
    Switched,
    /// Switched to a newly initialized id.
    Initialized,
    /// The item has no id; the slot exposes no state.
    Unresolved,
}

/// Id tracking for one rendered slot.
pub struct IdStateSlot<K, S> {
    id: Option<K>,
    state: Option<StateRef<S>>,
}

impl<K, S> Default for IdStateSlot<K, S> {
    fn default() -> Self {
        Self {
            id: None,
            state: None,
        }
    }
}

impl<K: fmt::Debug, S> fmt::Debug for IdStateSlot<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdStateSlot")
            .field("id", &self.id)
            .field("resolved", &self.state.is_some())
            .finish()
    }
}

impl<K: KeyCacheKey + Clone, S> IdStateSlot<K, S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<&K> {
        self.id.as_ref()
    }

    pub fn state(&self) -> Option<&StateRef<S>> {
        self.state.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.state.is_some()
    }

    /// Re-resolves the slot after it was (re)assigned to `item`.
    ///
    /// Known ids get their existing state back; the factory only runs for new ids.
    pub fn update<T>(
        &mut self,
        mixin: &IdState<T, K, S>,
        item: &T,
        key: Option<&K>,
    ) -> Result<IdStateUpdate> {
        let Some(id) = mixin.resolve_id(item, key) else {
            vwarn!("IdStateSlot::update: item has no id, per-item state unavailable");
            self.detach();
            return Ok(IdStateUpdate::Unresolved);
        };
        if self.state.is_some() && self.id.as_ref() == Some(&id) {
            return Ok(IdStateUpdate::Unchanged);
        }

        let (state, outcome) = match mixin.get(&id) {
            Some(state) => (state, IdStateUpdate::Switched),
            None => (mixin.init(&id, item)?, IdStateUpdate::Initialized),
        };
        self.id = Some(id);
        self.state = Some(state);
        Ok(outcome)
    }

    /// Drops the slot's handle; the item's state stays in the store.
    pub fn detach(&mut self) {
        self.id = None;
        self.state = None;
    }
}

/// Counts from one [`IdStateBinding::sync`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub unchanged: usize,
    pub switched: usize,
    pub initialized: usize,
    pub unresolved: usize,
    pub recycled: usize,
}

impl SyncReport {
    fn record(&mut self, update: IdStateUpdate) {
        match update {
            IdStateUpdate::Unchanged => self.unchanged += 1,
            IdStateUpdate::Switched => self.switched += 1,
            IdStateUpdate::Initialized => self.initialized += 1,
            IdStateUpdate::Unresolved => self.unresolved += 1,
        }
    }
}

/// Binds an [`IdState`] to the slots of one scroller.
pub struct IdStateBinding<T, K = ItemKey, S = ()> {
    mixin: IdState<T, K, S>,
    slots: Vec<IdStateSlot<K, S>>,
}

impl<T, K: fmt::Debug, S> fmt::Debug for IdStateBinding<T, K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdStateBinding")
            .field("mixin", &self.mixin)
            .field("slots", &self.slots)
            .finish()
    }
}

impl<T, K: KeyCacheKey + Clone, S> IdStateBinding<T, K, S> {
    pub fn new(mixin: IdState<T, K, S>) -> Self {
        Self {
            mixin,
            slots: Vec::new(),
        }
    }

    pub fn mixin(&self) -> &IdState<T, K, S> {
        &self.mixin
    }

    pub fn slot(&self, slot: SlotId) -> Option<&IdStateSlot<K, S>> {
        self.slots.get(slot.get() as usize)
    }

    fn slot_mut(&mut self, slot: SlotId) -> &mut IdStateSlot<K, S> {
        let ix = slot.get() as usize;
        if self.slots.len() <= ix {
            self.slots.resize_with(ix + 1, IdStateSlot::default);
        }
        &mut self.slots[ix]
    }

    /// Hook: `slot` now renders `item` (with scroller key `key`).
    pub fn on_slot_assigned(
        &mut self,
        slot: SlotId,
        item: &T,
        key: Option<&K>,
    ) -> Result<IdStateUpdate> {
        let mixin = &self.mixin;
        let ix = slot.get() as usize;
        if self.slots.len() <= ix {
            self.slots.resize_with(ix + 1, IdStateSlot::default);
        }
        self.slots[ix].update(mixin, item, key)
    }

    /// Hook: `slot` went back to the free list. The item's state is kept.
    pub fn on_slot_recycled(&mut self, slot: SlotId) {
        self.slot_mut(slot).detach();
    }

    /// Compares every used slot of `scroller` against the id it last saw.
    ///
    /// Run after each assignment pass (e.g. after `set_items`, scrolling or a measurement tick).
    pub fn sync(&mut self, scroller: &RecycleScroller<T, K>) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        for &slot in &scroller.last_diff().freed {
            self.on_slot_recycled(slot);
            report.recycled += 1;
        }
        // Slots freed by earlier passes that were not synced.
        let used: Vec<bool> = scroller.pool().slots().map(|nr| nr.used).collect();
        for (ix, slot) in self.slots.iter_mut().enumerate() {
            let attached = slot.id.is_some() || slot.state.is_some();
            if attached && !used.get(ix).copied().unwrap_or(false) {
                slot.detach();
                report.recycled += 1;
            }
        }
        for nr in scroller.pool().used() {
            let Some(item) = scroller.item(nr.index) else {
                continue;
            };
            let update = self.on_slot_assigned(nr.id, item, nr.key.as_ref())?;
            report.record(update);
        }
        vtrace!(
            unchanged = report.unchanged,
            switched = report.switched,
            initialized = report.initialized,
            unresolved = report.unresolved,
            recycled = report.recycled,
            "IdStateBinding::sync"
        );
        Ok(report)
    }

    /// Drops the state of every id that no longer appears in the scroller's items.
    ///
    /// Returns the number of removed entries.
    pub fn prune_absent(&mut self, scroller: &RecycleScroller<T, K>) -> usize {
        let mut present: KeyMap<K, ()> = KeyMap::new();
        for (index, item) in scroller.items().iter().enumerate() {
            let key = scroller.key_for(index);
            if let Some(id) = self.mixin.resolve_id(item, key.as_ref()) {
                present.insert(id, ());
            }
        }

        let removed = self.mixin.store().retain(|id| present.contains_key(id));
        for slot in &mut self.slots {
            if slot.id().is_some_and(|id| !present.contains_key(id)) {
                slot.detach();
            }
        }
        if removed > 0 {
            vdebug!(removed, "IdStateBinding::prune_absent");
        }
        removed
    }

    pub fn state_for_slot(&self, slot: SlotId) -> Option<StateRef<S>> {
        self.slot(slot).and_then(|s| s.state().cloned())
    }

    /// State of the item at `index`, whether or not it is rendered.
    pub fn state_for(&self, scroller: &RecycleScroller<T, K>, index: usize) -> Option<StateRef<S>> {
        let item = scroller.item(index)?;
        let key = scroller.key_for(index);
        let id = self.mixin.resolve_id(item, key.as_ref())?;
        self.mixin.get(&id)
    }

    /// Detaches every slot (e.g. on teardown). Stored state is untouched.
    pub fn clear_slots(&mut self) {
        self.slots.clear();
    }
}
