use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::key::{KeyCacheKey, KeyMap};
use crate::{CapacityExceeded, Error, ItemKey, Result, TypeKey};

/// Stable identity of one reusable slot. Never reused for another slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotId(u64);

impl SlotId {
    pub fn get(self) -> u64 {
        self.0
    }

    fn slot_index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}

/// Bookkeeping for one reusable visual slot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeRecord<K = ItemKey> {
    pub id: SlotId,
    /// Key of the item last rendered by this slot; kept while the slot is free.
    pub key: Option<K>,
    /// Data index rendered by this slot (the last one, when free).
    pub index: usize,
    pub used: bool,
    pub ty: TypeKey,
}

/// A used slot paired with the item it renders.
#[derive(Debug)]
pub struct PoolItem<'a, T, K = ItemKey> {
    pub nr: &'a NodeRecord<K>,
    pub item: &'a T,
    /// Start offset on the scroll axis.
    pub position: u64,
    pub size: u32,
}

impl<T, K> Clone for PoolItem<'_, T, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, K> Copy for PoolItem<'_, T, K> {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotAssignment {
    pub slot: SlotId,
    pub index: usize,
    /// Index the slot showed before; `None` for a newly created slot.
    pub from: Option<usize>,
}

/// What changed in one reconciliation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolDiff {
    /// Slots released back to their type's free list.
    pub freed: Vec<SlotId>,
    /// Slots given a new item, in ascending index order.
    pub assigned: Vec<SlotAssignment>,
    /// Retained slots whose item moved to another index.
    pub moved: Vec<SlotAssignment>,
    /// Number of slots allocated by this pass.
    pub created: usize,
    pub capacity: Option<CapacityExceeded>,
}

impl PoolDiff {
    pub fn is_empty(&self) -> bool {
        self.freed.is_empty()
            && self.assigned.is_empty()
            && self.moved.is_empty()
            && self.capacity.is_none()
    }

    pub fn ensure_within_capacity(&self) -> Result<()> {
        match self.capacity {
            Some(c) => Err(Error::CapacityExceeded(c)),
            None => Ok(()),
        }
    }
}

/// What to do when the pool is full and the range needs another slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CapacityPolicy {
    /// Render the indexes that fit and report the rest.
    #[default]
    Truncate,
    /// Keep allocating past the limit and report it.
    Grow,
}

/// Reusable slot pool.
///
/// Slots are created on demand up to `limit` and never destroyed individually. Free slots are
/// bucketed by [`TypeKey`] so a slot is never reused for an item of another type.
#[derive(Clone, Debug)]
pub struct Pool<K = ItemKey> {
    slots: Vec<NodeRecord<K>>,
    by_key: KeyMap<K, usize>,
    free: KeyMap<TypeKey, Vec<usize>>,
    limit: usize,
    policy: CapacityPolicy,
}

impl<K: KeyCacheKey + Clone> Pool<K> {
    pub fn new(limit: usize, policy: CapacityPolicy) -> Self {
        Self {
            slots: Vec::new(),
            by_key: KeyMap::new(),
            free: KeyMap::new(),
            limit,
            policy,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn policy(&self) -> CapacityPolicy {
        self.policy
    }

    pub fn set_limit(&mut self, limit: usize, policy: CapacityPolicy) {
        self.limit = limit;
        self.policy = policy;
    }

    /// Total number of slots, used or free.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn used_len(&self) -> usize {
        self.slots.iter().filter(|nr| nr.used).count()
    }

    pub fn get(&self, id: SlotId) -> Option<&NodeRecord<K>> {
        self.slots.get(id.slot_index())
    }

    /// The used slot currently rendering `key`.
    pub fn slot_for_key(&self, key: &K) -> Option<&NodeRecord<K>> {
        self.by_key.get(key).map(|&ix| &self.slots[ix])
    }

    pub fn slots(&self) -> impl Iterator<Item = &NodeRecord<K>> {
        self.slots.iter()
    }

    pub fn used(&self) -> impl Iterator<Item = &NodeRecord<K>> {
        self.slots.iter().filter(|nr| nr.used)
    }

    /// Reconciles the pool against the indexes that must be rendered.
    ///
    /// `desired` yields `(index, key, type)` in ascending index order. Used slots whose key is
    /// still desired (with the same type) keep it; the other used slots are freed; the remaining
    /// indexes take a free slot of their type or a new one.
    pub fn reconcile(&mut self, desired: impl IntoIterator<Item = (usize, K, TypeKey)>) -> PoolDiff {
        let mut wanted: Vec<(usize, K, TypeKey)> = desired.into_iter().collect();
        debug_assert!(
            wanted.windows(2).all(|w| w[0].0 < w[1].0),
            "Pool::reconcile: desired indexes must be strictly ascending"
        );

        let mut diff = PoolDiff::default();
        // Truncation keeps the lowest indexes; retained slots past them are freed below.
        if self.policy == CapacityPolicy::Truncate && wanted.len() > self.limit {
            let exceeded = CapacityExceeded {
                requested: wanted.len(),
                limit: self.limit,
            };
            vwarn!(
                requested = exceeded.requested,
                limit = exceeded.limit,
                "Pool::reconcile: rendered items limit reached"
            );
            diff.capacity = Some(exceeded);
            wanted.truncate(self.limit);
        }

        let mut position_of: KeyMap<K, usize> = KeyMap::new();
        for (pos, (index, key, _)) in wanted.iter().enumerate() {
            if position_of.contains_key(key) {
                vwarn!(index, "Pool::reconcile: duplicate item key, rendering without reuse");
                continue;
            }
            position_of.insert(key.clone(), pos);
        }

        let mut covered = vec![false; wanted.len()];

        for ix in 0..self.slots.len() {
            let nr = &mut self.slots[ix];
            if !nr.used {
                continue;
            }
            let keep = nr
                .key
                .as_ref()
                .and_then(|k| position_of.get(k))
                .copied()
                .filter(|&pos| !covered[pos] && wanted[pos].2 == nr.ty);
            match keep {
                Some(pos) => {
                    covered[pos] = true;
                    let index = wanted[pos].0;
                    if nr.index != index {
                        diff.moved.push(SlotAssignment {
                            slot: nr.id,
                            index,
                            from: Some(nr.index),
                        });
                        nr.index = index;
                    }
                    if let Some(key) = nr.key.clone() {
                        self.by_key.insert(key, ix);
                    }
                }
                None => {
                    nr.used = false;
                    if let Some(key) = &nr.key {
                        if self.by_key.get(key) == Some(&ix) {
                            self.by_key.remove(key);
                        }
                    }
                    self.free.entry(nr.ty.clone()).or_default().push(ix);
                    diff.freed.push(nr.id);
                }
            }
        }

        for (pos, (index, key, ty)) in wanted.iter().enumerate() {
            if covered[pos] {
                continue;
            }
            let recycled = self.free.get_mut(ty).and_then(Vec::pop);
            let ix = match recycled {
                Some(ix) => ix,
                None => {
                    if self.slots.len() >= self.limit {
                        if self.policy == CapacityPolicy::Truncate {
                            // Full, and every free slot holds another type.
                            vdebug!(index, ?ty, "Pool::reconcile: no free slot of this type");
                            if diff.capacity.is_none() {
                                diff.capacity = Some(CapacityExceeded {
                                    requested: wanted.len(),
                                    limit: self.limit,
                                });
                            }
                            continue;
                        }
                        if diff.capacity.is_none() {
                            let exceeded = CapacityExceeded {
                                requested: wanted.len(),
                                limit: self.limit,
                            };
                            vwarn!(
                                requested = exceeded.requested,
                                limit = exceeded.limit,
                                "Pool::reconcile: rendered items limit reached"
                            );
                            diff.capacity = Some(exceeded);
                        }
                    }
                    let ix = self.slots.len();
                    self.slots.push(NodeRecord {
                        id: SlotId(ix as u64),
                        key: None,
                        index: *index,
                        used: false,
                        ty: ty.clone(),
                    });
                    diff.created += 1;
                    ix
                }
            };

            let nr = &mut self.slots[ix];
            let from = recycled.map(|_| nr.index);
            nr.index = *index;
            nr.key = Some(key.clone());
            nr.used = true;
            if position_of.get(key) == Some(&pos) {
                self.by_key.insert(key.clone(), ix);
            }
            diff.assigned.push(SlotAssignment {
                slot: nr.id,
                index: *index,
                from,
            });
        }

        vtrace!(
            freed = diff.freed.len(),
            assigned = diff.assigned.len(),
            moved = diff.moved.len(),
            created = diff.created,
            "Pool::reconcile"
        );
        diff
    }

    /// Frees every used slot. Slot identities are kept for reuse.
    pub fn release_all(&mut self) -> Vec<SlotId> {
        let mut freed = Vec::new();
        for (ix, nr) in self.slots.iter_mut().enumerate() {
            if nr.used {
                nr.used = false;
                self.free.entry(nr.ty.clone()).or_default().push(ix);
                freed.push(nr.id);
            }
        }
        self.by_key.clear();
        freed
    }

    /// Drops every slot.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.by_key.clear();
        self.free.clear();
    }
}
