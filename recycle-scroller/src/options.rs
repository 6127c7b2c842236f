use alloc::sync::Arc;

use crate::{
    CapacityPolicy, Debounce, Direction, ItemKey, ItemLayout, Rect, ScrollerConfig, TypeKey,
    VirtualRange,
};

/// Maps an item (and its index) to its stable key.
pub type ItemKeyFn<T, K> = Arc<dyn Fn(&T, usize) -> K + Send + Sync>;

/// Maps an item to its slot type. Items of different types never share a slot.
pub type ItemTypeFn<T> = Arc<dyn Fn(&T, usize) -> TypeKey + Send + Sync>;

/// Size estimate for an item that has not been measured yet.
pub type EstimateSizeFn<T> = Arc<dyn Fn(&T, usize) -> u32 + Send + Sync>;

/// Fired after a recomputation changed the rendered range.
pub type OnUpdateCallback = Arc<dyn Fn(RangeUpdate) + Send + Sync>;

/// Decides whether a size change of `item` (by `delta`) should shift the scroll offset.
///
/// The third argument is the current scroll offset. Without a callback, the offset is shifted
/// when the item starts before it, so content in the viewport does not jump.
pub type ShouldAdjustScrollCallback = Arc<dyn Fn(ItemLayout, i64, u64) -> bool + Send + Sync>;

/// Payload of [`OnUpdateCallback`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeUpdate {
    /// Rendered range (visible + buffer).
    pub range: VirtualRange,
    pub visible: VirtualRange,
}

/// How item sizes are known.
pub enum ItemSize<T> {
    /// Every item has this size.
    Fixed(u32),
    /// Sizes are measured after layout; `estimate` is used until then.
    Dynamic { estimate: EstimateSizeFn<T> },
}

impl<T> ItemSize<T> {
    /// Dynamic sizing with the same estimate for every item.
    pub fn estimated(estimate: u32) -> Self
    where
        T: 'static,
    {
        Self::Dynamic {
            estimate: Arc::new(move |_: &T, _: usize| estimate),
        }
    }

    pub fn dynamic(estimate: impl Fn(&T, usize) -> u32 + Send + Sync + 'static) -> Self {
        Self::Dynamic {
            estimate: Arc::new(estimate),
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }

    pub(crate) fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Fixed(a), Self::Fixed(b)) => a == b,
            (Self::Dynamic { estimate: a }, Self::Dynamic { estimate: b }) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T> Clone for ItemSize<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(size) => Self::Fixed(*size),
            Self::Dynamic { estimate } => Self::Dynamic {
                estimate: Arc::clone(estimate),
            },
        }
    }
}

impl<T> core::fmt::Debug for ItemSize<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Fixed(size) => f.debug_tuple("Fixed").field(size).finish(),
            Self::Dynamic { .. } => f.write_str("Dynamic(..)"),
        }
    }
}

/// Configuration for [`crate::RecycleScroller`].
///
/// Cheap to clone: closures are stored in `Arc`s, so adapters can tweak a few fields and call
/// `RecycleScroller::set_options` without reallocating them.
pub struct ScrollerOptions<T, K = ItemKey> {
    pub item_size: ItemSize<T>,
    /// The key field. Defaults to the item index.
    pub get_item_key: ItemKeyFn<T, K>,
    /// Slot type of each item. `None` puts every item in [`TypeKey::NoType`].
    pub get_item_type: Option<ItemTypeFn<T>>,
    pub direction: Direction,
    /// Delay applied to measurement bursts before the range is recomputed.
    pub debounce: Debounce,
    /// Items rendered beyond each edge of the viewport.
    pub buffer: usize,
    /// Space before the first item (e.g. a header rendered by the adapter).
    pub padding_start: u32,
    /// Space after the last item.
    pub padding_end: u32,
    /// Maximum number of slots in the pool.
    pub items_limit: usize,
    pub capacity_policy: CapacityPolicy,
    pub initial_rect: Option<Rect>,
    pub initial_offset: u64,
    pub on_update: Option<OnUpdateCallback>,
    pub should_adjust_scroll_on_item_size_change: Option<ShouldAdjustScrollCallback>,
}

impl<T, K> Clone for ScrollerOptions<T, K> {
    fn clone(&self) -> Self {
        Self {
            item_size: self.item_size.clone(),
            get_item_key: Arc::clone(&self.get_item_key),
            get_item_type: self.get_item_type.clone(),
            direction: self.direction,
            debounce: self.debounce,
            buffer: self.buffer,
            padding_start: self.padding_start,
            padding_end: self.padding_end,
            items_limit: self.items_limit,
            capacity_policy: self.capacity_policy,
            initial_rect: self.initial_rect,
            initial_offset: self.initial_offset,
            on_update: self.on_update.clone(),
            should_adjust_scroll_on_item_size_change: self
                .should_adjust_scroll_on_item_size_change
                .clone(),
        }
    }
}

impl<T: 'static> ScrollerOptions<T, ItemKey> {
    /// Creates options for a list keyed by index (`ItemKey = u64`).
    pub fn new(item_size: ItemSize<T>) -> Self {
        Self::new_with_key(item_size, |_, i| i as u64)
    }

    /// Fixed-size items keyed by index.
    pub fn fixed(item_size: u32) -> Self {
        Self::new(ItemSize::Fixed(item_size))
    }

    /// Measured items keyed by index, estimated at `estimate` until measured.
    pub fn dynamic(estimate: u32) -> Self {
        Self::new(ItemSize::estimated(estimate))
    }
}

impl<T, K> ScrollerOptions<T, K> {
    /// Creates options with a custom key mapping.
    ///
    /// Keys should be stable item identities: measured sizes, retained slots and per-item state
    /// follow them across reorders and data replacement.
    pub fn new_with_key(
        item_size: ItemSize<T>,
        get_item_key: impl Fn(&T, usize) -> K + Send + Sync + 'static,
    ) -> Self {
        let config = ScrollerConfig::default();
        Self {
            item_size,
            get_item_key: Arc::new(get_item_key),
            get_item_type: None,
            direction: Direction::default(),
            debounce: Debounce::NONE,
            buffer: 1,
            padding_start: 0,
            padding_end: 0,
            items_limit: config.items_limit,
            capacity_policy: CapacityPolicy::default(),
            initial_rect: None,
            initial_offset: 0,
            on_update: None,
            should_adjust_scroll_on_item_size_change: None,
        }
    }

    /// Keys items by a field of the item (e.g. `|item| item.id`).
    pub fn with_key_field<K2>(
        self,
        key_field: impl Fn(&T) -> K2 + Send + Sync + 'static,
    ) -> ScrollerOptions<T, K2>
    where
        T: 'static,
    {
        ScrollerOptions {
            item_size: self.item_size,
            get_item_key: Arc::new(move |item: &T, _: usize| key_field(item)),
            get_item_type: self.get_item_type,
            direction: self.direction,
            debounce: self.debounce,
            buffer: self.buffer,
            padding_start: self.padding_start,
            padding_end: self.padding_end,
            items_limit: self.items_limit,
            capacity_policy: self.capacity_policy,
            initial_rect: self.initial_rect,
            initial_offset: self.initial_offset,
            on_update: self.on_update,
            should_adjust_scroll_on_item_size_change: self
                .should_adjust_scroll_on_item_size_change,
        }
    }

    pub fn with_item_size(mut self, item_size: ItemSize<T>) -> Self {
        self.item_size = item_size;
        self
    }

    pub fn with_item_type(
        mut self,
        get_item_type: impl Fn(&T, usize) -> TypeKey + Send + Sync + 'static,
    ) -> Self {
        self.get_item_type = Some(Arc::new(get_item_type));
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_debounce(mut self, debounce: impl Into<Debounce>) -> Self {
        self.debounce = debounce.into();
        self
    }

    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_padding(mut self, padding_start: u32, padding_end: u32) -> Self {
        self.padding_start = padding_start;
        self.padding_end = padding_end;
        self
    }

    pub fn with_items_limit(mut self, items_limit: usize) -> Self {
        self.items_limit = items_limit;
        self
    }

    pub fn with_capacity_policy(mut self, policy: CapacityPolicy) -> Self {
        self.capacity_policy = policy;
        self
    }

    /// Applies the application-wide configuration (currently the pool limit).
    pub fn with_config(mut self, config: &ScrollerConfig) -> Self {
        self.items_limit = config.items_limit;
        self
    }

    pub fn with_initial_rect(mut self, initial_rect: Option<Rect>) -> Self {
        self.initial_rect = initial_rect;
        self
    }

    pub fn with_initial_offset(mut self, initial_offset: u64) -> Self {
        self.initial_offset = initial_offset;
        self
    }

    pub fn with_on_update(
        mut self,
        on_update: Option<impl Fn(RangeUpdate) + Send + Sync + 'static>,
    ) -> Self {
        self.on_update = on_update.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_should_adjust_scroll_on_item_size_change(
        mut self,
        f: Option<impl Fn(ItemLayout, i64, u64) -> bool + Send + Sync + 'static>,
    ) -> Self {
        self.should_adjust_scroll_on_item_size_change = f.map(|f| Arc::new(f) as _);
        self
    }
}

impl<T, K> core::fmt::Debug for ScrollerOptions<T, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollerOptions")
            .field("item_size", &self.item_size)
            .field("direction", &self.direction)
            .field("debounce", &self.debounce)
            .field("buffer", &self.buffer)
            .field("padding_start", &self.padding_start)
            .field("padding_end", &self.padding_end)
            .field("items_limit", &self.items_limit)
            .field("capacity_policy", &self.capacity_policy)
            .field("initial_rect", &self.initial_rect)
            .field("initial_offset", &self.initial_offset)
            .finish_non_exhaustive()
    }
}
