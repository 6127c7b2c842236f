use core::fmt;

use recycle_scroller::{KeyCacheKey, RecycleScroller};

/// A scroll anchor that can be used to preserve visual position across data changes.
///
/// Typical use cases:
/// - chat/timeline "prepend" (load older messages above) without content jumping
/// - any reorder/replace where you want the viewport to stay anchored to an item identity
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollAnchor<K> {
    pub key: K,
    /// The distance from the anchor item's start to the scroll offset.
    pub offset_in_viewport: u64,
}

impl<K: fmt::Debug> fmt::Debug for ScrollAnchor<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollAnchor")
            .field("key", &self.key)
            .field("offset_in_viewport", &self.offset_in_viewport)
            .finish()
    }
}

/// Captures an anchor for the first visible item (by key).
///
/// Returns `None` if the visible range is empty.
pub fn capture_first_visible_anchor<T, K: KeyCacheKey + Clone>(
    s: &RecycleScroller<T, K>,
) -> Option<ScrollAnchor<K>> {
    let visible = s.visible_range();
    if visible.is_empty() {
        return None;
    }
    anchor_for_index(s, visible.start_index)
}

/// Captures an anchor for the item at `offset_in_viewport` below the scroll offset.
///
/// For example, `offset_in_viewport = 0` anchors the item at the top of the viewport.
pub fn capture_anchor_at_offset<T, K: KeyCacheKey + Clone>(
    s: &RecycleScroller<T, K>,
    offset_in_viewport: u64,
) -> Option<ScrollAnchor<K>> {
    let abs = s.scroll_offset().saturating_add(offset_in_viewport);
    let index = s.index_at_offset(abs)?;
    anchor_for_index(s, index)
}

fn anchor_for_index<T, K: KeyCacheKey + Clone>(
    s: &RecycleScroller<T, K>,
    index: usize,
) -> Option<ScrollAnchor<K>> {
    let start = s.item_start(index)?;
    let key = s.key_for(index)?;
    Some(ScrollAnchor {
        key,
        offset_in_viewport: s.scroll_offset().saturating_sub(start),
    })
}

/// Applies a previously captured anchor by adjusting the scroll offset.
///
/// The anchor key is looked up in the scroller's current items. Returns `true` when the anchor
/// was applied.
pub fn apply_anchor<T, K: KeyCacheKey + Clone>(
    s: &mut RecycleScroller<T, K>,
    anchor: &ScrollAnchor<K>,
) -> bool {
    let Some(index) = s.index_of_key(&anchor.key) else {
        vdebug!("apply_anchor: anchor key is gone");
        return false;
    };
    let Some(start) = s.item_start(index) else {
        return false;
    };
    let target = start.saturating_add(anchor.offset_in_viewport);
    s.set_scroll_offset_clamped(target);
    true
}
