use crate::Rect;

/// A lightweight snapshot of viewport geometry and scroll position.
///
/// Useful to restore a scroller across frames or sessions. With `feature = "serde"`, this type
/// implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameState {
    pub viewport: Rect,
    pub scroll_offset: u64,
}
