//! A headless recycling scroller.
//!
//! For binding-layer utilities (component registration, resize observation, anchoring), see the
//! `recycle-scroller-adapter` crate.
//!
//! The crate renders huge lists by keeping a small pool of reusable slots: only the items in the
//! visible range (plus a buffer) are assigned a slot, and slots leaving the range are recycled for
//! items entering it. It provides:
//! - item sizes, fixed (closed-form offsets) or measured (prefix sums over a per-key cache),
//! - offset → index lookup and buffered visible ranges,
//! - a type-segregated, key-preserving slot pool,
//! - debounced measurement commits with scroll stabilization,
//! - per-item state that survives slot recycling ([`id_state`]).
//!
//! It is UI-agnostic. A TUI/GUI/DOM layer is expected to provide:
//! - viewport size
//! - scroll offset
//! - measured item sizes (dynamic mode) and a clock (`now_ms`) for debouncing
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod config;
mod debounce;
mod error;
mod fenwick;
pub mod id_state;
mod key;
mod options;
mod pool;
mod range;
mod scroller;
mod size;
mod state;
mod types;


pub use config::{DEFAULT_ITEMS_LIMIT, InstallOptions, ScrollerConfig};
pub use debounce::Debounce;
pub use error::{CapacityExceeded, Error, Result};
pub use id_state::{
    IdProp, IdState, IdStateBinding, IdStateSlot, IdStateStore, IdStateUpdate, StateRef,
    SyncReport,
};
pub use options::{
    EstimateSizeFn, ItemKeyFn, ItemSize, ItemTypeFn, OnUpdateCallback, RangeUpdate,
    ScrollerOptions, ShouldAdjustScrollCallback,
};
pub use pool::{CapacityPolicy, NodeRecord, Pool, PoolDiff, PoolItem, SlotAssignment, SlotId};
pub use range::RangeCalculator;
pub use scroller::{Phase, RecycleScroller, Trigger};
pub use size::SizeTracker;
pub use state::FrameState;
pub use types::{
    Align, Direction, ItemKey, ItemLayout, Rect, ScrollDirection, TypeKey, VirtualRange,
};

#[doc(hidden)]
pub use key::KeyCacheKey;
