//! Adapter utilities for the `recycle-scroller` crate.
//!
//! The `recycle-scroller` crate is UI-agnostic and focuses on the windowing math, the slot pool
//! and per-item state. This crate provides small, framework-neutral helpers a binding layer
//! needs around it:
//!
//! - Explicit component registration and start-up configuration (`install`)
//! - A resize-observer seam for dynamic-size slots
//! - A `Controller` that runs the post-pass hooks (observation, per-item state sync)
//! - Scroll anchoring (e.g. prepend in chat/timelines without visual jumps)
//!
//! This crate is intentionally framework-agnostic (no DOM/egui/ratatui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod controller;
mod observer;
pub mod plugin;

#[cfg(test)]
mod tests;

pub use anchor::{
    ScrollAnchor, apply_anchor, capture_anchor_at_offset, capture_first_visible_anchor,
};
pub use controller::Controller;
pub use observer::{NoopObserver, ResizeEntry, ResizeObserver};
pub use plugin::{ComponentKind, ComponentRegistry, VERSION, install, register_components};
