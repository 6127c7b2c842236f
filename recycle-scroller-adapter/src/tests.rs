use crate::*;

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use recycle_scroller::{
    Align, IdProp, IdState, InstallOptions, Rect, RecycleScroller, ScrollerOptions, SlotId,
};

fn viewport(main: u32) -> Option<Rect> {
    Some(Rect { main, cross: 0 })
}

#[derive(Debug, Default)]
struct RecordingObserver {
    observed: Vec<SlotId>,
    events: usize,
    disconnected: bool,
}

impl ResizeObserver for RecordingObserver {
    fn observe(&mut self, slot: SlotId) {
        assert!(!self.observed.contains(&slot), "{slot} observed twice");
        self.observed.push(slot);
        self.events += 1;
    }

    fn unobserve(&mut self, slot: SlotId) {
        let before = self.observed.len();
        self.observed.retain(|&s| s != slot);
        assert_eq!(self.observed.len() + 1, before, "{slot} was not observed");
        self.events += 1;
    }

    fn disconnect(&mut self) {
        self.observed.clear();
        self.disconnected = true;
    }
}

#[test]
fn install_registers_prefixed_components() {
    let mut registry: Vec<(String, ComponentKind)> = Vec::new();
    let config = install(
        &mut registry,
        InstallOptions::default()
            .with_components_prefix("Vs")
            .with_items_limit(200),
    );
    assert_eq!(config.items_limit, 200);
    assert_eq!(registry.len(), 6);

    let names: Vec<&str> = registry.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Vsrecycle-scroller",
            "VsRecycleScroller",
            "Vsdynamic-scroller",
            "VsDynamicScroller",
            "Vsdynamic-scroller-item",
            "VsDynamicScrollerItem",
        ]
    );
    assert_eq!(registry[5].1, ComponentKind::DynamicScrollerItem);
}

#[test]
fn install_can_skip_component_registration() {
    let mut registry: Vec<(String, ComponentKind)> = Vec::new();
    let config = install(
        &mut registry,
        InstallOptions::default().with_install_components(false),
    );
    assert!(registry.is_empty());
    assert!(!config.install_components);
    assert_eq!(config.items_limit, 1000);
    assert_eq!(VERSION, "0.1.0");
}

#[test]
fn anchor_can_preserve_scroll_across_prepend() {
    let ids: Vec<u64> = (1000..1100).collect();
    let mut s = RecycleScroller::new(
        ids,
        ScrollerOptions::fixed(1)
            .with_key_field(|id: &u64| *id)
            .with_initial_rect(viewport(10))
            .with_initial_offset(50),
    );

    let anchor = capture_first_visible_anchor(&s).unwrap();
    assert_eq!(anchor.key, 1050);
    assert_eq!(anchor.offset_in_viewport, 0);

    // Prepend 10 items: old items shift by +10 indexes.
    s.update_items(|ids| {
        let mut next: Vec<u64> = (2000..2010).collect();
        next.append(ids);
        *ids = next;
    });
    assert!(apply_anchor(&mut s, &anchor));
    assert_eq!(s.scroll_offset(), 60);

    let at = capture_anchor_at_offset(&s, 3).unwrap();
    assert_eq!(at.key, 1053);

    s.set_items(Vec::new());
    assert!(!apply_anchor(&mut s, &anchor));
}

#[test]
fn controller_observes_assigned_slots_in_dynamic_mode() {
    let items: Vec<u32> = (0..100).collect();
    let mut c = Controller::new(
        items,
        ScrollerOptions::dynamic(20)
            .with_buffer(0)
            .with_initial_rect(viewport(100)),
        RecordingObserver::default(),
    );
    assert_eq!(c.observer().observed.len(), 5);

    c.on_scroll(0, 200).unwrap();
    assert_eq!(c.scroller().range().start_index, 10);
    // Recycled slots are unobserved, then observed again for their new items.
    assert_eq!(c.observer().observed.len(), 5);
    assert_eq!(c.observer().events, 15);
    for nr in c.scroller().pool().used() {
        assert!(c.is_observed(nr.id));
    }

    let slot = c.scroller().slot_for_index(12).unwrap().id;
    c.on_resize_entries(
        [ResizeEntry {
            slot,
            width: 300,
            height: 45,
        }],
        0,
    )
    .unwrap();
    assert_eq!(c.scroller().item_size(12), Some(45));
    assert_eq!(c.scroller().scroll_offset(), 200);

    c.destroy();
    assert!(c.observer().disconnected);
    assert!(c.observer().observed.is_empty());
    assert!(c.scroller().is_destroyed());
    c.on_scroll(0, 400).unwrap();
    assert!(c.observer().observed.is_empty());
}

#[test]
fn controller_observes_every_slot_after_a_batch_of_resize_entries() {
    let items: Vec<u32> = (0..100).collect();
    let mut c = Controller::new(
        items,
        ScrollerOptions::dynamic(20)
            .with_buffer(0)
            .with_initial_rect(viewport(100)),
        RecordingObserver::default(),
    );
    let first = c.scroller().slot_for_index(0).unwrap().id;
    let second = c.scroller().slot_for_index(1).unwrap().id;
    let before = c.scroller().recompute_count();

    // Each entry commits right away (no debounce), so this runs one pass per entry.
    c.on_resize_entries(
        [first, second].map(|slot| ResizeEntry {
            slot,
            width: 0,
            height: 1,
        }),
        0,
    )
    .unwrap();
    assert_eq!(c.scroller().recompute_count(), before + 2);
    assert_eq!(c.scroller().range(), recycle_scroller::VirtualRange::new(0, 7));

    let mut used: Vec<SlotId> = c.scroller().pool().used().map(|nr| nr.id).collect();
    let mut observed = c.observer().observed.clone();
    used.sort();
    observed.sort();
    assert_eq!(observed, used);
    for &slot in &used {
        assert!(c.is_observed(slot));
    }
}

#[test]
fn controller_skips_observation_for_fixed_sizes() {
    let items: Vec<u32> = (0..100).collect();
    let mut c = Controller::new(
        items,
        ScrollerOptions::fixed(20).with_initial_rect(viewport(100)),
        RecordingObserver::default(),
    );
    c.on_scroll(0, 500).unwrap();
    assert!(c.observer().observed.is_empty());
    assert_eq!(c.observer().events, 0);
}

#[test]
fn controller_debounces_resize_entries_until_tick() {
    let items: Vec<u32> = (0..100).collect();
    let mut c = Controller::new(
        items,
        ScrollerOptions::dynamic(20)
            .with_debounce(30u64)
            .with_initial_rect(viewport(100)),
        NoopObserver,
    );
    let slot = c.scroller().slot_for_index(1).unwrap().id;
    c.on_resize_entries(
        [ResizeEntry {
            slot,
            width: 0,
            height: 60,
        }],
        100,
    )
    .unwrap();
    assert_eq!(c.scroller().item_size(1), Some(20));
    assert!(!c.tick(120).unwrap());
    assert!(c.tick(130).unwrap());
    assert_eq!(c.scroller().item_size(1), Some(60));
}

#[test]
fn horizontal_controller_measures_width() {
    let items: Vec<u32> = (0..100).collect();
    let mut c = Controller::new(
        items,
        ScrollerOptions::dynamic(20).with_direction(recycle_scroller::Direction::Horizontal),
        NoopObserver,
    );
    c.on_viewport_resize(100, 30).unwrap();
    assert_eq!(c.scroller().viewport_size(), 100);

    let slot = c.scroller().slot_for_index(0).unwrap().id;
    c.on_resize_entries(
        [ResizeEntry {
            slot,
            width: 70,
            height: 30,
        }],
        0,
    )
    .unwrap();
    assert_eq!(c.scroller().item_size(0), Some(70));
}

#[derive(Debug)]
struct Expanded {
    label: String,
    open: bool,
}

fn expanded_state() -> IdState<u64, u64, Expanded> {
    IdState::new(IdProp::ItemKey).with_factory(|id: &u64| Expanded {
        label: id.to_string(),
        open: false,
    })
}

#[test]
fn controller_syncs_id_state_and_prunes_removed_items() {
    let ids: Vec<u64> = (0..50).collect();
    let mut c = Controller::new(
        ids,
        ScrollerOptions::fixed(10)
            .with_key_field(|id: &u64| *id)
            .with_buffer(0)
            .with_initial_rect(viewport(50)),
        NoopObserver,
    )
    .with_id_state(expanded_state())
    .unwrap();

    let state = c.state_for(2).unwrap();
    assert_eq!(state.borrow().label, "2");
    state.borrow_mut().open = true;

    c.scroll_to_item(30, Align::Start).unwrap();
    c.scroll_to_item(0, Align::Start).unwrap();
    let slot = c.scroller().slot_for_index(2).unwrap().id;
    assert!(c.state_for_slot(slot).unwrap().borrow().open);

    c.set_items((2..50).collect()).unwrap();
    let store = c.id_state().unwrap().mixin().store();
    assert!(!store.contains(&0));
    assert!(store.contains(&2));
    assert!(c.state_for(0).unwrap().borrow().open);
}

#[test]
fn replace_items_anchored_keeps_first_visible_item() {
    let ids: Vec<u64> = (100..200).collect();
    let mut c = Controller::new(
        ids,
        ScrollerOptions::fixed(10)
            .with_key_field(|id: &u64| *id)
            .with_initial_rect(viewport(50))
            .with_initial_offset(205),
        NoopObserver,
    );
    assert_eq!(c.scroller().visible_range().start_index, 20);

    let mut next: Vec<u64> = (0..5).collect();
    next.extend(100..200);
    assert!(c.replace_items_anchored(next).unwrap());
    assert_eq!(c.scroller().scroll_offset(), 255);
    assert_eq!(c.scroller().visible_range().start_index, 25);
    assert_eq!(c.scroller().item(25), Some(&120));

    let count = c.scroller().recompute_count();
    c.update(|s| s.set_scroll_offset(255)).unwrap();
    assert_eq!(c.scroller().recompute_count(), count);
}
