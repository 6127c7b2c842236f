use recycle_scroller::{InstallOptions, ScrollerOptions, SlotId};
use recycle_scroller_adapter::{
    ComponentKind, Controller, ResizeEntry, ResizeObserver, install,
};

/// Stands in for the host's element resize observer.
#[derive(Debug, Default)]
struct PrintObserver {
    watching: Vec<SlotId>,
}

impl ResizeObserver for PrintObserver {
    fn observe(&mut self, slot: SlotId) {
        self.watching.push(slot);
    }

    fn unobserve(&mut self, slot: SlotId) {
        self.watching.retain(|&s| s != slot);
    }

    fn disconnect(&mut self) {
        println!("disconnect ({} slots watched)", self.watching.len());
        self.watching.clear();
    }
}

fn main() -> Result<(), recycle_scroller::Error> {
    let mut registry: Vec<(String, ComponentKind)> = Vec::new();
    let config = install(&mut registry, InstallOptions::default().with_items_limit(64));
    println!("registered {} component names", registry.len());

    let rows: Vec<String> = (0..500).map(|i| format!("row {i}")).collect();
    let mut c = Controller::new(
        rows,
        ScrollerOptions::dynamic(24)
            .with_config(&config)
            .with_debounce(16u64),
        PrintObserver::default(),
    );
    c.on_viewport_resize(320, 240)?;
    println!(
        "range={:?} watching={:?}",
        c.scroller().range(),
        c.observer().watching
    );

    // The host reports real sizes for the watched slots.
    let entries: Vec<ResizeEntry> = c
        .observer()
        .watching
        .iter()
        .map(|&slot| ResizeEntry {
            slot,
            width: 320,
            height: 36,
        })
        .collect();
    c.on_resize_entries(entries, 0)?;
    let committed = c.tick(16)?;
    println!(
        "tick: committed={committed} total={} range={:?}",
        c.scroller().total_size(),
        c.scroller().range()
    );

    c.on_scroll(0, 4_000)?;
    println!(
        "scrolled: range={:?} watching={}",
        c.scroller().range(),
        c.observer().watching.len()
    );
    c.destroy();
    Ok(())
}
