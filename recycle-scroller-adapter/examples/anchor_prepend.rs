use recycle_scroller::{Rect, ScrollerOptions};
use recycle_scroller_adapter::{Controller, NoopObserver};

fn main() -> Result<(), recycle_scroller::Error> {
    // Example: preserve visual scroll position across "prepend" (chat/timeline load older messages).
    //
    // `replace_items_anchored` runs the usual adapter flow in one call:
    // 1) capture an anchor (key + offset_in_viewport) before data changes
    // 2) apply the data change
    // 3) apply the anchor so the same item stays in the same place
    let ids: Vec<u64> = (1000..1100).collect();
    let mut c = Controller::new(
        ids,
        ScrollerOptions::fixed(1)
            .with_key_field(|id: &u64| *id)
            .with_initial_rect(Some(Rect { main: 10, cross: 0 }))
            .with_initial_offset(50),
        NoopObserver,
    );
    println!(
        "before prepend: off={} first_visible={:?}",
        c.scroller().scroll_offset(),
        c.scroller().item(c.scroller().visible_range().start_index)
    );

    // Prepend 10 items; old items shift by +10 indexes.
    let mut next: Vec<u64> = (2000..2010).collect();
    next.extend(1000..1100);
    let ok = c.replace_items_anchored(next)?;

    println!(
        "after prepend: ok={ok} off={} first_visible={:?}",
        c.scroller().scroll_offset(),
        c.scroller().item(c.scroller().visible_range().start_index)
    );
    Ok(())
}
