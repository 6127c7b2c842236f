// Example: debounced measurement and scroll jump prevention.
use recycle_scroller::{Align, Rect, RecycleScroller, ScrollerOptions};

fn main() {
    let items: Vec<u32> = (0..100).collect();
    let mut s = RecycleScroller::new(
        items,
        ScrollerOptions::dynamic(10)
            .with_debounce(16u64)
            .with_initial_rect(Some(Rect {
                main: 30,
                cross: 0,
            }))
            .with_initial_offset(200),
    );

    println!(
        "before: off={} total={} range={:?}",
        s.scroll_offset(),
        s.total_size(),
        s.range()
    );

    // If an item before the viewport changes size, the scroll offset moves with it so the
    // viewport content does not jump.
    let applied = s.resize_item(0, 30);
    println!(
        "resize_item(0): applied_delta={applied} off={} total={}",
        s.scroll_offset(),
        s.total_size()
    );

    // Measurements reported by the binding layer are committed once the burst settles.
    s.measure(21, 40, 0);
    s.measure(21, 45, 8);
    println!(
        "pending={} deadline={:?}",
        s.pending_measurements(),
        s.next_measurement_deadline()
    );
    let recomputed = s.tick(24);
    println!(
        "tick(24): recomputed={recomputed} size21={:?} total={}",
        s.item_size(21),
        s.total_size()
    );

    let to = s.scroll_to_item(10, Align::Start);
    println!("scroll_to_item(10): off={to} range={:?}", s.range());
}
