// Example: minimal usage and scroll-to helper.
use recycle_scroller::{Align, Rect, RecycleScroller, ScrollerOptions};

fn main() {
    let items: Vec<u32> = (0..1_000_000).collect();
    let mut s = RecycleScroller::new(
        items,
        ScrollerOptions::fixed(50)
            .with_buffer(2)
            .with_initial_rect(Some(Rect {
                main: 500,
                cross: 320,
            })),
    );
    s.set_scroll_offset(1025);

    let mut items = Vec::new();
    s.collect_pool_items(&mut items);
    println!("total_size={}", s.total_size());
    println!("visible_range={:?}", s.visible_range());
    println!("rendered_range={:?}", s.range());
    println!("slots={} first={:?}", s.pool().len(), items.first());

    let off = s.scroll_to_item(999_999, Align::End);
    println!(
        "after scroll_to_item: offset={off} range={:?} slots={}",
        s.range(),
        s.pool().len()
    );
}
