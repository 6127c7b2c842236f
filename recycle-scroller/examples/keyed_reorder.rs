// Example: slots and measurements follow keys after reorder.
use recycle_scroller::{Rect, RecycleScroller, ScrollerOptions};

#[derive(Debug)]
struct Message {
    id: u64,
    text: &'static str,
}

fn main() {
    let messages = vec![
        Message { id: 7, text: "hello" },
        Message { id: 8, text: "a much longer message" },
        Message { id: 9, text: "bye" },
    ];
    let mut s = RecycleScroller::new(
        messages,
        ScrollerOptions::dynamic(20)
            .with_key_field(|m: &Message| m.id)
            .with_initial_rect(Some(Rect {
                main: 100,
                cross: 0,
            })),
    );
    s.resize_item(1, 60);
    let slot = s.pool().slot_for_key(&8).map(|nr| nr.id);
    println!("before reorder: size1={:?} slot={slot:?}", s.item_size(1));

    s.update_items(|messages| messages.reverse());

    let after = s.pool().slot_for_key(&8).map(|nr| (nr.id, nr.index));
    println!(
        "after reorder: size1={:?} size2={:?} slot={after:?} moved={}",
        s.item_size(1),
        s.item_size(2),
        s.last_diff().moved.len()
    );
    s.for_each_pool_item(|it| println!("  {} @{} {:?}", it.nr.id, it.position, it.item.text));
}
