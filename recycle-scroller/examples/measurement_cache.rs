// Example: export and import measurement cache.
use recycle_scroller::{RecycleScroller, ScrollerOptions};

fn main() {
    // Example: export and import measurement cache (key -> measured size).
    //
    // This is useful if you want to persist measurements across screens/sessions so that the
    // scroller can start with better estimates and avoid re-measuring everything.
    let mut s1 = RecycleScroller::new((0..10u32).collect(), ScrollerOptions::dynamic(1));
    s1.resize_item(2, 10);
    s1.resize_item(5, 42);

    let snapshot = s1.export_measurement_cache();
    println!("exported_cache_len={}", snapshot.len());

    let mut s2 = RecycleScroller::new((0..10u32).collect(), ScrollerOptions::dynamic(1));
    println!(
        "before import: size2={:?} size5={:?}",
        s2.item_size(2),
        s2.item_size(5)
    );

    s2.import_measurement_cache(snapshot);
    println!(
        "after import: cache_len={} size2={:?} size5={:?}",
        s2.measurement_cache_len(),
        s2.item_size(2),
        s2.item_size(5)
    );
}
