// Example: per-item state survives slot recycling.
use recycle_scroller::{IdProp, IdState, IdStateBinding, Rect, RecycleScroller, ScrollerOptions};

#[derive(Debug, Default)]
struct Draft {
    text: String,
}

fn main() -> Result<(), recycle_scroller::Error> {
    let ids: Vec<u64> = (0..1_000).collect();
    let mut s = RecycleScroller::new(
        ids,
        ScrollerOptions::fixed(40)
            .with_key_field(|id: &u64| *id)
            .with_initial_rect(Some(Rect {
                main: 200,
                cross: 0,
            })),
    );
    let mut drafts = IdStateBinding::new(
        IdState::new(IdProp::ItemKey).with_factory(|_: &u64| Draft::default()),
    );
    drafts.sync(&s)?;

    if let Some(draft) = drafts.state_for(&s, 3) {
        draft.borrow_mut().text.push_str("typed into item 3");
    }

    // Scroll far away: the slot that showed item 3 now shows another item.
    s.set_scroll_offset(20_000);
    let report = drafts.sync(&s)?;
    println!("after scroll: {report:?} slots={}", s.pool().len());

    s.set_scroll_offset(0);
    let report = drafts.sync(&s)?;
    let slot = s.slot_for_index(3).map(|nr| nr.id);
    let text = slot
        .and_then(|slot| drafts.state_for_slot(slot))
        .map(|d| d.borrow().text.clone());
    println!("back at top: {report:?} item3={text:?}");
    Ok(())
}
