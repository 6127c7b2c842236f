use recycle_scroller::SlotId;

/// A size report for one observed slot, in screen axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResizeEntry {
    pub slot: SlotId,
    pub width: u32,
    pub height: u32,
}

/// Element-resize observation provided by the host (e.g. a DOM `ResizeObserver`).
///
/// The controller observes every slot it assigns in dynamic mode and stops observing slots that
/// are freed. Size changes come back through `Controller::on_resize_entries`.
pub trait ResizeObserver {
    fn observe(&mut self, slot: SlotId);
    fn unobserve(&mut self, slot: SlotId);
    fn disconnect(&mut self);
}

/// Observer for hosts that report sizes some other way (or fixed-size lists).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ResizeObserver for NoopObserver {
    fn observe(&mut self, _slot: SlotId) {}

    fn unobserve(&mut self, _slot: SlotId) {}

    fn disconnect(&mut self) {}
}

impl<O: ResizeObserver + ?Sized> ResizeObserver for &mut O {
    fn observe(&mut self, slot: SlotId) {
        (**self).observe(slot);
    }

    fn unobserve(&mut self, slot: SlotId) {
        (**self).unobserve(slot);
    }

    fn disconnect(&mut self) {
        (**self).disconnect();
    }
}
