use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Single-slot in-flight flag
///
/// A second caller while the slot is taken gets `None` from `try_acquire`;
/// it is dropped, not queued. `acquire` instead waits for the holder to
/// release.
#[derive(Debug, Default)]
pub struct InFlight {
    busy: AtomicBool,
    released: Notify,
}

impl InFlight {
    pub fn try_acquire(&self) -> Option<InFlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { slot: self })
    }

    /// Waits until the slot is free, then takes it
    pub async fn acquire(&self) -> InFlightGuard<'_> {
        loop {
            if let Some(guard) = self.try_acquire() {
                return guard;
            }
            // notify_one keeps a permit, so a release between the check
            // above and this await is not lost
            self.released.notified().await;
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the slot on drop, including on early return or panic
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    slot: &'a InFlight,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.slot.busy.store(false, Ordering::Release);
        self.slot.released.notify_one();
    }
}
