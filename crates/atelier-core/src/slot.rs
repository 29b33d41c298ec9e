//! Pending-snapshot slot.

use atelier_client::Sketch;
use parking_lot::Mutex;

/// Single-writer/single-reader cell holding the most recent sketch awaiting
/// send.
///
/// The change detector overwrites the slot on every drawing change; the
/// polling driver takes-and-clears it only when the gate admits. Overwritten
/// snapshots are simply dropped.
#[derive(Debug, Default)]
pub struct PendingSlot {
    pending: Mutex<Option<Sketch>>,
}

impl PendingSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending sketch with a newer snapshot.
    pub fn offer(&self, sketch: Sketch) {
        *self.pending.lock() = Some(sketch);
    }

    /// Take and clear the pending sketch.
    pub fn take(&self) -> Option<Sketch> {
        self.pending.lock().take()
    }

    /// Whether no sketch is waiting.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_none()
    }

    /// Drop any pending sketch.
    pub fn clear(&self) {
        *self.pending.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::PendingSlot;
    use atelier_client::Sketch;
    use pretty_assertions::assert_eq;

    #[test]
    fn offer_overwrites_previous_snapshot() {
        let slot = PendingSlot::new();
        slot.offer(Sketch::new(vec![1], 10, 10));
        slot.offer(Sketch::new(vec![2], 10, 10));

        let taken = slot.take().expect("pending");
        assert_eq!(taken.png, vec![2]);
    }

    #[test]
    fn take_empties_the_slot() {
        let slot = PendingSlot::new();
        slot.offer(Sketch::new(vec![1], 10, 10));

        assert!(slot.take().is_some());
        assert!(slot.is_empty());
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn clear_drops_pending_sketch() {
        let slot = PendingSlot::new();
        slot.offer(Sketch::new(vec![1], 10, 10));
        slot.clear();
        assert!(slot.is_empty());
    }
}
