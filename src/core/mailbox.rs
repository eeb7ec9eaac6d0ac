// Single-slot mailbox for values produced off the frame cadence.
//
// The perception pipeline publishes gesture samples at its own rate; the
// frame loop reads whatever is current at tick time. The slot holds only
// the most recent write (latest-value-wins): stale samples are silently
// overwritten, never queued, so no backlog can accumulate and the
// producer is never blocked. In the single-threaded wasm environment
// interior mutability is sufficient; a multi-threaded port would replace
// the cell with an atomic swap to keep the same contract.

use std::cell::RefCell;

#[derive(Debug, Default)]
pub struct Latest<T: Clone> {
    slot: RefCell<T>,
}

impl<T: Clone> Latest<T> {
    pub fn new(initial: T) -> Self {
        Self {
            slot: RefCell::new(initial),
        }
    }

    /// Replace the slot's value. Any unread previous value is discarded.
    pub fn publish(&self, value: T) {
        *self.slot.borrow_mut() = value;
    }

    /// Snapshot the most recent value. Reading does not consume it; the
    /// same value is returned again until the next `publish`.
    pub fn get(&self) -> T {
        self.slot.borrow().clone()
    }
}
