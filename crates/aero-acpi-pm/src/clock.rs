//! Guest virtual time source.

use std::cell::Cell;
use std::rc::Rc;

/// Monotonic guest time in nanoseconds.
pub trait Clock {
    fn now_ns(&self) -> u64;
}

/// A clock that never advances. Useful for devices that are only poked through ports.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullClock;

impl Clock for NullClock {
    fn now_ns(&self) -> u64 {
        0
    }
}

/// Deterministic clock advanced explicitly by the caller.
///
/// Clones share the same time, so a test can keep one handle while the device owns another.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now_ns: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ns(&self, now_ns: u64) {
        self.now_ns.set(now_ns);
    }

    pub fn advance_ns(&self, delta_ns: u64) {
        self.now_ns.set(self.now_ns.get().saturating_add(delta_ns));
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> u64 {
        self.now_ns.get()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_ns(&self) -> u64 {
        (**self).now_ns()
    }
}
