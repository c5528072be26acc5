//! Recording pin doubles for testing the driver off-hardware.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::digital::v2::{OutputPin, StatefulOutputPin};

/// The logical line a [MockPin] stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wire {
    /// Latch line (RCLK)
    Latch,
    /// Clock line (SRCLK)
    Clock,
    /// Data line (SER)
    Data,
    /// Output enable line
    OutputEnable,
    /// Master reset line
    MasterReset,
}

/// A single recorded write: the wire it went to and the level driven.
pub type Write = (Wire, bool);

/// Shared log of every level driven through any [MockPin], in call
/// order. Clones share the same log.
#[derive(Clone, Default)]
pub struct Trace(Rc<RefCell<Vec<Write>>>);

impl Trace {
    /// Creates an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes recorded so far.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Snapshot of every recorded write.
    pub fn writes(&self) -> Vec<Write> {
        self.0.borrow().clone()
    }

    /// The levels driven onto one wire, in order.
    pub fn writes_to(&self, wire: Wire) -> Vec<bool> {
        self.0
            .borrow()
            .iter()
            .filter(|&&(recorded, _)| recorded == wire)
            .map(|&(_, level)| level)
            .collect()
    }

    fn record(&self, wire: Wire, level: bool) {
        self.0.borrow_mut().push((wire, level));
    }
}

/// An output pin that appends every write to a shared [Trace].
///
/// Starts high, like a line pulled up before the driver takes over.
pub struct MockPin {
    wire: Wire,
    state: bool,
    trace: Trace,
}

impl MockPin {
    /// Creates a pin standing in for `wire`, recording into `trace`.
    pub fn new(wire: Wire, trace: &Trace) -> Self {
        MockPin {
            wire,
            state: true,
            trace: trace.clone(),
        }
    }
}

type MockError = &'static str;

impl OutputPin for MockPin {
    type Error = MockError;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.state = false;
        self.trace.record(self.wire, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.state = true;
        self.trace.record(self.wire, true);
        Ok(())
    }
}

impl StatefulOutputPin for MockPin {
    fn is_set_high(&self) -> Result<bool, Self::Error> {
        Ok(self.state)
    }

    fn is_set_low(&self) -> Result<bool, Self::Error> {
        Ok(!self.state)
    }
}
