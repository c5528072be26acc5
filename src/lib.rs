#![deny(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(not(test), no_std)]

//! SN74HC595N DRIVER
//!
//! Drives the SN74HC595N serial-in/parallel-out shift register over
//! three to five GPIO lines: latch, clock and data, plus the chip's
//! optional output-enable and master-reset control lines. Daisy
//! chained chips are supported by sizing the driver with the number
//! of chips sharing the control lines.
//!
//! Built using [`embedded-hal`] traits
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal/0.2

use embedded_hal::digital::v2::{OutputPin, StatefulOutputPin};

#[cfg(test)]
pub mod mock;

/// Number of parallel outputs exposed by a single chip.
pub const PINS_PER_CHIP: usize = 8;

/// The optional control lines a driver may be asked to manage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum PinRole {
    /// The active-low output enable line, package pin 13.
    OutputEnable,
    /// The active-low master reset line, package pin 10.
    MasterReset,
}

/// Errors reported by [Sn74hc595] operations.
///
/// Both variants are caller errors (wrong slice length, or a feature
/// requested without its control line); neither indicates a hardware
/// fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub enum Error {
    /// The bit slice handed to [Sn74hc595::shift] does not cover the
    /// configured chain exactly.
    InvalidLength {
        /// Number of bits the chain expects, `CHIPS * PINS_PER_CHIP`.
        expected: usize,
        /// Number of bits actually supplied.
        actual: usize,
    },
    /// The operation needs a control line that was not handed to the
    /// driver at construction.
    UnmanagedPin(PinRole),
}

/// A driver for a chain of `CHIPS` daisy-chained SN74HC595N shift
/// registers sharing one set of control lines.
///
/// `CHIPS` must be at least 1; each chip adds [PINS_PER_CHIP] outputs
/// to the chain. All pins must already be configured as outputs
/// before they are handed over, and the driver assumes exclusive use
/// of them for the duration of every call.
///
/// There is no internal locking. Every operation takes `&mut self`
/// and runs a fixed sequence of blocking pin writes, so a driver
/// shared between contexts has to be serialized externally.
///
/// Dropping the driver leaves every line at whatever level the last
/// operation set.
#[cfg_attr(feature = "logging", derive(defmt::Format))]
pub struct Sn74hc595<const CHIPS: usize, TPin> {
    /// Copies the shift chain to the visible outputs when raised
    latch: TPin,

    /// Advances the chain one stage on every rising edge
    clock: TPin,

    /// Carries the bit sampled on the next clock rising edge
    data: TPin,

    /// Optional output enable line, active low
    output_enable: Option<TPin>,

    /// Optional master reset line, active low
    master_reset: Option<TPin>,
}

impl<const CHIPS: usize, TPin> Sn74hc595<CHIPS, TPin>
where
    TPin: OutputPin + StatefulOutputPin,
{
    /// Creates a driver that manages only the three mandatory lines.
    ///
    /// Output enable and master reset are assumed to be tied off
    /// externally (OE to ground to keep the outputs on, MR to Vcc to
    /// keep the chain from clearing); the operations that need them
    /// return [Error::UnmanagedPin].
    pub fn new(latch: TPin, clock: TPin, data: TPin) -> Self {
        Self::new_with_options(latch, clock, data, None, None)
    }

    /// Creates a driver from the full set of control lines.
    ///
    /// No line is driven here; construction only stores the pins, and
    /// no assumption is made about the levels they currently sit at.
    pub fn new_with_options(
        latch: TPin,
        clock: TPin,
        data: TPin,
        output_enable: Option<TPin>,
        master_reset: Option<TPin>,
    ) -> Self {
        Self {
            latch,
            clock,
            data,
            output_enable,
            master_reset,
        }
    }

    /// Turns the chip outputs on by pulling OE low.
    ///
    /// The line is only written when it does not already sit low, so
    /// repeated calls write it at most once.
    pub fn enable_output(&mut self) -> Result<(), Error> {
        let oe = self
            .output_enable
            .as_mut()
            .ok_or(Error::UnmanagedPin(PinRole::OutputEnable))?;

        if !oe.is_set_low().ok().unwrap_or(false) {
            oe.set_low().ok();
        }
        Ok(())
    }

    /// Turns the chip outputs off by pulling OE high.
    ///
    /// The latched register contents survive; only the output stage
    /// is gated. Like [Sn74hc595::enable_output], this writes the
    /// line at most once.
    pub fn disable_output(&mut self) -> Result<(), Error> {
        let oe = self
            .output_enable
            .as_mut()
            .ok_or(Error::UnmanagedPin(PinRole::OutputEnable))?;

        if !oe.is_set_high().ok().unwrap_or(false) {
            oe.set_high().ok();
        }
        Ok(())
    }

    /// Returns whether the chip outputs are currently on, i.e.
    /// whether the OE line sits low. Drives nothing.
    pub fn is_output_enabled(&self) -> Result<bool, Error> {
        let oe = self
            .output_enable
            .as_ref()
            .ok_or(Error::UnmanagedPin(PinRole::OutputEnable))?;

        Ok(oe.is_set_low().ok().unwrap_or(false))
    }

    /// Shifts a new pattern into the chain and latches it onto the
    /// output pins.
    ///
    /// `bits[0]` ends up on the first output of the first chip,
    /// `bits[1]` on the second, and so on through the chain. The
    /// slice length must be exactly `CHIPS` * [PINS_PER_CHIP] or the
    /// call fails with [Error::InvalidLength] before any line is
    /// driven.
    ///
    /// With `reset` the chain is cleared through master reset before
    /// the new bits go in, failing with [Error::UnmanagedPin] when
    /// that line is unmanaged. The chip clears arriving bits for as
    /// long as MR is held low, so the pulse is two back-to-back
    /// writes and the line is then left high for the rest of the
    /// shift.
    pub fn shift(&mut self, bits: &[bool], reset: bool) -> Result<(), Error> {
        let expected = CHIPS * PINS_PER_CHIP;
        if bits.len() != expected {
            return Err(Error::InvalidLength {
                expected,
                actual: bits.len(),
            });
        }

        if reset {
            let mr = self
                .master_reset
                .as_mut()
                .ok_or(Error::UnmanagedPin(PinRole::MasterReset))?;
            mr.set_low().ok();
            mr.set_high().ok();
        }

        // rest state before shifting
        self.clock.set_low().ok();
        self.data.set_low().ok();

        // detach the visible outputs while the new bits shift in
        self.latch.set_low().ok();

        // Last index first: every clock edge pushes the earlier bits
        // one stage further down the chain, which leaves bits[0] on
        // the first output once the whole slice has gone through.
        for &bit in bits.iter().rev() {
            self.clock.set_low().ok();

            if bit {
                self.data.set_high().ok();
            } else {
                self.data.set_low().ok();
            }

            #[cfg(feature = "logging")]
            defmt::trace!("writing bit: {}", bit);

            // the chip samples data on this rising edge
            self.clock.set_high().ok();

            // clear data before the next bit
            self.data.set_low().ok();
        }
        self.clock.set_low().ok();

        // copy the shifted chain onto the output pins
        self.latch.set_high().ok();

        Ok(())
    }
}
