//! Mode-agnostic line-level device reset
//!
//! The device may power up, or be left by a crashed host, in any of its
//! multi-line modes - in which case it no longer decodes single-line
//! instructions and no [`XspiBus`](crate::controller::XspiBus) transaction
//! can reach it. The vendor documents a recovery sequence of chip-select
//! pulses interleaved with a fixed IO0 pattern that every mode decodes as
//! a reset.

use crate::controller::BusLines;

/// Force the device back to single-line SPI, whatever mode it is in.
///
/// Takes manual control of the signal lines, plays the pulse train, and
/// returns pin ownership to the controller. The sequence is open-loop:
/// it has no failure signal and is timed by the pin operations themselves.
pub fn line_reset<L: BusLines + ?Sized>(lines: &mut L) {
    lines.acquire();

    // The device samples IO0 on chip-select rising edges; IO1 must not be
    // driven while it may still be an output on the device side.
    lines.float_io1();
    lines.set_clk(false);

    lines.set_cs(false);
    lines.set_cs(true);
    lines.set_io0(true);
    lines.set_cs(false);
    lines.set_cs(true);
    lines.set_io0(false);
    lines.set_cs(false);
    lines.set_cs(true);
    lines.set_io0(true);
    lines.set_cs(false);
    lines.set_cs(true);

    lines.release();
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    enum Event {
        Acquire,
        Cs(bool),
        Clk(bool),
        Io0(bool),
        FloatIo1,
        Release,
    }

    #[derive(Default)]
    struct RecordingLines {
        events: Vec<Event>,
    }

    impl BusLines for RecordingLines {
        fn acquire(&mut self) {
            self.events.push(Event::Acquire);
        }
        fn set_cs(&mut self, high: bool) {
            self.events.push(Event::Cs(high));
        }
        fn set_clk(&mut self, high: bool) {
            self.events.push(Event::Clk(high));
        }
        fn set_io0(&mut self, high: bool) {
            self.events.push(Event::Io0(high));
        }
        fn float_io1(&mut self) {
            self.events.push(Event::FloatIo1);
        }
        fn release(&mut self) {
            self.events.push(Event::Release);
        }
    }

    #[test]
    fn test_pulse_train_order() {
        let mut lines = RecordingLines::default();
        line_reset(&mut lines);

        use Event::*;
        assert_eq!(
            lines.events,
            [
                Acquire,
                FloatIo1,
                Clk(false),
                Cs(false),
                Cs(true),
                Io0(true),
                Cs(false),
                Cs(true),
                Io0(false),
                Cs(false),
                Cs(true),
                Io0(true),
                Cs(false),
                Cs(true),
                Release,
            ]
        );
    }

    #[test]
    fn test_ownership_restored() {
        let mut lines = RecordingLines::default();
        line_reset(&mut lines);
        assert_eq!(lines.events.first(), Some(&Event::Acquire));
        assert_eq!(lines.events.last(), Some(&Event::Release));
    }
}
