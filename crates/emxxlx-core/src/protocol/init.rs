//! Device bring-up
//!
//! The bring-up walks the device from an unknown, possibly stuck state to
//! the caller's requested interface width:
//!
//! RESET -> ENABLE_WRITE -> PROGRAM_NONVOLATILE -> PROGRAM_VOLATILE ->
//! SELECT_MODE -> VERIFY_STATUS -> VERIFY_NONVOLATILE -> VERIFY_VOLATILE ->
//! READY
//!
//! The ordering is load-bearing: the registers are programmed while the
//! link is still single-line (the device cannot be assumed to decode the
//! target width yet), and both banks are re-read after the framing switch.
//! The read-back compare under the new framing is the one check that the
//! device actually adopted the requested width, not just the local state.

use super::reset::line_reset;
use crate::controller::{BusLines, XspiBus};
use crate::error::{Error, RegisterBank, Result, VerifyFailure};
use crate::frame::FrameContext;
use crate::regs::{self, DeviceConfig};
use maybe_async::maybe_async;

use super::ops::Emxxlx;

#[maybe_async]
impl<B: XspiBus> Emxxlx<B> {
    /// Bring the device up at the requested interface width.
    ///
    /// `width` is the number of data lines (1, 2, 4 or 8). Any failure is
    /// fatal to initialization; the device may be left mid-configuration,
    /// and recovery is another call to `init` (which starts with a line
    /// reset). No automatic rollback is attempted.
    pub async fn init<L: BusLines + ?Sized>(
        bus: B,
        lines: &mut L,
        config: DeviceConfig,
        width: u8,
    ) -> Result<Self> {
        // Reject unsupported widths before any bus traffic.
        let target = FrameContext::derive(width, false, &config)?;

        log::debug!("bringing up EMxxLX at {} data line(s)", width);

        // Force the device to single-line SPI whatever mode it was left in.
        line_reset(lines);
        let mut dev = Emxxlx {
            bus,
            frame: FrameContext::reset_default(),
            config,
        };

        dev.clear_flags().await?;
        dev.write_enable().await?;

        // Program both banks while the link is still single-line. The
        // volatile image additionally carries the OTP-lock bit.
        let nonvol = config.encode();
        let vol = config.encode_volatile();
        dev.write_nonvolatile_config(0, &nonvol).await?;
        dev.write_volatile_config(0, &vol).await?;

        // The device is now in the requested mode; follow it.
        dev.frame = target;
        log::debug!(
            "switched framing: read 0x{:02X}, write 0x{:02X}, {:?} address",
            target.read_instruction,
            target.write_instruction,
            target.address_width
        );

        // First contact in the new mode: zero the status register and
        // require the write enable latch to be observable.
        dev.write_enable().await?;
        dev.write_status(0).await?;
        let status = dev.read_status().await?;
        if status & regs::STATUS_WEL == 0 {
            return Err(Error::Verify(VerifyFailure::Status {
                expected: regs::STATUS_WEL,
                found: status,
            }));
        }

        dev.verify_bank(RegisterBank::NonVolatile, &nonvol).await?;
        dev.verify_bank(RegisterBank::Volatile, &vol).await?;

        log::debug!("bring-up complete");
        Ok(dev)
    }
}
