//! Factory re-provisioning
//!
//! A destructive first-time/factory setup: forces the factory register
//! image through the privileged maintenance window, blanks the non-volatile
//! bank, exercises both block-protect transitions, and optionally pattern-
//! verifies the whole array. The maintenance window is closed and the write
//! enable latch dropped on every exit path, including failure - leaking the
//! window would leave the part accepting privileged writes.

use super::ops::{Emxxlx, Timeout};
use super::reset::line_reset;
use crate::controller::{BusLines, XspiBus};
use crate::error::{Error, Result, VerifyFailure};
use crate::frame::FrameContext;
use crate::regs::{
    self, DeviceConfig, CFG_LEN, MAINTENANCE_KEY, MAINTENANCE_KEY_ADDR,
};
use maybe_async::maybe_async;

/// Bytes per array page, the write/verify granularity
const PAGE_SIZE: usize = 256;

/// Whether re-provisioning pattern-verifies the memory array
///
/// The array pass writes and reads back both data polarities over the whole
/// device and is slow; most production flows skip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayCheck {
    /// Leave the array untouched (default)
    #[default]
    Skip,
    /// Program and read back all-zeros then all-ones across `capacity` bytes
    PatternVerify {
        /// Device capacity in bytes
        capacity: u32,
    },
}

#[maybe_async]
impl<B: XspiBus> Emxxlx<B> {
    /// Re-provision the device to its factory configuration.
    ///
    /// Destructive: rewrites both register banks and, with
    /// [`ArrayCheck::PatternVerify`], the whole array. On return the device
    /// is in octal DTR mode and `self` frames transactions accordingly.
    pub async fn reprovision<L: BusLines + ?Sized>(
        &mut self,
        lines: &mut L,
        policy: ArrayCheck,
    ) -> Result<()> {
        line_reset(lines);
        self.frame = FrameContext::reset_default();

        let result = self.reprovision_inner(policy).await;

        // Close the privileged window and drop the latch no matter how the
        // sequence ended.
        let close = self.write_volatile_config(MAINTENANCE_KEY_ADDR, &[0]).await;
        let disable = self.write_disable().await;

        result.and(close).and(disable)
    }

    async fn reprovision_inner(&mut self, policy: ArrayCheck) -> Result<()> {
        let factory = DeviceConfig::factory();
        let vol = factory.encode_volatile();

        self.clear_flags().await?;
        self.write_enable().await?;

        // The key byte in the reserved sub-register opens the privileged
        // configuration window.
        self.write_volatile_config(MAINTENANCE_KEY_ADDR, &[MAINTENANCE_KEY])
            .await?;
        self.write_volatile_config(0, &vol).await?;

        // The volatile write switched the device to octal; follow it with
        // DTR-octal framing for the rest of the sequence.
        self.frame = FrameContext::derive(8, true, &factory)?;
        self.config = factory;
        log::debug!("maintenance window open, link at octal DTR");

        // Blank the non-volatile bank through both polarities.
        self.write_nonvolatile_config(0, &[0u8; CFG_LEN]).await?;
        self.write_nonvolatile_config(0, &[0xFF; CFG_LEN]).await?;

        // Drive the block-protect bits through the all-protected and
        // all-unprotected transitions, confirming each took effect.
        self.write_status(regs::STATUS_BLOCK_PROTECT_MASK).await?;
        let status = self.read_status().await?;
        if status & regs::STATUS_BLOCK_PROTECT_MASK != regs::STATUS_BLOCK_PROTECT_MASK {
            return Err(Error::Verify(VerifyFailure::Status {
                expected: regs::STATUS_BLOCK_PROTECT_MASK,
                found: status,
            }));
        }

        self.write_status(0).await?;
        let status = self.read_status().await?;
        if status & regs::STATUS_BLOCK_PROTECT_MASK != 0 {
            return Err(Error::Verify(VerifyFailure::Status {
                expected: 0,
                found: status,
            }));
        }

        if let ArrayCheck::PatternVerify { capacity } = policy {
            self.pattern_verify(capacity).await?;
        }

        Ok(())
    }

    /// Program and read back both polarities across the array
    async fn pattern_verify(&mut self, capacity: u32) -> Result<()> {
        log::debug!("pattern-verifying {} bytes", capacity);
        self.pattern_pass(capacity, 0x00).await?;
        self.pattern_pass(capacity, 0xFF).await
    }

    async fn pattern_pass(&mut self, capacity: u32, pattern: u8) -> Result<()> {
        let page = [pattern; PAGE_SIZE];
        let mut readback = [0u8; PAGE_SIZE];

        let mut addr = 0u32;
        while addr < capacity {
            let len = core::cmp::min(PAGE_SIZE as u32, capacity - addr) as usize;
            self.write(addr, &page[..len]).await?;
            self.poll_ready(Timeout::Infinite).await?;
            addr += len as u32;
        }

        let mut addr = 0u32;
        while addr < capacity {
            let len = core::cmp::min(PAGE_SIZE as u32, capacity - addr) as usize;
            self.read(addr, &mut readback[..len]).await?;
            if let Some(bad) = readback[..len].iter().position(|b| *b != pattern) {
                return Err(Error::Verify(VerifyFailure::Array {
                    addr: addr + bad as u32,
                    expected: pattern,
                    found: readback[bad],
                }));
            }
            addr += len as u32;
        }

        Ok(())
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::controller::BusFeatures;
    use crate::regs::values;
    use crate::xspi::{opcodes, MemoryMap, XspiCommand};
    use std::vec;
    use std::vec::Vec;

    /// Device model with register banks, status, and a small array
    struct FactoryBus {
        log: Vec<u8>,
        vol: [u8; 0x20],
        nonvol: [u8; CFG_LEN],
        status: u8,
        /// Block-protect bits that refuse to set
        protect_stuck: bool,
        /// Corrupt the first byte of every array read
        corrupt_reads: bool,
        memory: Vec<u8>,
    }

    impl FactoryBus {
        fn new(capacity: usize) -> Self {
            Self {
                log: Vec::new(),
                vol: [0u8; 0x20],
                nonvol: [0u8; CFG_LEN],
                status: 0,
                protect_stuck: false,
                corrupt_reads: false,
                memory: vec![0u8; capacity],
            }
        }
    }

    impl XspiBus for FactoryBus {
        fn features(&self) -> BusFeatures {
            BusFeatures::all()
        }

        fn max_read_len(&self) -> usize {
            4096
        }

        fn max_write_len(&self) -> usize {
            PAGE_SIZE
        }

        fn execute(&mut self, cmd: &mut XspiCommand<'_>) -> Result<()> {
            self.log.push(cmd.instruction);
            let addr = cmd.address.unwrap_or(0) as usize;
            match cmd.instruction {
                opcodes::WRITE_VOL_CFG => {
                    let n = cmd.write_data.len();
                    self.vol[addr..addr + n].copy_from_slice(cmd.write_data);
                }
                opcodes::WRITE_NONVOL_CFG => {
                    let n = cmd.write_data.len().min(CFG_LEN);
                    self.nonvol[..n].copy_from_slice(&cmd.write_data[..n]);
                }
                opcodes::READ_VOL_CFG => {
                    let n = cmd.read_buf.len();
                    cmd.read_buf.copy_from_slice(&self.vol[addr..addr + n]);
                }
                opcodes::READ_NONVOL_CFG => {
                    let n = cmd.read_buf.len().min(CFG_LEN);
                    cmd.read_buf[..n].copy_from_slice(&self.nonvol[..n]);
                }
                opcodes::WRITE_STATUS => {
                    self.status = if self.protect_stuck {
                        0
                    } else {
                        cmd.write_data[0]
                    };
                }
                opcodes::READ_STATUS => cmd.read_buf[0] = self.status,
                opcodes::READ_FLAGS => cmd.read_buf[0] = regs::FLAGS_READY,
                opcodes::WRITE_OCTAL_EXT => {
                    self.memory[addr..addr + cmd.write_data.len()]
                        .copy_from_slice(cmd.write_data);
                }
                opcodes::READ_DTR_OCTAL_OUT => {
                    let n = cmd.read_buf.len();
                    cmd.read_buf.copy_from_slice(&self.memory[addr..addr + n]);
                    if self.corrupt_reads {
                        cmd.read_buf[0] = !cmd.read_buf[0];
                    }
                }
                _ => {}
            }
            Ok(())
        }

        fn map_memory(&mut self, _map: &MemoryMap) -> Result<()> {
            Ok(())
        }

        fn delay_us(&mut self, _us: u32) {}

        fn ticks(&self) -> u32 {
            0
        }
    }

    struct NullLines;
    impl BusLines for NullLines {
        fn acquire(&mut self) {}
        fn set_cs(&mut self, _high: bool) {}
        fn set_clk(&mut self, _high: bool) {}
        fn set_io0(&mut self, _high: bool) {}
        fn float_io1(&mut self) {}
        fn release(&mut self) {}
    }

    fn driver(bus: FactoryBus) -> Emxxlx<FactoryBus> {
        let config = DeviceConfig::default();
        let frame = FrameContext::reset_default();
        Emxxlx::with_frame(bus, config, frame)
    }

    #[test]
    fn test_reprovision_programs_factory_image() {
        let mut dev = driver(FactoryBus::new(0));
        dev.reprovision(&mut NullLines, ArrayCheck::Skip).unwrap();

        assert_eq!(dev.frame().read_instruction, opcodes::READ_DTR_OCTAL_OUT);
        assert!(dev.frame().ddr);

        let bus = dev.release();
        let vol = DeviceConfig::factory().encode_volatile();
        assert_eq!(bus.vol[..CFG_LEN], vol);
        assert_eq!(bus.vol[0], values::MODE_OCTAL);
        // non-volatile bank ends blanked to ones
        assert_eq!(bus.nonvol, [0xFF; CFG_LEN]);
        // window closed again
        assert_eq!(bus.vol[MAINTENANCE_KEY_ADDR as usize], 0);
    }

    #[test]
    fn test_reprovision_always_exits_window() {
        let mut bus = FactoryBus::new(0);
        bus.protect_stuck = true;
        let mut dev = driver(bus);

        let err = dev
            .reprovision(&mut NullLines, ArrayCheck::Skip)
            .unwrap_err();
        assert!(matches!(err, Error::Verify(VerifyFailure::Status { .. })));

        let bus = dev.release();
        // failure path still closes the window and drops the latch
        assert_eq!(bus.vol[MAINTENANCE_KEY_ADDR as usize], 0);
        assert_eq!(bus.log.last(), Some(&opcodes::WRITE_DISABLE));
    }

    #[test]
    fn test_skip_policy_leaves_array_untouched() {
        let mut dev = driver(FactoryBus::new(512));
        dev.reprovision(&mut NullLines, ArrayCheck::Skip).unwrap();
        let bus = dev.release();
        assert!(!bus.log.contains(&opcodes::WRITE_OCTAL_EXT));
        assert_eq!(bus.memory, vec![0u8; 512]);
    }

    #[test]
    fn test_pattern_verify_covers_both_polarities() {
        let mut dev = driver(FactoryBus::new(512));
        dev.reprovision(&mut NullLines, ArrayCheck::PatternVerify { capacity: 512 })
            .unwrap();
        let bus = dev.release();
        // the ones pass runs last
        assert_eq!(bus.memory, vec![0xFF; 512]);
        let writes = bus
            .log
            .iter()
            .filter(|i| **i == opcodes::WRITE_OCTAL_EXT)
            .count();
        // two pages per pass, two passes
        assert_eq!(writes, 4);
    }

    #[test]
    fn test_pattern_verify_reports_first_mismatch() {
        let mut bus = FactoryBus::new(256);
        bus.corrupt_reads = true;
        let mut dev = driver(bus);
        let err = dev
            .reprovision(&mut NullLines, ArrayCheck::PatternVerify { capacity: 256 })
            .unwrap_err();
        match err {
            Error::Verify(VerifyFailure::Array { addr: 0, .. }) => {}
            other => panic!("expected array verify failure, got {:?}", other),
        }
        // and the window is still exited afterwards
        assert_eq!(dev.release().vol[MAINTENANCE_KEY_ADDR as usize], 0);
    }
}
