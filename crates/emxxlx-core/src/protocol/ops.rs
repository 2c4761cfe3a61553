//! The device command set

use crate::controller::XspiBus;
use crate::error::{Error, RegisterBank, Result, VerifyFailure};
use crate::frame::FrameContext;
use crate::regs::{self, DeviceConfig, CFG_LEN};
use crate::xspi::{opcodes, AddressWidth, CommandTemplate, MemoryMap, XspiCommand};
use maybe_async::maybe_async;

/// Bound for a busy-poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Poll until the device reports ready, without a deadline
    Infinite,
    /// Give up once this many ticks have elapsed; zero always times out
    Ticks(u32),
}

/// Driver for one EMxxLX device on one bus
///
/// Owns the bus handle and the framing state; every operation frames its
/// transactions from the current [`FrameContext`]. Constructed by
/// [`Emxxlx::init`](crate::protocol::Emxxlx::init), or by
/// [`Emxxlx::with_frame`] to attach to an already-configured part.
#[derive(Debug)]
pub struct Emxxlx<B: XspiBus> {
    pub(super) bus: B,
    pub(super) frame: FrameContext,
    pub(super) config: DeviceConfig,
}

impl<B: XspiBus> Emxxlx<B> {
    /// Attach to a device that is already in a known mode.
    ///
    /// No bus traffic is issued; `frame` is trusted to match the device's
    /// actual configuration. Use [`Emxxlx::init`](crate::protocol::Emxxlx::init)
    /// for a full bring-up from an unknown state.
    pub fn with_frame(bus: B, config: DeviceConfig, frame: FrameContext) -> Self {
        Self { bus, frame, config }
    }

    /// The framing currently in effect
    pub fn frame(&self) -> &FrameContext {
        &self.frame
    }

    /// The configuration record this driver was programmed with
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Consume the driver and return the bus handle
    pub fn release(self) -> B {
        self.bus
    }
}

#[maybe_async]
impl<B: XspiBus> Emxxlx<B> {
    /// Set the write enable latch
    pub async fn write_enable(&mut self) -> Result<()> {
        let mut cmd = XspiCommand::simple(opcodes::WRITE_ENABLE, self.frame.phases)
            .with_ddr(self.frame.ddr);
        self.bus.execute(&mut cmd).await
    }

    /// Clear the write enable latch
    pub async fn write_disable(&mut self) -> Result<()> {
        let mut cmd = XspiCommand::simple(opcodes::WRITE_DISABLE, self.frame.phases)
            .with_ddr(self.frame.ddr);
        self.bus.execute(&mut cmd).await
    }

    /// Issue a software reset
    pub async fn reset(&mut self) -> Result<()> {
        let mut cmd = XspiCommand::simple(opcodes::RESET_MEMORY, self.frame.phases)
            .with_ddr(self.frame.ddr);
        self.bus.execute(&mut cmd).await
    }

    /// Read the status register
    pub async fn read_status(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        let mut cmd = XspiCommand::read_reg(opcodes::READ_STATUS, self.frame.phases, &mut buf)
            .with_dummy_cycles(self.frame.config_dummy_cycles)
            .with_ddr(self.frame.ddr);
        self.bus.execute(&mut cmd).await?;
        Ok(buf[0])
    }

    /// Write the status register
    pub async fn write_status(&mut self, value: u8) -> Result<()> {
        let data = [value];
        let mut cmd = XspiCommand::write_reg(opcodes::WRITE_STATUS, self.frame.phases, &data)
            .with_ddr(self.frame.ddr);
        self.bus.execute(&mut cmd).await
    }

    /// Read the flag status register
    pub async fn read_flags(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        let mut cmd = XspiCommand::read_reg(opcodes::READ_FLAGS, self.frame.phases, &mut buf)
            .with_dummy_cycles(self.frame.config_dummy_cycles)
            .with_ddr(self.frame.ddr);
        self.bus.execute(&mut cmd).await?;
        Ok(buf[0])
    }

    /// Clear the flag status register
    pub async fn clear_flags(&mut self) -> Result<()> {
        let mut cmd = XspiCommand::simple(opcodes::CLEAR_FLAGS, self.frame.phases)
            .with_ddr(self.frame.ddr);
        self.bus.execute(&mut cmd).await
    }

    /// Read the 3-byte device ID on the current line configuration
    pub async fn read_id(&mut self) -> Result<[u8; 3]> {
        let mut buf = [0u8; 3];
        let mut cmd = XspiCommand::read_reg(opcodes::READ_ID_MULTI_IO, self.frame.phases, &mut buf)
            .with_dummy_cycles(self.frame.config_dummy_cycles)
            .with_ddr(self.frame.ddr);
        self.bus.execute(&mut cmd).await?;
        Ok(buf)
    }

    /// Read from the volatile configuration registers
    pub async fn read_volatile_config(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        let frame = self.frame;
        let mut cmd = XspiCommand::read(
            opcodes::READ_VOL_CFG,
            frame.phases,
            addr,
            frame.address_width,
            buf,
        )
        .with_dummy_cycles(frame.config_dummy_cycles)
        .with_ddr(frame.ddr);
        self.bus.execute(&mut cmd).await
    }

    /// Write to the volatile configuration registers
    pub async fn write_volatile_config(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        let frame = self.frame;
        let mut cmd = XspiCommand::write(
            opcodes::WRITE_VOL_CFG,
            frame.phases,
            addr,
            frame.address_width,
            data,
        )
        .with_ddr(frame.ddr);
        self.bus.execute(&mut cmd).await
    }

    /// Read from the non-volatile configuration registers
    pub async fn read_nonvolatile_config(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        let frame = self.frame;
        let mut cmd = XspiCommand::read(
            opcodes::READ_NONVOL_CFG,
            frame.phases,
            addr,
            frame.address_width,
            buf,
        )
        .with_dummy_cycles(frame.config_dummy_cycles)
        .with_ddr(frame.ddr);
        self.bus.execute(&mut cmd).await
    }

    /// Write to the non-volatile configuration registers
    pub async fn write_nonvolatile_config(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        let frame = self.frame;
        let mut cmd = XspiCommand::write(
            opcodes::WRITE_NONVOL_CFG,
            frame.phases,
            addr,
            frame.address_width,
            data,
        )
        .with_ddr(frame.ddr);
        self.bus.execute(&mut cmd).await
    }

    /// Read `buf.len()` bytes of the memory array starting at `addr`
    pub async fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        let frame = self.frame;
        let max_len = self.bus.max_read_len();
        let mut offset = 0;

        while offset < buf.len() {
            let chunk_len = core::cmp::min(max_len, buf.len() - offset);
            let chunk = &mut buf[offset..offset + chunk_len];
            let mut cmd = XspiCommand::read(
                frame.read_instruction,
                frame.phases,
                addr + offset as u32,
                frame.address_width,
                chunk,
            )
            .with_dummy_cycles(frame.data_dummy_cycles)
            .with_ddr(frame.ddr);
            self.bus.execute(&mut cmd).await?;
            offset += chunk_len;
        }

        Ok(())
    }

    /// Write `data` into the memory array starting at `addr`.
    ///
    /// The write enable latch is not asserted here; composite sequences
    /// pair it with their own WRITE_ENABLE, matching the device protocol.
    pub async fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        let frame = self.frame;
        let max_len = self.bus.max_write_len();
        let mut offset = 0;

        while offset < data.len() {
            let chunk_len = core::cmp::min(max_len, data.len() - offset);
            let chunk = &data[offset..offset + chunk_len];
            let mut cmd = XspiCommand::write(
                frame.write_instruction,
                frame.phases,
                addr + offset as u32,
                frame.address_width,
                chunk,
            )
            .with_ddr(frame.ddr);
            self.bus.execute(&mut cmd).await?;
            offset += chunk_len;
        }

        Ok(())
    }

    /// Erase the whole array.
    ///
    /// Erase duration is device-determined and can be long; this polls
    /// without a deadline. Callers wanting a wall-clock bound should issue
    /// the instruction and poll with [`Emxxlx::poll_ready`] themselves.
    pub async fn erase_chip(&mut self) -> Result<()> {
        let mut cmd = XspiCommand::simple(opcodes::ERASE_CHIP, self.frame.phases)
            .with_ddr(self.frame.ddr);
        self.bus.execute(&mut cmd).await?;
        self.poll_ready(Timeout::Infinite).await
    }

    /// Poll the flag status register until the device reports ready.
    ///
    /// A zero tick budget fails immediately, whatever the device state.
    pub async fn poll_ready(&mut self, timeout: Timeout) -> Result<()> {
        let budget = match timeout {
            Timeout::Ticks(0) => return Err(Error::Timeout),
            Timeout::Ticks(t) => Some(t),
            Timeout::Infinite => None,
        };
        let start = self.bus.ticks();

        let mut flags = self.read_flags().await?;
        while flags & regs::FLAGS_READY == 0 {
            if let Some(t) = budget {
                if self.bus.ticks().wrapping_sub(start) > t {
                    return Err(Error::Timeout);
                }
            }
            flags = self.read_flags().await?;
        }

        Ok(())
    }

    /// Switch the controller into memory-mapped mode using the current
    /// framing.
    ///
    /// On failure the bus is left in an undefined transaction mode; treat
    /// any error from here as fatal to the driver and recover with a line
    /// reset and a fresh [`Emxxlx::init`](crate::protocol::Emxxlx::init).
    pub async fn enable_memory_mapped(&mut self) -> Result<()> {
        self.write_enable().await?;

        let frame = self.frame;
        let map = MemoryMap {
            // Mapped accesses always carry the full 32-bit address phase.
            write: CommandTemplate {
                instruction: frame.write_instruction,
                phases: frame.phases,
                address_width: AddressWidth::FourByte,
                dummy_cycles: 0,
                ddr: frame.ddr,
                dqs: true,
            },
            read: CommandTemplate {
                instruction: frame.read_instruction,
                phases: frame.phases,
                address_width: AddressWidth::FourByte,
                dummy_cycles: frame.data_dummy_cycles,
                ddr: frame.ddr,
                dqs: false,
            },
            timeout_cycles: 0xFFFF,
        };

        self.bus.map_memory(&map).await
    }

    /// Re-read a register bank and byte-compare it against `expected`
    pub(super) async fn verify_bank(
        &mut self,
        bank: RegisterBank,
        expected: &[u8; CFG_LEN],
    ) -> Result<()> {
        let mut readback = [0u8; CFG_LEN];
        match bank {
            RegisterBank::Volatile => self.read_volatile_config(0, &mut readback).await?,
            RegisterBank::NonVolatile => self.read_nonvolatile_config(0, &mut readback).await?,
        }

        for (offset, (want, got)) in expected.iter().zip(readback.iter()).enumerate() {
            if want != got {
                log::warn!(
                    "{:?} register +{} read back 0x{:02X}, wrote 0x{:02X}",
                    bank,
                    offset,
                    got,
                    want
                );
                return Err(Error::Verify(VerifyFailure::Register {
                    bank,
                    offset: offset as u8,
                    expected: *want,
                    found: *got,
                }));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::controller::BusFeatures;
    use core::cell::Cell;
    use std::vec::Vec;

    /// Scriptable bus that records every instruction it executes
    struct MockBus {
        log: Vec<u8>,
        dummy_log: Vec<u8>,
        /// Flag reads left that report busy before the ready bit appears
        busy_reads: u32,
        flag_reads: u32,
        /// Fail any transaction carrying this instruction
        fail_on: Option<u8>,
        tick: Cell<u32>,
        max_len: usize,
        mapped: Option<MemoryMap>,
    }

    impl MockBus {
        fn new() -> Self {
            Self {
                log: Vec::new(),
                dummy_log: Vec::new(),
                busy_reads: 0,
                flag_reads: 0,
                fail_on: None,
                tick: Cell::new(0),
                max_len: 4096,
                mapped: None,
            }
        }

        fn busy_for(mut self, reads: u32) -> Self {
            self.busy_reads = reads;
            self
        }

        fn failing_on(mut self, instruction: u8) -> Self {
            self.fail_on = Some(instruction);
            self
        }
    }

    impl XspiBus for MockBus {
        fn features(&self) -> BusFeatures {
            BusFeatures::all()
        }

        fn max_read_len(&self) -> usize {
            self.max_len
        }

        fn max_write_len(&self) -> usize {
            self.max_len
        }

        fn execute(&mut self, cmd: &mut XspiCommand<'_>) -> Result<()> {
            self.log.push(cmd.instruction);
            self.dummy_log.push(cmd.dummy_cycles);
            if self.fail_on == Some(cmd.instruction) {
                return Err(Error::Transport);
            }
            match cmd.instruction {
                opcodes::READ_FLAGS => {
                    self.flag_reads += 1;
                    cmd.read_buf[0] = if self.busy_reads > 0 {
                        self.busy_reads -= 1;
                        0
                    } else {
                        regs::FLAGS_READY
                    };
                }
                opcodes::READ_STATUS => cmd.read_buf[0] = regs::STATUS_WEL,
                opcodes::READ_ID_MULTI_IO => cmd.read_buf.copy_from_slice(&[0x6B, 0x10, 0x18]),
                _ => {}
            }
            Ok(())
        }

        fn map_memory(&mut self, map: &MemoryMap) -> Result<()> {
            self.mapped = Some(*map);
            Ok(())
        }

        fn delay_us(&mut self, _us: u32) {}

        fn ticks(&self) -> u32 {
            let t = self.tick.get();
            self.tick.set(t + 1);
            t
        }
    }

    fn quad_driver(bus: MockBus) -> Emxxlx<MockBus> {
        let config = DeviceConfig::default();
        let frame = FrameContext::derive(4, false, &config).unwrap();
        Emxxlx::with_frame(bus, config, frame)
    }

    #[test]
    fn test_poll_zero_budget_fails_without_traffic() {
        let mut dev = quad_driver(MockBus::new());
        assert_eq!(dev.poll_ready(Timeout::Ticks(0)), Err(Error::Timeout));
        assert_eq!(dev.release().flag_reads, 0);
    }

    #[test]
    fn test_poll_reads_exactly_n_plus_one() {
        let mut dev = quad_driver(MockBus::new().busy_for(3));
        dev.poll_ready(Timeout::Infinite).unwrap();
        assert_eq!(dev.release().flag_reads, 4);
    }

    #[test]
    fn test_poll_finite_budget_expires() {
        // never becomes ready; the fake clock advances one tick per read
        let mut dev = quad_driver(MockBus::new().busy_for(u32::MAX));
        assert_eq!(dev.poll_ready(Timeout::Ticks(5)), Err(Error::Timeout));
    }

    #[test]
    fn test_poll_immediate_ready() {
        let mut dev = quad_driver(MockBus::new());
        dev.poll_ready(Timeout::Ticks(1)).unwrap();
        assert_eq!(dev.release().flag_reads, 1);
    }

    #[test]
    fn test_erase_chip_polls_until_ready() {
        let mut dev = quad_driver(MockBus::new().busy_for(2));
        dev.erase_chip().unwrap();
        let bus = dev.release();
        assert_eq!(bus.log[0], opcodes::ERASE_CHIP);
        assert_eq!(bus.flag_reads, 3);
    }

    #[test]
    fn test_erase_chip_transport_failure_short_circuits() {
        let mut dev = quad_driver(MockBus::new().failing_on(opcodes::ERASE_CHIP));
        assert_eq!(dev.erase_chip(), Err(Error::Transport));
        // no polling after a failed erase instruction
        assert_eq!(dev.release().flag_reads, 0);
    }

    #[test]
    fn test_read_id() {
        let mut dev = quad_driver(MockBus::new());
        assert_eq!(dev.read_id().unwrap(), [0x6B, 0x10, 0x18]);
    }

    #[test]
    fn test_bulk_read_chunks_by_bus_limit() {
        let mut bus = MockBus::new();
        bus.max_len = 16;
        let mut dev = quad_driver(bus);
        let mut buf = [0u8; 40];
        dev.read(0x100, &mut buf).unwrap();
        let bus = dev.release();
        // 40 bytes over a 16-byte limit: three read transactions
        assert_eq!(bus.log, [opcodes::READ_QUAD_OUT; 3]);
    }

    #[test]
    fn test_write_does_not_assert_wel() {
        let mut dev = quad_driver(MockBus::new());
        dev.write(0, &[1, 2, 3]).unwrap();
        let bus = dev.release();
        assert_eq!(bus.log, [opcodes::WRITE_QUAD]);
    }

    #[test]
    fn test_memory_map_templates_follow_frame() {
        let mut config = DeviceConfig::default();
        config.dummy_cycles = 16;
        let frame = FrameContext::derive(4, false, &config).unwrap();
        let mut dev = Emxxlx::with_frame(MockBus::new(), config, frame);

        dev.enable_memory_mapped().unwrap();
        let bus = dev.release();
        assert_eq!(bus.log, [opcodes::WRITE_ENABLE]);

        let map = bus.mapped.unwrap();
        assert_eq!(map.read.instruction, opcodes::READ_QUAD_OUT);
        assert_eq!(map.read.dummy_cycles, 16);
        assert!(!map.read.dqs);
        assert_eq!(map.write.instruction, opcodes::WRITE_QUAD);
        assert_eq!(map.write.dummy_cycles, 0);
        assert!(map.write.dqs);
        assert_eq!(map.read.address_width, AddressWidth::FourByte);
        assert_eq!(map.write.address_width, AddressWidth::FourByte);
        assert_eq!(map.timeout_cycles, 0xFFFF);
    }

    #[test]
    fn test_register_reads_use_config_dummies() {
        let config = DeviceConfig::default();
        let frame = FrameContext::derive(8, false, &config).unwrap();
        let mut dev = Emxxlx::with_frame(MockBus::new(), config, frame);

        dev.read_status().unwrap();
        dev.read_id().unwrap();
        let mut cfg = [0u8; 9];
        dev.read_volatile_config(0, &mut cfg).unwrap();
        dev.write_status(0).unwrap();

        let bus = dev.release();
        // register reads clock the octal config dummies, writes none
        assert_eq!(bus.dummy_log, [8, 8, 8, 0]);
    }

    #[test]
    fn test_array_reads_use_data_dummies() {
        let mut config = DeviceConfig::default();
        config.dummy_cycles = 16;
        let frame = FrameContext::derive(4, false, &config).unwrap();
        let mut dev = Emxxlx::with_frame(MockBus::new(), config, frame);

        let mut buf = [0u8; 8];
        dev.read(0, &mut buf).unwrap();
        dev.write(0, &buf).unwrap();

        let bus = dev.release();
        assert_eq!(bus.dummy_log, [16, 0]);
    }
}
