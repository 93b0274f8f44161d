// Licensed under the Apache-2.0 license

//! Driver for the Telechips OTP fuse controller.
//!
//! Fuses are read and programmed 128 bits at a time through the command
//! register block. Programming additionally needs the protect-control bit of
//! the control block cleared for the duration of the command, and is refused
//! outright while the external write-protect pin is high.

#![cfg_attr(not(test), no_std)]

use log::{debug, error};
use romtime::wait::Wait;
use romtime::{HexWord, Mmio, TccError, TccResult};
use tcc_config::OtpConfig;
use tcc_registers::otp::bits::{AdminInfo, CtrlProtect, GeneralStatus, OtpControl, ReadStatus};
use tcc_registers::otp::{offsets, WORDS_PER_COMMAND};
use tock_registers::LocalRegisterCopy;

/// Bytes covered by one read or program command.
pub const BLOCK_SIZE: u32 = 16;

pub struct Otp<M: Mmio, W: Wait> {
    mmio: M,
    config: OtpConfig,
    wait: W,
}

impl<M: Mmio, W: Wait> Otp<M, W> {
    pub fn new(mmio: M, config: OtpConfig, wait: W) -> Self {
        Self { mmio, config, wait }
    }

    fn cmd(&self, offset: usize) -> usize {
        self.config.cmd_base + offset
    }

    fn ctrl(&self) -> usize {
        self.config.ctrl_base + offsets::CTRL_PROTECT
    }

    fn validate(&self, offset: u32) -> TccResult<()> {
        if offset % BLOCK_SIZE != 0
            || offset < self.config.rom_128_start
            || offset >= self.config.rom_128_limit
            || self.config.cmd_base == 0
        {
            error!("[tcc-otp] Invalid parameters: offset {:#x}", offset);
            return Err(TccError::BadParameters);
        }
        Ok(())
    }

    fn wait_ready(&self) -> TccResult<()> {
        let status = self.cmd(offsets::GENERAL_STATUS);
        self.wait.until(|| {
            LocalRegisterCopy::<u32, GeneralStatus::Register>::new(self.mmio.read32(status))
                .is_set(GeneralStatus::READY)
        })
    }

    fn issue(&self, command: u32) -> TccResult<()> {
        let control = self.cmd(offsets::OTP_CONTROL);
        self.mmio.write32(control, command);
        self.wait.until(|| {
            LocalRegisterCopy::<u32, OtpControl::Register>::new(self.mmio.read32(control))
                .is_set(OtpControl::DONE)
        })
    }

    /// Reads the 128-bit block at `offset` into `buf`.
    ///
    /// Returns [`TccError::NoData`] for a block that was never programmed.
    pub fn read_128(&self, offset: u32, buf: &mut [u32; WORDS_PER_COMMAND]) -> TccResult<()> {
        self.validate(offset)?;

        self.wait_ready()?;
        self.mmio.write32(self.cmd(offsets::OTP_ADDRESS), offset);
        self.issue((OtpControl::CMD::Read + OtpControl::START::SET).value)?;

        let admin = self.mmio.read32(self.cmd(offsets::READ_ADMIN_INFO[0]));
        if LocalRegisterCopy::<u32, AdminInfo::Register>::new(admin).is_set(AdminInfo::VALID) {
            let status = LocalRegisterCopy::<u32, ReadStatus::Register>::new(
                self.mmio.read32(self.cmd(offsets::READ_STATUS)),
            );
            if status.is_set(ReadStatus::DATA_ERR) || status.is_set(ReadStatus::PERMISSION_ERR) {
                error!("[tcc-otp] Failed to read OTP ({})", HexWord(status.get()));
                return Err(TccError::BadState);
            }
            for (word, reg) in buf.iter_mut().zip(offsets::READ_DATA_PAYLOAD) {
                *word = self.mmio.read32(self.cmd(reg));
            }
            return Ok(());
        }

        // A blank block reports neither admin info nor status.
        if self.mmio.read32(self.cmd(offsets::READ_ADMIN_INFO[0])) == 0
            && self.mmio.read32(self.cmd(offsets::READ_STATUS)) == 0
        {
            debug!("[tcc-otp] {:#x} is not programmed", offset);
            return Err(TccError::NoData);
        }
        Err(TccError::BadState)
    }

    /// Burns `buf` into the 128-bit block at `offset`.
    ///
    /// Completion of the command is the only check; the block is not read
    /// back. The protect-control bit is set again on every path that cleared
    /// it, including a wait timeout.
    pub fn write_128(&self, offset: u32, buf: &[u32; WORDS_PER_COMMAND]) -> TccResult<()> {
        self.validate(offset)?;

        let ctrl = LocalRegisterCopy::<u32, CtrlProtect::Register>::new(
            self.mmio.read32(self.ctrl()),
        );
        if ctrl.is_set(CtrlProtect::EXT_WP) {
            error!("[tcc-otp] EXT_WP is high");
            return Err(TccError::WriteProtected);
        }

        self.wait_ready()?;
        self.mmio
            .clear_bits32(self.ctrl(), CtrlProtect::PROTECT::SET.value);
        self.mmio.write32(self.cmd(offsets::OTP_ADDRESS), offset);
        for (reg, word) in offsets::PROG_DATA_PAYLOAD.iter().zip(buf.iter()) {
            self.mmio.write32(self.cmd(*reg), *word);
        }
        for reg in offsets::PROG_ADMIN_INFO {
            self.mmio.write32(self.cmd(reg), 0);
        }
        let result = self.issue((OtpControl::CMD::Program + OtpControl::START::SET).value);
        // Relock even when the command never completed.
        self.mmio
            .set_bits32(self.ctrl(), CtrlProtect::PROTECT::SET.value);
        result?;

        debug!("[tcc-otp] programmed {:#x}", offset);
        Ok(())
    }

    /// Raw program status word of the last program command.
    pub fn program_status(&self) -> TccResult<u32> {
        if self.config.cmd_base == 0 {
            return Err(TccError::BadParameters);
        }
        Ok(self.mmio.read32(self.cmd(offsets::PROG_STATUS)))
    }
}
