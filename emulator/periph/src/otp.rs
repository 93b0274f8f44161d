/*++

Licensed under the Apache-2.0 license.

File Name:

    otp.rs

Abstract:

    File contains the OTP fuse controller peripheral emulation. The command
    block is decoded at offset 0 and the protect/control block at
    `OtpPeripheral::CTRL_OFFSET`.

--*/

use crate::bus::Bus;
use std::collections::BTreeMap;
use tcc_config::{OTP_CMD_SIZE, OTP_CTRL_SIZE};
use tcc_registers::otp::bits::{AdminInfo, CtrlProtect, GeneralStatus, OtpControl};
use tcc_registers::otp::{offsets, WORDS_PER_COMMAND};
use tock_registers::LocalRegisterCopy;

type Block = [u32; WORDS_PER_COMMAND];

pub struct OtpPeripheral {
    /// Programmed 128-bit blocks keyed by OTP offset.
    fuses: BTreeMap<u32, Block>,
    /// Read status forced for specific offsets.
    read_faults: BTreeMap<u32, u32>,

    ready: bool,
    done_delay: Option<u32>,
    pending_polls: u32,
    busy: bool,

    address: u32,
    control: u32,
    read_status: u32,
    prog_status: u32,
    read_payload: Block,
    read_admin: Block,
    prog_payload: Block,
    prog_admin: Block,
    ctrl_protect: u32,

    general_status_polls: usize,
    rejected_programs: usize,
}

impl Default for OtpPeripheral {
    fn default() -> Self {
        Self::new()
    }
}

impl OtpPeripheral {
    pub const CMD_OFFSET: usize = 0x0;
    pub const CTRL_OFFSET: usize = OTP_CMD_SIZE;
    pub const SIZE: usize = OTP_CMD_SIZE + OTP_CTRL_SIZE;

    /// A ready controller with programming locked, which is the reset state.
    pub fn new() -> Self {
        Self {
            fuses: BTreeMap::new(),
            read_faults: BTreeMap::new(),
            ready: true,
            done_delay: Some(0),
            pending_polls: 0,
            busy: false,
            address: 0,
            control: 0,
            read_status: 0,
            prog_status: 0,
            read_payload: [0; WORDS_PER_COMMAND],
            read_admin: [0; WORDS_PER_COMMAND],
            prog_payload: [0; WORDS_PER_COMMAND],
            prog_admin: [0; WORDS_PER_COMMAND],
            ctrl_protect: CtrlProtect::PROTECT::SET.value,
            general_status_polls: 0,
            rejected_programs: 0,
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Number of control polls before a started command reports done.
    /// `None` leaves the command running forever.
    pub fn set_done_delay(&mut self, polls: Option<u32>) {
        self.done_delay = polls;
    }

    pub fn set_write_protect(&mut self, asserted: bool) {
        let mut ctrl = LocalRegisterCopy::<u32, CtrlProtect::Register>::new(self.ctrl_protect);
        if asserted {
            ctrl.modify(CtrlProtect::EXT_WP::SET);
        } else {
            ctrl.modify(CtrlProtect::EXT_WP::CLEAR);
        }
        self.ctrl_protect = ctrl.get();
    }

    pub fn ctrl_protect(&self) -> u32 {
        self.ctrl_protect
    }

    pub fn burn(&mut self, offset: u32, data: Block) {
        self.fuses.insert(offset, data);
    }

    pub fn fuses(&self, offset: u32) -> Option<Block> {
        self.fuses.get(&offset).copied()
    }

    /// Admin words written with the last program command.
    pub fn prog_admin(&self) -> Block {
        self.prog_admin
    }

    pub fn inject_read_fault(&mut self, offset: u32, status: u32) {
        self.read_faults.insert(offset, status);
    }

    pub fn set_prog_status(&mut self, status: u32) {
        self.prog_status = status;
    }

    pub fn general_status_polls(&self) -> usize {
        self.general_status_polls
    }

    pub fn rejected_programs(&self) -> usize {
        self.rejected_programs
    }

    fn start(&mut self, val: u32) {
        let control = LocalRegisterCopy::<u32, OtpControl::Register>::new(val);
        self.control = val & !OtpControl::DONE::SET.value;
        if !control.is_set(OtpControl::START) {
            return;
        }

        match control.read_as_enum(OtpControl::CMD) {
            Some(OtpControl::CMD::Value::Read) => self.read_block(),
            Some(OtpControl::CMD::Value::Program) => self.program_block(),
            None => panic!("unknown OTP command {val:#x}"),
        }
        self.busy = true;
        self.pending_polls = 0;
    }

    fn read_block(&mut self) {
        self.read_status = self.read_faults.get(&self.address).copied().unwrap_or(0);
        match self.fuses.get(&self.address) {
            Some(data) => {
                self.read_payload = *data;
                self.read_admin = [AdminInfo::VALID::SET.value, 0, 0, 0];
            }
            None => {
                self.read_payload = [0; WORDS_PER_COMMAND];
                self.read_admin = [0; WORDS_PER_COMMAND];
            }
        }
    }

    fn program_block(&mut self) {
        let ctrl = LocalRegisterCopy::<u32, CtrlProtect::Register>::new(self.ctrl_protect);
        if ctrl.is_set(CtrlProtect::PROTECT) || ctrl.is_set(CtrlProtect::EXT_WP) {
            self.rejected_programs += 1;
            return;
        }
        // Fuses only ever go from 0 to 1.
        let block = self
            .fuses
            .entry(self.address)
            .or_insert([0; WORDS_PER_COMMAND]);
        for (fuse, word) in block.iter_mut().zip(self.prog_payload.iter()) {
            *fuse |= *word;
        }
    }

    fn poll_control(&mut self) -> u32 {
        if self.busy {
            match self.done_delay {
                Some(delay) if self.pending_polls >= delay => {
                    self.busy = false;
                    self.control |= OtpControl::DONE::SET.value;
                }
                _ => self.pending_polls += 1,
            }
        }
        self.control
    }
}

impl Bus for OtpPeripheral {
    fn read(&mut self, offset: usize) -> u32 {
        if offset >= Self::CTRL_OFFSET {
            return match offset - Self::CTRL_OFFSET {
                offsets::CTRL_PROTECT => self.ctrl_protect,
                other => panic!("read of unknown OTP control register {other:#x}"),
            };
        }

        match offset {
            offsets::GENERAL_STATUS => {
                self.general_status_polls += 1;
                if self.ready && !self.busy {
                    GeneralStatus::READY::SET.value
                } else {
                    0
                }
            }
            offsets::READ_STATUS => self.read_status,
            offsets::PROG_STATUS => self.prog_status,
            offsets::OTP_ADDRESS => self.address,
            offsets::OTP_CONTROL => self.poll_control(),
            _ => {
                if let Some(i) = offsets::READ_DATA_PAYLOAD.iter().position(|&o| o == offset) {
                    self.read_payload[i]
                } else if let Some(i) = offsets::READ_ADMIN_INFO.iter().position(|&o| o == offset)
                {
                    self.read_admin[i]
                } else {
                    panic!("read of unknown OTP register {offset:#x}")
                }
            }
        }
    }

    fn write(&mut self, offset: usize, val: u32) {
        if offset >= Self::CTRL_OFFSET {
            match offset - Self::CTRL_OFFSET {
                offsets::CTRL_PROTECT => {
                    // The external write-protect pin is not software writable.
                    let wp = CtrlProtect::EXT_WP::SET.value;
                    self.ctrl_protect = (self.ctrl_protect & wp) | (val & !wp);
                }
                other => panic!("write to unknown OTP control register {other:#x}"),
            }
            return;
        }

        match offset {
            offsets::OTP_ADDRESS => self.address = val,
            offsets::OTP_CONTROL => self.start(val),
            _ => {
                if let Some(i) = offsets::PROG_DATA_PAYLOAD.iter().position(|&o| o == offset) {
                    self.prog_payload[i] = val;
                } else if let Some(i) = offsets::PROG_ADMIN_INFO.iter().position(|&o| o == offset)
                {
                    self.prog_admin[i] = val;
                } else {
                    panic!("write of {val:#x} to read-only or unknown OTP register {offset:#x}")
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const CTRL: usize = OtpPeripheral::CTRL_OFFSET;

    fn command(cmd: u32) -> u32 {
        (OtpControl::START::SET + OtpControl::CMD.val(cmd)).value
    }

    #[test]
    fn test_read_programmed_block() {
        let mut otp = OtpPeripheral::new();
        otp.burn(0x1010, [1, 2, 3, 4]);

        otp.write(offsets::OTP_ADDRESS, 0x1010);
        otp.write(offsets::OTP_CONTROL, command(0xF));
        assert_ne!(otp.read(offsets::OTP_CONTROL) & OtpControl::DONE::SET.value, 0);
        assert_eq!(otp.read(offsets::READ_ADMIN_INFO[0]), 1);
        assert_eq!(otp.read(offsets::READ_STATUS), 0);
        let words: Vec<u32> = offsets::READ_DATA_PAYLOAD
            .iter()
            .map(|&o| otp.read(o))
            .collect();
        assert_eq!(words, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_read_blank_block() {
        let mut otp = OtpPeripheral::new();
        otp.write(offsets::OTP_ADDRESS, 0x1020);
        otp.write(offsets::OTP_CONTROL, command(0xF));
        otp.read(offsets::OTP_CONTROL);
        assert_eq!(otp.read(offsets::READ_ADMIN_INFO[0]), 0);
        assert_eq!(otp.read(offsets::READ_DATA_PAYLOAD[0]), 0);
    }

    #[test]
    fn test_program_requires_unlock() {
        let mut otp = OtpPeripheral::new();
        otp.write(offsets::OTP_ADDRESS, 0x1000);
        otp.write(offsets::PROG_DATA_PAYLOAD[0], 0xa5);
        otp.write(offsets::OTP_CONTROL, command(0xA));
        assert_eq!(otp.rejected_programs(), 1);
        assert_eq!(otp.fuses(0x1000), None);

        otp.write(CTRL + offsets::CTRL_PROTECT, 0);
        otp.write(offsets::OTP_CONTROL, command(0xA));
        assert_eq!(otp.fuses(0x1000), Some([0xa5, 0, 0, 0]));
    }

    #[test]
    fn test_program_only_sets_bits() {
        let mut otp = OtpPeripheral::new();
        otp.burn(0x1000, [0xf0, 0, 0, 0]);
        otp.write(CTRL + offsets::CTRL_PROTECT, 0);
        otp.write(offsets::OTP_ADDRESS, 0x1000);
        otp.write(offsets::PROG_DATA_PAYLOAD[0], 0x0f);
        otp.write(offsets::OTP_CONTROL, command(0xA));
        assert_eq!(otp.fuses(0x1000), Some([0xff, 0, 0, 0]));
    }

    #[test]
    fn test_done_delay() {
        let mut otp = OtpPeripheral::new();
        otp.set_done_delay(Some(2));
        otp.write(offsets::OTP_CONTROL, command(0xF));
        let done = OtpControl::DONE::SET.value;
        assert_eq!(otp.read(offsets::OTP_CONTROL) & done, 0);
        assert_eq!(otp.read(offsets::GENERAL_STATUS), 0);
        assert_eq!(otp.read(offsets::OTP_CONTROL) & done, 0);
        assert_eq!(otp.read(offsets::OTP_CONTROL) & done, done);
        assert_eq!(otp.read(offsets::GENERAL_STATUS), 1);
    }

    #[test]
    fn test_layout_follows_platform_block_sizes() {
        assert_eq!(OtpPeripheral::CTRL_OFFSET, 0x1000);
        assert_eq!(OtpPeripheral::SIZE, 0x2000);
    }

    #[test]
    fn test_write_protect_pin_is_read_only() {
        let mut otp = OtpPeripheral::new();
        otp.set_write_protect(true);
        otp.write(CTRL + offsets::CTRL_PROTECT, 0);
        assert_eq!(otp.read(CTRL + offsets::CTRL_PROTECT), 1 << 30);
        otp.set_write_protect(false);
        assert_eq!(otp.ctrl_protect(), 0);
    }
}
