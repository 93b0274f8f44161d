// Licensed under the Apache-2.0 license

use crate::Direction;
use core::fmt;
use tcc_registers::omc::bits::{FailControl, FailId, IntStatus};
use tock_registers::LocalRegisterCopy;

/// Decoded fault registers of one filter and direction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Violation {
    pub filter: u8,
    pub direction: Direction,
    pub overlap: bool,
    pub overrun: bool,
    pub permission: bool,
    pub fault_address: u64,
    pub non_secure: bool,
    pub privileged: bool,
    pub master_id: u8,
    pub access_id: u32,
}

impl Violation {
    pub(crate) fn decode(
        filter: u8,
        direction: Direction,
        status: u32,
        control: u32,
        fault_address: u64,
        id: u32,
    ) -> Self {
        let status = LocalRegisterCopy::<u32, IntStatus::Register>::new(status);
        let control = LocalRegisterCopy::<u32, FailControl::Register>::new(control);
        let id = LocalRegisterCopy::<u32, FailId::Register>::new(id);
        Self {
            filter,
            direction,
            overlap: status.is_set(IntStatus::OVERLAP),
            overrun: status.is_set(IntStatus::OVERRUN),
            permission: status.is_set(IntStatus::STATUS),
            fault_address,
            non_secure: control.is_set(FailControl::NONSECURE),
            privileged: control.is_set(FailControl::PRIVILEGED),
            master_id: id.read(FailId::MID) as u8,
            access_id: id.read(FailId::AID),
        }
    }
}

/// The summary line: `Violation @0x<addr>, <sec> <priv> <dir>, MID <mid>, AID <aid>`.
impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Violation @0x{:x}, {} {} {}, MID {:02x}, AID {:x}",
            self.fault_address,
            if self.non_secure { "non-secure" } else { "secure" },
            if self.privileged {
                "privileged"
            } else {
                "unprivileged"
            },
            self.direction.as_str(),
            self.master_id,
            self.access_id,
        )
    }
}

/// DRAM address-map control block, programmed by the boot ROM.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AddressMap {
    pub address_ctrl: [u32; 2],
    pub region0_start: u32,
    pub region0_end: u32,
    pub region0_cfg: u32,
    pub region1_start: u32,
    pub region1_end: u32,
    pub region1_cfg: u32,
    pub chip_size: [u32; 2],
}
