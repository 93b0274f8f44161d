/*++

Licensed under the Apache-2.0 license.

File Name:

    omc.rs

Abstract:

    File contains the OMC memory filter controller peripheral emulation.

--*/

use crate::bus::Bus;
use std::collections::BTreeMap;
use tcc_registers::omc::bits::{IntClear, IntStatus};
use tcc_registers::omc::{offsets, DIRECTION_STRIDE, FILTER_BLOCK_SIZE, NUM_REGIONS};
use tock_registers::LocalRegisterCopy;

/// Fault latched by the emulated filter for one access direction.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct InjectedViolation {
    pub status: u32,
    pub address: u64,
    pub control: u32,
    pub id: u32,
}

/// Register contents of one region of one filter.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RegionState {
    pub base: u64,
    pub top: u64,
    pub attributes: u32,
    pub id_access: u32,
}

#[derive(Default)]
struct FilterRegs {
    words: BTreeMap<usize, u32>,
    int_clears: usize,
}

impl FilterRegs {
    fn get(&self, offset: usize) -> u32 {
        self.words.get(&offset).copied().unwrap_or(0)
    }

    fn get64(&self, offset: usize) -> u64 {
        u64::from(self.get(offset)) | (u64::from(self.get(offset + 4)) << 32)
    }

    fn set(&mut self, offset: usize, val: u32) {
        self.words.insert(offset, val);
    }

    fn set64(&mut self, offset: usize, val: u64) {
        self.set(offset, val as u32);
        self.set(offset + 4, (val >> 32) as u32);
    }
}

/// Emulates `filter_count` identical filter register blocks spaced
/// `filter_stride` bytes apart.
///
/// Fault registers are read-only from the bus and are only changed through
/// [`OmcPeripheral::inject_violation`]. Writing 1 to `INT_CLEAR` drops the
/// latched status of both directions.
pub struct OmcPeripheral {
    filter_stride: usize,
    filters: Vec<FilterRegs>,
}

impl OmcPeripheral {
    pub fn new(filter_count: usize, filter_stride: usize) -> Self {
        assert!(
            filter_stride >= FILTER_BLOCK_SIZE,
            "filter stride {filter_stride:#x} is smaller than the register block"
        );
        Self {
            filter_stride,
            filters: (0..filter_count).map(|_| FilterRegs::default()).collect(),
        }
    }

    /// Bus size covering every filter block.
    pub fn size(&self) -> usize {
        self.filter_stride * self.filters.len()
    }

    /// Sets the strap value the drivers use to extend 32-bit region addresses.
    pub fn set_region0_start(&mut self, filter: usize, val: u32) {
        self.filters[filter].set(offsets::REGION0_START, val);
    }

    /// Sets a raw register, bypassing bus semantics.
    pub fn poke(&mut self, filter: usize, offset: usize, val: u32) {
        self.filters[filter].set(offset, val);
    }

    pub fn peek(&self, filter: usize, offset: usize) -> u32 {
        self.filters[filter].get(offset)
    }

    pub fn inject_violation(&mut self, filter: usize, direction: usize, fault: InjectedViolation) {
        let regs = &mut self.filters[filter];
        let dir_offset = DIRECTION_STRIDE * direction;
        regs.set(offsets::INT_STATUS + dir_offset, fault.status);
        regs.set64(offsets::FAIL_ADDRESS_LOW + dir_offset, fault.address);
        regs.set(offsets::FAIL_CONTROL + dir_offset, fault.control);
        regs.set(offsets::FAIL_ID + dir_offset, fault.id);
    }

    pub fn region(&self, filter: usize, region: usize) -> RegionState {
        let regs = &self.filters[filter];
        RegionState {
            base: regs.get64(offsets::region_base(region)),
            top: regs.get64(offsets::region_top(region)),
            attributes: regs.get(offsets::region_attributes(region)),
            id_access: regs.get(offsets::region_id_access(region)),
        }
    }

    pub fn action(&self, filter: usize) -> u32 {
        self.filters[filter].get(offsets::ACTION)
    }

    pub fn int_status(&self, filter: usize, direction: usize) -> u32 {
        self.filters[filter].get(offsets::int_status(direction))
    }

    pub fn int_clears(&self, filter: usize) -> usize {
        self.filters[filter].int_clears
    }

    fn is_fault_register(offset: usize) -> bool {
        (0..2).any(|dir| {
            let dir_offset = DIRECTION_STRIDE * dir;
            offset == offsets::INT_STATUS + dir_offset
                || offset == offsets::FAIL_ADDRESS_LOW + dir_offset
                || offset == offsets::FAIL_ADDRESS_HIGH + dir_offset
                || offset == offsets::FAIL_CONTROL + dir_offset
                || offset == offsets::FAIL_ID + dir_offset
        })
    }

    fn is_region_register(offset: usize) -> bool {
        let last = offsets::region_id_access(usize::from(NUM_REGIONS) - 1);
        (offsets::REGION_BASE_LOW..=last).contains(&offset)
    }
}

impl Bus for OmcPeripheral {
    fn read(&mut self, offset: usize) -> u32 {
        let filter = offset / self.filter_stride;
        let reg = offset % self.filter_stride;
        match reg {
            // Write-only.
            offsets::INT_CLEAR => 0,
            _ => self.filters[filter].get(reg),
        }
    }

    fn write(&mut self, offset: usize, val: u32) {
        let filter = offset / self.filter_stride;
        let reg = offset % self.filter_stride;
        let regs = &mut self.filters[filter];

        if reg == offsets::INT_CLEAR {
            let clear = LocalRegisterCopy::<u32, IntClear::Register>::new(val);
            if clear.is_set(IntClear::CLEAR) {
                regs.int_clears += 1;
                for dir in 0..2 {
                    let status = offsets::int_status(dir);
                    let mut latched =
                        LocalRegisterCopy::<u32, IntStatus::Register>::new(regs.get(status));
                    latched.modify(
                        IntStatus::STATUS::CLEAR
                            + IntStatus::OVERRUN::CLEAR
                            + IntStatus::OVERLAP::CLEAR,
                    );
                    regs.set(status, latched.get());
                }
            }
            return;
        }

        if Self::is_fault_register(reg) {
            panic!("write to read-only OMC fault register {reg:#x}");
        }

        if reg == offsets::ACTION || Self::is_region_register(reg) {
            regs.set(reg, val);
        } else {
            // Address-map registers are owned by the boot ROM.
            panic!("unexpected OMC write {val:#x} to {reg:#x}");
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const STRIDE: usize = 0x2000;

    #[test]
    fn test_filters_are_independent() {
        let mut omc = OmcPeripheral::new(2, STRIDE);
        omc.write(offsets::ACTION, 1);
        omc.write(STRIDE + offsets::ACTION, 3);
        assert_eq!(omc.action(0), 1);
        assert_eq!(omc.action(1), 3);
        assert_eq!(omc.size(), 2 * STRIDE);
    }

    #[test]
    fn test_region_words_assemble() {
        let mut omc = OmcPeripheral::new(1, STRIDE);
        omc.write(offsets::region_base(2), 0x8000_0000);
        omc.write(offsets::region_base(2) + 4, 0x1);
        omc.write(offsets::region_top(2), 0x8fff_ffff);
        omc.write(offsets::region_attributes(2), 0xc000_0001);
        omc.write(offsets::region_id_access(2), 0xff);
        assert_eq!(
            omc.region(0, 2),
            RegionState {
                base: 0x1_8000_0000,
                top: 0x8fff_ffff,
                attributes: 0xc000_0001,
                id_access: 0xff,
            }
        );
        assert_eq!(omc.peek(0, offsets::region_base(2) + 4), 0x1);
        assert_eq!(omc.peek(0, offsets::region_top(2) + 4), 0);
    }

    #[test]
    fn test_int_clear_drops_latched_status() {
        let mut omc = OmcPeripheral::new(2, STRIDE);
        let fault = InjectedViolation {
            status: (1 << 16) | 1,
            address: 0x4000_1000,
            control: 1 << 21,
            id: 0x12345,
        };
        omc.inject_violation(1, 0, fault);
        omc.inject_violation(1, 1, fault);
        assert_eq!(omc.read(STRIDE + offsets::int_status(0)), (1 << 16) | 1);

        omc.write(STRIDE + offsets::INT_CLEAR, 1);
        assert_eq!(omc.int_status(1, 0), 0);
        assert_eq!(omc.int_status(1, 1), 0);
        assert_eq!(omc.int_clears(1), 1);
        assert_eq!(omc.int_clears(0), 0);
        // The fault address is kept for inspection.
        assert_eq!(omc.read(STRIDE + offsets::fail_address(0)), 0x4000_1000);
    }

    #[test]
    fn test_int_clear_without_clear_bit_is_ignored() {
        let mut omc = OmcPeripheral::new(1, STRIDE);
        omc.inject_violation(
            0,
            1,
            InjectedViolation {
                status: 1 << 8,
                ..Default::default()
            },
        );
        omc.write(offsets::INT_CLEAR, 0);
        assert_eq!(omc.int_status(0, 1), 1 << 8);
        assert_eq!(omc.int_clears(0), 0);
    }

    #[test]
    #[should_panic(expected = "read-only")]
    fn test_fault_registers_are_read_only() {
        let mut omc = OmcPeripheral::new(1, STRIDE);
        omc.write(offsets::fail_id(1), 0);
    }
}
