// Licensed under the Apache-2.0 license

//! Driver for the Telechips OMC, the TrustZone memory filter controller.
//!
//! The controller sits in front of DRAM as a set of identical bus filters.
//! Each filter has [`NUM_REGIONS`] programmable regions and its own fault
//! latch for read and write accesses. A region is programmed on every filter
//! at once; the filter-enable bit of the region decides which filters enforce
//! it. Secure accesses are always allowed; non-secure access is granted per
//! device through the id-access mask.
//!
//! # Legacy address extension
//!
//! When the upper 32 bits of a region base or top are zero, the driver ORs
//! in the filter's `REGION0_START` strap shifted left by 8 before writing.
//! Platforms that hand 32-bit addresses to the driver rely on this. A caller
//! that really means an address below 4GB therefore cannot express it when
//! the strap is non-zero.

#![cfg_attr(not(test), no_std)]

mod region;
mod violation;

pub use region::{Direction, OmcAction, OmcRegionConfig};
pub use violation::{AddressMap, Violation};

use log::{debug, error, info};
use romtime::{ConfigFault, HexWord, Mmio, TccError, TccResult};
use tcc_config::{OmcConfig, OMC_MAX_FILTERS};
use tcc_registers::omc::bits::{Action, IntClear, RegionAttributes, INT_STATUS_MASK};
use tcc_registers::omc::{offsets, FILTER_BLOCK_SIZE, NUM_REGIONS, REGION_ALIGN};
use tock_registers::LocalRegisterCopy;

pub struct Omc<M: Mmio> {
    mmio: M,
    base: usize,
    filter_stride: usize,
    filter_count: u8,
}

impl<M: Mmio> Omc<M> {
    /// Fails with a configuration fault for a zero base, a filter count
    /// outside `1..=8`, or a stride that puts a filter block past the end of
    /// the address space.
    pub fn new(mmio: M, config: OmcConfig) -> TccResult<Self> {
        if config.base == 0 {
            return Err(Self::fault(ConfigFault::NullBase));
        }
        if config.filter_count == 0 || config.filter_count > OMC_MAX_FILTERS {
            return Err(Self::fault(ConfigFault::InvalidFilterCount(
                config.filter_count,
            )));
        }
        // The last filter block must be addressable.
        let last_block_end = config
            .filter_stride
            .checked_mul(usize::from(config.filter_count - 1))
            .and_then(|offset| config.base.checked_add(offset))
            .and_then(|block| block.checked_add(FILTER_BLOCK_SIZE));
        if last_block_end.is_none() {
            return Err(Self::fault(ConfigFault::FilterStrideOverflow {
                stride: config.filter_stride,
                filter_count: config.filter_count,
            }));
        }

        debug!(
            "[tcc-omc] {} filters at {:#x}, stride {:#x}",
            config.filter_count, config.base, config.filter_stride
        );
        Ok(Self {
            mmio,
            base: config.base,
            filter_stride: config.filter_stride,
            filter_count: config.filter_count,
        })
    }

    pub fn filter_count(&self) -> u8 {
        self.filter_count
    }

    pub fn region_count(&self) -> u8 {
        NUM_REGIONS
    }

    fn fault(fault: ConfigFault) -> TccError {
        error!("[tcc-omc] {}", fault);
        TccError::from(fault)
    }

    fn filter_base(&self, filter: u8) -> usize {
        self.base + self.filter_stride * usize::from(filter)
    }

    fn check_filter(&self, filter: u8) -> TccResult<()> {
        if filter >= self.filter_count {
            return Err(Self::fault(ConfigFault::FilterOutOfRange(filter)));
        }
        Ok(())
    }

    fn validate(&self, region: u8, config: &OmcRegionConfig) -> TccResult<()> {
        if config.filters >> self.filter_count != 0 {
            return Err(Self::fault(ConfigFault::FilterMaskOverflow {
                filters: config.filters,
                filter_count: self.filter_count,
            }));
        }
        if region >= NUM_REGIONS {
            return Err(Self::fault(ConfigFault::RegionOutOfRange(region)));
        }
        if (config.base | config.top.wrapping_add(1)) & (REGION_ALIGN - 1) != 0 {
            return Err(Self::fault(ConfigFault::Misaligned {
                base: config.base,
                top: config.top,
            }));
        }
        Ok(())
    }

    fn extend_legacy(&self, filter_base: usize, addr: u64) -> u64 {
        if addr >> 32 != 0 {
            return addr;
        }
        addr | (u64::from(self.mmio.read32(filter_base + offsets::REGION0_START)) << 8)
    }

    fn write_region(&self, region: u8, config: &OmcRegionConfig) {
        let region_offset = usize::from(region);
        debug!(
            "[tcc-omc] region {}: [{:#x}, {:#x}] filters {:#x} ns access {}",
            region,
            config.base,
            config.top,
            config.filters,
            HexWord(config.ns_device_access)
        );

        for filter in 0..self.filter_count {
            let filter_base = self.filter_base(filter);

            let base = self.extend_legacy(filter_base, config.base);
            self.mmio
                .write64(filter_base + offsets::region_base(region_offset), base);
            let top = self.extend_legacy(filter_base, config.top);
            self.mmio
                .write64(filter_base + offsets::region_top(region_offset), top);

            let enable = if config.is_enabled_on(filter) {
                RegionAttributes::FILTER_EN::SET
            } else {
                RegionAttributes::FILTER_EN::CLEAR
            };
            let attributes =
                RegionAttributes::S_WR_EN::SET + RegionAttributes::S_RD_EN::SET + enable;
            self.mmio.write32(
                filter_base + offsets::region_attributes(region_offset),
                attributes.value,
            );
            self.mmio.write32(
                filter_base + offsets::region_id_access(region_offset),
                config.ns_device_access,
            );
        }
    }

    /// Programs `region` on every filter.
    ///
    /// Nothing is written unless the filter mask, region index and alignment
    /// are all valid.
    pub fn configure_region(&self, region: u8, config: &OmcRegionConfig) -> TccResult<()> {
        self.validate(region, config)?;
        self.write_region(region, config);
        Ok(())
    }

    /// Programs several regions, validating all of them before the first write.
    pub fn configure_regions(&self, regions: &[(u8, OmcRegionConfig)]) -> TccResult<()> {
        for (region, config) in regions.iter() {
            self.validate(*region, config)?;
        }
        for (region, config) in regions.iter() {
            self.write_region(*region, config);
        }
        Ok(())
    }

    /// Sets the violation action of every filter.
    pub fn set_action(&self, action: OmcAction) {
        let value = Action::ACTION.val(action as u32).value;
        for filter in 0..self.filter_count {
            self.mmio
                .write32(self.filter_base(filter) + offsets::ACTION, value);
        }
    }

    pub fn action(&self, filter: u8) -> TccResult<OmcAction> {
        self.check_filter(filter)?;
        let reg = LocalRegisterCopy::<u32, Action::Register>::new(
            self.mmio.read32(self.filter_base(filter) + offsets::ACTION),
        );
        OmcAction::try_from(reg.read(Action::ACTION)).map_err(|_| TccError::BadState)
    }

    fn read_violation(&self, filter: u8, direction: Direction) -> Option<Violation> {
        let filter_base = self.filter_base(filter);
        let dir = direction.index();

        let status = self.mmio.read32(filter_base + offsets::int_status(dir));
        if status & INT_STATUS_MASK == 0 {
            return None;
        }
        let control = self.mmio.read32(filter_base + offsets::fail_control(dir));
        let address = self.mmio.read64(filter_base + offsets::fail_address(dir));
        let id = self.mmio.read32(filter_base + offsets::fail_id(dir));
        Some(Violation::decode(
            filter, direction, status, control, address, id,
        ))
    }

    /// Latched violations of `filter`, indexed by [`Direction::index`].
    pub fn violations(&self, filter: u8) -> TccResult<[Option<Violation>; 2]> {
        self.check_filter(filter)?;
        Ok(Direction::ALL.map(|direction| self.read_violation(filter, direction)))
    }

    /// Logs the latched violations of `filter`. The latch is left untouched.
    pub fn fail_dump(&self, filter: u8) {
        if filter >= self.filter_count {
            error!(
                "[tcc-omc] cannot dump filter {}: {} filters",
                filter, self.filter_count
            );
            return;
        }

        for direction in Direction::ALL {
            let Some(violation) = self.read_violation(filter, direction) else {
                continue;
            };
            if violation.overlap {
                error!("[tcc-omc] Overlap violation on filter {}", filter);
            }
            if violation.overrun {
                error!("[tcc-omc] Overrun violation on filter {}", filter);
            }
            if violation.permission {
                error!("[tcc-omc] Permission violation on filter {}", filter);
            }
            error!("[tcc-omc] {}", violation);
        }
    }

    /// Acknowledges the violation latch of `filter`.
    pub fn int_clear(&self, filter: u8) -> TccResult<()> {
        self.check_filter(filter)?;
        self.mmio.write32(
            self.filter_base(filter) + offsets::INT_CLEAR,
            IntClear::CLEAR::SET.value,
        );
        Ok(())
    }

    pub fn address_map(&self, filter: u8) -> TccResult<AddressMap> {
        self.check_filter(filter)?;
        let filter_base = self.filter_base(filter);
        let read = |offset| self.mmio.read32(filter_base + offset);
        Ok(AddressMap {
            address_ctrl: [read(offsets::ADDRESS_CTRL0), read(offsets::ADDRESS_CTRL1)],
            region0_start: read(offsets::REGION0_START),
            region0_end: read(offsets::REGION0_END),
            region0_cfg: read(offsets::REGION0_CFG),
            region1_start: read(offsets::REGION1_START),
            region1_end: read(offsets::REGION1_END),
            region1_cfg: read(offsets::REGION1_CFG),
            chip_size: [read(offsets::CHIP0_SIZE), read(offsets::CHIP1_SIZE)],
        })
    }

    pub fn dump_address_map(&self, filter: u8) -> TccResult<()> {
        let map = self.address_map(filter)?;
        info!(
            "[tcc-omc] filter {} address ctrl {} {}",
            filter,
            HexWord(map.address_ctrl[0]),
            HexWord(map.address_ctrl[1])
        );
        info!(
            "[tcc-omc] region0 {} - {} cfg {}",
            HexWord(map.region0_start),
            HexWord(map.region0_end),
            HexWord(map.region0_cfg)
        );
        info!(
            "[tcc-omc] region1 {} - {} cfg {}",
            HexWord(map.region1_start),
            HexWord(map.region1_end),
            HexWord(map.region1_cfg)
        );
        info!(
            "[tcc-omc] chip size {} {}",
            HexWord(map.chip_size[0]),
            HexWord(map.chip_size[1])
        );
        Ok(())
    }
}
