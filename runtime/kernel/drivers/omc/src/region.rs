// Licensed under the Apache-2.0 license

use tcc_registers::omc::REGION_ALIGN;

/// What a filter does when it detects a violation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum OmcAction {
    None = 0,
    Error = 1,
    Interrupt = 2,
    ErrorAndInterrupt = 3,
}

impl TryFrom<u32> for OmcAction {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, u32> {
        match value {
            0 => Ok(OmcAction::None),
            1 => Ok(OmcAction::Error),
            2 => Ok(OmcAction::Interrupt),
            3 => Ok(OmcAction::ErrorAndInterrupt),
            _ => Err(value),
        }
    }
}

/// Access direction of a fault register group.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Read = 0,
    Write = 1,
}

impl Direction {
    /// Order in which fault groups are inspected.
    pub const ALL: [Direction; 2] = [Direction::Read, Direction::Write];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Read => "read",
            Direction::Write => "write",
        }
    }
}

/// One protected address range.
///
/// `top` is inclusive. Both `base` and `top + 1` must be 4KB aligned.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OmcRegionConfig {
    /// Bit `n` enables the region on filter `n`.
    pub filters: u32,
    pub base: u64,
    pub top: u64,
    /// Non-secure device access mask, written verbatim.
    pub ns_device_access: u32,
}

impl OmcRegionConfig {
    /// A region covering `[base, top]` enabled on every filter in `filters`,
    /// closed to non-secure devices.
    pub const fn new(filters: u32, base: u64, top: u64) -> Self {
        Self {
            filters,
            base,
            top,
            ns_device_access: 0,
        }
    }

    /// Enables the region on the filters numbered in `filters`.
    ///
    /// A filter number that does not fit the 32-bit mask saturates it, so
    /// configuring the region fails with a filter mask overflow.
    pub fn with_filters(mut self, filters: &[u8]) -> Self {
        self.filters = filters.iter().fold(0, |mask, &f| {
            mask | 1u32.checked_shl(u32::from(f)).unwrap_or(u32::MAX)
        });
        self
    }

    pub const fn with_ns_device_access(mut self, ns_device_access: u32) -> Self {
        self.ns_device_access = ns_device_access;
        self
    }

    /// Size in bytes, wrapping to 0 for a region covering the whole 64-bit space.
    pub const fn size(&self) -> u64 {
        self.top.wrapping_sub(self.base).wrapping_add(1)
    }

    pub const fn is_aligned(&self) -> bool {
        (self.base | self.top.wrapping_add(1)) & (REGION_ALIGN - 1) == 0
    }

    pub const fn is_enabled_on(&self, filter: u8) -> bool {
        filter < 32 && self.filters & (1 << filter) != 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_action_codes() {
        for action in [
            OmcAction::None,
            OmcAction::Error,
            OmcAction::Interrupt,
            OmcAction::ErrorAndInterrupt,
        ] {
            assert_eq!(OmcAction::try_from(action as u32), Ok(action));
        }
        assert_eq!(OmcAction::try_from(4), Err(4));
    }

    #[test]
    fn test_region_helpers() {
        let region = OmcRegionConfig::new(0, 0x8000_0000, 0x8fff_ffff).with_filters(&[0, 2, 3]);
        assert_eq!(region.filters, 0b1101);
        assert_eq!(region.size(), 0x1000_0000);
        assert!(region.is_aligned());
        assert!(region.is_enabled_on(2));
        assert!(!region.is_enabled_on(1));

        let whole = OmcRegionConfig::new(1, 0, u64::MAX);
        assert!(whole.is_aligned());
        assert_eq!(whole.size(), 0);

        assert!(!OmcRegionConfig::new(1, 0x800, 0x1fff).is_aligned());
        assert!(!OmcRegionConfig::new(1, 0x1000, 0x1ffe).is_aligned());
    }

    #[test]
    fn test_with_filters_out_of_mask_saturates() {
        let region = OmcRegionConfig::new(0, 0, 0xfff).with_filters(&[40]);
        assert_eq!(region.filters, u32::MAX);
        assert_eq!(
            OmcRegionConfig::new(0, 0, 0xfff).with_filters(&[31]).filters,
            1 << 31
        );
    }
}
