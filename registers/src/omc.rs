// Licensed under the Apache-2.0 license

//! OMC (TrustZone memory filter controller) registers.
//!
//! Every filter owns an identical copy of this block; filter `n` lives at
//! `base + n * filter_stride`.

/// Number of regions implemented by each filter.
pub const NUM_REGIONS: u8 = 17;

/// Distance between consecutive region register groups.
pub const REGION_STRIDE: usize = 0x20;
/// Distance between the read and write fault register groups.
pub const DIRECTION_STRIDE: usize = 0x20;

/// Bytes of one filter's register block, up to and including `CHIP1_SIZE`.
pub const FILTER_BLOCK_SIZE: usize = offsets::CHIP1_SIZE + 4;

/// Regions must start and end (exclusive) on this boundary.
pub const REGION_ALIGN: u64 = 0x1000;

pub mod offsets {
    use super::{DIRECTION_STRIDE, REGION_STRIDE};

    pub const ACTION: usize = 0x1004;

    pub const INT_STATUS: usize = 0x1010;
    pub const INT_CLEAR: usize = 0x1014;
    pub const FAIL_ADDRESS_LOW: usize = 0x1020;
    pub const FAIL_ADDRESS_HIGH: usize = 0x1024;
    pub const FAIL_CONTROL: usize = 0x1028;
    pub const FAIL_ID: usize = 0x102c;

    pub const REGION_BASE_LOW: usize = 0x1100;
    pub const REGION_TOP_LOW: usize = 0x1108;
    pub const REGION_ATTRIBUTES: usize = 0x1110;
    pub const REGION_ID_ACCESS: usize = 0x1114;

    pub const ADDRESS_CTRL0: usize = 0x1f00;
    pub const ADDRESS_CTRL1: usize = 0x1f04;
    pub const REGION0_START: usize = 0x1f10;
    pub const REGION0_END: usize = 0x1f14;
    pub const REGION0_CFG: usize = 0x1f18;
    pub const REGION1_START: usize = 0x1f20;
    pub const REGION1_END: usize = 0x1f24;
    pub const REGION1_CFG: usize = 0x1f28;
    pub const CHIP0_SIZE: usize = 0x1f30;
    pub const CHIP1_SIZE: usize = 0x1f34;

    pub const fn int_status(direction: usize) -> usize {
        INT_STATUS + DIRECTION_STRIDE * direction
    }

    pub const fn fail_address(direction: usize) -> usize {
        FAIL_ADDRESS_LOW + DIRECTION_STRIDE * direction
    }

    pub const fn fail_control(direction: usize) -> usize {
        FAIL_CONTROL + DIRECTION_STRIDE * direction
    }

    pub const fn fail_id(direction: usize) -> usize {
        FAIL_ID + DIRECTION_STRIDE * direction
    }

    pub const fn region_base(region: usize) -> usize {
        REGION_BASE_LOW + REGION_STRIDE * region
    }

    pub const fn region_top(region: usize) -> usize {
        REGION_TOP_LOW + REGION_STRIDE * region
    }

    pub const fn region_attributes(region: usize) -> usize {
        REGION_ATTRIBUTES + REGION_STRIDE * region
    }

    pub const fn region_id_access(region: usize) -> usize {
        REGION_ID_ACCESS + REGION_STRIDE * region
    }
}

pub mod bits {
    use tock_registers::register_bitfields;

    register_bitfields![u32,
        pub Action [
            ACTION OFFSET(0) NUMBITS(2) []
        ],
        pub IntStatus [
            STATUS OFFSET(0) NUMBITS(1) [],
            OVERRUN OFFSET(8) NUMBITS(1) [],
            OVERLAP OFFSET(16) NUMBITS(1) []
        ],
        pub IntClear [
            CLEAR OFFSET(0) NUMBITS(1) []
        ],
        pub FailControl [
            PRIVILEGED OFFSET(20) NUMBITS(1) [],
            NONSECURE OFFSET(21) NUMBITS(1) []
        ],
        pub FailId [
            MID OFFSET(0) NUMBITS(8) [],
            AID OFFSET(8) NUMBITS(20) []
        ],
        pub RegionAttributes [
            FILTER_EN OFFSET(0) NUMBITS(1) [],
            S_RD_EN OFFSET(30) NUMBITS(1) [],
            S_WR_EN OFFSET(31) NUMBITS(1) []
        ],
    ];

    /// Status bits that indicate a latched violation.
    pub const INT_STATUS_MASK: u32 = (1 << 16) | (1 << 8) | (1 << 0);
}
