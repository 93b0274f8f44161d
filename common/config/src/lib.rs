// Licensed under the Apache-2.0 license

//! Platform configuration for the Telechips secure-world drivers.
//!
//! The memory map is supplied by the platform bring-up code after the
//! enclosing kernel has mapped the device regions. Addresses are virtual
//! addresses of the mapped register blocks.

#![no_std]

/// Size of the OTP command register block.
pub const OTP_CMD_SIZE: usize = 0x1000;
/// Size of the OTP control (write-protect) register block.
pub const OTP_CTRL_SIZE: usize = 0x1000;

/// First OTPROM offset accessible through the 128-bit command interface.
pub const OTPROM_128_START: u32 = 0x1000;
/// End (exclusive) of the OTPROM 128-bit window.
pub const OTPROM_128_LIMIT: u32 = 0x2000;

/// Maximum number of OMC filters addressable by the filter-enable mask.
pub const OMC_MAX_FILTERS: u8 = 8;

/// OMC instance parameters.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OmcConfig {
    /// Address of filter 0's register block.
    pub base: usize,
    /// Distance in bytes between consecutive filter register blocks.
    pub filter_stride: usize,
    /// Number of filters behind this controller.
    pub filter_count: u8,
}

/// OTP controller parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OtpConfig {
    pub cmd_base: usize,
    pub ctrl_base: usize,
    pub rom_128_start: u32,
    pub rom_128_limit: u32,
}

impl OtpConfig {
    /// OTP configuration using the standard OTPROM 128-bit window.
    pub const fn new(cmd_base: usize, ctrl_base: usize) -> Self {
        Self {
            cmd_base,
            ctrl_base,
            rom_128_start: OTPROM_128_START,
            rom_128_limit: OTPROM_128_LIMIT,
        }
    }
}

/// Where the secure-world drivers find their register blocks.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TccMemoryMap {
    pub omc_offset: usize,
    pub omc_filter_stride: usize,
    pub omc_filter_count: u8,

    pub otp_cmd_offset: usize,
    pub otp_ctrl_offset: usize,
}

impl TccMemoryMap {
    pub const fn omc(&self) -> OmcConfig {
        OmcConfig {
            base: self.omc_offset,
            filter_stride: self.omc_filter_stride,
            filter_count: self.omc_filter_count,
        }
    }

    pub const fn otp(&self) -> OtpConfig {
        OtpConfig::new(self.otp_cmd_offset, self.otp_ctrl_offset)
    }
}
