// Licensed under the Apache-2.0 license

use thiserror::Error;

pub type TccResult<T> = Result<T, TccError>;

/// Why a configuration request was refused.
///
/// These are caller contract violations. They are never caused by the
/// hardware and repeating the same request cannot succeed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum ConfigFault {
    #[error("base address is null")]
    NullBase,
    #[error("filter count {0} is not supported")]
    InvalidFilterCount(u8),
    #[error("filter mask {filters:#x} overflows {filter_count} filters")]
    FilterMaskOverflow { filters: u32, filter_count: u8 },
    #[error("{filter_count} filters with stride {stride:#x} overflow the address space")]
    FilterStrideOverflow { stride: usize, filter_count: u8 },
    #[error("filter {0} is out of range")]
    FilterOutOfRange(u8),
    #[error("region {0} is out of range")]
    RegionOutOfRange(u8),
    #[error("region base {base:#x} or top {top:#x} + 1 is not 4KB aligned")]
    Misaligned { base: u64, top: u64 },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum TccError {
    /// Unrecoverable programming error. The embedding system decides whether
    /// to halt; it must not retry.
    #[error("configuration fault: {0}")]
    ConfigurationFault(ConfigFault),
    #[error("bad parameters")]
    BadParameters,
    #[error("external write protect is asserted")]
    WriteProtected,
    #[error("bad state")]
    BadState,
    #[error("no data")]
    NoData,
    #[error("timed out waiting for hardware")]
    Timeout,
}

impl TccError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, TccError::ConfigurationFault(_))
    }
}

impl From<ConfigFault> for TccError {
    fn from(fault: ConfigFault) -> Self {
        TccError::ConfigurationFault(fault)
    }
}
