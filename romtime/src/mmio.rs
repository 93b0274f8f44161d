// Licensed under the Apache-2.0 license

use core::ptr::{read_volatile, write_volatile};

/// Register access used by the drivers.
///
/// Addresses are absolute (block base plus register offset). Drivers never
/// dereference device memory directly, so the same driver code runs against
/// real hardware through [`RealMmio`] and against an emulated bus in tests.
pub trait Mmio {
    fn read32(&self, addr: usize) -> u32;

    fn write32(&self, addr: usize, val: u32);

    /// Reads a 64-bit register pair. The default issues the low word first.
    fn read64(&self, addr: usize) -> u64 {
        let lo = self.read32(addr);
        let hi = self.read32(addr + 4);
        u64::from(lo) | (u64::from(hi) << 32)
    }

    /// Writes a 64-bit register pair. The default issues the low word first.
    fn write64(&self, addr: usize, val: u64) {
        self.write32(addr, val as u32);
        self.write32(addr + 4, (val >> 32) as u32);
    }

    fn set_bits32(&self, addr: usize, mask: u32) {
        let val = self.read32(addr);
        self.write32(addr, val | mask);
    }

    fn clear_bits32(&self, addr: usize, mask: u32) {
        let val = self.read32(addr);
        self.write32(addr, val & !mask);
    }
}

impl<T: Mmio + ?Sized> Mmio for &T {
    fn read32(&self, addr: usize) -> u32 {
        (**self).read32(addr)
    }

    fn write32(&self, addr: usize, val: u32) {
        (**self).write32(addr, val)
    }

    fn read64(&self, addr: usize) -> u64 {
        (**self).read64(addr)
    }

    fn write64(&self, addr: usize, val: u64) {
        (**self).write64(addr, val)
    }

    fn set_bits32(&self, addr: usize, mask: u32) {
        (**self).set_bits32(addr, mask)
    }

    fn clear_bits32(&self, addr: usize, mask: u32) {
        (**self).clear_bits32(addr, mask)
    }
}

/// Volatile access to mapped device memory.
#[derive(Debug)]
pub struct RealMmio {
    _private: (), // ensure that this struct cannot be instantiated directly except through new
}

impl RealMmio {
    /// # Safety
    ///
    /// Every address later passed to this accessor must be a mapped, suitably
    /// aligned device register that no other code accesses concurrently.
    pub const unsafe fn new() -> Self {
        RealMmio { _private: () }
    }
}

impl Mmio for RealMmio {
    fn read32(&self, addr: usize) -> u32 {
        // Safety: upheld by the caller of `RealMmio::new`.
        unsafe { read_volatile(addr as *const u32) }
    }

    fn write32(&self, addr: usize, val: u32) {
        // Safety: upheld by the caller of `RealMmio::new`.
        unsafe { write_volatile(addr as *mut u32, val) }
    }

    fn read64(&self, addr: usize) -> u64 {
        // Safety: upheld by the caller of `RealMmio::new`.
        unsafe { read_volatile(addr as *const u64) }
    }

    fn write64(&self, addr: usize, val: u64) {
        // Safety: upheld by the caller of `RealMmio::new`.
        unsafe { write_volatile(addr as *mut u64, val) }
    }
}
