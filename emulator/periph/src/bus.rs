/*++

Licensed under the Apache-2.0 license.

File Name:

    bus.rs

Abstract:

    File contains the emulated system bus and the MMIO adapter that records
    every register access made by a driver.

--*/

use romtime::Mmio;
use std::cell::RefCell;
use std::rc::Rc;

/// A peripheral that can be attached to the [`SocBus`].
///
/// Offsets are relative to the base the peripheral was attached at.
pub trait Bus {
    fn read(&mut self, offset: usize) -> u32;
    fn write(&mut self, offset: usize, val: u32);
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BusOp {
    Read,
    Write,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Width {
    Word,
    DoubleWord,
}

/// One access observed on the bus, in issue order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BusAccess {
    pub op: BusOp,
    pub width: Width,
    pub addr: usize,
    pub value: u64,
}

impl BusAccess {
    pub const fn write32(addr: usize, value: u32) -> Self {
        Self {
            op: BusOp::Write,
            width: Width::Word,
            addr,
            value: value as u64,
        }
    }

    pub const fn write64(addr: usize, value: u64) -> Self {
        Self {
            op: BusOp::Write,
            width: Width::DoubleWord,
            addr,
            value,
        }
    }
}

struct Mapping {
    base: usize,
    size: usize,
    device: Rc<RefCell<dyn Bus>>,
}

/// Address decoder routing accesses to attached peripherals.
#[derive(Default)]
pub struct SocBus {
    mappings: Vec<Mapping>,
}

impl SocBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `device` at `[base, base + size)`.
    ///
    /// # Panics
    ///
    /// Panics if the range overlaps a device attached earlier.
    pub fn attach(mut self, base: usize, size: usize, device: Rc<RefCell<dyn Bus>>) -> Self {
        assert!(size != 0, "peripheral at {base:#x} cannot be zero-sized");
        for m in self.mappings.iter() {
            assert!(
                !(m.base < base + size && base < m.base + m.size),
                "peripheral at {base:#x} overlaps peripheral at {:#x}",
                m.base
            );
        }
        self.mappings.push(Mapping { base, size, device });
        self
    }

    fn decode(&self, addr: usize) -> (&Rc<RefCell<dyn Bus>>, usize) {
        self.mappings
            .iter()
            .find(|m| addr >= m.base && addr < m.base + m.size)
            .map(|m| (&m.device, addr - m.base))
            .unwrap_or_else(|| panic!("access to unmapped address {addr:#x}"))
    }

    pub fn read(&self, addr: usize) -> u32 {
        let (device, offset) = self.decode(addr);
        device.borrow_mut().read(offset)
    }

    pub fn write(&self, addr: usize, val: u32) {
        let (device, offset) = self.decode(addr);
        device.borrow_mut().write(offset, val)
    }
}

/// An MMIO implementation that reads and writes to a [`SocBus`] and keeps a
/// trace of every access.
///
/// # Panics
///
/// Accesses to addresses no peripheral decodes panic, so a driver bug shows
/// up as a test failure instead of a silently ignored write.
pub struct BusMmio {
    bus: SocBus,
    trace: RefCell<Vec<BusAccess>>,
}

impl BusMmio {
    pub fn new(bus: SocBus) -> Self {
        Self {
            bus,
            trace: RefCell::new(Vec::new()),
        }
    }

    pub fn trace(&self) -> Vec<BusAccess> {
        self.trace.borrow().clone()
    }

    pub fn writes(&self) -> Vec<BusAccess> {
        self.trace
            .borrow()
            .iter()
            .filter(|a| a.op == BusOp::Write)
            .copied()
            .collect()
    }

    pub fn reads_of(&self, addr: usize) -> usize {
        self.trace
            .borrow()
            .iter()
            .filter(|a| a.op == BusOp::Read && a.addr == addr)
            .count()
    }

    pub fn clear_trace(&self) {
        self.trace.borrow_mut().clear();
    }

    fn record(&self, op: BusOp, width: Width, addr: usize, value: u64) {
        self.trace.borrow_mut().push(BusAccess {
            op,
            width,
            addr,
            value,
        });
    }
}

impl Mmio for BusMmio {
    fn read32(&self, addr: usize) -> u32 {
        let val = self.bus.read(addr);
        self.record(BusOp::Read, Width::Word, addr, u64::from(val));
        val
    }

    fn write32(&self, addr: usize, val: u32) {
        self.record(BusOp::Write, Width::Word, addr, u64::from(val));
        self.bus.write(addr, val)
    }

    fn read64(&self, addr: usize) -> u64 {
        let val = u64::from(self.bus.read(addr)) | (u64::from(self.bus.read(addr + 4)) << 32);
        self.record(BusOp::Read, Width::DoubleWord, addr, val);
        val
    }

    fn write64(&self, addr: usize, val: u64) {
        self.record(BusOp::Write, Width::DoubleWord, addr, val);
        self.bus.write(addr, val as u32);
        self.bus.write(addr + 4, (val >> 32) as u32);
    }
}
