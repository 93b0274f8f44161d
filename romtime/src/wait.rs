// Licensed under the Apache-2.0 license

//! Polling primitives for hardware handshakes.
//!
//! Drivers never loop on a register themselves; they hand a predicate to a
//! [`Wait`] implementation chosen by the platform. [`Spin`] reproduces the
//! hardware-bounded busy wait, [`BoundedSpin`] gives up after a fixed number
//! of polls so an embedding system can impose its own deadline.

use crate::{TccError, TccResult};

pub trait Wait {
    /// Polls `predicate` until it returns true.
    fn until<F>(&self, predicate: F) -> TccResult<()>
    where
        F: FnMut() -> bool;
}

impl<T: Wait + ?Sized> Wait for &T {
    fn until<F>(&self, predicate: F) -> TccResult<()>
    where
        F: FnMut() -> bool,
    {
        (**self).until(predicate)
    }
}

/// Unbounded busy wait. Never returns an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct Spin;

impl Wait for Spin {
    fn until<F>(&self, mut predicate: F) -> TccResult<()>
    where
        F: FnMut() -> bool,
    {
        while !predicate() {
            core::hint::spin_loop();
        }
        Ok(())
    }
}

/// Busy wait that fails with [`TccError::Timeout`] after `max_polls` checks.
#[derive(Clone, Copy, Debug)]
pub struct BoundedSpin {
    max_polls: u32,
}

impl BoundedSpin {
    pub const fn new(max_polls: u32) -> Self {
        Self { max_polls }
    }

    pub const fn max_polls(&self) -> u32 {
        self.max_polls
    }
}

impl Wait for BoundedSpin {
    fn until<F>(&self, mut predicate: F) -> TccResult<()>
    where
        F: FnMut() -> bool,
    {
        for _ in 0..self.max_polls {
            if predicate() {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(TccError::Timeout)
    }
}
