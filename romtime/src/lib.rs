// Licensed under the Apache-2.0 license

//! Support code shared by the secure-world drivers: register access,
//! wait loops, the common error type and log formatting helpers.

#![cfg_attr(not(test), no_std)]

mod error;
mod io;
mod mmio;
pub mod wait;

pub use error::{ConfigFault, TccError, TccResult};
pub use io::{HexBytes, HexWord};
pub use mmio::{Mmio, RealMmio};
