// Licensed under the Apache-2.0 license

//! Register layouts for the Telechips secure-world peripherals.
//!
//! Offsets are byte offsets from the start of a register block. Bit layouts
//! are tock-registers bitfields so drivers can compose and decode words by
//! field name.

#![no_std]

pub mod omc;
pub mod otp;
