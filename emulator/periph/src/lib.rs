/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Emulated Telechips secure-world peripherals and the traced bus that
    connects them to the drivers under test.

--*/

mod bus;
mod omc;
mod otp;

pub use bus::{Bus, BusAccess, BusMmio, BusOp, SocBus, Width};
pub use omc::{InjectedViolation, OmcPeripheral, RegionState};
pub use otp::OtpPeripheral;
