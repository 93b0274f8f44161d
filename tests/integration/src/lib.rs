// Licensed under the Apache-2.0 license

//! Emulated platform used by the bring-up scenario tests.

use romtime::wait::Wait;
use romtime::TccResult;
use simple_logger::SimpleLogger;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;
use tcc_config::TccMemoryMap;
use tcc_emulator_periph::{BusMmio, OmcPeripheral, OtpPeripheral, SocBus};
use tcc_omc::Omc;
use tcc_otp::Otp;

/// Memory map of the emulated SoC.
pub const PLATFORM_MAP: TccMemoryMap = TccMemoryMap {
    omc_offset: 0x1330_0000,
    omc_filter_stride: 0x1_0000,
    omc_filter_count: 4,
    otp_cmd_offset: 0x1440_0000,
    otp_ctrl_offset: 0x1440_1000,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        SimpleLogger::new()
            .with_level(log::LevelFilter::Debug)
            .init()
            .unwrap();
    });
}

pub struct EmulatedSoc {
    pub map: TccMemoryMap,
    pub omc: Rc<RefCell<OmcPeripheral>>,
    pub otp: Rc<RefCell<OtpPeripheral>>,
    pub mmio: BusMmio,
}

impl EmulatedSoc {
    pub fn new(map: TccMemoryMap) -> Self {
        assert_eq!(
            map.otp_ctrl_offset,
            map.otp_cmd_offset + OtpPeripheral::CTRL_OFFSET,
            "OTP control block must follow the command block"
        );

        let omc = Rc::new(RefCell::new(OmcPeripheral::new(
            usize::from(map.omc_filter_count),
            map.omc_filter_stride,
        )));
        let otp = Rc::new(RefCell::new(OtpPeripheral::new()));
        let omc_size = omc.borrow().size();
        let bus = SocBus::new()
            .attach(map.omc_offset, omc_size, omc.clone())
            .attach(map.otp_cmd_offset, OtpPeripheral::SIZE, otp.clone());

        Self {
            map,
            omc,
            otp,
            mmio: BusMmio::new(bus),
        }
    }

    pub fn omc_driver(&self) -> TccResult<Omc<&BusMmio>> {
        Omc::new(&self.mmio, self.map.omc())
    }

    pub fn otp_driver<W: Wait>(&self, wait: W) -> Otp<&BusMmio, W> {
        Otp::new(&self.mmio, self.map.otp(), wait)
    }
}

impl Default for EmulatedSoc {
    fn default() -> Self {
        Self::new(PLATFORM_MAP)
    }
}
