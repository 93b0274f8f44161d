// Licensed under the Apache-2.0 license

use romtime::wait::{BoundedSpin, Spin};
use romtime::{ConfigFault, TccError};
use tcc_emulator_periph::{InjectedViolation, RegionState};
use tcc_omc::{Direction, OmcAction, OmcRegionConfig};
use tcc_registers::omc::offsets;
use tests_integration::{init_logging, EmulatedSoc, PLATFORM_MAP};

const SECURE_BASE: u64 = 0x1_3000_0000;
const SECURE_TOP: u64 = 0x1_31ff_ffff;
const SHM_BASE: u64 = 0x1_3200_0000;
const SHM_TOP: u64 = 0x1_323f_ffff;

#[test]
fn test_secure_memory_bring_up() {
    init_logging();
    let soc = EmulatedSoc::default();
    let omc = soc.omc_driver().unwrap();

    omc.configure_regions(&[
        // Secure world image, no non-secure filter access.
        (1, OmcRegionConfig::new(0, SECURE_BASE, SECURE_TOP)),
        // Shared memory, enforced on the CPU and GPU filters.
        (
            2,
            OmcRegionConfig::new(0, SHM_BASE, SHM_TOP)
                .with_filters(&[0, 2])
                .with_ns_device_access(0xffff_ffff),
        ),
    ])
    .unwrap();
    omc.set_action(OmcAction::ErrorAndInterrupt);

    for filter in 0..usize::from(PLATFORM_MAP.omc_filter_count) {
        let omc_hw = soc.omc.borrow();
        assert_eq!(
            omc_hw.region(filter, 1),
            RegionState {
                base: SECURE_BASE,
                top: SECURE_TOP,
                attributes: 0xc000_0000,
                id_access: 0,
            }
        );
        let shm = omc_hw.region(filter, 2);
        assert_eq!(shm.attributes & 1, u32::from(filter == 0 || filter == 2));
        assert_eq!(shm.id_access, 0xffff_ffff);
        assert_eq!(omc_hw.action(filter), 3);
    }
    for filter in 0..PLATFORM_MAP.omc_filter_count {
        assert_eq!(omc.action(filter), Ok(OmcAction::ErrorAndInterrupt));
    }
}

#[test]
fn test_violation_handling() {
    init_logging();
    let soc = EmulatedSoc::default();
    let omc = soc.omc_driver().unwrap();

    soc.omc.borrow_mut().inject_violation(
        3,
        Direction::Write.index(),
        InjectedViolation {
            status: 1,
            address: SECURE_BASE + 0x40,
            control: 1 << 21,
            id: (0x31 << 8) | 0x9,
        },
    );

    // What a fault handler does: find the filter, report, acknowledge.
    let faulted: Vec<u8> = (0..omc.filter_count())
        .filter(|&f| omc.violations(f).unwrap().iter().any(Option::is_some))
        .collect();
    assert_eq!(faulted, vec![3]);

    let [_, write] = omc.violations(3).unwrap();
    let write = write.unwrap();
    assert_eq!(
        write.to_string(),
        "Violation @0x130000040, non-secure unprivileged write, MID 09, AID 31"
    );

    omc.fail_dump(3);
    omc.int_clear(3).unwrap();
    assert_eq!(soc.omc.borrow().int_clears(3), 1);
    assert_eq!(omc.violations(3).unwrap(), [None, None]);
    // Scan, decode and dump each read the fault address; the cleared latch does not.
    let filter3 = PLATFORM_MAP.omc_offset + 3 * PLATFORM_MAP.omc_filter_stride;
    assert_eq!(soc.mmio.reads_of(filter3 + offsets::fail_address(1)), 3);
}

#[test]
fn test_misconfiguration_is_fatal() {
    init_logging();
    let soc = EmulatedSoc::default();
    let omc = soc.omc_driver().unwrap();

    let err = omc
        .configure_region(1, &OmcRegionConfig::new(0b1_0000, SECURE_BASE, SECURE_TOP))
        .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(
        err,
        TccError::ConfigurationFault(ConfigFault::FilterMaskOverflow {
            filters: 0b1_0000,
            filter_count: 4,
        })
    );
    assert!(soc.mmio.trace().is_empty());
}

#[test]
fn test_fuse_provisioning() {
    init_logging();
    let soc = EmulatedSoc::default();
    let otp = soc.otp_driver(Spin);
    let key = [0x0123_4567, 0x89ab_cdef, 0xfedc_ba98, 0x7654_3210];

    let mut buf = [0u32; 4];
    assert_eq!(otp.read_128(0x1800, &mut buf), Err(TccError::NoData));

    otp.write_128(0x1800, &key).unwrap();
    otp.read_128(0x1800, &mut buf).unwrap();
    assert_eq!(buf, key);

    // Provisioning done, the board asserts the write-protect pin.
    soc.otp.borrow_mut().set_write_protect(true);
    assert_eq!(
        otp.write_128(0x1810, &[1, 0, 0, 0]),
        Err(TccError::WriteProtected)
    );
    assert_eq!(soc.otp.borrow().fuses(0x1810), None);
    otp.read_128(0x1800, &mut buf).unwrap();
    assert_eq!(buf, key);
}

#[test]
fn test_hung_fuse_controller() {
    init_logging();
    let soc = EmulatedSoc::default();
    soc.otp.borrow_mut().set_done_delay(None);
    let otp = soc.otp_driver(BoundedSpin::new(1000));

    let mut buf = [0u32; 4];
    assert_eq!(otp.read_128(0x1000, &mut buf), Err(TccError::Timeout));
}
