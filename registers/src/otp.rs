// Licensed under the Apache-2.0 license

//! OTP controller registers.
//!
//! The controller is split into a command block, which carries the
//! read/program handshake, and a control block holding the protect bits.

/// Number of 32-bit words moved by one read or program command.
pub const WORDS_PER_COMMAND: usize = 4;

pub mod offsets {
    pub const GENERAL_STATUS: usize = 0x0;
    pub const READ_STATUS: usize = 0x4;
    pub const PROG_STATUS: usize = 0x8;
    pub const OTP_ADDRESS: usize = 0x10;
    pub const OTP_CONTROL: usize = 0x14;

    pub const READ_DATA_PAYLOAD: [usize; 4] = [0x20, 0x24, 0x28, 0x2c];
    pub const READ_ADMIN_INFO: [usize; 4] = [0x30, 0x34, 0x38, 0x3c];
    pub const PROG_DATA_PAYLOAD: [usize; 4] = [0x40, 0x44, 0x48, 0x4c];
    pub const PROG_ADMIN_INFO: [usize; 4] = [0x50, 0x54, 0x58, 0x5c];

    /// Protect register, first word of the control block.
    pub const CTRL_PROTECT: usize = 0x0;
}

pub mod bits {
    use tock_registers::register_bitfields;

    register_bitfields![u32,
        pub GeneralStatus [
            READY OFFSET(0) NUMBITS(1) []
        ],
        pub ReadStatus [
            PERMISSION_ERR OFFSET(0) NUMBITS(1) [],
            DATA_ERR OFFSET(3) NUMBITS(1) []
        ],
        pub OtpControl [
            START OFFSET(0) NUMBITS(1) [],
            CMD OFFSET(4) NUMBITS(4) [
                Program = 0xA,
                Read = 0xF
            ],
            DONE OFFSET(16) NUMBITS(1) []
        ],
        pub AdminInfo [
            VALID OFFSET(0) NUMBITS(1) []
        ],
        pub CtrlProtect [
            PROTECT OFFSET(3) NUMBITS(1) [],
            EXT_WP OFFSET(30) NUMBITS(1) []
        ],
    ];
}
