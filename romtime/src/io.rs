// Licensed under the Apache-2.0 license.

use core::fmt::{Display, Formatter, Result, Write};

/// Lower-case hex dump of a byte slice, without separators.
pub struct HexBytes<'a>(pub &'a [u8]);

impl Display for HexBytes<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";
        for &x in self.0.iter() {
            f.write_char(DIGITS[usize::from(x >> 4)] as char)?;
            f.write_char(DIGITS[usize::from(x & 0xf)] as char)?;
        }
        Ok(())
    }
}

/// A register word formatted as `0x` followed by eight hex digits.
pub struct HexWord(pub u32);

impl Display for HexWord {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str("0x")?;
        HexBytes(&self.0.to_be_bytes()).fmt(f)
    }
}
