use std::fmt::{self, Display};

use super::BITS_IN_BYTE;

/// A position inside a byte buffer: the byte index and the bit within that
/// byte. `bit` is always below 8.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BitCursor {
    pub byte: usize,
    pub bit: u8,
}

impl BitCursor {
    pub const START: Self = Self { byte: 0, bit: 0 };

    pub const fn new(byte: usize, bit: u8) -> Self {
        debug_assert!((bit as usize) < BITS_IN_BYTE);
        Self { byte, bit }
    }

    pub const fn from_bit_index(index: usize) -> Self {
        Self {
            byte: index / BITS_IN_BYTE,
            bit: (index % BITS_IN_BYTE) as u8,
        }
    }

    pub const fn bit_index(&self) -> usize {
        self.byte * BITS_IN_BYTE + self.bit as usize
    }

    /// Bits left before the next byte boundary.
    pub const fn remaining_in_byte(&self) -> u8 {
        (BITS_IN_BYTE - self.bit as usize) as u8
    }

    /// Moves the cursor forward, carrying into the byte index whenever the
    /// bit offset reaches 8.
    pub fn advance(&mut self, bits: usize) {
        let bit = self.bit as usize + bits;
        self.byte += bit / BITS_IN_BYTE;
        self.bit = (bit % BITS_IN_BYTE) as u8;
    }

    pub fn advanced(mut self, bits: usize) -> Self {
        self.advance(bits);
        self
    }
}

impl Display for BitCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.byte, self.bit)
    }
}
