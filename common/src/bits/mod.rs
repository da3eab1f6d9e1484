//! Primitives for addressing byte buffers at bit granularity. Bits are ordered
//! least to most significant within each byte, and bytes are taken in buffer
//! order, so a run spanning several bytes reads as a little endian integer.

mod cursor;
mod span;

pub use cursor::BitCursor;
pub use span::{copy_bits, shift_to_start, CopyMode};

pub const BITS_IN_BYTE: usize = 8;

/// Byte with the low `width` bits set. Widths of 8 or more give a full byte.
pub const fn low_mask(width: u8) -> u8 {
    if width as usize >= BITS_IN_BYTE {
        u8::MAX
    } else {
        (1 << width) - 1
    }
}

/// Number of bytes needed to hold `bits` bits.
pub const fn bytes_for_bits(bits: usize) -> usize {
    bits.div_ceil(BITS_IN_BYTE)
}

/// Reads a single bit, indexed from the least significant bit of the first
/// byte.
pub fn bit_at(bytes: &[u8], index: usize) -> bool {
    (bytes[index / BITS_IN_BYTE] >> (index % BITS_IN_BYTE)) & 1 != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks() {
        assert_eq!(low_mask(0), 0b0000_0000);
        assert_eq!(low_mask(1), 0b0000_0001);
        assert_eq!(low_mask(5), 0b0001_1111);
        assert_eq!(low_mask(7), 0b0111_1111);
        assert_eq!(low_mask(8), 0b1111_1111);
    }

    #[test]
    fn byte_counts() {
        assert_eq!(bytes_for_bits(0), 0);
        assert_eq!(bytes_for_bits(1), 1);
        assert_eq!(bytes_for_bits(8), 1);
        assert_eq!(bytes_for_bits(9), 2);
        assert_eq!(bytes_for_bits(64), 8);
    }

    #[test]
    fn bits_are_lsb_first() {
        let bytes = [0b1010_1010, 0b0000_0001];
        let bits = (0..9).map(|i| bit_at(&bytes, i)).collect::<Vec<_>>();
        assert_eq!(
            bits,
            [false, true, false, true, false, true, false, true, true]
        );
    }
}
