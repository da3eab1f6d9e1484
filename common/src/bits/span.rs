use super::{bytes_for_bits, low_mask, BitCursor};

/// How copied bits are combined with the destination byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMode {
    /// OR the bits into the destination. Bits already set stay set, so the
    /// destination should be zeroed for a deterministic result.
    Merge,
    /// Clear the target bits first, replacing whatever was there.
    Overwrite,
}

/// Copies `bit_count` bits from `src` starting at `src_pos` into `dst`
/// starting at `dst_pos`, returning both cursors advanced past the run.
///
/// Each step moves the longest span that crosses neither a source nor a
/// destination byte boundary, so a run is copied in at most
/// `2 * bytes + 1` steps regardless of alignment. Bits of the destination
/// outside the run are never touched.
///
/// Panics if either range runs past the end of its slice.
pub fn copy_bits(
    src: &[u8],
    mut src_pos: BitCursor,
    dst: &mut [u8],
    mut dst_pos: BitCursor,
    bit_count: usize,
    mode: CopyMode,
) -> (BitCursor, BitCursor) {
    let mut remaining = bit_count;
    while remaining > 0 {
        let span = src_pos
            .remaining_in_byte()
            .min(dst_pos.remaining_in_byte())
            .min(remaining.min(8) as u8);
        let mask = low_mask(span);

        let bits = (src[src_pos.byte] >> src_pos.bit) & mask;
        let byte = &mut dst[dst_pos.byte];
        if mode == CopyMode::Overwrite {
            *byte &= !(mask << dst_pos.bit);
        }
        *byte |= bits << dst_pos.bit;

        src_pos.advance(span as usize);
        dst_pos.advance(span as usize);
        remaining -= span as usize;
    }

    (src_pos, dst_pos)
}

/// Moves the `bit_count` bits starting at `from` to the very start of the
/// buffer. Bits past the moved run in its final byte are left unspecified.
pub fn shift_to_start(buf: &mut [u8], from: BitCursor, bit_count: usize) {
    let shift = from.bit;
    for i in 0..bytes_for_bits(bit_count) {
        // Source bytes are always at or after `i`, so nothing is clobbered
        // before it has been read.
        let low = buf[from.byte + i] >> shift;
        let high = match (shift, buf.get(from.byte + i + 1)) {
            (0, _) | (_, None) => 0,
            (_, Some(&next)) => next << (8 - shift),
        };
        buf[i] = low | high;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::bit_at;

    fn copy(
        src: &[u8],
        src_pos: BitCursor,
        dst: &mut [u8],
        dst_pos: BitCursor,
        bits: usize,
    ) -> (BitCursor, BitCursor) {
        copy_bits(src, src_pos, dst, dst_pos, bits, CopyMode::Merge)
    }

    #[test]
    fn aligned_whole_byte() {
        let mut dst = [0];
        let end = copy(&[0xAB], BitCursor::START, &mut dst, BitCursor::START, 8);
        assert_eq!(dst, [0xAB]);
        assert_eq!(end, (BitCursor::new(1, 0), BitCursor::new(1, 0)));
    }

    #[test]
    fn equal_offsets() {
        let mut dst = [0];
        let at = BitCursor::new(0, 2);
        copy(&[0b1011_0110], at, &mut dst, at, 4);
        assert_eq!(dst, [0b0011_0100]);
    }

    #[test]
    fn source_aligned_destination_offset() {
        let mut dst = [0];
        let (src_end, dst_end) = copy(
            &[0b0001_1011],
            BitCursor::START,
            &mut dst,
            BitCursor::new(0, 3),
            5,
        );
        assert_eq!(dst, [0b1101_1000]);
        assert_eq!(src_end, BitCursor::new(0, 5));
        assert_eq!(dst_end, BitCursor::new(1, 0));
    }

    #[test]
    fn source_offset_destination_aligned() {
        let mut dst = [0];
        copy(
            &[0b1110_0000, 0b0000_0101],
            BitCursor::new(0, 5),
            &mut dst,
            BitCursor::START,
            6,
        );
        assert_eq!(dst, [0b0010_1111]);
    }

    #[test]
    fn merge_leaves_other_bits() {
        let mut dst = [0x00, 0xF0];
        copy(&[0xFF, 0x0F], BitCursor::START, &mut dst, BitCursor::START, 12);
        assert_eq!(dst, [0xFF, 0xFF]);

        let mut dst = [0xF0];
        copy(&[0x05], BitCursor::START, &mut dst, BitCursor::START, 4);
        assert_eq!(dst, [0xF5]);
    }

    #[test]
    fn overwrite_clears_target_bits() {
        let mut dst = [0xFF, 0xFF];
        copy_bits(
            &[0x00],
            BitCursor::START,
            &mut dst,
            BitCursor::new(0, 4),
            6,
            CopyMode::Overwrite,
        );
        assert_eq!(dst, [0x0F, 0xFC]);
    }

    #[test]
    fn matches_bitwise_copy_at_every_alignment() {
        let src = [0x5A, 0xC3, 0x96, 0x3C, 0xF0];
        for src_offset in 0..8 {
            for dst_offset in 0..8 {
                for bits in 1..=24 {
                    let mut dst = [0u8; 4];
                    copy(
                        &src,
                        BitCursor::from_bit_index(src_offset),
                        &mut dst,
                        BitCursor::from_bit_index(dst_offset),
                        bits,
                    );

                    for i in 0..32 {
                        let expected = (dst_offset..dst_offset + bits)
                            .contains(&i)
                            .then(|| bit_at(&src, src_offset + i - dst_offset))
                            .unwrap_or(false);
                        assert_eq!(
                            bit_at(&dst, i),
                            expected,
                            "src offset {src_offset}, dst offset {dst_offset}, {bits} bits, bit {i}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn shift_unaligned_run() {
        let mut buf = [0b1010_1100, 0b0000_0011];
        shift_to_start(&mut buf, BitCursor::new(0, 2), 10);
        assert_eq!(buf[0], 0xEB);
        assert_eq!(buf[1] & 0b11, 0);
    }

    #[test]
    fn shift_whole_bytes() {
        let mut buf = [0x00, 0x34, 0x12];
        shift_to_start(&mut buf, BitCursor::new(1, 0), 16);
        assert_eq!(buf[..2], [0x34, 0x12]);
    }
}
