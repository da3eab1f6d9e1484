use common::bits::{bytes_for_bits, copy_bits, shift_to_start, BitCursor, CopyMode, BITS_IN_BYTE};
use tracing::{debug, trace};

use crate::{BitQueueError, Result};

/// FIFO of bits over a fixed size byte buffer.
///
/// Unread bits always start at the read cursor and occupy the next
/// `written_bits` bits of the buffer. Reads consume from the front, writes
/// append after the last unread bit. Bits are LSB first within each byte.
///
/// The storage decides who releases the buffer: owned storage (`Box<[u8]>`,
/// `Vec<u8>`) is freed with the queue, a borrowed `&mut [u8]` is handed back
/// to its owner untouched apart from the bits written through the queue.
#[derive(Debug)]
pub struct BitQueue<B = Box<[u8]>> {
    buffer: B,
    capacity_bits: usize,
    read: BitCursor,
    written_bits: usize,
}

impl BitQueue {
    /// Allocates an empty queue over `byte_count` zeroed bytes.
    pub fn new(byte_count: usize) -> Result<Self> {
        if byte_count == 0 {
            return Err(BitQueueError::InvalidArgument {
                reason: "byte count must be non-zero",
            });
        }

        let failure = BitQueueError::AllocationFailure { bytes: byte_count };
        let capacity_bits = byte_count.checked_mul(BITS_IN_BYTE).ok_or(failure.clone())?;

        let mut buffer = Vec::new();
        buffer.try_reserve_exact(byte_count).map_err(|_| failure)?;
        buffer.resize(byte_count, 0);

        debug!(byte_count, "allocated bit queue");
        Ok(Self {
            buffer: buffer.into_boxed_slice(),
            capacity_bits,
            read: BitCursor::START,
            written_bits: 0,
        })
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> BitQueue<B> {
    /// Wraps a buffer that is entirely full of unread data.
    pub fn from_buffer(buffer: B) -> Result<Self> {
        let capacity_bits = buffer.as_ref().len() * BITS_IN_BYTE;
        Self::from_buffer_with_len(buffer, capacity_bits)
    }

    /// Wraps a buffer whose first `written_bits` bits are unread data.
    pub fn from_buffer_with_len(buffer: B, written_bits: usize) -> Result<Self> {
        let byte_count = buffer.as_ref().len();
        if byte_count == 0 {
            return Err(BitQueueError::InvalidArgument {
                reason: "buffer must not be empty",
            });
        }

        let capacity_bits = byte_count * BITS_IN_BYTE;
        if written_bits > capacity_bits {
            return Err(BitQueueError::SizeExceeded {
                requested: written_bits,
                capacity: capacity_bits,
            });
        }

        debug!(byte_count, written_bits, "wrapped buffer in bit queue");
        Ok(Self {
            buffer,
            capacity_bits,
            read: BitCursor::START,
            written_bits,
        })
    }

    /// Moves `bit_count` bits from the front of the queue into `destination`,
    /// starting at its first bit. Bits are OR-ed in, so anything already set
    /// in `destination` stays set, including bits past the end of the run.
    pub fn read_bits(&mut self, destination: &mut [u8], bit_count: usize) -> Result<usize> {
        self.peek_bits(destination, bit_count)?;
        trace!(bit_count, from = %self.read, "read bits");
        self.consume(bit_count);
        Ok(bit_count)
    }

    /// Same as [`BitQueue::read_bits`] without consuming anything.
    pub fn peek_bits(&self, destination: &mut [u8], bit_count: usize) -> Result<usize> {
        if bit_count == 0 {
            return Err(BitQueueError::InvalidArgument {
                reason: "bit count must be non-zero",
            });
        }

        if destination.len() < bytes_for_bits(bit_count) {
            return Err(BitQueueError::InvalidArgument {
                reason: "destination is shorter than the requested run",
            });
        }

        self.check_available(bit_count)?;
        copy_bits(
            self.buffer.as_ref(),
            self.read,
            destination,
            BitCursor::START,
            bit_count,
            CopyMode::Merge,
        );
        Ok(bit_count)
    }

    /// Reads up to 64 bits as an integer. Bit `i` of the run becomes bit `i`
    /// of the value.
    pub fn read_value(&mut self, bit_count: usize) -> Result<u64> {
        let value = self.peek_value(bit_count)?;
        trace!(bit_count, from = %self.read, value, "read value");
        self.consume(bit_count);
        Ok(value)
    }

    pub fn peek_value(&self, bit_count: usize) -> Result<u64> {
        check_value_width(bit_count)?;
        let mut bytes = [0; 8];
        self.peek_bits(&mut bytes[..bytes_for_bits(bit_count)], bit_count)?;
        Ok(u64::from_le_bytes(bytes))
    }

    /// Discards `bit_count` bits from the front of the queue.
    pub fn skip_bits(&mut self, bit_count: usize) -> Result<usize> {
        if bit_count == 0 {
            return Err(BitQueueError::InvalidArgument {
                reason: "bit count must be non-zero",
            });
        }

        self.check_available(bit_count)?;
        trace!(bit_count, from = %self.read, "skipped bits");
        self.consume(bit_count);
        Ok(bit_count)
    }

    /// Appends the first `bit_count` bits of `source` after the last unread
    /// bit. Bits previously stored at the target position are replaced.
    pub fn write_bits(&mut self, source: &[u8], bit_count: usize) -> Result<usize> {
        if bit_count == 0 {
            return Err(BitQueueError::InvalidArgument {
                reason: "bit count must be non-zero",
            });
        }

        if source.len() < bytes_for_bits(bit_count) {
            return Err(BitQueueError::InvalidArgument {
                reason: "source is shorter than the requested run",
            });
        }

        if bit_count > self.capacity_bits {
            return Err(BitQueueError::SizeExceeded {
                requested: bit_count,
                capacity: self.capacity_bits,
            });
        }

        if !self.has_space(bit_count) {
            return Err(BitQueueError::CapacityExceeded {
                requested: bit_count,
                free: self.free_bits(),
            });
        }

        // The free space is there, it may just be in front of the read cursor.
        if self.write_position().bit_index() + bit_count > self.capacity_bits {
            self.compact();
        }

        let start = self.write_position();
        let end = start.bit_index() + bit_count;
        if end > self.capacity_bits {
            return Err(BitQueueError::InternalInvariant {
                end,
                capacity: self.capacity_bits,
            });
        }

        trace!(bit_count, at = %start, "wrote bits");
        copy_bits(
            source,
            BitCursor::START,
            self.buffer.as_mut(),
            start,
            bit_count,
            CopyMode::Overwrite,
        );
        self.written_bits += bit_count;
        Ok(bit_count)
    }

    /// Appends the low `bit_count` bits of `value`, up to 64.
    pub fn write_value(&mut self, value: u64, bit_count: usize) -> Result<usize> {
        check_value_width(bit_count)?;
        self.write_bits(&value.to_le_bytes(), bit_count)
    }

    /// Shifts the unread bits to the start of the buffer, making all free
    /// space available to writes. The unread content is unchanged.
    pub fn compact(&mut self) {
        if self.read == BitCursor::START {
            return;
        }

        debug!(from = %self.read, bits = self.written_bits, "compacting bit queue");
        shift_to_start(self.buffer.as_mut(), self.read, self.written_bits);
        self.read = BitCursor::START;
    }

    /// Forgets all unread bits. The buffer itself is left as is.
    pub fn clear(&mut self) {
        self.read = BitCursor::START;
        self.written_bits = 0;
    }

    /// Releases the queue. Owned storage is freed, borrowed storage goes back
    /// to its owner.
    pub fn destroy(self) -> Result<()> {
        debug!(
            byte_count = self.buffer.as_ref().len(),
            unread_bits = self.written_bits,
            "destroying bit queue"
        );
        drop(self);
        Ok(())
    }

    /// Releases the queue but keeps the storage.
    pub fn into_inner(self) -> B {
        self.buffer
    }

    pub fn capacity_bits(&self) -> usize {
        self.capacity_bits
    }

    pub fn written_bits(&self) -> usize {
        self.written_bits
    }

    pub fn free_bits(&self) -> usize {
        self.capacity_bits - self.written_bits
    }

    pub fn is_empty(&self) -> bool {
        self.written_bits == 0
    }

    pub fn is_full(&self) -> bool {
        self.written_bits == self.capacity_bits
    }

    pub fn has_data(&self, bit_count: usize) -> bool {
        self.written_bits >= bit_count
    }

    pub fn has_space(&self, bit_count: usize) -> bool {
        self.free_bits() >= bit_count
    }

    /// Position of the next bit to be read.
    pub fn read_position(&self) -> BitCursor {
        self.read
    }

    /// Position the next written bit will land on, unless a write has to
    /// compact first.
    pub fn write_position(&self) -> BitCursor {
        self.read.advanced(self.written_bits)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    fn check_available(&self, bit_count: usize) -> Result<()> {
        if bit_count > self.capacity_bits {
            return Err(BitQueueError::SizeExceeded {
                requested: bit_count,
                capacity: self.capacity_bits,
            });
        }

        if !self.has_data(bit_count) {
            return Err(BitQueueError::InsufficientData {
                requested: bit_count,
                available: self.written_bits,
            });
        }

        let end = self.read.bit_index() + bit_count;
        if end > self.capacity_bits {
            return Err(BitQueueError::InternalInvariant {
                end,
                capacity: self.capacity_bits,
            });
        }

        Ok(())
    }

    fn consume(&mut self, bit_count: usize) {
        self.read.advance(bit_count);
        self.written_bits -= bit_count;
    }
}

fn check_value_width(bit_count: usize) -> Result<()> {
    if !(1..=64).contains(&bit_count) {
        return Err(BitQueueError::InvalidArgument {
            reason: "value width must be between 1 and 64 bits",
        });
    }

    Ok(())
}
