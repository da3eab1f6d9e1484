//! A queue of bits over a fixed size byte buffer. Runs of any width can be
//! appended and drained without regard for byte alignment.
//!
//! ```
//! use bit_queue::BitQueue;
//!
//! let mut buffer = [0xAA, 0xAA];
//! let mut queue = BitQueue::from_buffer(&mut buffer[..])?;
//! assert_eq!(queue.read_value(8)?, 0xAA);
//! assert_eq!(queue.read_value(5)?, 0b01010);
//! assert_eq!(queue.read_value(1)?, 1);
//! queue.destroy()?;
//! # Ok::<(), bit_queue::BitQueueError>(())
//! ```

mod error;
mod queue;

pub use common::bits::BitCursor;
pub use error::{BitQueueError, Result};
pub use queue::BitQueue;
