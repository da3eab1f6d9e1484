use std::fmt::{self, Display};

pub type Result<T, E = BitQueueError> = std::result::Result<T, E>;

/// Reasons a bit queue operation can fail. A failed call never changes the
/// queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitQueueError {
    /// A zero length request, an empty buffer, or a caller buffer too short
    /// for the requested run.
    InvalidArgument { reason: &'static str },
    /// Backing storage for a new queue could not be reserved.
    AllocationFailure { bytes: usize },
    /// The request is larger than the whole queue and can never succeed.
    SizeExceeded { requested: usize, capacity: usize },
    /// Not enough unread bits yet.
    InsufficientData { requested: usize, available: usize },
    /// Not enough free space yet.
    CapacityExceeded { requested: usize, free: usize },
    /// A cursor would have left the buffer. Always a bug in the queue.
    InternalInvariant { end: usize, capacity: usize },
}

impl BitQueueError {
    /// Transient errors can succeed later, once bits have been written or
    /// consumed. Everything else will fail again on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BitQueueError::InsufficientData { .. } | BitQueueError::CapacityExceeded { .. }
        )
    }
}

impl Display for BitQueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitQueueError::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            BitQueueError::AllocationFailure { bytes } => {
                write!(f, "failed to allocate a {bytes} byte buffer")
            }
            BitQueueError::SizeExceeded {
                requested,
                capacity,
            } => write!(
                f,
                "requested {requested} bits but the queue only holds {capacity}"
            ),
            BitQueueError::InsufficientData {
                requested,
                available,
            } => write!(
                f,
                "requested {requested} bits but only {available} are available"
            ),
            BitQueueError::CapacityExceeded { requested, free } => write!(
                f,
                "cannot append {requested} bits with only {free} bits free"
            ),
            BitQueueError::InternalInvariant { end, capacity } => write!(
                f,
                "cursor would reach bit {end} of a {capacity} bit buffer"
            ),
        }
    }
}

impl std::error::Error for BitQueueError {}
