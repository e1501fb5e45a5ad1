use thiserror::Error;

/// Errors that can occur when allocating, reading or writing buffers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// An argument was rejected before any work was done, e.g. a tuple with the wrong number
    /// of components or a value that is not representable in the element kind of a store
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
    /// An element, tuple or sub-buffer index was outside of `0..len`
    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    /// The backing memory for the requested capacity could not be obtained
    #[error("failed to allocate {requested_bytes} bytes")]
    AllocationFailure { requested_bytes: usize },
}

impl BufferError {
    pub(crate) fn invalid_argument<S: Into<String>>(reason: S) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Checks that `index` is within `0..len`
    pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
        if index >= len {
            Err(Self::IndexOutOfBounds { index, len })
        } else {
            Ok(())
        }
    }
}

pub type Result<T> = std::result::Result<T, BufferError>;
