use thiserror::Error;

use crate::segment::SegmentId;

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, BufferError>;

/// Errors raised by chain construction, cursor movement and slicing.
///
/// Every variant maps onto one of three broad kinds, see [`BufferError::kind`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A slice or construction range falls outside its source.
    #[error("invalid range: {0}")]
    InvalidRange(&'static str),
    /// A walk would pass the end of the buffer or a validated bound.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    /// A numeric argument is negative.
    #[error("argument out of range: `{name}` was {value}")]
    ArgumentOutOfRange {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: isize,
    },
    /// A position was narrowed to a segment kind it does not hold.
    #[error("unexpected segment type: expected {expected}, found {found}")]
    UnexpectedSegmentType {
        /// Kind requested by the caller.
        expected: &'static str,
        /// Kind actually stored in the position.
        found: &'static str,
    },
    /// `set_next` was called twice on the same segment.
    #[error("segment {0} is already linked")]
    SegmentAlreadyLinked(SegmentId),
    /// The id does not belong to this chain.
    #[error("segment {0} does not exist in this chain")]
    UnknownSegment(SegmentId),
    /// Links must point forward in allocation order.
    #[error("cannot link segment {from} to segment {to}")]
    InvalidLink {
        /// Segment being linked.
        from: SegmentId,
        /// Requested successor.
        to: SegmentId,
    },
}

/// The three-way error taxonomy callers usually branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// Bad slice or construction bounds.
    InvalidRange,
    /// A walk or narrowing that cannot be satisfied.
    InvalidOperation,
    /// A negative count or length.
    ArgumentOutOfRange,
}

impl BufferError {
    /// Classifies the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRange(_) => ErrorKind::InvalidRange,
            Self::ArgumentOutOfRange { .. } => ErrorKind::ArgumentOutOfRange,
            Self::InvalidOperation(_)
            | Self::UnexpectedSegmentType { .. }
            | Self::SegmentAlreadyLinked(_)
            | Self::UnknownSegment(_)
            | Self::InvalidLink { .. } => ErrorKind::InvalidOperation,
        }
    }
}
